//! Core types for kernel operations.

use crate::error::Result;
use crate::example::Example;

/// Trait for kernel functions that compute similarity between examples.
///
/// A kernel reads one named representation from each example and maps the
/// pair to a scalar similarity. Evaluation takes `&mut self` because some
/// kernels own scratch state (the subtree kernel's delta cache) that is
/// rebuilt on every call.
pub trait Kernel: Send {
    /// Compute kernel value between two examples.
    ///
    /// # Arguments
    /// * `x` - First example
    /// * `y` - Second example
    ///
    /// # Returns
    /// Unnormalized similarity score
    fn compute(&mut self, x: &Example, y: &Example) -> Result<f64>;

    /// Compute the Gram matrix for a set of examples.
    ///
    /// Kernels are symmetric, so only the upper triangle is evaluated.
    ///
    /// # Returns
    /// Kernel matrix K where `K[i,j] = kernel(examples[i], examples[j])`
    fn compute_matrix(&mut self, examples: &[Example]) -> Result<Vec<Vec<f64>>> {
        let n = examples.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i..n {
                let value = self.compute(&examples[i], &examples[j])?;
                matrix[i][j] = value;
                matrix[j][i] = value;
            }
        }

        Ok(matrix)
    }

    /// Get kernel name for identification.
    fn name(&self) -> &str;

    /// Identifier of the representation this kernel reads.
    fn representation(&self) -> &str;
}
