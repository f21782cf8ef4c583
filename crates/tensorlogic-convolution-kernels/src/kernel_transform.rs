//! Kernel normalization.
//!
//! Convolution kernels grow with the size of their inputs, so they are often
//! used in normalized form:
//!
//! ```text
//! K_norm(x, y) = K(x, y) / sqrt(K(x, x) * K(y, y))
//! ```
//!
//! [`NormalizedKernel`] wraps a kernel and normalizes every evaluation;
//! [`normalize_kernel_matrix`] normalizes a precomputed Gram matrix.

use tracing::warn;

use crate::error::{KernelError, Result};
use crate::example::Example;
use crate::types::Kernel;

/// Normalize a kernel matrix to have unit diagonal entries.
///
/// # Arguments
/// * `kernel_matrix` - Input kernel matrix (must be square)
///
/// # Returns
/// * Normalized kernel matrix
///
/// # Examples
/// ```
/// use tensorlogic_convolution_kernels::kernel_transform::normalize_kernel_matrix;
///
/// let gram = vec![vec![4.0, 2.0], vec![2.0, 9.0]];
/// let normalized = normalize_kernel_matrix(&gram).unwrap();
///
/// assert!((normalized[0][0] - 1.0).abs() < 1e-10);
/// assert!((normalized[0][1] - 2.0 / 6.0).abs() < 1e-10);
/// ```
pub fn normalize_kernel_matrix(kernel_matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = kernel_matrix.len();

    if let Some(row) = kernel_matrix.iter().find(|row| row.len() != n) {
        return Err(KernelError::ComputationError(format!(
            "Kernel matrix must be square: {} rows, found a row of length {}",
            n,
            row.len()
        )));
    }

    let mut diagonal = Vec::with_capacity(n);
    for (i, row) in kernel_matrix.iter().enumerate() {
        let value = row[i];
        if value.is_nan() || value <= 0.0 {
            return Err(KernelError::ComputationError(format!(
                "Kernel matrix has non-positive diagonal element {} at {}",
                value, i
            )));
        }
        diagonal.push(value);
    }

    Ok(kernel_matrix
        .iter()
        .zip(&diagonal)
        .map(|(row, d_i)| {
            row.iter()
                .zip(&diagonal)
                .map(|(value, d_j)| value / (d_i * d_j).sqrt())
                .collect()
        })
        .collect())
}

/// Normalized kernel wrapper.
///
/// Wraps a kernel and normalizes its output so that every example with a
/// non-zero self-similarity scores 1.0 against itself. A pair involving an
/// example whose self-similarity is 0 scores 0.
///
/// # Examples
/// ```
/// use tensorlogic_convolution_kernels::{
///     Example, Kernel, NormalizedKernel, SubtreeKernel, SubtreeKernelConfig, TreeRepresentation,
/// };
///
/// let base = SubtreeKernel::new(SubtreeKernelConfig::new()).unwrap();
/// let mut kernel = NormalizedKernel::new(base);
///
/// let tree: TreeRepresentation = "(S (NP a) (VP b))".parse().unwrap();
/// let x = Example::new().with_representation("tree", tree);
///
/// let self_sim = kernel.compute(&x, &x).unwrap();
/// assert!((self_sim - 1.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct NormalizedKernel<K> {
    inner: K,
    name: String,
}

impl<K: Kernel> NormalizedKernel<K> {
    /// Wrap a kernel
    pub fn new(inner: K) -> Self {
        let name = format!("Normalized{}", inner.name());
        Self { inner, name }
    }

    /// The wrapped kernel
    pub fn inner(&self) -> &K {
        &self.inner
    }

    /// Unwrap the kernel
    pub fn into_inner(self) -> K {
        self.inner
    }
}

impl<K: Kernel> Kernel for NormalizedKernel<K> {
    fn compute(&mut self, x: &Example, y: &Example) -> Result<f64> {
        let k_xy = self.inner.compute(x, y)?;
        let k_xx = self.inner.compute(x, x)?;
        let k_yy = self.inner.compute(y, y)?;

        let norm = (k_xx * k_yy).sqrt();
        if norm == 0.0 {
            warn!(
                kernel = self.inner.name(),
                k_xx, k_yy, "zero self-similarity, normalized value set to 0"
            );
            return Ok(0.0);
        }

        Ok(k_xy / norm)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn representation(&self) -> &str {
        self.inner.representation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceRepresentation;
    use crate::sequence_kernel::{SequenceKernel, SequenceKernelConfig};
    use crate::tree::TreeRepresentation;
    use crate::tree_kernel::{SubtreeKernel, SubtreeKernelConfig};
    use approx::assert_abs_diff_eq;

    fn tree_example(text: &str) -> Example {
        Example::new().with_representation("tree", text.parse::<TreeRepresentation>().unwrap())
    }

    #[test]
    fn test_normalize_kernel_matrix_correctness() {
        let gram = vec![vec![4.0, 2.0, 1.0], vec![2.0, 9.0, 3.0], vec![1.0, 3.0, 16.0]];
        let normalized = normalize_kernel_matrix(&gram).unwrap();

        for (i, row) in normalized.iter().enumerate() {
            assert_abs_diff_eq!(row[i], 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(normalized[0][1], 2.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized[1][2], 3.0 / 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized[2][0], normalized[0][2], epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_kernel_matrix_empty() {
        assert!(normalize_kernel_matrix(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_kernel_matrix_non_square() {
        let gram = vec![vec![1.0, 0.5], vec![0.5]];
        assert!(normalize_kernel_matrix(&gram).is_err());
    }

    #[test]
    fn test_normalize_kernel_matrix_zero_diagonal() {
        let gram = vec![vec![1.0, 0.0], vec![0.0, 0.0]];
        assert!(matches!(
            normalize_kernel_matrix(&gram),
            Err(KernelError::ComputationError(_))
        ));
    }

    #[test]
    fn test_normalized_subtree_kernel() {
        let base = SubtreeKernel::new(SubtreeKernelConfig::new()).unwrap();
        let mut kernel = NormalizedKernel::new(base);
        assert_eq!(kernel.name(), "NormalizedSubtree");
        assert_eq!(kernel.representation(), "tree");

        let x = tree_example("(S (NP the dog) (VP barks))");
        let y = tree_example("(S (NP the cat) (VP barks))");

        assert_abs_diff_eq!(kernel.compute(&x, &x).unwrap(), 1.0, epsilon = 1e-9);
        let sim = kernel.compute(&x, &y).unwrap();
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_zero_self_similarity_gives_zero() {
        let base = SubtreeKernel::new(SubtreeKernelConfig::new()).unwrap();
        let mut kernel = NormalizedKernel::new(base);

        let empty = Example::new().with_representation("tree", TreeRepresentation::empty());
        let x = tree_example("(S a)");
        assert_eq!(kernel.compute(&empty, &x).unwrap(), 0.0);
    }

    #[test]
    fn test_normalized_sequence_kernel_bounded() {
        let base = SequenceKernel::new(SequenceKernelConfig::new()).unwrap();
        let mut kernel = NormalizedKernel::new(base);

        let x = Example::new().with_representation(
            "sequence",
            SequenceRepresentation::from_tokens(["a", "b", "c", "d"]),
        );
        let y = Example::new()
            .with_representation("sequence", SequenceRepresentation::from_tokens(["a", "c"]));

        let sim = kernel.compute(&x, &y).unwrap();
        assert!(sim > 0.0 && sim <= 1.0 + 1e-12);
        assert_abs_diff_eq!(kernel.into_inner().config().decay, 0.75);
    }
}
