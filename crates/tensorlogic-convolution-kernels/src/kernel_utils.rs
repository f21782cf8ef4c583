//! Gram matrix utilities.
//!
//! - Parallel Gram matrix computation with one engine per worker
//! - Symmetry validation of precomputed kernel matrices

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::example::Example;
use crate::types::Kernel;

/// Compute the Gram matrix of `examples` in parallel.
///
/// Rows of the upper triangle are distributed over the rayon thread pool.
/// Each worker evaluates with its own clone of `kernel`, so engines owning a
/// delta cache never share it. The lower triangle is mirrored afterwards.
///
/// # Examples
/// ```
/// use tensorlogic_convolution_kernels::kernel_utils::compute_matrix_parallel;
/// use tensorlogic_convolution_kernels::{Example, SubtreeKernel, SubtreeKernelConfig, TreeRepresentation};
///
/// let kernel = SubtreeKernel::new(SubtreeKernelConfig::new()).unwrap();
/// let examples: Vec<Example> = ["(S a)", "(S b)", "(S a)"]
///     .iter()
///     .map(|t| Example::new().with_representation("tree", t.parse::<TreeRepresentation>().unwrap()))
///     .collect();
///
/// let gram = compute_matrix_parallel(&kernel, &examples).unwrap();
/// assert_eq!(gram[0][2], gram[0][0]);
/// assert_eq!(gram[1][0], gram[0][1]);
/// ```
pub fn compute_matrix_parallel<K>(kernel: &K, examples: &[Example]) -> Result<Vec<Vec<f64>>>
where
    K: Kernel + Clone + Sync,
{
    let n = examples.len();
    debug!(
        kernel = kernel.name(),
        examples = n,
        threads = rayon::current_num_threads(),
        "computing gram matrix"
    );

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map_init(
            || kernel.clone(),
            |worker, i| {
                (i..n)
                    .map(|j| worker.compute(&examples[i], &examples[j]))
                    .collect::<Result<Vec<f64>>>()
            },
        )
        .collect::<Result<_>>()?;

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + offset;
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }

    Ok(matrix)
}

/// Check that a kernel matrix is square and symmetric within `tolerance`.
///
/// Positive semi-definiteness is not checked.
///
/// # Examples
/// ```
/// use tensorlogic_convolution_kernels::kernel_utils::is_symmetric_kernel_matrix;
///
/// let gram = vec![vec![1.0, 0.8], vec![0.8, 1.0]];
/// assert!(is_symmetric_kernel_matrix(&gram, 1e-10));
/// ```
pub fn is_symmetric_kernel_matrix(kernel_matrix: &[Vec<f64>], tolerance: f64) -> bool {
    let n = kernel_matrix.len();

    if kernel_matrix.iter().any(|row| row.len() != n) {
        return false;
    }

    (0..n).all(|i| {
        ((i + 1)..n).all(|j| (kernel_matrix[i][j] - kernel_matrix[j][i]).abs() <= tolerance)
    })
}
