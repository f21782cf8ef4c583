//! Gapped subsequence kernel over element sequences.
//!
//! Counts the (possibly non-contiguous) subsequences of length `1..=n` two
//! sequences share. Every occurrence is weighted by `λ` raised to the total
//! span it covers in both sequences, so gaps are penalized.
//!
//! The kernel is evaluated with the classic dynamic program over a
//! three-dimensional auxiliary table `Kp[l][j][k]` (Lodhi et al., 2002),
//! generalized from characters to arbitrary elements compared by an
//! [`ElementSimilarity`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{KernelError, Result};
use crate::example::Example;
use crate::sequence::{ElementSimilarity, SequenceRepresentation};
use crate::tree_kernel::{validate_decay, validate_representation};
use crate::types::Kernel;

/// Default maximum subsequence length.
pub const DEFAULT_MAX_SUBSEQUENCE_LENGTH: usize = 4;

/// Default gap decay.
pub const DEFAULT_SEQUENCE_DECAY: f64 = 0.75;

/// Default identifier of the sequence representation.
pub const DEFAULT_SEQUENCE_REPRESENTATION: &str = "sequence";

/// Subsequence kernel configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceKernelConfig {
    /// Maximum subsequence length; 0 makes every value 0
    pub max_subsequence_length: usize,
    /// Gap decay λ in (0, 1]
    pub decay: f64,
    /// Identifier of the sequence representation the kernel reads
    pub representation: String,
    /// Element comparison
    pub similarity: ElementSimilarity,
}

impl SequenceKernelConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            max_subsequence_length: DEFAULT_MAX_SUBSEQUENCE_LENGTH,
            decay: DEFAULT_SEQUENCE_DECAY,
            representation: DEFAULT_SEQUENCE_REPRESENTATION.to_string(),
            similarity: ElementSimilarity::default(),
        }
    }

    /// Set maximum subsequence length
    pub fn with_max_subsequence_length(mut self, length: usize) -> Self {
        self.max_subsequence_length = length;
        self
    }

    /// Set decay factor
    pub fn with_decay(mut self, decay: f64) -> Result<Self> {
        validate_decay(decay)?;
        self.decay = decay;
        Ok(self)
    }

    /// Set the representation identifier
    pub fn with_representation(mut self, representation: impl Into<String>) -> Result<Self> {
        self.representation = representation.into();
        validate_representation(&self.representation)?;
        Ok(self)
    }

    /// Set element comparison
    pub fn with_similarity(mut self, similarity: ElementSimilarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Validate every field
    pub fn validate(&self) -> Result<()> {
        validate_decay(self.decay)?;
        validate_representation(&self.representation)
    }
}

impl Default for SequenceKernelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gapped subsequence kernel
///
/// # Example
///
/// ```rust
/// use tensorlogic_convolution_kernels::{SequenceKernel, SequenceKernelConfig, SequenceRepresentation};
///
/// let config = SequenceKernelConfig::new()
///     .with_max_subsequence_length(2)
///     .with_decay(1.0)
///     .unwrap();
/// let kernel = SequenceKernel::new(config).unwrap();
///
/// let a = SequenceRepresentation::from_tokens(["a", "b"]);
/// // "a", "b" and "ab"
/// assert_eq!(kernel.compute_sequences(&a, &a).unwrap(), 3.0);
/// ```
#[derive(Clone, Debug)]
pub struct SequenceKernel {
    config: SequenceKernelConfig,
}

impl SequenceKernel {
    /// Create a new subsequence kernel
    pub fn new(config: SequenceKernelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Kernel configuration
    pub fn config(&self) -> &SequenceKernelConfig {
        &self.config
    }

    /// Compute the unnormalized kernel between two sequences
    pub fn compute_sequences(
        &self,
        a: &SequenceRepresentation,
        b: &SequenceRepresentation,
    ) -> Result<f64> {
        let value: f64 = self.spectrum(a, b)?.iter().sum();
        trace!(value, "sequence kernel evaluated");
        Ok(value)
    }

    /// Contribution of each subsequence length: entry `l` holds the
    /// weighted count of common subsequences of length `l + 1`.
    pub fn spectrum(
        &self,
        a: &SequenceRepresentation,
        b: &SequenceRepresentation,
    ) -> Result<Vec<f64>> {
        let n = self.config.max_subsequence_length;
        let (sl, tl) = (a.len(), b.len());
        let mut spectrum = vec![0.0; n];
        if n == 0 || sl == 0 || tl == 0 {
            return Ok(spectrum);
        }

        let plane = sl
            .checked_mul(tl)
            .and_then(|plane| plane.checked_mul(n).map(|_| plane))
            .ok_or_else(|| {
                KernelError::ComputationError(format!(
                    "subsequence table {} x {} x {} overflows",
                    n, sl, tl
                ))
            })?;
        trace!(n, sl, tl, "sequence kernel table");

        let lambda = self.config.decay;
        let similarity = self.config.similarity;
        let sim: Vec<f64> = a
            .elements()
            .iter()
            .flat_map(|x| b.elements().iter().map(move |y| similarity.score(x, y)))
            .collect();

        // Kp[l] is only needed for l < n.
        let mut kp = vec![0.0; plane * n];
        kp[..plane].fill(1.0);
        let at = |l: usize, j: usize, k: usize| l * plane + j * tl + k;

        for l in 0..n - 1 {
            for j in 0..sl - 1 {
                let mut acc = 0.0;
                for k in 0..tl - 1 {
                    acc = lambda * (acc + lambda * sim[j * tl + k] * kp[at(l, j, k)]);
                    kp[at(l + 1, j + 1, k + 1)] = lambda * kp[at(l + 1, j, k + 1)] + acc;
                }
            }
        }

        for (l, value) in spectrum.iter_mut().enumerate() {
            for j in 0..sl {
                for k in 0..tl {
                    *value += lambda * lambda * sim[j * tl + k] * kp[at(l, j, k)];
                }
            }
        }

        Ok(spectrum)
    }
}

impl Kernel for SequenceKernel {
    fn compute(&mut self, x: &Example, y: &Example) -> Result<f64> {
        let a = x.sequence(&self.config.representation)?;
        let b = y.sequence(&self.config.representation)?;
        self.compute_sequences(a, b)
    }

    fn name(&self) -> &str {
        "Subsequence"
    }

    fn representation(&self) -> &str {
        &self.config.representation
    }
}
