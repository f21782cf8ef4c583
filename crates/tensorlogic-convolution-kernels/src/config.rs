//! Serializable kernel specifications.
//!
//! A [`KernelSpec`] names a kernel and its configuration so that it can be
//! stored in JSON or TOML and instantiated later:
//!
//! ```toml
//! kernel = "subtree"
//! decay = 0.4
//! representation = "parse"
//!
//! [cache]
//! backend = "sparse"
//! ```
//!
//! Fields left out take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::example::Example;
use crate::kernel_utils::compute_matrix_parallel;
use crate::sequence_kernel::{SequenceKernel, SequenceKernelConfig};
use crate::tree_kernel::{SubtreeKernel, SubtreeKernelConfig};
use crate::types::Kernel;

/// A kernel together with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kernel", rename_all = "snake_case")]
pub enum KernelSpec {
    /// Subtree kernel over a tree representation
    Subtree(SubtreeKernelConfig),
    /// Gapped subsequence kernel over a sequence representation
    Sequence(SequenceKernelConfig),
}

impl KernelSpec {
    /// Parse a specification from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a specification from TOML
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let spec: Self = toml::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Subtree(config) => config.validate(),
            Self::Sequence(config) => config.validate(),
        }
    }

    /// Identifier of the representation the kernel reads
    pub fn representation(&self) -> &str {
        match self {
            Self::Subtree(config) => &config.representation,
            Self::Sequence(config) => &config.representation,
        }
    }

    /// Instantiate the kernel
    pub fn build(&self) -> Result<Box<dyn Kernel>> {
        Ok(match self {
            Self::Subtree(config) => Box::new(SubtreeKernel::new(config.clone())?),
            Self::Sequence(config) => Box::new(SequenceKernel::new(config.clone())?),
        })
    }

    /// Compute the Gram matrix of `examples` in parallel with this kernel
    pub fn gram_matrix(&self, examples: &[Example]) -> Result<Vec<Vec<f64>>> {
        match self {
            Self::Subtree(config) => {
                compute_matrix_parallel(&SubtreeKernel::new(config.clone())?, examples)
            }
            Self::Sequence(config) => {
                compute_matrix_parallel(&SequenceKernel::new(config.clone())?, examples)
            }
        }
    }
}

impl From<SubtreeKernelConfig> for KernelSpec {
    fn from(config: SubtreeKernelConfig) -> Self {
        Self::Subtree(config)
    }
}

impl From<SequenceKernelConfig> for KernelSpec {
    fn from(config: SequenceKernelConfig) -> Self {
        Self::Sequence(config)
    }
}
