//! # Tensorlogic-Convolution-Kernels
//!
//! **Version**: 0.1.0-alpha.2 | **Status**: Alpha
//!
//! Convolution kernels over structured objects: labeled ordered trees and
//! symbol sequences. The kernels measure similarity by counting shared
//! substructures, so that tree- and sequence-shaped data (parse trees,
//! token streams, tag sequences) can feed kernel methods such as SVMs.
//!
//! ## Features
//!
//! - ✅ **Subtree Kernel** - Shared complete subtrees, decayed per level
//! - ✅ **Gapped Subsequence Kernel** - Shared subsequences with gap penalty
//! - ✅ **Delta Caches** - Dense (bounded) and sparse (unbounded) memo tables
//! - ✅ **Multi-Representation Examples** - Kernels select a named representation
//! - ✅ **Normalization** - Normalized kernel wrapper and Gram matrix normalization
//! - ✅ **Parallel Gram Matrices** - One engine per rayon worker
//! - ✅ **Serializable Specs** - Kernel configuration from JSON or TOML
//!
//! ## Architecture
//!
//! ### Representations
//!
//! Trees parse from bracket notation and are flattened into a
//! [`TreeRepresentation`] whose nodes carry their production. Sequences parse
//! from whitespace-separated tokens:
//!
//! ```rust
//! use tensorlogic_convolution_kernels::{SequenceRepresentation, TreeRepresentation};
//!
//! let tree: TreeRepresentation = "(S (NP the dog) (VP barks))".parse().unwrap();
//! assert_eq!(tree.len(), 6);
//! assert_eq!(tree.root().unwrap().production(), "S -> NP VP");
//!
//! let seq: SequenceRepresentation = "the dog barks".parse().unwrap();
//! assert_eq!(seq.len(), 3);
//! ```
//!
//! ### Kernel Trait
//!
//! Kernels compare two [`Example`]s, each holding representations under
//! string identifiers:
//!
//! ```rust
//! use tensorlogic_convolution_kernels::{
//!     Example, Kernel, SequenceKernel, SequenceKernelConfig, SequenceRepresentation,
//! };
//!
//! let mut kernel = SequenceKernel::new(
//!     SequenceKernelConfig::new().with_representation("words").unwrap(),
//! )
//! .unwrap();
//!
//! let x = Example::new().with_representation("words", SequenceRepresentation::from_tokens(["a", "b"]));
//! let y = Example::new().with_representation("words", SequenceRepresentation::from_tokens(["a", "c", "b"]));
//!
//! let sim = kernel.compute(&x, &y).unwrap();
//! assert!(sim > 0.0);
//! ```
//!
//! ### Subtree Kernel
//!
//! ```rust
//! use tensorlogic_convolution_kernels::{
//!     DeltaCacheConfig, SubtreeKernel, SubtreeKernelConfig, TreeRepresentation,
//! };
//!
//! let config = SubtreeKernelConfig::new()
//!     .with_decay(0.4)
//!     .unwrap()
//!     .with_cache(DeltaCacheConfig::sparse())
//!     .unwrap();
//! let mut kernel = SubtreeKernel::new(config).unwrap();
//!
//! let x: TreeRepresentation = "X".parse().unwrap();
//! let sim = kernel.compute_trees(&x, &x).unwrap();
//! assert!((sim - 0.4).abs() < 1e-6);
//! ```
//!
//! ## Kernel Matrix Computation
//!
//! ```rust
//! use tensorlogic_convolution_kernels::{Example, KernelSpec, TreeRepresentation};
//!
//! let spec = KernelSpec::from_toml_str("kernel = \"subtree\"\ndecay = 0.5").unwrap();
//!
//! let examples: Vec<Example> = ["(S a)", "(S b)", "(S (A a))"]
//!     .iter()
//!     .map(|t| Example::new().with_representation("tree", t.parse::<TreeRepresentation>().unwrap()))
//!     .collect();
//!
//! let matrix = spec.gram_matrix(&examples).unwrap();
//! assert_eq!(matrix[0][1], matrix[1][0]);
//! ```
//!
//! ## Logging
//!
//! Evaluation emits `tracing` events (`debug` for candidate pair counts,
//! `trace` for per-pair values). Install a subscriber to see them.

pub mod config;
pub mod delta;
pub mod error;
pub mod example;
pub mod kernel_transform;
pub mod kernel_utils;
pub mod sequence;
pub mod sequence_kernel;
pub mod tree;
pub mod tree_kernel;
pub mod types;

// Re-export main types for convenience
pub use config::KernelSpec;
pub use delta::{
    DeltaCache, DeltaCacheConfig, DenseDeltaCache, SparseDeltaCache, DEFAULT_DENSE_CAPACITY,
};
pub use error::{KernelError, Result};
pub use example::{Example, Representation};
pub use kernel_transform::{normalize_kernel_matrix, NormalizedKernel};
pub use kernel_utils::{compute_matrix_parallel, is_symmetric_kernel_matrix};
pub use sequence::{ElementSimilarity, SequenceElement, SequenceRepresentation};
pub use sequence_kernel::{SequenceKernel, SequenceKernelConfig};
pub use tree::{ProductionNode, TreeNode, TreeRepresentation};
pub use tree_kernel::{SubtreeKernel, SubtreeKernelConfig};
pub use types::Kernel;
