//! SubTree Kernel over production-indexed trees.
//!
//! The kernel counts the complete subtrees two trees have in common,
//! weighting each by a decay factor per level:
//!
//! ```text
//! K(T1, T2) = Σ_{n1 ∈ T1} Σ_{n2 ∈ T2} Δ(n1, n2)
//! ```
//!
//! where
//! - `Δ(n1, n2) = 0` if the productions at `n1` and `n2` differ,
//! - `Δ(n1, n2) = λ` if both nodes are childless,
//! - `Δ(n1, n2) = λ · Π_i (1 + Δ(c_i(n1), c_i(n2)))` otherwise, where the
//!   product ranges over child positions whose children both have children
//!   and share a production.
//!
//! Node pairs with differing productions are never visited: the two
//! production-sorted node lists are merged, and only the cross products of
//! equal-production runs become candidates. Δ values are memoized in a
//! [`DeltaCache`] owned by the kernel and cleared on every evaluation.
//!
//! ## References
//!
//! - Vishwanathan & Smola (2002): "Fast Kernels on Strings and Trees"
//! - Moschitti (2006): "Making Tree Kernels Practical for Natural Language Learning"

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::delta::{DeltaCache, DeltaCacheConfig};
use crate::error::{KernelError, Result};
use crate::example::Example;
use crate::tree::TreeRepresentation;
use crate::types::Kernel;

/// Default decay factor.
pub const DEFAULT_TREE_DECAY: f32 = 0.4;

/// Default identifier of the tree representation.
pub const DEFAULT_TREE_REPRESENTATION: &str = "tree";

/// Configuration for subtree kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtreeKernelConfig {
    /// Decay factor λ in (0, 1]
    pub decay: f32,
    /// Identifier of the tree representation the kernel reads
    pub representation: String,
    /// Delta cache backend
    pub cache: DeltaCacheConfig,
}

impl SubtreeKernelConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self {
            decay: DEFAULT_TREE_DECAY,
            representation: DEFAULT_TREE_REPRESENTATION.to_string(),
            cache: DeltaCacheConfig::default(),
        }
    }

    /// Set decay factor
    pub fn with_decay(mut self, decay: f32) -> Result<Self> {
        validate_decay(f64::from(decay))?;
        self.decay = decay;
        Ok(self)
    }

    /// Set the representation identifier
    pub fn with_representation(mut self, representation: impl Into<String>) -> Result<Self> {
        self.representation = representation.into();
        validate_representation(&self.representation)?;
        Ok(self)
    }

    /// Set the delta cache backend
    pub fn with_cache(mut self, cache: DeltaCacheConfig) -> Result<Self> {
        cache.validate()?;
        self.cache = cache;
        Ok(self)
    }

    /// Validate every field
    pub fn validate(&self) -> Result<()> {
        validate_decay(f64::from(self.decay))?;
        validate_representation(&self.representation)?;
        self.cache.validate()
    }
}

impl Default for SubtreeKernelConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_decay(decay: f64) -> Result<()> {
    if decay > 0.0 && decay <= 1.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            parameter: "decay".to_string(),
            value: decay.to_string(),
            reason: "must be in (0, 1]".to_string(),
        })
    }
}

pub(crate) fn validate_representation(representation: &str) -> Result<()> {
    if representation.is_empty() {
        return Err(KernelError::InvalidParameter {
            parameter: "representation".to_string(),
            value: String::new(),
            reason: "representation identifier must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Subtree kernel
///
/// # Example
///
/// ```rust
/// use tensorlogic_convolution_kernels::{SubtreeKernel, SubtreeKernelConfig, TreeRepresentation};
///
/// let mut kernel = SubtreeKernel::new(SubtreeKernelConfig::new()).unwrap();
///
/// let a: TreeRepresentation = "(S (NP the dog) (VP barks))".parse().unwrap();
/// let b: TreeRepresentation = "(S (NP the cat) (VP barks))".parse().unwrap();
///
/// let sim = kernel.compute_trees(&a, &b).unwrap();
/// assert!(sim > 0.0);
/// ```
///
/// An instance is not meant to be shared between threads while evaluating;
/// clone it per worker instead. Clones start with an empty cache.
#[derive(Debug)]
pub struct SubtreeKernel {
    config: SubtreeKernelConfig,
    cache: Box<dyn DeltaCache>,
}

impl SubtreeKernel {
    /// Create a new subtree kernel
    pub fn new(config: SubtreeKernelConfig) -> Result<Self> {
        config.validate()?;
        let cache = config.cache.build();
        Ok(Self { config, cache })
    }

    /// Kernel configuration
    pub fn config(&self) -> &SubtreeKernelConfig {
        &self.config
    }

    /// Decay factor
    pub fn decay(&self) -> f32 {
        self.config.decay
    }

    /// Delta cache state left by the last evaluation
    pub fn cache(&self) -> &dyn DeltaCache {
        self.cache.as_ref()
    }

    /// Compute the unnormalized kernel between two trees
    pub fn compute_trees(&mut self, a: &TreeRepresentation, b: &TreeRepresentation) -> Result<f64> {
        self.cache.clear();

        let pairs = self.candidate_pairs(a, b)?;
        debug!(
            nodes_a = a.len(),
            nodes_b = b.len(),
            candidate_pairs = pairs.len(),
            backend = self.cache.backend(),
            "subtree kernel candidates"
        );

        let mut kernel = 0.0f64;
        for &(n1, n2) in &pairs {
            kernel += f64::from(self.delta(a, b, n1, n2)?);
        }

        trace!(value = kernel, cached = self.cache.computed(), "subtree kernel evaluated");
        Ok(kernel)
    }

    /// Pairs of nodes with equal productions, found by merging the two
    /// production-sorted node lists. Every pair is registered as pending in
    /// the cache, which also checks the ids against a bounded backend.
    fn candidate_pairs(
        &mut self,
        a: &TreeRepresentation,
        b: &TreeRepresentation,
    ) -> Result<Vec<(usize, usize)>> {
        let nodes_a = a.ordered_nodes_by_production();
        let nodes_b = b.ordered_nodes_by_production();
        let production_a = |i: usize| a.nodes()[nodes_a[i]].production();
        let production_b = |j: usize| b.nodes()[nodes_b[j]].production();

        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < nodes_a.len() && j < nodes_b.len() {
            match production_a(i).cmp(production_b(j)) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let production = production_a(i);
                    let run_a = (i..nodes_a.len())
                        .take_while(|&x| production_a(x) == production)
                        .count();
                    let run_b = (j..nodes_b.len())
                        .take_while(|&y| production_b(y) == production)
                        .count();

                    for &n1 in &nodes_a[i..i + run_a] {
                        for &n2 in &nodes_b[j..j + run_b] {
                            self.cache.reserve(n1, n2)?;
                            pairs.push((n1, n2));
                        }
                    }
                    i += run_a;
                    j += run_b;
                }
            }
        }

        Ok(pairs)
    }

    /// Δ(n1, n2) for two nodes with equal productions.
    ///
    /// Evaluated with an explicit post-order work stack, so tree depth is
    /// not limited by the call stack.
    fn delta(
        &mut self,
        a: &TreeRepresentation,
        b: &TreeRepresentation,
        n1: usize,
        n2: usize,
    ) -> Result<f32> {
        if let Some(value) = self.cache.get(n1, n2)? {
            return Ok(value);
        }

        let decay = self.config.decay;
        let mut value = 0.0;
        let mut stack = vec![(n1, n2, false)];

        while let Some((x, y, children_done)) = stack.pop() {
            if self.cache.get(x, y)?.is_some() {
                continue;
            }

            if children_done {
                let mut product = 1.0f32;
                for (cx, cy) in matching_children(a, b, x, y) {
                    let child = self.cache.get(cx, cy)?.ok_or_else(|| {
                        KernelError::ComputationError(format!(
                            "delta of child pair ({}, {}) was not computed",
                            cx, cy
                        ))
                    })?;
                    product *= 1.0 + child;
                }
                value = decay * product;
                self.cache.add(x, y, value)?;
            } else {
                stack.push((x, y, true));
                for (cx, cy) in matching_children(a, b, x, y) {
                    if self.cache.get(cx, cy)?.is_none() {
                        stack.push((cx, cy, false));
                    }
                }
            }
        }

        Ok(value)
    }
}

/// Child pairs at equal positions that both have children and share a
/// production. Positions beyond the shorter child list are ignored.
fn matching_children<'t>(
    a: &'t TreeRepresentation,
    b: &'t TreeRepresentation,
    n1: usize,
    n2: usize,
) -> impl Iterator<Item = (usize, usize)> + 't {
    a.nodes()[n1]
        .children()
        .iter()
        .zip(b.nodes()[n2].children())
        .map(|(&ca, &cb)| (ca, cb))
        .filter(move |&(ca, cb)| {
            let (ca, cb) = (&a.nodes()[ca], &b.nodes()[cb]);
            ca.has_children() && cb.has_children() && ca.production() == cb.production()
        })
}

impl Clone for SubtreeKernel {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            cache: self.config.cache.build(),
        }
    }
}

impl Kernel for SubtreeKernel {
    fn compute(&mut self, x: &Example, y: &Example) -> Result<f64> {
        let a = x.tree(&self.config.representation)?;
        let b = y.tree(&self.config.representation)?;
        self.compute_trees(a, b)
    }

    fn name(&self) -> &str {
        "Subtree"
    }

    fn representation(&self) -> &str {
        &self.config.representation
    }
}
