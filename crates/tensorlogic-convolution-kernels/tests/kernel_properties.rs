//! Property-based tests for the convolution kernels
//!
//! These tests use proptest to check properties that hold for every pair of
//! trees or sequences: symmetry, positivity, monotonicity in the decay and
//! independence from previous evaluations.

use proptest::prelude::*;
use tensorlogic_convolution_kernels::{
    compute_matrix_parallel, is_symmetric_kernel_matrix, DeltaCacheConfig, Example, Kernel,
    SequenceKernel, SequenceKernelConfig, SequenceRepresentation, SubtreeKernel,
    SubtreeKernelConfig, TreeNode, TreeRepresentation,
};

// ===== Strategies for generating test data =====

const LABELS: &[&str] = &["S", "NP", "VP", "a", "b"];
const OTHER_LABELS: &[&str] = &["T", "X", "y", "z"];
const SYMBOLS: &[&str] = &["a", "b", "c"];

/// Generate random trees over a fixed label alphabet
fn arb_tree(labels: &'static [&'static str]) -> impl Strategy<Value = TreeRepresentation> {
    let leaf = prop::sample::select(labels).prop_map(TreeNode::new);
    leaf.prop_recursive(4, 32, 3, move |inner| {
        (prop::sample::select(labels), prop::collection::vec(inner, 1..=3))
            .prop_map(|(label, children)| TreeNode::with_children(label, children))
    })
    .prop_map(|root| TreeRepresentation::from(&root))
}

/// Generate random token sequences over a small alphabet
fn arb_sequence() -> impl Strategy<Value = SequenceRepresentation> {
    prop::collection::vec(prop::sample::select(SYMBOLS), 0..8)
        .prop_map(SequenceRepresentation::from_tokens)
}

fn subtree(decay: f32, cache: DeltaCacheConfig) -> SubtreeKernel {
    SubtreeKernel::new(
        SubtreeKernelConfig::new()
            .with_decay(decay)
            .unwrap()
            .with_cache(cache)
            .unwrap(),
    )
    .unwrap()
}

fn sequence(n: usize, decay: f64) -> SequenceKernel {
    SequenceKernel::new(
        SequenceKernelConfig::new()
            .with_max_subsequence_length(n)
            .with_decay(decay)
            .unwrap(),
    )
    .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(b.abs()).max(1.0)
}

// ===== Subtree kernel =====

proptest! {
    #[test]
    fn prop_subtree_symmetric(a in arb_tree(LABELS), b in arb_tree(LABELS)) {
        let mut kernel = subtree(0.4, DeltaCacheConfig::default());
        let ab = kernel.compute_trees(&a, &b).unwrap();
        let ba = kernel.compute_trees(&b, &a).unwrap();
        prop_assert!(close(ab, ba), "K(a,b) = {} but K(b,a) = {}", ab, ba);
    }

    #[test]
    fn prop_subtree_self_similarity_positive(a in arb_tree(LABELS), decay in 0.05f32..=1.0) {
        let mut kernel = subtree(decay, DeltaCacheConfig::default());
        prop_assert!(kernel.compute_trees(&a, &a).unwrap() > 0.0);
    }

    #[test]
    fn prop_subtree_zero_on_disjoint_productions(
        a in arb_tree(LABELS),
        b in arb_tree(OTHER_LABELS),
    ) {
        let mut kernel = subtree(0.4, DeltaCacheConfig::default());
        prop_assert_eq!(kernel.compute_trees(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn prop_subtree_monotone_in_decay(
        a in arb_tree(LABELS),
        b in arb_tree(LABELS),
        low in 0.05f32..0.5,
        step in 0.05f32..0.5,
    ) {
        let high = low + step;
        let k_low = subtree(low, DeltaCacheConfig::default()).compute_trees(&a, &b).unwrap();
        let k_high = subtree(high, DeltaCacheConfig::default()).compute_trees(&a, &b).unwrap();
        prop_assert!(k_low <= k_high + 1e-6, "K({}) = {} > K({}) = {}", low, k_low, high, k_high);
    }

    #[test]
    fn prop_subtree_cache_isolation(
        a in arb_tree(LABELS),
        b in arb_tree(LABELS),
        c in arb_tree(LABELS),
        d in arb_tree(LABELS),
    ) {
        let mut reused = subtree(0.4, DeltaCacheConfig::default());
        reused.compute_trees(&c, &d).unwrap();
        let after_other = reused.compute_trees(&a, &b).unwrap();

        let fresh = subtree(0.4, DeltaCacheConfig::default()).compute_trees(&a, &b).unwrap();
        prop_assert_eq!(after_other, fresh);
    }

    #[test]
    fn prop_subtree_backends_agree(a in arb_tree(LABELS), b in arb_tree(LABELS)) {
        let dense = subtree(0.4, DeltaCacheConfig::dense(1024)).compute_trees(&a, &b).unwrap();
        let sparse = subtree(0.4, DeltaCacheConfig::sparse()).compute_trees(&a, &b).unwrap();
        prop_assert_eq!(dense, sparse);
    }
}

// ===== Sequence kernel =====

proptest! {
    #[test]
    fn prop_sequence_symmetric(a in arb_sequence(), b in arb_sequence(), n in 1usize..5) {
        let kernel = sequence(n, 0.75);
        let ab = kernel.compute_sequences(&a, &b).unwrap();
        let ba = kernel.compute_sequences(&b, &a).unwrap();
        prop_assert!(close(ab, ba), "K(a,b) = {} but K(b,a) = {}", ab, ba);
    }

    #[test]
    fn prop_sequence_zero_length_is_zero(a in arb_sequence(), b in arb_sequence()) {
        prop_assert_eq!(sequence(0, 0.75).compute_sequences(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn prop_sequence_self_similarity_positive(a in arb_sequence(), n in 1usize..5) {
        prop_assume!(!a.is_empty());
        prop_assert!(sequence(n, 0.75).compute_sequences(&a, &a).unwrap() > 0.0);
    }

    #[test]
    fn prop_sequence_monotone_in_length(a in arb_sequence(), b in arb_sequence(), n in 0usize..5) {
        let shorter = sequence(n, 0.75).compute_sequences(&a, &b).unwrap();
        let longer = sequence(n + 1, 0.75).compute_sequences(&a, &b).unwrap();
        prop_assert!(shorter <= longer);
    }

    #[test]
    fn prop_sequence_monotone_in_decay(
        a in arb_sequence(),
        b in arb_sequence(),
        low in 0.05f64..0.5,
        step in 0.05f64..0.5,
    ) {
        let k_low = sequence(3, low).compute_sequences(&a, &b).unwrap();
        let k_high = sequence(3, low + step).compute_sequences(&a, &b).unwrap();
        prop_assert!(k_low <= k_high + 1e-12);
    }
}

// ===== Gram matrices =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_parallel_gram_matches_sequential(trees in prop::collection::vec(arb_tree(LABELS), 0..6)) {
        let examples: Vec<Example> = trees
            .into_iter()
            .map(|t| Example::new().with_representation("tree", t))
            .collect();
        let mut kernel = subtree(0.4, DeltaCacheConfig::default());

        let parallel = compute_matrix_parallel(&kernel, &examples).unwrap();
        let sequential = kernel.compute_matrix(&examples).unwrap();

        prop_assert!(is_symmetric_kernel_matrix(&parallel, 0.0));
        prop_assert_eq!(parallel, sequential);
    }
}
