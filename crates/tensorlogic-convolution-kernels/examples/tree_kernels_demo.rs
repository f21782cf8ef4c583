//! Convolution Kernels Demonstration
//!
//! This example shows how to use the two convolution kernels:
//! 1. SubtreeKernel - Shared complete subtrees of parse trees
//! 2. SequenceKernel - Shared gapped subsequences of token streams
//!
//! and how to normalize them and build Gram matrices.
//!
//! Run with: cargo run --example tree_kernels_demo

use tensorlogic_convolution_kernels::{
    compute_matrix_parallel, normalize_kernel_matrix, DeltaCacheConfig, Example, Kernel,
    NormalizedKernel, SequenceKernel, SequenceKernelConfig, SequenceRepresentation,
    SubtreeKernel, SubtreeKernelConfig, TreeRepresentation,
};

fn main() -> anyhow::Result<()> {
    println!("=== Convolution Kernels Demonstration ===\n");

    println!("1. Creating sample examples...");
    let sentences = [
        ("(S (NP (DT the) (NN dog)) (VP (V saw) (NP (DT a) (NN cat))))", "the dog saw a cat"),
        ("(S (NP (DT the) (NN cat)) (VP (V saw) (NP (DT a) (NN dog))))", "the cat saw a dog"),
        ("(S (NP (DT a) (NN bird)) (VP (V sang)))", "a bird sang"),
    ];

    let mut examples = Vec::new();
    for (i, (tree, words)) in sentences.iter().enumerate() {
        println!("  Example {}: {}", i + 1, words);
        examples.push(
            Example::new()
                .with_representation("parse", tree.parse::<TreeRepresentation>()?)
                .with_representation("words", words.parse::<SequenceRepresentation>()?),
        );
    }
    println!();

    println!("2. SubtreeKernel (Shared Complete Subtrees)");
    println!("   Δ = λ for matching pre-terminals, λ·Π(1 + Δ(children)) above them.");
    println!();

    let subtree_config = SubtreeKernelConfig::new()
        .with_decay(0.4)?
        .with_representation("parse")?
        .with_cache(DeltaCacheConfig::sparse())?;
    let mut subtree = SubtreeKernel::new(subtree_config)?;

    let sim_12 = subtree.compute(&examples[0], &examples[1])?;
    let sim_13 = subtree.compute(&examples[0], &examples[2])?;
    println!("   Similarity(1, 2): {:.4}", sim_12);
    println!("   Similarity(1, 3): {:.4}", sim_13);
    println!(
        "   → {} delta values cached in the last evaluation",
        subtree.cache().computed()
    );
    println!();

    println!("3. SequenceKernel (Gapped Subsequences)");
    println!("   Common subsequences up to length 3, gaps penalized with λ = 0.5.");
    println!();

    let sequence_config = SequenceKernelConfig::new()
        .with_max_subsequence_length(3)
        .with_decay(0.5)?
        .with_representation("words")?;
    let sequence = SequenceKernel::new(sequence_config)?;

    let a = examples[0].sequence("words")?;
    let b = examples[1].sequence("words")?;
    let spectrum = sequence.spectrum(a, b)?;
    for (length, value) in spectrum.iter().enumerate() {
        println!("   Length {}: {:.4}", length + 1, value);
    }
    println!("   Total: {:.4}", sequence.compute_sequences(a, b)?);
    println!();

    println!("4. Normalized Kernels");
    let mut normalized = NormalizedKernel::new(subtree.clone());
    let normalized_name = normalized.name().to_string();
    println!(
        "   {}(1, 1): {:.4}",
        normalized_name,
        normalized.compute(&examples[0], &examples[0])?
    );
    println!(
        "   {}(1, 2): {:.4}",
        normalized_name,
        normalized.compute(&examples[0], &examples[1])?
    );
    println!();

    println!("5. Gram Matrix (parallel, normalized)");
    let gram = normalize_kernel_matrix(&compute_matrix_parallel(&subtree, &examples)?)?;
    for row in &gram {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
        println!("   [{}]", cells.join(", "));
    }
    println!();

    println!("=== Demo Complete ===");

    Ok(())
}
