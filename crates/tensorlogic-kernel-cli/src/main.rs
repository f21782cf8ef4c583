//! tlkernel - Command-line interface for tree and sequence convolution kernels
//!
//! Evaluates the subtree and gapped subsequence kernels on inputs given on
//! the command line, or computes Gram matrices over files of inputs.

mod cli;
mod output;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tensorlogic_convolution_kernels::{
    normalize_kernel_matrix, DeltaCacheConfig, ElementSimilarity, Example, Kernel, KernelSpec,
    NormalizedKernel, Representation, SequenceKernel, SequenceKernelConfig,
    SequenceRepresentation, SubtreeKernel, SubtreeKernelConfig, TreeRepresentation,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{CacheBackend, Cli, Commands, InputKind, MatrixFormat};
use output::{enable_colors, format_matrix, print_error, print_value};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        enable_colors(false);
    }

    if let Err(e) = run(cli) {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Tree {
            a,
            b,
            decay,
            cache,
            capacity,
            normalize,
        } => {
            let cache = match cache {
                CacheBackend::Dense => DeltaCacheConfig::dense(capacity),
                CacheBackend::Sparse => DeltaCacheConfig::sparse(),
            };
            let config = SubtreeKernelConfig::new()
                .with_decay(decay)?
                .with_cache(cache)?;
            let kernel = SubtreeKernel::new(config)?;

            let x = example(&kernel, parse_input(InputKind::Tree, &a).context("Invalid first tree")?);
            let y = example(&kernel, parse_input(InputKind::Tree, &b).context("Invalid second tree")?);
            print_value(evaluate(kernel, &x, &y, normalize)?);
        }
        Commands::Sequence {
            a,
            b,
            decay,
            max_length,
            text_only,
            normalize,
        } => {
            let similarity = if text_only {
                ElementSimilarity::Text
            } else {
                ElementSimilarity::KindAndText
            };
            let config = SequenceKernelConfig::new()
                .with_max_subsequence_length(max_length)
                .with_decay(decay)?
                .with_similarity(similarity);
            let kernel = SequenceKernel::new(config)?;

            let x = example(
                &kernel,
                parse_input(InputKind::Sequence, &a).context("Invalid first sequence")?,
            );
            let y = example(
                &kernel,
                parse_input(InputKind::Sequence, &b).context("Invalid second sequence")?,
            );
            print_value(evaluate(kernel, &x, &y, normalize)?);
        }
        Commands::Matrix {
            file,
            kind,
            config,
            normalize,
            format,
        } => {
            let spec = load_spec(kind, config.as_deref())?;
            let examples = load_examples(&file, kind, spec.representation())?;

            let mut matrix = spec.gram_matrix(&examples)?;
            info!(examples = examples.len(), "gram matrix computed");
            if normalize {
                matrix = normalize_kernel_matrix(&matrix)
                    .context("Cannot normalize: an input has zero self-similarity")?;
            }

            match format {
                MatrixFormat::Text => println!("{}", format_matrix(&matrix)),
                MatrixFormat::Json => println!("{}", serde_json::to_string_pretty(&matrix)?),
            }
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn parse_input(kind: InputKind, text: &str) -> Result<Representation> {
    Ok(match kind {
        InputKind::Tree => text.parse::<TreeRepresentation>()?.into(),
        InputKind::Sequence => text.parse::<SequenceRepresentation>()?.into(),
    })
}

fn example(kernel: &dyn Kernel, representation: Representation) -> Example {
    Example::new().with_representation(kernel.representation(), representation)
}

fn evaluate<K: Kernel>(mut kernel: K, x: &Example, y: &Example, normalize: bool) -> Result<f64> {
    let value = if normalize {
        NormalizedKernel::new(kernel).compute(x, y)?
    } else {
        kernel.compute(x, y)?
    };
    Ok(value)
}

fn load_spec(kind: InputKind, path: Option<&Path>) -> Result<KernelSpec> {
    let Some(path) = path else {
        return Ok(match kind {
            InputKind::Tree => KernelSpec::Subtree(SubtreeKernelConfig::default()),
            InputKind::Sequence => KernelSpec::Sequence(SequenceKernelConfig::default()),
        });
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let spec = KernelSpec::from_toml_str(&text)
        .with_context(|| format!("Invalid kernel specification: {}", path.display()))?;

    match (&spec, kind) {
        (KernelSpec::Subtree(_), InputKind::Tree)
        | (KernelSpec::Sequence(_), InputKind::Sequence) => Ok(spec),
        _ => bail!(
            "Kernel in {} does not match input kind {:?}",
            path.display(),
            kind
        ),
    }
}

fn load_examples(path: &Path, kind: InputKind, representation: &str) -> Result<Vec<Example>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let mut examples = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let input = parse_input(kind, line)
            .with_context(|| format!("{}:{}: invalid input", path.display(), index + 1))?;
        examples.push(Example::new().with_representation(representation, input));
    }

    if examples.is_empty() {
        bail!("No inputs found in {}", path.display());
    }

    Ok(examples)
}
