//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tlkernel")]
#[command(author, version, about = "Tree and sequence convolution kernels", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subtree kernel between two bracketed trees, e.g. "(S (NP a) (VP b))"
    Tree {
        /// First tree
        a: String,

        /// Second tree
        b: String,

        /// Decay factor in (0, 1]
        #[arg(short, long, default_value_t = 0.4)]
        decay: f32,

        /// Delta cache backend
        #[arg(long, value_enum, default_value = "dense")]
        cache: CacheBackend,

        /// Dense cache capacity (largest node id + 1)
        #[arg(long, default_value_t = 200)]
        capacity: usize,

        /// Divide by sqrt(K(a,a) * K(b,b))
        #[arg(short, long)]
        normalize: bool,
    },

    /// Gapped subsequence kernel between two whitespace-separated sequences
    Sequence {
        /// First sequence
        a: String,

        /// Second sequence
        b: String,

        /// Gap decay in (0, 1]
        #[arg(short, long, default_value_t = 0.75)]
        decay: f64,

        /// Maximum subsequence length
        #[arg(short = 'm', long, default_value_t = 4)]
        max_length: usize,

        /// Compare element text only, ignoring content kinds
        #[arg(long)]
        text_only: bool,

        /// Divide by sqrt(K(a,a) * K(b,b))
        #[arg(short, long)]
        normalize: bool,
    },

    /// Gram matrix over the inputs of a file (one per line)
    Matrix {
        /// Input file; blank lines and lines starting with '#' are skipped
        file: PathBuf,

        /// Kind of inputs in the file
        #[arg(short, long, value_enum, default_value = "tree")]
        kind: InputKind,

        /// Kernel specification (TOML); its kernel must match the input kind
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Normalize the matrix to unit diagonal
        #[arg(short, long)]
        normalize: bool,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "text")]
        format: MatrixFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// Bounded square array
    Dense,
    /// Unbounded hash map
    Sparse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// Bracketed trees
    Tree,
    /// Whitespace-separated sequences
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatrixFormat {
    /// One row per line
    Text,
    /// JSON array of rows
    Json,
}
