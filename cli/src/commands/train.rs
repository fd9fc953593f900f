//! Train command implementation.

use super::render::{render, OutputFormat};
use anyhow::{Context, Result as AnyhowResult};
use bytebpe_core::Corpus;
use bytebpe_training::{BpeTrainer, TieBreak, TrainingConfig};
use clap::{Parser, ValueEnum};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::time::Instant;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training corpus (must be UTF-8)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target vocabulary size, including special tokens and the 256 bytes
    #[arg(long, default_value_t = 1_000)]
    pub vocab_size: usize,

    /// Special token, reserved before the byte alphabet (repeatable)
    #[arg(short, long = "special-token", value_name = "TOKEN")]
    pub special_tokens: Vec<String>,

    /// Minimum pair frequency for a merge
    #[arg(short, long, default_value_t = 1)]
    pub min_frequency: u64,

    /// Rule for pairs with equal counts
    #[arg(long, value_enum, default_value_t = TieBreakArg::Smallest)]
    pub tie_break: TieBreakArg,

    /// Count pairs on a single thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Number of worker threads for pair counting
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Log progress every N merges (0 disables)
    #[arg(long, default_value_t = 100)]
    pub log_every: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only print the last N vocabulary entries and merges
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Tie-break choices on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TieBreakArg {
    Smallest,
    Largest,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Smallest => TieBreak::Smallest,
            TieBreakArg::Largest => TieBreak::Largest,
        }
    }
}

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    if let Some(threads) = cmd.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure rayon thread pool")?;
    }

    let corpus = Corpus::from_path(&cmd.input)
        .with_context(|| format!("failed to load corpus {}", cmd.input.display()))?;

    let config = TrainingConfig::new(cmd.vocab_size)
        .special_tokens(cmd.special_tokens)
        .min_frequency(cmd.min_frequency)
        .tie_break(cmd.tie_break.into())
        .parallel(!cmd.no_parallel)
        .log_every(cmd.log_every);

    let start = Instant::now();
    let model = BpeTrainer::new(config)
        .train(&corpus)
        .context("training failed")?;
    log::info!(
        "trained {} merges in {:.2}s",
        model.merges.len(),
        start.elapsed().as_secs_f64()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &model, cmd.format, cmd.limit)?;

    Ok(())
}
