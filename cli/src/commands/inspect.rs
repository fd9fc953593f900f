//! Inspect command implementation.

use anyhow::{Context, Result as AnyhowResult};
use bytebpe_core::{Corpus, Vocabulary};
use clap::Parser;
use std::path::PathBuf;

/// Inspect command arguments.
#[derive(Parser)]
pub struct InspectCommand {
    /// Path to the corpus (must be UTF-8)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Special token, reserved before the byte alphabet (repeatable)
    #[arg(short, long = "special-token", value_name = "TOKEN")]
    pub special_tokens: Vec<String>,
}

pub fn run(cmd: InspectCommand) -> AnyhowResult<()> {
    let corpus = Corpus::from_path(&cmd.input)
        .with_context(|| format!("failed to load corpus {}", cmd.input.display()))?;
    let vocab = Vocabulary::initialize(&cmd.special_tokens)
        .context("invalid special tokens")?;

    let distinct = {
        let mut seen = [false; 256];
        corpus.as_bytes().iter().for_each(|&b| seen[b as usize] = true);
        seen.iter().filter(|&&s| s).count()
    };

    println!("Corpus: {}", cmd.input.display());
    println!("  Bytes: {}", corpus.len());
    println!("  Distinct byte values: {}", distinct);
    println!("  Characters: {}", corpus.text().chars().count());
    println!("Initial vocabulary: {}", vocab.len());
    println!("  Special tokens: {}", vocab.special_tokens().len());
    println!(
        "  Byte tokens: {}",
        vocab.len() - vocab.special_tokens().len()
    );

    Ok(())
}
