//! Rendering trained vocabularies for inspection.

use anyhow::Result as AnyhowResult;
use bytebpe_training::{StopReason, TrainedModel};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

/// Output formats for the train command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON document
    Json,
}

#[derive(Serialize)]
struct TokenView {
    id: u32,
    /// ASCII-escaped content
    text: String,
    bytes: Vec<u8>,
}

#[derive(Serialize)]
struct MergeView {
    rank: usize,
    left: String,
    right: String,
    new_id: u32,
}

#[derive(Serialize)]
struct ModelView {
    vocab_size: usize,
    initial_vocab_size: usize,
    stop_reason: StopReason,
    vocab: Vec<TokenView>,
    merges: Vec<MergeView>,
}

fn escape(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

fn view(model: &TrainedModel, limit: Option<usize>) -> ModelView {
    let vocab_skip = limit.map_or(0, |n| model.vocab.len().saturating_sub(n));
    let merges_skip = limit.map_or(0, |n| model.merges.len().saturating_sub(n));

    ModelView {
        vocab_size: model.vocab.len(),
        initial_vocab_size: model.initial_vocab_size,
        stop_reason: model.stop_reason,
        vocab: model
            .vocab
            .iter()
            .skip(vocab_skip)
            .map(|(id, content)| TokenView {
                id,
                text: escape(content),
                bytes: content.to_vec(),
            })
            .collect(),
        merges: model
            .merges
            .iter()
            .enumerate()
            .skip(merges_skip)
            .map(|(rank, (record, rule))| MergeView {
                rank,
                left: escape(&record.left),
                right: escape(&record.right),
                new_id: rule.new_id,
            })
            .collect(),
    }
}

/// Write `model` to `out` in the requested format.
///
/// `limit` keeps only the most recent vocabulary entries and merges.
pub fn render<W: Write>(
    out: &mut W,
    model: &TrainedModel,
    format: OutputFormat,
    limit: Option<usize>,
) -> AnyhowResult<()> {
    let view = view(model, limit);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &view)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "Vocabulary: {} tokens ({} initial, {:?})",
                view.vocab_size, view.initial_vocab_size, view.stop_reason
            )?;
            for token in &view.vocab {
                writeln!(out, "{:>8}  \"{}\"", token.id, token.text)?;
            }
            writeln!(out)?;
            writeln!(out, "Merges: {}", model.merges.len())?;
            for merge in &view.merges {
                writeln!(
                    out,
                    "{:>8}  \"{}\" + \"{}\" -> {}",
                    merge.rank, merge.left, merge.right, merge.new_id
                )?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebpe_core::Corpus;
    use bytebpe_training::{BpeTrainer, TrainingConfig};

    fn model() -> TrainedModel {
        BpeTrainer::new(TrainingConfig::new(258).parallel(false))
            .train(&Corpus::from("aaabdaaabac"))
            .unwrap()
    }

    #[test]
    fn test_render_text() {
        let mut out = Vec::new();
        render(&mut out, &model(), OutputFormat::Text, Some(2)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Vocabulary: 258 tokens (256 initial, TargetReached)"));
        assert!(text.contains("\"a\" + \"a\" -> 256"));
        assert!(text.contains("     257  \"ab\""));
        assert!(!text.contains("\"\\x00\""));
    }

    #[test]
    fn test_render_json() {
        let mut out = Vec::new();
        render(&mut out, &model(), OutputFormat::Json, None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["vocab_size"], 258);
        assert_eq!(value["stop_reason"], "target_reached");
        assert_eq!(value["vocab"][0]["text"], "\\x00");
        assert_eq!(value["merges"][0]["left"], "a");
        assert_eq!(value["merges"][1]["new_id"], 257);
    }
}
