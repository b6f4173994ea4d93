// src/application/generator.rs
use crate::domain::{DomainError, Metadata, NoteContent, Row};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// AI note generation backend. Returns the model's raw text; callers must
/// run it through [`parse_generated`] before it becomes note content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, topic: &str, course: &str) -> Result<String, DomainError>;
}

#[derive(Debug, Deserialize)]
struct GeneratedContent {
    metadata: Metadata,
    rows: Vec<GeneratedRow>,
    summary: String,
}

// Model-supplied row ids are discarded, so they are not part of the schema.
#[derive(Debug, Deserialize)]
struct GeneratedRow {
    cue: String,
    note: String,
}

/// Parse generator output into note content.
///
/// Strips markdown code fences, requires every schema field with the right
/// type and at least one row, and assigns fresh row ids `row-{stamp}-{index}`.
/// Anything else is `MalformedContent`; nothing is ever substituted.
#[instrument(level = "debug", skip(raw), fields(len = raw.len()))]
pub fn parse_generated(raw: &str, stamp: i64) -> Result<NoteContent, DomainError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(DomainError::MalformedContent(
            "generator returned no content".to_string(),
        ));
    }

    let generated: GeneratedContent = serde_json::from_str(cleaned)
        .map_err(|e| DomainError::MalformedContent(format!("generator output is not a note: {e}")))?;

    if generated.rows.is_empty() {
        return Err(DomainError::MalformedContent(
            "generator output has no rows".to_string(),
        ));
    }

    let rows = generated
        .rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| Row {
            id: format!("row-{stamp}-{index}"),
            cue: row.cue,
            note: row.note,
        })
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), "Parsed generated note");

    Ok(NoteContent {
        metadata: generated.metadata,
        rows,
        summary: generated.summary,
    })
}
