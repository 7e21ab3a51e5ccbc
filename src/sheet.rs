//! Answer sheets: TOML tables of answers used by the `compile` subcommand.
//!
//! ```toml
//! objective = "Escrever um poema"
//! audience = "crianças de 8 anos"
//! constraints = ["rimas simples", "máximo 12 versos"]
//! inputs = "tema: outono, tema: chuva"   # comma-separated also accepted
//! ```

use std::path::Path;

use tracing::{debug, warn};

use crate::answers::AnswerState;
use crate::fields::{Field, InputKind};
use crate::reducer::{EditAction, parse_tag_list, reduce};

/// Parse an answer sheet into edit actions, one per key.
pub fn parse_sheet(contents: &str) -> Result<Vec<EditAction>, String> {
    let table: toml::Table =
        toml::from_str(contents).map_err(|e| format!("Invalid answer sheet: {}", e))?;

    let mut actions = Vec::with_capacity(table.len());
    for (key, value) in table {
        let field = Field::from_key(&key).ok_or_else(|| format!("Unknown field: {}", key))?;
        let action = match (field.kind(), value) {
            (InputKind::TagList, toml::Value::String(raw)) => EditAction::SetTags {
                field,
                values: parse_tag_list(&raw),
            },
            (InputKind::TagList, toml::Value::Array(items)) => EditAction::SetTags {
                field,
                values: tag_items(&key, items)?,
            },
            (_, toml::Value::String(text)) if field.kind().is_text() => {
                EditAction::SetText { field, value: text }
            }
            (kind, other) => {
                return Err(format!(
                    "Field {} expects {}, got {}",
                    key,
                    kind.label(),
                    other.type_str()
                ));
            }
        };
        actions.push(action);
    }
    Ok(actions)
}

/// Array entries are trimmed; blank entries are dropped like in the comma form.
fn tag_items(key: &str, items: Vec<toml::Value>) -> Result<Vec<String>, String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            toml::Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| Ok(trimmed.to_string()))
            }
            other => Some(Err(format!(
                "Field {} expects strings, got {}",
                key,
                other.type_str()
            ))),
        })
        .collect()
}

/// Build a state by applying a sheet's actions to the empty baseline.
pub fn state_from_sheet(contents: &str) -> Result<AnswerState, String> {
    let actions = parse_sheet(contents)?;
    Ok(actions
        .into_iter()
        .fold(AnswerState::empty(), |state, action| reduce(&state, action)))
}

/// Read and parse an answer sheet from disk.
pub fn load_sheet(path: &Path) -> Result<AnswerState, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        warn!(path = ?path, error = %e, "sheet_read_failed");
        format!("Failed to read {}: {}", path.display(), e)
    })?;
    let state = state_from_sheet(&contents).inspect_err(|e| {
        warn!(path = ?path, error = %e, "sheet_parse_failed");
    })?;
    debug!(path = ?path, answered = state.answered_count(), "sheet_loaded");
    Ok(state)
}
