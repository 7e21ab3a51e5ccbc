//! Answer-state to document compiler.
//!
//! Pure functions of an `AnswerState`: the assembled prompt document, the completion
//! percentage, the pending-required list and the advisory messages.

use serde::Serialize;

use crate::answers::AnswerState;
use crate::fields::{FIELD_COUNT, FIELDS, Field};
use crate::templates;

/// Everything the presentation layer shows for one state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledOutput {
    pub document: String,
    /// 0..=100
    pub completion_percent: u8,
    /// Titles of required fields still unanswered, in table order.
    pub pending_required: Vec<&'static str>,
    pub advisories: Vec<&'static str>,
}

/// Compile a state snapshot.
pub fn compile(state: &AnswerState) -> CompiledOutput {
    CompiledOutput {
        document: build_document(state),
        completion_percent: completion_percent(state.answered_count(), FIELD_COUNT),
        pending_required: pending_required(state),
        advisories: advisories(state),
    }
}

/// Labeled text block, or nothing when the field is blank.
fn text_block(state: &AnswerState, field: Field, label: &str) -> Option<String> {
    let text = state.text(field).trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("{label}\n{text}"))
    }
}

/// Labeled bullet list, or nothing when the list is empty.
fn list_block(state: &AnswerState, field: Field, label: &str) -> Option<String> {
    let items = state.tags(field);
    if items.is_empty() {
        return None;
    }
    let mut lines = vec![label.to_string()];
    lines.extend(
        items
            .iter()
            .map(|item| format!("{}{}", templates::BULLET, item)),
    );
    Some(lines.join("\n"))
}

/// Assemble the prompt document. Never empty: the closing block is unconditional.
pub fn build_document(state: &AnswerState) -> String {
    let persona = state.text(Field::Persona).trim();
    let persona_block =
        (!persona.is_empty()).then(|| format!("{} {}.", templates::PERSONA_PREFIX, persona));

    let blocks = [
        persona_block,
        text_block(state, Field::Objective, templates::OBJECTIVE_LABEL),
        text_block(state, Field::Audience, templates::AUDIENCE_LABEL),
        text_block(state, Field::Context, templates::CONTEXT_LABEL),
        list_block(state, Field::Inputs, templates::INPUTS_LABEL),
        text_block(state, Field::Tone, templates::TONE_LABEL),
        text_block(state, Field::Format, templates::FORMAT_LABEL),
        list_block(state, Field::Constraints, templates::CONSTRAINTS_LABEL),
        text_block(state, Field::Evaluation, templates::EVALUATION_LABEL),
        Some(templates::CLOSING_INSTRUCTION.to_string()),
    ];

    blocks.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

/// `round(100 * answered / total)`, halves rounded away from zero.
pub fn completion_percent(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let answered = answered.min(total);
    ((200 * answered + total) / (2 * total)) as u8
}

/// Titles of required fields that are still unanswered.
pub fn pending_required(state: &AnswerState) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|d| d.required && !state.is_answered(d.field))
        .map(|d| d.title)
        .collect()
}

fn missing_format(s: &AnswerState) -> bool {
    s.is_answered(Field::Objective) && s.text(Field::Format).is_empty()
}

fn missing_constraints(s: &AnswerState) -> bool {
    s.tags(Field::Constraints).is_empty()
}

fn missing_evaluation(s: &AnswerState) -> bool {
    s.text(Field::Evaluation).is_empty()
}

/// Heuristics evaluated in this order; any subset may fire.
const ADVISORY_RULES: [(fn(&AnswerState) -> bool, &str); 3] = [
    (missing_format, templates::ADVISORY_FORMAT),
    (missing_constraints, templates::ADVISORY_CONSTRAINTS),
    (missing_evaluation, templates::ADVISORY_EVALUATION),
];

pub fn advisories(state: &AnswerState) -> Vec<&'static str> {
    ADVISORY_RULES
        .iter()
        .filter(|(applies, _)| applies(state))
        .map(|(_, message)| *message)
        .collect()
}
