//! Edit actions and the pure state reducer.

use crate::answers::{AnswerState, AnswerValue};
use crate::fields::Field;

/// The only way to derive a new `AnswerState` from an old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    SetText { field: Field, value: String },
    SetTags { field: Field, values: Vec<String> },
    /// Replace the whole state with the given baseline.
    Reset(AnswerState),
}

impl EditAction {
    /// Field touched by this action, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::SetText { field, .. } | Self::SetTags { field, .. } => Some(*field),
            Self::Reset(_) => None,
        }
    }

    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetText { .. } => "set_text",
            Self::SetTags { .. } => "set_tags",
            Self::Reset(_) => "reset",
        }
    }
}

/// Apply `action` to `state`. Total; never inspects the field kind.
pub fn reduce(state: &AnswerState, action: EditAction) -> AnswerState {
    match action {
        EditAction::SetText { field, value } => state.with(field, AnswerValue::Text(value)),
        EditAction::SetTags { field, values } => state.with(field, AnswerValue::Tags(values)),
        EditAction::Reset(baseline) => baseline,
    }
}

/// Split a raw comma-separated string into trimmed, non-empty pieces.
/// Order is preserved and duplicates are kept.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_text(field: Field, value: &str) -> EditAction {
        EditAction::SetText {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_parse_tag_list_trims_and_drops_empty() {
        assert_eq!(parse_tag_list("a, b ,,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tag_list_keeps_duplicates_and_order() {
        assert_eq!(parse_tag_list("z, a, z"), vec!["z", "a", "z"]);
    }

    #[test]
    fn test_parse_tag_list_blank_input() {
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list(" , ,  ").is_empty());
    }

    #[test]
    fn test_set_text_replaces_only_that_field() {
        let state = reduce(&AnswerState::empty(), set_text(Field::Objective, "Write a poem"));
        assert_eq!(state.text(Field::Objective), "Write a poem");
        assert_eq!(state.answered_count(), 1);
    }

    #[test]
    fn test_set_tags_replaces_sequence() {
        let state = reduce(
            &AnswerState::empty(),
            EditAction::SetTags {
                field: Field::Inputs,
                values: parse_tag_list("a, b ,,c"),
            },
        );
        assert_eq!(state.tags(Field::Inputs), ["a", "b", "c"]);
    }

    #[test]
    fn test_set_text_on_tag_field_overwrites() {
        let state = reduce(&AnswerState::empty(), set_text(Field::Constraints, "raw"));
        assert_eq!(
            state.get(Field::Constraints),
            &AnswerValue::Text("raw".to_string())
        );
    }

    #[test]
    fn test_reset_returns_baseline_regardless_of_state() {
        let dirty = [
            set_text(Field::Tone, "formal"),
            set_text(Field::Persona, "um poeta"),
        ]
        .into_iter()
        .fold(AnswerState::empty(), |s, a| reduce(&s, a));

        let baseline = AnswerState::empty();
        assert_eq!(reduce(&dirty, EditAction::Reset(baseline.clone())), baseline);
        assert_eq!(
            reduce(&baseline, EditAction::Reset(baseline.clone())),
            baseline
        );
    }

    #[test]
    fn test_same_actions_same_result() {
        let actions = vec![
            set_text(Field::Objective, "x"),
            EditAction::SetTags {
                field: Field::Constraints,
                values: vec!["y".to_string()],
            },
            set_text(Field::Objective, "z"),
        ];
        let run = || {
            actions
                .iter()
                .cloned()
                .fold(AnswerState::empty(), |s, a| reduce(&s, a))
        };
        assert_eq!(run(), run());
        assert_eq!(run().text(Field::Objective), "z");
    }

    #[test]
    fn test_action_metadata() {
        assert_eq!(set_text(Field::Tone, "a").field(), Some(Field::Tone));
        assert_eq!(EditAction::Reset(AnswerState::empty()).field(), None);
        assert_eq!(EditAction::Reset(AnswerState::empty()).kind(), "reset");
    }
}
