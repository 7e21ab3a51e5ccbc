//! Answer values and the full answer state.

use crate::fields::{FIELD_COUNT, Field};

/// Current answer for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// Free-form text (single or multi-line).
    Text(String),
    /// Ordered tag list.
    Tags(Vec<String>),
}

impl AnswerValue {
    /// Empty value with the shape expected by `field`.
    pub fn empty_for(field: Field) -> Self {
        if field.kind().is_text() {
            Self::Text(String::new())
        } else {
            Self::Tags(Vec::new())
        }
    }

    /// Non-empty trimmed text, or at least one tag.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Text(text) => !text.trim().is_empty(),
            Self::Tags(tags) => !tags.is_empty(),
        }
    }
}

/// One answer per field, always fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerState {
    values: [AnswerValue; FIELD_COUNT],
}

impl Default for AnswerState {
    fn default() -> Self {
        Self::empty()
    }
}

impl AnswerState {
    /// Baseline state: every text field `""`, every tag field `[]`.
    pub fn empty() -> Self {
        Self {
            values: std::array::from_fn(|i| AnswerValue::empty_for(Field::ALL[i])),
        }
    }

    pub fn get(&self, field: Field) -> &AnswerValue {
        &self.values[field.index()]
    }

    /// Text held by `field`, or `""` when it holds tags.
    pub fn text(&self, field: Field) -> &str {
        match self.get(field) {
            AnswerValue::Text(text) => text,
            AnswerValue::Tags(_) => "",
        }
    }

    /// Tags held by `field`, or an empty slice when it holds text.
    pub fn tags(&self, field: Field) -> &[String] {
        match self.get(field) {
            AnswerValue::Tags(tags) => tags,
            AnswerValue::Text(_) => &[],
        }
    }

    pub fn is_answered(&self, field: Field) -> bool {
        self.get(field).is_answered()
    }

    /// Number of answered fields.
    pub fn answered_count(&self) -> usize {
        self.iter().filter(|(_, v)| v.is_answered()).count()
    }

    /// Copy of this state with `field` replaced.
    pub fn with(&self, field: Field, value: AnswerValue) -> Self {
        let mut next = self.clone();
        next.values[field.index()] = value;
        next
    }

    /// Iterate `(field, value)` pairs in descriptor-table order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &AnswerValue)> {
        Field::ALL.into_iter().zip(self.values.iter())
    }
}
