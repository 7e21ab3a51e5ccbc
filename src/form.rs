//! Form editing state and keyboard handling.
//!
//! The form never writes answers itself: every buffer change produces an
//! `EditAction` that the app feeds through the reducer.

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::answers::{AnswerState, AnswerValue};
use crate::app::App;
use crate::fields::{Field, InputKind};
use crate::reducer::{EditAction, parse_tag_list};

/// Edit buffer for the focused field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub focus: Field,
    /// Raw text being edited. For tag fields this is the comma-separated form.
    pub buffer: String,
    /// Cursor position in chars, `0..=buffer.chars().count()`.
    pub cursor_pos: usize,
}

/// Text shown in the editor for a stored answer.
pub fn buffer_for(state: &AnswerState, field: Field) -> String {
    match state.get(field) {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::Tags(tags) => tags.join(", "),
    }
}

impl FormState {
    pub fn new(state: &AnswerState) -> Self {
        let mut form = Self {
            focus: Field::ALL[0],
            buffer: String::new(),
            cursor_pos: 0,
        };
        form.seed(state);
        form
    }

    /// Reload the buffer for the focused field, cursor at the end.
    pub fn seed(&mut self, state: &AnswerState) {
        self.buffer = buffer_for(state, self.focus);
        self.cursor_pos = self.char_count();
    }

    pub fn focus_field(&mut self, field: Field, state: &AnswerState) {
        self.focus = field;
        self.seed(state);
    }

    pub fn focus_next(&mut self, state: &AnswerState) {
        self.focus_field(self.focus.next(), state);
    }

    pub fn focus_prev(&mut self, state: &AnswerState) {
        self.focus_field(self.focus.prev(), state);
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Byte offset of the char at `char_idx`, or the buffer length past the end.
    fn byte_index(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    /// The action that stores the current buffer.
    pub fn edit_action(&self) -> EditAction {
        match self.focus.kind() {
            InputKind::TagList => EditAction::SetTags {
                field: self.focus,
                values: parse_tag_list(&self.buffer),
            },
            InputKind::SingleLine | InputKind::MultiLine => EditAction::SetText {
                field: self.focus,
                value: self.buffer.clone(),
            },
        }
    }

    /// Insert a character at the current cursor position.
    pub fn insert_char(&mut self, c: char) -> EditAction {
        let at = self.byte_index(self.cursor_pos);
        self.buffer.insert(at, c);
        self.cursor_pos += 1;
        self.edit_action()
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char_before(&mut self) -> Option<EditAction> {
        if self.cursor_pos == 0 {
            return None;
        }
        let at = self.byte_index(self.cursor_pos - 1);
        self.buffer.remove(at);
        self.cursor_pos -= 1;
        Some(self.edit_action())
    }

    /// Delete the character at the cursor position (delete key).
    pub fn delete_char_at(&mut self) -> Option<EditAction> {
        if self.cursor_pos >= self.char_count() {
            return None;
        }
        let at = self.byte_index(self.cursor_pos);
        self.buffer.remove(at);
        Some(self.edit_action())
    }

    pub fn cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor_pos < self.char_count() {
            self.cursor_pos += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_pos = self.char_count();
    }

    /// Cursor as (line, display column) for placing the terminal cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.buffer[..self.byte_index(self.cursor_pos)];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (line, before[line_start..].width())
    }
}

/// Which button is focused in the reset-confirm modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetModalField {
    ResetButton,
    #[default]
    CancelButton,
}

impl ResetModalField {
    pub fn next(self) -> Self {
        match self {
            Self::ResetButton => Self::CancelButton,
            Self::CancelButton => Self::ResetButton,
        }
    }

    pub fn prev(self) -> Self {
        self.next() // Only two options, so prev == next
    }
}

/// Handle keyboard input for the question form.
pub fn handle_form_input(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    let action = match key_code {
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
            app.form.focus_prev(&app.answers);
            None
        }
        KeyCode::Tab | KeyCode::Down => {
            app.form.focus_next(&app.answers);
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.focus_prev(&app.answers);
            None
        }

        // Multi-line fields take a newline, everything else moves on
        KeyCode::Enter => {
            if app.form.focus.kind() == InputKind::MultiLine {
                Some(app.form.insert_char('\n'))
            } else {
                app.form.focus_next(&app.answers);
                None
            }
        }

        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            Some(app.form.insert_char(c))
        }
        KeyCode::Backspace => app.form.delete_char_before(),
        KeyCode::Delete => app.form.delete_char_at(),

        KeyCode::Left => {
            app.form.cursor_left();
            None
        }
        KeyCode::Right => {
            app.form.cursor_right();
            None
        }
        KeyCode::Home => {
            app.form.cursor_home();
            None
        }
        KeyCode::End => {
            app.form.cursor_end();
            None
        }

        KeyCode::PageUp => {
            app.scroll_preview_up(5);
            None
        }
        KeyCode::PageDown => {
            app.scroll_preview_down(5);
            None
        }

        _ => None,
    };

    if let Some(action) = action {
        app.dispatch(action);
    }
}

/// Handle keyboard input for the review checklist.
pub fn handle_review_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Up | KeyCode::Char('k') => app.form.focus_prev(&app.answers),
        KeyCode::Down | KeyCode::Char('j') => app.form.focus_next(&app.answers),
        // Jump back into the editor on the selected field
        KeyCode::Enter | KeyCode::Esc => {
            app.review_mode = false;
            debug!(field = app.form.focus.key(), "review_closed");
        }
        _ => {}
    }
}

/// Handle keyboard input for the reset-confirm modal.
pub fn handle_reset_modal_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
            app.reset_modal_focus = app.reset_modal_focus.next();
        }
        KeyCode::BackTab => {
            app.reset_modal_focus = app.reset_modal_focus.prev();
        }
        KeyCode::Esc => {
            app.show_reset_modal = false;
        }
        KeyCode::Enter => match app.reset_modal_focus {
            ResetModalField::ResetButton => app.reset_answers(),
            ResetModalField::CancelButton => app.show_reset_modal = false,
        },
        _ => {}
    }
}
