//! Application state and core logic.

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, warn};

use crate::answers::AnswerState;
use crate::compiler::{CompiledOutput, compile};
use crate::config::{Config, LoadedConfig, reload_config};
use crate::export::{ExportTarget, export_document};
use crate::fields::Field;
use crate::form::{FormState, ResetModalField};
use crate::logging::{self, ReloadHandle};
use crate::reducer::{EditAction, reduce};
use crate::get_file_mtime;

/// Main application state. The only owner of the `AnswerState`.
pub struct App {
    pub answers: AnswerState,
    /// Output for the current `answers`, refreshed only when the state changes.
    pub compiled: CompiledOutput,
    /// How many times `compiled` was rebuilt.
    pub compile_count: u64,
    pub form: FormState,
    pub review_mode: bool,
    pub show_help_modal: bool,
    pub show_reset_modal: bool,
    pub reset_modal_focus: ResetModalField,
    pub preview_scroll: u16,
    /// When the document was last exported (for the "Copied" indicator).
    pub copied_at: Option<Instant>,
    /// Where the last export went.
    pub last_export: Option<String>,
    pub export_error: Option<String>,
    /// Document to print once the terminal is restored (stdout target).
    pub pending_stdout: Option<String>,
    pub should_quit: bool,
    /// Session ID for this invocation (always populated).
    pub session_id: String,
    /// Directory where logs are written.
    pub log_directory: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
    /// `--output` from the command line; survives config reloads.
    pub output_override: Option<String>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
    /// Path to the project config (.promptwright), if one was found at startup.
    pub project_config_path: Option<PathBuf>,
    /// Last known mtimes for change detection.
    pub config_mtime: Option<SystemTime>,
    pub project_config_mtime: Option<SystemTime>,
    /// Last time we polled for config changes.
    pub last_config_poll: Instant,
    /// When config was last successfully reloaded (for "Reloaded" indicator fade).
    pub config_reloaded_at: Option<Instant>,
    /// Error message if config reload failed (invalid TOML, etc.).
    pub config_reload_error: Option<String>,
    /// Handle for dynamically reloading the log level.
    pub log_level_handle: Option<ReloadHandle>,
    /// Current log level from config (to detect changes on reload).
    pub current_log_level: String,
    /// `RUST_LOG` was set at startup; config reloads leave the filter alone.
    pub log_level_pinned: bool,
}

impl App {
    pub fn new(
        session_id: String,
        log_directory: Option<PathBuf>,
        loaded_config: LoadedConfig,
        log_level_handle: Option<ReloadHandle>,
        output_override: Option<String>,
    ) -> Self {
        let mut config = loaded_config.config;
        if let Some(path) = &output_override {
            config.output.path = path.clone();
        }
        let answers = AnswerState::empty();
        let compiled = compile(&answers);
        let form = FormState::new(&answers);

        Self {
            compiled,
            compile_count: 1,
            form,
            answers,
            review_mode: config.behavior.start_in_review,
            show_help_modal: false,
            show_reset_modal: false,
            reset_modal_focus: ResetModalField::default(),
            preview_scroll: 0,
            copied_at: None,
            last_export: None,
            export_error: None,
            pending_stdout: None,
            should_quit: false,
            session_id,
            log_directory,
            current_log_level: config.logging.level.clone(),
            config,
            output_override,
            config_mtime: get_file_mtime(&loaded_config.config_path),
            project_config_mtime: loaded_config
                .project_config_path
                .as_deref()
                .and_then(get_file_mtime),
            config_path: loaded_config.config_path,
            project_config_path: loaded_config.project_config_path,
            // Initialize to "long ago" so we poll immediately on start
            last_config_poll: Instant::now() - Duration::from_secs(10),
            config_reloaded_at: None,
            config_reload_error: None,
            log_level_handle,
            log_level_pinned: logging::level_pinned_by_env(),
        }
    }

    /// Apply an edit. The compiled output is rebuilt only when the state actually changed.
    pub fn dispatch(&mut self, action: EditAction) {
        let kind = action.kind();
        let field = action.field().map(Field::key);

        let next = reduce(&self.answers, action);
        if next == self.answers {
            debug!(kind, field, "action_unchanged");
            return;
        }
        self.answers = next;

        self.compiled = compile(&self.answers);
        self.compile_count += 1;

        debug!(
            kind,
            field,
            answered = self.answers.answered_count(),
            "action_applied"
        );
        debug!(
            completion = self.compiled.completion_percent,
            pending = self.compiled.pending_required.len(),
            advisories = self.compiled.advisories.len(),
            bytes = self.compiled.document.len(),
            "document_compiled"
        );
    }

    /// Clear every answer and reseed the editor.
    pub fn reset_answers(&mut self) {
        self.dispatch(EditAction::Reset(AnswerState::empty()));
        self.form.seed(&self.answers);
        self.show_reset_modal = false;
        self.reset_modal_focus = ResetModalField::default();
        self.preview_scroll = 0;
        info!("answers_reset");
    }

    pub fn open_reset_modal(&mut self) {
        self.show_reset_modal = true;
        self.reset_modal_focus = ResetModalField::default();
    }

    pub fn toggle_review(&mut self) {
        self.review_mode = !self.review_mode;
        debug!(review = self.review_mode, "review_toggled");
    }

    /// Export the current document. Answers are never touched, whatever the outcome.
    pub fn copy_document(&mut self) {
        let target = ExportTarget::from_config(&self.config);
        match export_document(&self.compiled.document, &target) {
            Ok(_) => {
                if target == ExportTarget::Stdout {
                    self.pending_stdout = Some(self.compiled.document.clone());
                }
                self.copied_at = Some(Instant::now());
                self.last_export = Some(target.describe());
                self.export_error = None;
            }
            Err(e) => {
                self.copied_at = None;
                self.export_error = Some(e);
            }
        }
    }

    /// Whether the "Copied" indicator should still be shown.
    pub fn copied_visible(&self) -> bool {
        let flash = Duration::from_millis(self.config.behavior.copied_flash_ms);
        self.copied_at.is_some_and(|at| at.elapsed() < flash)
    }

    pub fn scroll_preview_up(&mut self, amount: u16) {
        self.preview_scroll = self.preview_scroll.saturating_sub(amount);
    }

    pub fn scroll_preview_down(&mut self, amount: u16) {
        let max = self.compiled.document.lines().count() as u16;
        self.preview_scroll = (self.preview_scroll + amount).min(max);
    }

    fn config_files_changed(&mut self) -> bool {
        let global = get_file_mtime(&self.config_path);
        let project = self.project_config_path.as_deref().and_then(get_file_mtime);

        if global.is_none() {
            debug!(path = ?self.config_path, "config_mtime_check_failed");
            return false;
        }

        let changed = global != self.config_mtime || project != self.project_config_mtime;
        self.config_mtime = global;
        self.project_config_mtime = project;
        changed
    }

    pub fn poll_config(&mut self) {
        // Throttle: poll every 2 seconds
        if self.last_config_poll.elapsed() < Duration::from_secs(2) {
            return;
        }
        self.last_config_poll = Instant::now();

        if !self.config_files_changed() {
            return;
        }
        self.apply_reload();
    }

    /// Re-read config from disk, keeping the previous config when the global file is broken.
    /// A broken `.promptwright` still applies the global config and is shown as an error.
    pub fn apply_reload(&mut self) {
        match reload_config(&self.config_path, self.project_config_path.as_deref()) {
            Ok(reloaded) => {
                let mut new_config = reloaded.config;
                if let Some(path) = &self.output_override {
                    new_config.output.path = path.clone();
                }

                // A stale export error refers to the old target
                if new_config.output.path != self.config.output.path {
                    self.export_error = None;
                }

                let new_log_level = &new_config.logging.level;
                if new_log_level != &self.current_log_level
                    && !self.log_level_pinned
                    && let Some(ref handle) = self.log_level_handle
                {
                    match logging::update_log_level(handle, new_log_level) {
                        Ok(()) => {
                            debug!(
                                old_level = %self.current_log_level,
                                new_level = %new_log_level,
                                "log_level_updated"
                            );
                            self.current_log_level = new_log_level.clone();
                        }
                        Err(e) => {
                            // Continue with config reload, just don't update log level
                            warn!(error = %e, "log_level_update_failed");
                        }
                    }
                }

                self.config = new_config;
                self.config_reload_error = reloaded.project_error;
                self.config_reloaded_at = Some(Instant::now());
            }
            Err(error) => {
                self.config_reload_error = Some(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoadStatus;
    use crate::templates;
    use std::fs;

    fn test_app(dir: &std::path::Path) -> App {
        let config_path = dir.join("config.toml");
        fs::write(&config_path, "").unwrap();
        let mut config = Config::default();
        config.output.path = dir.join("PROMPT.md").to_string_lossy().into_owned();
        let loaded = LoadedConfig {
            config,
            config_path,
            project_config_path: None,
            status: ConfigLoadStatus::Loaded,
        };
        let mut app = App::new("abc123".to_string(), None, loaded, None, None);
        app.log_level_pinned = false;
        app
    }

    // The layer must outlive the handle for reloads to succeed
    fn test_filter() -> (
        tracing_subscriber::reload::Layer<tracing_subscriber::EnvFilter, tracing_subscriber::Registry>,
        ReloadHandle,
    ) {
        tracing_subscriber::reload::Layer::new(tracing_subscriber::EnvFilter::new("info"))
    }

    fn set_text(field: Field, value: &str) -> EditAction {
        EditAction::SetText {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_new_app_starts_from_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());
        assert_eq!(app.answers, AnswerState::empty());
        assert_eq!(app.compiled, compile(&AnswerState::empty()));
        assert!(!app.review_mode);
    }

    #[test]
    fn test_dispatch_recompiles_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.dispatch(set_text(Field::Objective, "Write a poem"));
        assert_eq!(app.compile_count, 2);
        assert!(app.compiled.document.contains("Write a poem"));
        assert_eq!(app.compiled.completion_percent, 11);
    }

    #[test]
    fn test_dispatch_skips_compile_when_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.dispatch(set_text(Field::Tone, "formal"));
        let count = app.compile_count;
        app.dispatch(set_text(Field::Tone, "formal"));
        assert_eq!(app.compile_count, count);
    }

    #[test]
    fn test_reset_clears_answers_and_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.dispatch(set_text(Field::Objective, "x"));
        app.form.seed(&app.answers);
        app.open_reset_modal();

        app.reset_answers();
        assert_eq!(app.answers, AnswerState::empty());
        assert_eq!(app.form.buffer, "");
        assert!(!app.show_reset_modal);
        assert_eq!(app.compiled.document, templates::CLOSING_INSTRUCTION);
    }

    #[test]
    fn test_copy_writes_file_and_flashes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.dispatch(set_text(Field::Objective, "obj"));
        let before = app.answers.clone();

        app.copy_document();
        assert!(app.copied_visible());
        assert!(app.export_error.is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("PROMPT.md")).unwrap(),
            app.compiled.document
        );
        assert_eq!(app.answers, before);
    }

    #[test]
    fn test_copied_indicator_expires() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.config.behavior.copied_flash_ms = 0;
        app.copy_document();
        assert!(app.copied_at.is_some());
        assert!(!app.copied_visible());
    }

    #[test]
    fn test_copy_failure_keeps_answers() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.dispatch(set_text(Field::Audience, "iniciantes"));
        let before = app.answers.clone();

        // A directory is not a writable file
        app.config.output.path = dir.path().to_string_lossy().into_owned();
        app.copy_document();
        assert!(app.export_error.is_some());
        assert!(!app.copied_visible());
        assert_eq!(app.answers, before);
    }

    #[test]
    fn test_copy_to_stdout_is_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.config.output.path = "-".to_string();
        app.copy_document();
        assert_eq!(app.pending_stdout.as_deref(), Some(app.compiled.document.as_str()));
        assert_eq!(app.last_export.as_deref(), Some("stdout"));
    }

    #[test]
    fn test_reload_keeps_output_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.output_override = Some("./override.md".to_string());
        fs::write(&app.config_path, "[behavior]\ncopied_flash_ms = 10\n").unwrap();

        app.apply_reload();
        assert!(app.config_reload_error.is_none());
        assert!(app.config_reloaded_at.is_some());
        assert_eq!(app.config.behavior.copied_flash_ms, 10);
        assert_eq!(app.config.output.path, "./override.md");
    }

    #[test]
    fn test_reload_error_keeps_previous_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        let before = app.config.clone();
        fs::write(&app.config_path, "[behavior\n").unwrap();

        app.apply_reload();
        assert!(app.config_reload_error.is_some());
        assert_eq!(app.config, before);
    }

    #[test]
    fn test_preview_scroll_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.scroll_preview_up(3);
        assert_eq!(app.preview_scroll, 0);
        app.scroll_preview_down(100);
        assert_eq!(
            app.preview_scroll as usize,
            app.compiled.document.lines().count()
        );
    }

    #[test]
    fn test_reload_broken_project_file_applies_global() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        let project = dir.path().join(".promptwright");
        fs::write(&project, "[behavior\n").unwrap();
        app.project_config_path = Some(project);
        fs::write(&app.config_path, "[behavior]\ncopied_flash_ms = 750\n").unwrap();

        app.apply_reload();
        assert_eq!(app.config.behavior.copied_flash_ms, 750);
        assert!(app.config_reloaded_at.is_some());
        let err = app.config_reload_error.as_deref().unwrap();
        assert!(err.starts_with("Invalid .promptwright"));
    }

    #[test]
    fn test_reload_updates_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        let (_layer, handle) = test_filter();
        app.log_level_handle = Some(handle);
        fs::write(&app.config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

        app.apply_reload();
        assert_eq!(app.current_log_level, "debug");
    }

    #[test]
    fn test_reload_leaves_log_level_pinned_by_rust_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        let (_layer, handle) = test_filter();
        app.log_level_handle = Some(handle);
        app.log_level_pinned = true;
        fs::write(&app.config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

        app.apply_reload();
        assert_eq!(app.current_log_level, "info");
        assert_eq!(app.config.logging.level, "debug");
    }

    #[test]
    fn test_reload_with_new_output_clears_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.export_error = Some("Failed to write".to_string());
        let target = dir.path().join("elsewhere.md");
        fs::write(
            &app.config_path,
            format!("[output]\npath = {:?}\n", target.to_string_lossy()),
        )
        .unwrap();

        app.apply_reload();
        assert_eq!(app.config.output.path, target.to_string_lossy());
        assert!(app.export_error.is_none());
    }

    #[test]
    fn test_reload_with_same_output_keeps_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.export_error = Some("Failed to write".to_string());
        let target = app.config.output.path.clone();
        fs::write(
            &app.config_path,
            format!("[output]\npath = {:?}\n[behavior]\ncopied_flash_ms = 10\n", target),
        )
        .unwrap();

        app.apply_reload();
        assert_eq!(app.config.behavior.copied_flash_ms, 10);
        assert_eq!(app.export_error.as_deref(), Some("Failed to write"));
    }
}
