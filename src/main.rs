mod answers;
mod app;
mod compiler;
mod config;
mod export;
mod fields;
mod form;
mod logging;
mod modal_ui;
mod reducer;
mod sheet;
mod templates;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::form::{handle_form_input, handle_reset_modal_input, handle_review_input};
use crate::ui::draw_ui;

#[derive(Parser, Debug)]
#[command(
    name = "promptwright",
    version,
    about = "Answer a few questions, get a structured prompt"
)]
struct Cli {
    /// Where Ctrl+Y writes the document; `-` prints it after exit
    #[arg(long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a TOML answer sheet and print the document
    Compile {
        sheet: PathBuf,

        /// Print the full compiled output as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Modification time of a file, if it can be read.
pub fn get_file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    // Initialize logging before anything else; the configured level is applied below
    let bootstrap_level = std::env::var("PROMPTWRIGHT_LOG").unwrap_or_else(|_| "info".to_string());
    let (session_id, log_directory, reload_handle, _guard) = match logging::init(&bootstrap_level) {
        Ok(ctx) => {
            logging::cleanup_old_logs(&ctx.log_directory);
            (
                ctx.session_id,
                Some(ctx.log_directory),
                Some(ctx.reload_handle),
                Some(ctx._guard),
            )
        }
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            ("------".to_string(), None, None, None)
        }
    };

    let loaded_config = config::load_config();
    debug!(
        config_path = %loaded_config.config_path.display(),
        project_config = ?loaded_config.project_config_path,
        status = ?loaded_config.status,
        "config_loaded"
    );
    if loaded_config.config.logging.level != bootstrap_level
        && !logging::level_pinned_by_env()
        && let Some(handle) = &reload_handle
        && let Err(e) = logging::update_log_level(handle, &loaded_config.config.logging.level)
    {
        warn!(error = %e, "log_level_update_failed");
    }

    let result = match cli.command {
        Some(Command::Compile { sheet, json }) => run_compile(&sheet, json),
        None => run_tui(
            session_id.clone(),
            log_directory,
            loaded_config,
            reload_handle,
            cli.output,
        ),
    };

    info!(
        session_id = %session_id,
        duration_secs = start_time.elapsed().as_secs_f64(),
        "session_end"
    );

    result
}

/// One-shot compile of an answer sheet to stdout.
fn run_compile(sheet_path: &Path, json: bool) -> Result<()> {
    let state = sheet::load_sheet(sheet_path).map_err(anyhow::Error::msg)?;
    let compiled = compiler::compile(&state);
    info!(
        path = ?sheet_path,
        completion = compiled.completion_percent,
        "document_compiled"
    );

    if json {
        let text = serde_json::to_string_pretty(&compiled).context("serializing compiled output")?;
        println!("{}", text);
    } else {
        export::print_document(&compiled.document)?;
        for title in &compiled.pending_required {
            eprintln!("pendente: {}", title);
        }
    }
    Ok(())
}

fn run_tui(
    session_id: String,
    log_directory: Option<PathBuf>,
    loaded_config: config::LoadedConfig,
    reload_handle: Option<logging::ReloadHandle>,
    output_override: Option<String>,
) -> Result<()> {
    let mut app = App::new(
        session_id,
        log_directory,
        loaded_config,
        reload_handle,
        output_override,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The alternate screen is gone, so a stdout export can finally be printed
    if let Some(document) = app.pending_stdout.take() {
        export::print_document(&document)?;
    }

    result
}

fn run_app(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.poll_config();

        terminal.draw(|f| draw_ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        // Short timeout so the copied flash and config polling keep ticking
        if crossterm::event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = crossterm::event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key);
        }
    }
}

/// Route a key press to the focused surface.
fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.show_help_modal {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            app.show_help_modal = false;
        }
        return;
    }

    if app.show_reset_modal {
        handle_reset_modal_input(app, key.code);
        return;
    }

    match key.code {
        KeyCode::F(1) => app.show_help_modal = true,
        KeyCode::Char('y') if ctrl => app.copy_document(),
        KeyCode::Char('r') if ctrl => app.toggle_review(),
        KeyCode::Char('l') if ctrl => app.open_reset_modal(),
        KeyCode::Esc if !app.review_mode => app.should_quit = true,
        _ if app.review_mode => handle_review_input(app, key.code),
        _ => handle_form_input(app, key.code, key.modifiers),
    }
}
