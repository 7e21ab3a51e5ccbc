//! UI rendering functions.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Gauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    Wrap,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::fields::{FIELD_COUNT, Field};
use crate::form::buffer_for;
use crate::modal_ui::{draw_help_modal, draw_reset_modal};

/// How long the "Config reloaded" marker stays up.
const RELOADED_MARKER: Duration = Duration::from_secs(2);

/// Truncates a string to the given display width, appending "..." if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    // Replace newlines with spaces for single-line display
    let single_line: String = s.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();

    if single_line.width() <= max_width {
        return single_line;
    }

    let room = max_width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in single_line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > room {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Checklist marker for a field.
pub fn answered_marker(answered: bool) -> &'static str {
    if answered { "✓" } else { "○" }
}

/// First visible editor line so that `cursor_line` stays inside `height` rows.
pub fn editor_scroll(cursor_line: usize, height: u16) -> u16 {
    let height = height.max(1) as usize;
    cursor_line.saturating_sub(height - 1) as u16
}

/// Status text for the right side of the command bar.
fn status_indicator(app: &App) -> Option<(String, Color)> {
    if app.copied_visible() {
        let target = app.last_export.as_deref().unwrap_or("");
        return Some((format!("✓ Copiado para {}", target), Color::Green));
    }
    if let Some(err) = &app.export_error {
        return Some((err.clone(), Color::Red));
    }
    if let Some(err) = &app.config_reload_error {
        return Some((err.clone(), Color::Red));
    }
    if app
        .config_reloaded_at
        .is_some_and(|at| at.elapsed() < RELOADED_MARKER)
    {
        return Some(("Config recarregada".to_string(), Color::Cyan));
    }
    None
}

/// Draw the main UI.
pub fn draw_ui(f: &mut Frame, app: &App) {
    let advisory_rows = app.compiled.advisories.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                    // Form + preview
            Constraint::Length(3),                 // Completion gauge
            Constraint::Length(advisory_rows + 3), // Pending + advisories
            Constraint::Length(3),                 // Command bar
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    if app.review_mode {
        draw_review(f, app, columns[0]);
    } else {
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FIELD_COUNT as u16 + 2),
                Constraint::Min(0),
            ])
            .split(columns[0]);
        draw_field_list(f, app, left[0]);
        draw_editor(f, app, left[1]);
    }

    draw_preview(f, app, columns[1]);
    draw_gauge(f, app, chunks[1]);
    draw_notes(f, app, chunks[2]);
    draw_command_bar(f, app, chunks[3]);

    if app.show_reset_modal {
        draw_reset_modal(f, app);
    }

    if app.show_help_modal {
        draw_help_modal(f, app);
    }
}

fn field_line(app: &App, field: Field, focused: bool) -> Line<'static> {
    let answered = app.answers.is_answered(field);
    let mut title_style = Style::default().fg(field.color(answered));
    if focused {
        title_style = title_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }

    let mut spans = vec![
        Span::styled(
            format!(" {} ", answered_marker(answered)),
            Style::default().fg(field.color(answered)),
        ),
        Span::styled(field.title().to_string(), title_style),
    ];
    if field.is_required() {
        spans.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn draw_field_list(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = Field::ALL
        .into_iter()
        .map(|field| field_line(app, field, field == app.form.focus))
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Perguntas ")
            .title_bottom(Line::from(" * obrigatória ").right_aligned()),
    );
    f.render_widget(list, area);
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let descriptor = app.form.focus.descriptor();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let help = Paragraph::new(descriptor.description)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(help, rows[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", descriptor.title))
        .title_bottom(Line::from(format!(" {} ", descriptor.kind.label())).right_aligned());
    let inner = block.inner(rows[1]);

    let (cursor_line, cursor_col) = app.form.cursor_line_col();
    let scroll_y = editor_scroll(cursor_line, inner.height);

    let editor = if app.form.buffer.is_empty() {
        let placeholder = descriptor.placeholder.unwrap_or("");
        Paragraph::new(Span::styled(
            placeholder,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .wrap(Wrap { trim: false })
    } else {
        let lines: Vec<Line> = app.form.buffer.split('\n').map(Line::raw).collect();
        Paragraph::new(lines).scroll((scroll_y, 0))
    };
    f.render_widget(editor.block(block), rows[1]);

    // Modals own the cursor while they are open
    if !app.show_help_modal && !app.show_reset_modal && inner.width > 0 {
        let x = inner.x + (cursor_col as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_line as u16).saturating_sub(scroll_y);
        f.set_cursor_position((x, y));
    }
}

fn draw_review(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(8) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for field in Field::ALL {
        lines.push(field_line(app, field, field == app.form.focus));
        let value = buffer_for(&app.answers, field);
        let summary = if value.trim().is_empty() {
            Span::styled("(sem resposta)", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(truncate_str(value.trim(), width))
        };
        lines.push(Line::from(vec![Span::raw("     "), summary]));
    }

    let answered = app.answers.answered_count();
    let review = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Revisão ")
            .title_bottom(Line::from(format!(" {}/{} respondidas ", answered, FIELD_COUNT)).left_aligned())
            .title_bottom(Line::from(" Enter editar ").right_aligned()),
    );
    f.render_widget(review, area);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let document = app.compiled.document.as_str();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(" Prompt ").left_aligned())
        .title(Line::from(format!(" {} ", app.session_id)).right_aligned());

    let preview = Paragraph::new(document)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));
    f.render_widget(preview, area);

    // Scrollbar - only visible when content exceeds viewport
    let line_count = document.lines().count();
    let viewport = area.height.saturating_sub(2) as usize;
    if line_count > viewport {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state = ScrollbarState::default()
            .content_length(line_count)
            .position(app.preview_scroll as usize)
            .viewport_content_length(viewport);

        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn draw_gauge(f: &mut Frame, app: &App, area: Rect) {
    let percent = app.compiled.completion_percent;
    let color = match percent {
        100 => Color::Green,
        50..=99 => Color::Yellow,
        _ => Color::Red,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Completude "),
        )
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(percent))
        .label(format!(
            "{}% ({}/{})",
            percent,
            app.answers.answered_count(),
            FIELD_COUNT
        ));
    f.render_widget(gauge, area);
}

fn draw_notes(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    if app.compiled.pending_required.is_empty() {
        lines.push(Line::from(Span::styled(
            "Todas as perguntas obrigatórias foram respondidas.",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Pendentes: ", Style::default().fg(Color::Red)),
            Span::raw(app.compiled.pending_required.join(", ")),
        ]));
    }

    for advisory in &app.compiled.advisories {
        lines.push(Line::from(vec![
            Span::styled("! ", Style::default().fg(Color::Yellow)),
            Span::styled(*advisory, Style::default().fg(Color::Yellow)),
        ]));
    }

    let notes = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Sugestões "),
    );
    f.render_widget(notes, area);
}

fn draw_command_bar(f: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.review_mode {
        "[↑/↓] Selecionar  [Enter] Editar  [^Y] Copiar  [F1] Ajuda"
    } else {
        "[Tab] Próxima  [^Y] Copiar  [^R] Revisar  [^L] Limpar  [F1] Ajuda  [Esc] Sair"
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let mut spans = vec![Span::styled(shortcuts, Style::default().fg(Color::DarkGray))];

    if let Some((text, color)) = status_indicator(app) {
        let room = inner_width.saturating_sub(shortcuts.width() + 1);
        let text = truncate_str(&text, room);
        let spacing = inner_width.saturating_sub(shortcuts.width() + text.width());
        spans.push(Span::raw(" ".repeat(spacing)));
        spans.push(Span::styled(text, Style::default().fg(color)));
    }

    let command_panel = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(command_panel, area);
}
