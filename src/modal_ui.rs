//! Modal UI rendering functions.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;
use crate::form::ResetModalField;
use crate::templates;
use crate::ui::centered_rect;

/// Draw the reset-confirm modal.
pub fn draw_reset_modal(f: &mut Frame, app: &App) {
    let modal_width: u16 = 54;
    let modal_height: u16 = 9;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let reset_style = if app.reset_modal_focus == ResetModalField::ResetButton {
        Style::default().fg(Color::Black).bg(Color::Red)
    } else {
        Style::default().fg(Color::Red)
    };

    let cancel_style = if app.reset_modal_focus == ResetModalField::CancelButton {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default().fg(Color::White)
    };

    let answered = app.answers.answered_count();
    let content: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::raw(templates::RESET_CONFIRM_TEXT)).centered(),
        Line::from(Span::styled(
            format!("{} resposta(s) serão perdidas.", answered),
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Limpar ", reset_style),
            Span::raw("    "),
            Span::styled(" Cancelar ", cancel_style),
        ])
        .centered(),
    ];

    let modal = Paragraph::new(content).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Limpar respostas ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}

/// Rows of the help screen, built from the fixed key table.
fn help_lines(log_directory: Option<&Path>) -> Vec<Line<'static>> {
    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let key_width = templates::HELP_SECTIONS
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (i, (header, rows)) in templates::HELP_SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!("  {}", header), header_style)));
        for (key, desc) in rows.iter() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("{:<width$}", key, width = key_width), key_style),
                Span::styled(format!("  {}", desc), desc_style),
            ]));
        }
    }
    if let Some(dir) = log_directory {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Logs: ", header_style),
            Span::styled(dir.display().to_string(), desc_style),
        ]));
    }
    lines
}

/// Draw the help modal.
pub fn draw_help_modal(f: &mut Frame, app: &App) {
    let mut content = help_lines(app.log_directory.as_deref());
    let modal_width: u16 = 56;
    let modal_height = content.len() as u16 + 4;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let desc_style = Style::default().fg(Color::DarkGray);
    content.push(Line::from(""));
    content.push(Line::from(Span::styled("F1 ou Esc para fechar", desc_style)).right_aligned());

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Ajuda ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lines_cover_every_key() {
        let rows: usize = templates::HELP_SECTIONS
            .iter()
            .map(|(_, rows)| rows.len())
            .sum();
        let sections = templates::HELP_SECTIONS.len();
        // One header per section, a blank line between sections
        assert_eq!(help_lines(None).len(), rows + sections + sections - 1);
    }

    #[test]
    fn test_help_mentions_copy_shortcut() {
        let text: String = help_lines(None)
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("Ctrl+Y"));
        assert!(text.contains("Ctrl+L"));
    }

    #[test]
    fn test_help_shows_log_directory() {
        let dir = Path::new("/tmp/promptwright-logs");
        let lines = help_lines(Some(dir));
        assert_eq!(lines.len(), help_lines(None).len() + 2);
        let last: String = lines
            .last()
            .unwrap()
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(last, "  Logs: /tmp/promptwright-logs");
    }
}
