use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::settings::{FieldKind, SettingsField, SettingsForm, Severity};

fn field_line(form: &SettingsForm, field: SettingsField) -> Line<'static> {
    let selected = form.selected_field() == field;
    let enabled = form.draft.is_enabled(field);

    let value = match form.edit_buffer() {
        Some(buffer) if selected => {
            let shown = if field.kind() == FieldKind::Secret {
                "•".repeat(buffer.chars().count())
            } else {
                buffer.to_string()
            };
            format!("{}▏", shown)
        }
        _ => form.draft.display_value(field),
    };

    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray).add_modifier(Modifier::DIM);
    }
    if selected {
        style = style.fg(Color::Black).bg(Color::Cyan);
    }

    let marker = if selected { "> " } else { "  " };
    Line::from(vec![
        Span::styled(format!("{}{}: ", marker, field.label()), style),
        Span::styled(value, style.add_modifier(Modifier::BOLD)),
    ])
}

pub fn form_lines(form: &SettingsForm) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut section = "";
    for field in SettingsField::ALL {
        if field.section() != section {
            if !section.is_empty() {
                lines.push(Line::from(""));
            }
            section = field.section();
            lines.push(Line::from(Span::styled(
                section,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(field_line(form, field));
    }

    let warnings = form.warnings();
    if !warnings.is_empty() {
        lines.push(Line::from(""));
        for issue in warnings {
            lines.push(Line::from(Span::styled(
                format!("! {}", issue),
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    lines
}

pub fn draw(frame: &mut Frame, area: Rect, form: &SettingsForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let body = Paragraph::new(form_lines(form))
        .block(Block::default().borders(Borders::ALL).title(" Bot Settings "));
    frame.render_widget(body, chunks[0]);

    let (text, color) = if form.is_saving() {
        ("Saving...".to_string(), Color::Yellow)
    } else if let Some(notification) = form.notification() {
        let color = match notification.severity {
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        (notification.message.clone(), color)
    } else {
        ("Press s to save settings".to_string(), Color::DarkGray)
    };

    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[1]);
}
