use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Token prompt shown after the session expired. The input is masked.
pub fn draw(frame: &mut Frame, area: Rect, input: &str) {
    let masked = "•".repeat(input.chars().count());
    let text = vec![
        Line::from("Your session has expired or no API token is set."),
        Line::from("Paste an API token and press Enter to sign in."),
        Line::from(""),
        Line::from(vec![
            Span::styled("Token: ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}▏", masked), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let login = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Login "));
    frame.render_widget(login, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_token_is_masked() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|frame| draw(frame, frame.area(), "secret"))
            .unwrap();
        let text = buffer_text(terminal.backend());

        assert!(text.contains("••••••"));
        assert!(!text.contains("secret"));
    }
}
