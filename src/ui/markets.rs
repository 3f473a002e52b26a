use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::types::Market;
use crate::polling::ViewState;
use crate::ui::format::{format_date, format_usd, status_tone};
use crate::ui::pagination::Paginator;
use crate::ui::tone_color;
use crate::views::MarketsView;

const TITLE: &str = "Markets";

pub fn draw(frame: &mut Frame, area: Rect, view: &MarketsView) {
    match view.state() {
        ViewState::Idle | ViewState::Loading => super::draw_loading(frame, area, TITLE),
        ViewState::Error(message) => super::draw_error(frame, area, TITLE, &message),
        ViewState::Ready(markets) => {
            draw_table(frame, area, &markets, &view.pager, view.selected_row())
        }
    }
}

fn market_row(market: &Market) -> Row<'static> {
    let tone = status_tone(&market.status);
    Row::new(vec![
        Cell::from(market.title.clone()),
        Cell::from(format_usd(market.volume)),
        Cell::from(Span::styled(
            market.status.to_string(),
            Style::default().fg(tone_color(tone)),
        )),
        Cell::from(market.resolution_label().to_string()),
        Cell::from(format_date(&market.end_date)),
    ])
}

pub fn draw_table(
    frame: &mut Frame,
    area: Rect,
    markets: &[Market],
    pager: &Paginator,
    selected: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let header = Row::new(vec!["Title", "Volume", "Status", "Resolution", "End Date"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = pager.slice(markets).iter().map(market_row).collect();
    let widths = [
        Constraint::Min(30),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", TITLE)))
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !markets.is_empty() {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let footer = Paragraph::new(format!(
        " Rows per page: {}   {}",
        pager.rows_per_page(),
        pager.label(markets.len())
    ));
    frame.render_widget(footer, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::market_fixture;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn markets() -> Vec<Market> {
        (0..23)
            .map(|i| serde_json::from_value(market_fixture(i)).unwrap())
            .collect()
    }

    fn render(pager: &Paginator) -> String {
        let markets = markets();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| draw_table(frame, frame.area(), &markets, pager, 0))
            .unwrap();
        buffer_text(terminal.backend())
    }

    #[test]
    fn test_first_page() {
        let text = render(&Paginator::new(10));

        assert!(text.contains("Market 0 "));
        assert!(text.contains("Market 9 "));
        assert!(!text.contains("Market 10 "));
        assert!(text.contains("1–10 of 23"));
        assert!(text.contains("Pending"));
        assert!(text.contains("$9,000"));
    }

    #[test]
    fn test_last_page() {
        let mut pager = Paginator::new(10);
        pager.set_page(2);
        let text = render(&pager);

        assert!(text.contains("Market 20"));
        assert!(text.contains("Market 22"));
        assert!(!text.contains("Market 19"));
        assert!(text.contains("21–23 of 23"));
    }
}
