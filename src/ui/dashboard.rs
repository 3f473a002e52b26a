use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::api::types::DashboardStats;
use crate::polling::ViewState;
use crate::ui::format::{format_count, format_usd};

const TITLE: &str = "Dashboard";

/// Card label and display value, in display order.
pub fn stat_cards(stats: &DashboardStats) -> [(&'static str, String); 4] {
    [
        ("Total Markets", format_count(stats.total_markets)),
        ("Active Markets", format_count(stats.active_markets)),
        ("Total Volume", format_usd(stats.total_volume)),
        ("Total Trades", format_count(stats.total_trades)),
    ]
}

pub fn draw(frame: &mut Frame, area: Rect, state: &ViewState<DashboardStats>) {
    match state {
        ViewState::Loading => super::draw_loading(frame, area, TITLE),
        ViewState::Error(message) => super::draw_error(frame, area, TITLE, message),
        ViewState::Idle => super::draw_error(frame, area, TITLE, "No data available"),
        ViewState::Ready(stats) => draw_stats(frame, area, stats),
    }
}

fn draw_stats(frame: &mut Frame, area: Rect, stats: &DashboardStats) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    for ((label, value), card_area) in stat_cards(stats).into_iter().zip(cards.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(card, *card_area);
    }

    // Ratio only; activeMarkets <= totalMarkets is the backend's promise.
    let ratio = if stats.total_markets == 0 {
        0.0
    } else {
        (stats.active_markets as f64 / stats.total_markets as f64).clamp(0.0, 1.0)
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Trading Activity "),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!(
            "{} of {} markets active",
            format_count(stats.active_markets),
            format_count(stats.total_markets)
        ));
    frame.render_widget(gauge, rows[1]);
}
