use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::api::types::{MarketEvent, MarketSnapshot};
use crate::polling::ViewState;
use crate::ui::chart::price_series;
use crate::ui::format::{format_count, format_number, format_price, format_timestamp, format_usd, status_tone};
use crate::ui::tone_color;

const TITLE: &str = "Market";

pub fn draw(frame: &mut Frame, area: Rect, state: &ViewState<MarketSnapshot>) {
    match state {
        ViewState::Idle | ViewState::Loading => super::draw_loading(frame, area, TITLE),
        ViewState::Error(message) => super::draw_error(frame, area, TITLE, message),
        ViewState::Ready(snapshot) => draw_snapshot(frame, area, snapshot),
    }
}

fn draw_snapshot(frame: &mut Frame, area: Rect, snapshot: &MarketSnapshot) {
    let market = &snapshot.market;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(area);
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let label = Style::default().fg(Color::DarkGray);
    let overview = Paragraph::new(vec![
        Line::from(Span::styled(
            market.description.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Current Price: ", label),
            Span::raw(format_price(market.current_price)),
            Span::styled("   Status: ", label),
            Span::styled(
                market.status.to_string(),
                Style::default().fg(tone_color(status_tone(&market.status))),
            ),
        ]),
        Line::from(vec![
            Span::styled("24h Volume: ", label),
            Span::raw(format_usd(market.volume24h)),
            Span::styled("   24h Trades: ", label),
            Span::raw(format_count(market.trades24h)),
        ]),
        Line::from(vec![
            Span::styled("Open Interest: ", label),
            Span::raw(format_usd(market.open_interest)),
            Span::styled("   Resolves: ", label),
            Span::raw(format_timestamp(&market.resolution_date)),
        ]),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", market.title)),
    );
    frame.render_widget(overview, rows[0]);

    draw_price_chart(frame, lower[0], &snapshot.events);
    draw_events(frame, lower[1], &snapshot.events);
}

fn draw_price_chart(frame: &mut Frame, area: Rect, events: &[MarketEvent]) {
    let series = price_series(events);
    let x_max = (series.yes.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Yes")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&series.yes),
        Dataset::default()
            .name("No")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&series.no),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Price History "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, 1.0])
                .labels(vec![Span::raw("0.00"), Span::raw("0.50"), Span::raw("1.00")]),
        );
    frame.render_widget(chart, area);
}

fn event_item(event: &MarketEvent) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(Span::styled(
            format!("{} - {}", event.event_type, format_price(event.price)),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Amount: {} | {}",
                format_number(event.amount),
                format_timestamp(&event.timestamp)
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn draw_events(frame: &mut Frame, area: Rect, events: &[MarketEvent]) {
    let block = Block::default().borders(Borders::ALL).title(" Recent Events ");
    if events.is_empty() {
        frame.render_widget(Paragraph::new("No events yet").block(block), area);
        return;
    }
    let items: Vec<ListItem> = events.iter().map(event_item).collect();
    frame.render_widget(List::new(items).block(block), area);
}
