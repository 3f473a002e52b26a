//! Terminal rendering. Each screen module draws from its view's current state.

pub mod chart;
pub mod dashboard;
pub mod format;
pub mod login;
pub mod market_detail;
pub mod markets;
pub mod pagination;
pub mod settings;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::types::HealthStatus;
use crate::app::{App, Screen};
use crate::polling::ViewState;
use format::StatusTone;

pub fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Success => Color::Green,
        StatusTone::Info => Color::Cyan,
        StatusTone::Error => Color::Red,
        StatusTone::Default => Color::Gray,
    }
}

pub fn draw_loading(frame: &mut Frame, area: Rect, title: &str) {
    let loading = Paragraph::new("Loading...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(loading, area);
}

pub fn draw_error(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let error = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(error, area);
}

/// Draw the main UI layout
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Screen
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match app.screen() {
        Screen::Dashboard(view) => dashboard::draw(frame, chunks[1], &view.state()),
        Screen::Markets(view) => markets::draw(frame, chunks[1], view),
        Screen::MarketDetail(view) => market_detail::draw(frame, chunks[1], &view.state()),
        Screen::Settings(form) => settings::draw(frame, chunks[1], form),
        Screen::Login => login::draw(frame, chunks[1], app.login_input()),
        Screen::NotFound => {
            let text = format!("404: Page not found ({})", app.route().path());
            draw_error(frame, chunks[1], "Not Found", &text);
        }
    }

    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (health, color) = match app.health() {
        ViewState::Ready(HealthStatus::Ok) => ("ok", Color::Green),
        ViewState::Ready(HealthStatus::Degraded) => ("degraded", Color::Yellow),
        ViewState::Error(_) => ("unreachable", Color::Red),
        ViewState::Idle | ViewState::Loading => ("checking", Color::Gray),
    };

    let header_text = format!(
        " {} | API: {} | {}",
        app.route().title(),
        health,
        app.route().full_path(app.base_path())
    );

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" Polybot Dashboard "));

    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.screen() {
        Screen::Markets(_) => "j/k=select enter=open n/p=page r=rows esc=back",
        Screen::MarketDetail(_) => "esc=back",
        Screen::Settings(form) if form.is_editing() => "type to edit enter=apply esc=cancel",
        Screen::Settings(_) => "j/k=field enter=edit/toggle s=save x=dismiss",
        Screen::Login => "paste token enter=sign in esc=cancel",
        _ => "",
    };

    let nav = "1=dashboard 2=markets 3=settings q=quit";
    let footer_text = match app.status_message() {
        Some(status) => format!(" {} | {}", status, nav),
        None if hints.is_empty() => format!(" {}", nav),
        None => format!(" {} | {}", hints, nav),
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

#[cfg(test)]
pub(crate) fn buffer_text(backend: &ratatui::backend::TestBackend) -> String {
    backend
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}
