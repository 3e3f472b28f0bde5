//! Server checker view
//!
//! Shows "Loading…" while a resolution runs, the error line when one failed,
//! and otherwise the fetched JSON with a refetch hint.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::pretty_json;
use crate::fetcher::{DataSource, RequestState};

/// Renders the checker for `url` in the given state
pub fn render(frame: &mut Frame, state: &RequestState, url: &str, scroll_offset: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(header(state, url), chunks[0]);
    frame.render_widget(body(state, scroll_offset), chunks[1]);
    frame.render_widget(footer(), chunks[2]);
}

fn header<'a>(state: &RequestState, url: &'a str) -> Paragraph<'a> {
    let source = match state.source {
        Some(DataSource::Cache) => Span::styled("cache", Style::default().fg(Color::Green)),
        Some(DataSource::Network) => Span::styled("network", Style::default().fg(Color::Cyan)),
        None => Span::styled("-", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![
        Span::styled(url, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  from "),
        source,
    ]);

    Paragraph::new(line).block(
        Block::default()
            .title(" cachedfetch ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
}

fn body(state: &RequestState, scroll_offset: u16) -> Paragraph<'static> {
    let block = Block::default().borders(Borders::ALL);

    if state.loading {
        return Paragraph::new(Span::styled(
            "Loading…",
            Style::default().fg(Color::Cyan),
        ))
        .block(block);
    }

    if let Some(error) = &state.error {
        return Paragraph::new(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ))
        .block(block);
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Fetched Data:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(data) = &state.data {
        lines.extend(pretty_json(data).lines().map(|l| Line::from(l.to_string())));
    }

    Paragraph::new(lines).block(block).scroll((scroll_offset, 0))
}

fn footer() -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled("[r]", Style::default().fg(Color::Yellow)),
        Span::raw(" Refetch  "),
        Span::styled("[?]", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("[q]", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]))
}
