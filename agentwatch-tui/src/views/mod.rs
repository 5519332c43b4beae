//! View rendering dispatch.

pub mod config;
pub mod pipeline;
pub mod reports;
pub mod timeline;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Pipeline => pipeline::render(f, app, layout[1]),
        View::Timeline => timeline::render(f, app, layout[1]),
        View::Reports => reports::render(f, app, layout[1]),
        View::Config => config::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if let Some(modal) = &app.modal {
        let area = centered(f.size(), 70, 60);
        f.render_widget(Clear, area);
        let body = Paragraph::new(modal.message.clone())
            .block(
                Block::default()
                    .title(modal.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border_focus)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(body, area);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let job = match &app.session {
        Some(session) => {
            let stream = if session.is_closed() { "closed" } else { "live" };
            format!(
                "Job: {} | {} | Stream: {}",
                session.job_id(),
                session.summary().status,
                stream
            )
        }
        None => "No job attached".to_string(),
    };
    let paused = if app.updates_paused {
        format!(" | PAUSED ({} queued)", app.event_queue.len())
    } else {
        String::new()
    };
    let title = format!("AGENTWATCH | {}{}", job, paused);

    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            title,
            Style::default().fg(app.theme.primary),
        )));
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = "Tab switch view • j/k move • Enter open • r refresh • p pause • f/s filter • n new job • ? help • q quit";
    let (text, style) = if let Some(note) = app.notifications.last() {
        let color = match note.level {
            NotificationLevel::Info => app.theme.info,
            NotificationLevel::Warning => app.theme.warning,
            NotificationLevel::Error => app.theme.error,
            NotificationLevel::Success => app.theme.success,
        };
        (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

/// Two-column split of `area`, left column taking `left_percent`.
pub fn two_column(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
