//! Timeline view: activity records filtered by kind and stage.

use crate::state::App;
use crate::theme::activity_kind_color;
use crate::views::two_column;
use crate::widgets::{DetailPanel, FilterBar};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let bar = FilterBar {
        filter: &app.timeline_view.filter,
        theme: &app.theme,
    };
    bar.render(f, chunks[0]);

    let (list_area, detail_area) = two_column(chunks[1], 65);
    let records = app.filtered_timeline();
    let items: Vec<ListItem> = records
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", record.local_time),
                    Style::default().fg(app.theme.text_dim),
                ),
                Span::styled(
                    format!("{:<7} ", record.kind.as_str()),
                    Style::default().fg(activity_kind_color(record.kind, &app.theme)),
                ),
                Span::styled(
                    format!("{}: ", record.agent),
                    Style::default().fg(app.theme.secondary),
                ),
                Span::raw(record.content.clone()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.timeline_view.selected.filter(|i| *i < records.len()));
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Activity ({})", records.len()))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight));
    f.render_stateful_widget(list, list_area, &mut state);

    let mut fields = Vec::new();
    if let Some(record) = app.selected_record() {
        fields.push(("Seq", record.seq.to_string()));
        fields.push(("Time", record.local_time.clone()));
        fields.push(("Stage", record.stage.to_string()));
        fields.push(("Agent", record.agent.to_string()));
        fields.push(("Kind", record.kind.to_string()));
        fields.push(("Content", record.content.clone()));
    }
    let detail = DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
    };
    detail.render(f, detail_area);
}
