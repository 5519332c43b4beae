//! Reports view: reports, run artifacts and archived files of the attached job.

use crate::realtime::{FileContent, FileEntry};
use crate::state::App;
use crate::views::two_column;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (list_area, body_area) = two_column(area, 35);
    let entries = app.file_entries();

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let (tag, color) = match entry {
                FileEntry::Report(_) => ("report  ", app.theme.success),
                FileEntry::Artifact(_) => ("artifact", app.theme.tertiary),
                FileEntry::Archive(_) => ("archive ", app.theme.text_dim),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", tag), Style::default().fg(color)),
                Span::raw(entry.name().to_string()),
            ]))
        })
        .collect();

    let title = match app.archive_dir() {
        Some(dir) => format!("Files ({})", dir),
        None => "Files".to_string(),
    };

    let mut state = ListState::default();
    state.select(app.reports_view.selected.filter(|i| *i < entries.len()));
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(app.theme.bg_highlight));
    f.render_stateful_widget(list, list_area, &mut state);

    let (title, text) = match (&app.reports_view.loading, &app.reports_view.loaded) {
        (Some(name), _) => (name.clone(), "Loading...".to_string()),
        (None, Some(file)) => (
            format!("{} ({} bytes)", file.name, file.content.size()),
            match &file.content {
                FileContent::Text(text) => text.clone(),
                FileContent::Binary { size, content_type } => format!(
                    "Binary file, not previewed.\n\nSize: {} bytes\nType: {}",
                    size,
                    content_type.as_deref().unwrap_or("unknown")
                ),
            },
        ),
        (None, None) => (
            "Preview".to_string(),
            "Select a file and press Enter".to_string(),
        ),
    };
    let body = Paragraph::new(text)
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false });
    f.render_widget(body, body_area);
}
