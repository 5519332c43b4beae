//! Grouped tree widget: team headers with their agent nodes beneath.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

#[derive(Debug, Clone)]
pub struct TreeItem {
    pub label: String,
    pub depth: usize,
    pub marker: &'static str,
    pub style: Style,
}

#[derive(Debug, Clone)]
pub struct TreeStyle {
    pub selected: Style,
}

impl TreeStyle {
    pub fn new(selected: Style) -> Self {
        Self { selected }
    }
}

pub struct TreeWidget<'a> {
    pub title: &'a str,
    pub items: &'a [TreeItem],
    pub selected: Option<usize>,
    pub style: TreeStyle,
}

impl<'a> TreeWidget<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let indent = "  ".repeat(item.depth);
                ListItem::new(Line::from(Span::styled(
                    format!("{}{} {}", indent, item.marker, item.label),
                    item.style,
                )))
            })
            .collect();

        let list = List::new(rows)
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .highlight_style(self.style.selected);

        let mut state = ListState::default();
        state.select(self.selected);
        f.render_stateful_widget(list, area, &mut state);
    }
}
