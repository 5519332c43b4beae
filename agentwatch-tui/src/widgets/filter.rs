//! Timeline filter: the kind/stage selection and the chip rows that show it.

use crate::theme::SynthBruteTheme;
use agentwatch_core::{ActivityKind, ActivityRecord, Stage};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde::{Deserialize, Serialize};

/// Which timeline records are shown. `None` on an axis lets everything through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineFilter {
    #[serde(default)]
    pub kind: Option<ActivityKind>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

impl TimelineFilter {
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.kind.map_or(true, |k| record.kind == k)
            && self.stage.map_or(true, |s| record.stage == s)
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.stage.is_none()
    }

    /// all → message → tool → ... → event → all
    pub fn cycle_kind(&mut self) {
        self.kind = next_choice(self.kind, ActivityKind::all());
    }

    /// all → analysts → research → ... → final → all
    pub fn cycle_stage(&mut self) {
        self.stage = next_choice(self.stage, Stage::all());
    }
}

fn next_choice<T: Copy + PartialEq>(current: Option<T>, choices: &[T]) -> Option<T> {
    match current {
        None => choices.first().copied(),
        Some(value) => choices
            .iter()
            .position(|c| *c == value)
            .and_then(|i| choices.get(i + 1).copied()),
    }
}

/// Two chip rows, kinds then stages, with the selected chip highlighted.
pub struct FilterBar<'a> {
    pub filter: &'a TimelineFilter,
    pub theme: &'a SynthBruteTheme,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let kinds: Vec<&str> = ActivityKind::all().iter().map(|k| k.as_str()).collect();
        let stages: Vec<&str> = Stage::all().iter().map(|s| s.as_str()).collect();
        let lines = vec![
            self.chip_row("kind  [f]", &kinds, self.filter.kind.map(|k| k.as_str())),
            self.chip_row("stage [s]", &stages, self.filter.stage.map(|s| s.as_str())),
        ];

        let title = if self.filter.is_empty() {
            "Filter"
        } else {
            "Filter (active)"
        };
        let paragraph =
            Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn chip_row(
        &self,
        label: &'static str,
        choices: &[&str],
        selected: Option<&str>,
    ) -> Line<'static> {
        let on = Style::default()
            .fg(self.theme.bg)
            .bg(self.theme.primary)
            .add_modifier(Modifier::BOLD);
        let off = Style::default().fg(self.theme.text_dim);

        let mut spans = vec![Span::styled(
            format!("{} ", label),
            Style::default().fg(self.theme.secondary),
        )];
        spans.push(Span::styled(" all ", if selected.is_none() { on } else { off }));
        for choice in choices {
            let style = if selected == Some(*choice) { on } else { off };
            spans.push(Span::styled(format!(" {} ", choice), style));
        }
        Line::from(spans)
    }
}
