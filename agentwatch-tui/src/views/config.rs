//! Configuration viewer.

use crate::state::App;
use ratatui::{
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let config_text = Paragraph::new(app.config_view.content.clone())
        .block(Block::default().title("Config").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(config_text, area);
}
