//! Pipeline view: team-grouped agent nodes, job status and live preview.

use crate::state::{format_elapsed, App};
use crate::theme::{completion_color, job_status_color, node_status_color};
use crate::views::two_column;
use crate::widgets::{DetailPanel, ProgressBar, StatusIndicator, TreeItem, TreeStyle, TreeWidget};
use agentwatch_core::progress::artifact_file;
use agentwatch_core::{NodeStatus, ProgressSnapshot};
use agentwatch_events::MonitorSession;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        let detail = DetailPanel {
            title: "Pipeline",
            fields: vec![("Hint", "Press n to submit the configured job".to_string())],
            style: Style::default().fg(app.theme.text_dim),
        };
        detail.render(f, area);
        return;
    };
    let snapshot = session.snapshot();
    let (tree_area, right) = two_column(area, 45);

    let (items, selected) = build_tree(app, snapshot);
    let tree = TreeWidget {
        title: "Agents",
        items: &items,
        selected,
        style: TreeStyle::new(Style::default().bg(app.theme.bg_highlight)),
    };
    tree.render(f, tree_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(right);

    render_status(f, app, session, chunks[0]);

    let gauge = ProgressBar {
        title: "Progress".to_string(),
        completed: snapshot.completed_count(),
        total: snapshot.nodes().len(),
        style: Style::default().fg(completion_color(snapshot.fraction_complete(), &app.theme)),
    };
    gauge.render(f, chunks[1]);

    render_preview(f, app, session, chunks[2]);
}

/// Tree rows plus the row index of the selected node.
fn build_tree(app: &App, snapshot: &ProgressSnapshot) -> (Vec<TreeItem>, Option<usize>) {
    let mut items = Vec::new();
    let mut selected_row = None;
    let mut node_index = 0;
    for (team, nodes) in snapshot.teams() {
        items.push(TreeItem {
            label: team.title().to_string(),
            depth: 0,
            marker: "▾",
            style: Style::default()
                .fg(app.theme.secondary)
                .add_modifier(Modifier::BOLD),
        });
        for node in nodes {
            if app.pipeline_view.selected == Some(node_index) {
                selected_row = Some(items.len());
            }
            let marker = match node.status {
                NodeStatus::Pending => "○",
                NodeStatus::InProgress => "◐",
                NodeStatus::Completed => "●",
            };
            let mut style = Style::default().fg(node_status_color(node.status, &app.theme));
            if snapshot.active() == Some(node.role) {
                style = style.add_modifier(Modifier::BOLD);
            }
            items.push(TreeItem {
                label: node.name().to_string(),
                depth: 1,
                marker,
                style,
            });
            node_index += 1;
        }
    }
    (items, selected_row)
}

fn render_status(f: &mut Frame<'_>, app: &App, session: &MonitorSession, area: Rect) {
    let summary = session.summary();
    let snapshot = session.snapshot();
    let label = Style::default().fg(app.theme.text_dim);
    let active = snapshot
        .active()
        .map(|role| role.display_name().to_string())
        .unwrap_or_else(|| "-".to_string());
    let elapsed = app
        .elapsed_secs()
        .map(format_elapsed)
        .unwrap_or_else(|| "--:--:--".to_string());
    let ticker = if summary.ticker.is_empty() {
        app.config.job.ticker.clone()
    } else {
        summary.ticker.clone()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                summary.status.to_string(),
                Style::default().fg(job_status_color(summary.status, &app.theme)),
            ),
            Span::styled("  Elapsed: ", label),
            Span::raw(elapsed),
        ]),
        Line::from(vec![
            Span::styled("Ticker: ", label),
            Span::raw(ticker),
            Span::styled("  Active: ", label),
            Span::styled(active, Style::default().fg(app.theme.primary)),
        ]),
        Line::from(vec![
            Span::styled("LLM calls: ", label),
            Span::raw(summary.counters.llm_calls.to_string()),
            Span::styled("  Tool calls: ", label),
            Span::raw(summary.counters.tool_calls.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Tokens in/out: ", label),
            Span::raw(format!(
                "{}/{}",
                summary.counters.tokens_in, summary.counters.tokens_out
            )),
            Span::styled("  Events: ", label),
            Span::raw(session.timeline().len().to_string()),
        ]),
    ];
    if let Some(error) = summary.error.as_deref().or(session.last_summary_error()) {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(app.theme.error),
        )));
    }

    let status = StatusIndicator {
        title: "Job".to_string(),
        lines,
        style: Style::default().fg(app.theme.text),
    };
    status.render(f, area);
}

fn render_preview(f: &mut Frame<'_>, app: &App, session: &MonitorSession, area: Rect) {
    let mut fields = Vec::new();

    if let Some(node) = app
        .pipeline_view
        .selected
        .and_then(|i| session.snapshot().nodes().get(i))
    {
        fields.push(("Selected", format!("{} ({})", node.name(), node.status)));
        let topology = session.topology();
        if let (Some(team), Some(position)) =
            (topology.team_of(node.role), topology.position(node.role))
        {
            fields.push((
                "Step",
                format!("{} of {} ({})", position + 1, topology.len(), team.title()),
            ));
        }
        if let Some(file) = artifact_file(node.role) {
            let state = if session.summary().has_report(file) {
                "available"
            } else {
                "not yet"
            };
            fields.push(("Report", format!("{} {}", file, state)));
        }
    }

    let preview = session.snapshot().preview();
    for (label, record) in [
        ("Latest message", &preview.latest_message),
        ("Latest tool", &preview.latest_tool),
        ("Latest report", &preview.latest_report),
    ] {
        if let Some(record) = record {
            fields.push((
                label,
                format!("[{}] {}: {}", record.local_time, record.agent, record.content),
            ));
        }
    }

    let detail = DetailPanel {
        title: "Live Preview",
        fields,
        style: Style::default().fg(app.theme.secondary),
    };
    detail.render(f, area);
}
