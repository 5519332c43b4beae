//! SynthBrute theme and color utilities.

use agentwatch_core::{ActivityKind, JobStatus, NodeStatus};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            text_muted: Color::Rgb(68, 68, 68),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

pub fn node_status_color(status: NodeStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        NodeStatus::Pending => theme.text_muted,
        NodeStatus::InProgress => theme.primary,
        NodeStatus::Completed => theme.success,
    }
}

pub fn activity_kind_color(kind: ActivityKind, theme: &SynthBruteTheme) -> Color {
    match kind {
        ActivityKind::Message => theme.text,
        ActivityKind::Tool => theme.tertiary,
        ActivityKind::Report => theme.success,
        ActivityKind::Status => theme.secondary,
        ActivityKind::Event => theme.text_dim,
    }
}

pub fn job_status_color(status: JobStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        JobStatus::Unknown => theme.text_dim,
        JobStatus::Queued => theme.primary_dim,
        JobStatus::Running => theme.primary,
        JobStatus::Succeeded => theme.success,
        JobStatus::Failed => theme.error,
        JobStatus::Cancelled => theme.warning,
    }
}

/// Completion gauge colour: dim while early, success when done.
pub fn completion_color(fraction: f64, theme: &SynthBruteTheme) -> Color {
    if fraction >= 1.0 {
        theme.success
    } else if fraction >= 0.5 {
        theme.primary
    } else {
        theme.primary_dim
    }
}
