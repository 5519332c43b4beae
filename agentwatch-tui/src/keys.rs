//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    Open,
    Close,
    Refresh,
    PauseUpdates,
    CycleKindFilter,
    CycleStageFilter,
    NewJob,
    OpenHelp,
}

pub fn map_key(event: KeyEvent) -> Option<KeyAction> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            KeyCode::Char('r') => Some(KeyAction::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Char('?') => Some(KeyAction::OpenHelp),
        KeyCode::Char('p') => Some(KeyAction::PauseUpdates),
        KeyCode::Char('r') => Some(KeyAction::Refresh),
        KeyCode::Char('f') => Some(KeyAction::CycleKindFilter),
        KeyCode::Char('s') => Some(KeyAction::CycleStageFilter),
        KeyCode::Char('n') => Some(KeyAction::NewJob),
        KeyCode::Enter => Some(KeyAction::Open),
        KeyCode::Esc => Some(KeyAction::Close),
        KeyCode::Tab => Some(KeyAction::NextView),
        KeyCode::BackTab => Some(KeyAction::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::MoveDown),
        KeyCode::Char(c @ '1'..='4') => Some(KeyAction::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

/// Help text shown in the keybinding modal.
pub const HELP_TEXT: &str = "q quit | Tab/Shift-Tab or 1-4 switch view | j/k move | Enter open | \
Esc close | r refresh summary | p pause | f/s filter timeline by kind/stage | n new job";
