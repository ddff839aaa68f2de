/// Keyboard and mouse input.
///
/// The cave is a step-per-press game: every Press (or terminal auto-repeat)
/// of a movement key becomes one `Action::Move`. Held keys are not tracked;
/// presses that arrive while the caveman is walking are dropped by the
/// session, not queued here.
///
///   Arrows / WASD / HJKL        →  Move
///   Enter / Space / left click  →  Trigger (enter the cave, play again)
///   Esc / Q / Ctrl+C            →  Quit

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};

use crate::domain::player::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Trigger,
    Quit,
}

pub struct InputState {
    /// Actions collected during the most recent `drain_events()`.
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            actions: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the session is driven.
    pub fn drain_events(&mut self) {
        self.actions.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(ev) = event::read() else { break };
            if let Some(action) = map_event(&ev) {
                self.actions.push(action);
            }
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn quit_requested(&self) -> bool {
        self.actions.contains(&Action::Quit)
    }
}

fn map_event(ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Action::Trigger),
            _ => None,
        },
        _ => None,
    }
}

/// Translate one key event. Releases never produce an action.
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Up => Action::Move(Direction::Up),
        KeyCode::Down => Action::Move(Direction::Down),
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Enter => Action::Trigger,
        KeyCode::Esc => Action::Quit,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' | 'k' => Action::Move(Direction::Up),
            's' | 'j' => Action::Move(Direction::Down),
            'a' | 'h' => Action::Move(Direction::Left),
            'd' | 'l' => Action::Move(Direction::Right),
            ' ' => Action::Trigger,
            'q' => Action::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(action)
}
