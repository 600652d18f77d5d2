use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    SpeedUp,
    SpeedDown,
    /// Raise the bias threshold: more draws send the bean left.
    LeanLeft,
    LeanRight,
    Reset,
    HelpToggle,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(ev: &InputEvent) -> Option<Action> {
    if matches!(ev.key, KeyCode::Char('c')) && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::TogglePause),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Action::SpeedUp),
        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Down => Some(Action::SpeedDown),
        KeyCode::Char('[') | KeyCode::Left => Some(Action::LeanLeft),
        KeyCode::Char(']') | KeyCode::Right => Some(Action::LeanRight),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reset),
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => Some(Action::HelpToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn arrows_steer_bias_and_speed() {
        assert_eq!(map_event_to_action(&key(KeyCode::Left)), Some(Action::LeanLeft));
        assert_eq!(map_event_to_action(&key(KeyCode::Right)), Some(Action::LeanRight));
        assert_eq!(map_event_to_action(&key(KeyCode::Up)), Some(Action::SpeedUp));
        assert_eq!(map_event_to_action(&key(KeyCode::Down)), Some(Action::SpeedDown));
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        assert_eq!(map_event_to_action(&ev), Some(Action::Quit));
        assert_eq!(map_event_to_action(&key(KeyCode::Char('x'))), None);
    }
}
