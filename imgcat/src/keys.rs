// ABOUTME: Maps crossterm terminal events onto navigation events
// ABOUTME: Only key presses and resizes matter to the viewer

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use imgcat_core::{Event, Key};

pub fn map_key(key: &KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Char('q') => Key::Quit,
        KeyCode::Char('j') | KeyCode::Down => Key::Next,
        KeyCode::Char('k') | KeyCode::Up => Key::Previous,
        _ => Key::Other,
    }
}

/// Translate a terminal event; `None` for events the viewer ignores
pub fn translate(event: TermEvent) -> Option<Event> {
    match event {
        // Release and repeat events would double every step on some platforms
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(map_key(&key))),
        TermEvent::Resize(_, rows) => Some(Event::Resize { rows }),
        _ => None,
    }
}
