#![forbid(unsafe_code)]

//! Host-independent input events.
//!
//! Only the subset of input the modal stack reacts to is modelled: key
//! presses (dismiss key) and pointer presses (click-outside).

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

/// A key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Backspace,
    Char(char),
    F(u8),
}

impl KeyCode {
    /// Parse a key name as used in configuration files.
    ///
    /// Accepts `"escape"`/`"esc"`, `"enter"`, `"tab"`, `"backspace"`, `"f1"`..`"f24"`,
    /// and any single character. Matching is case-insensitive for named keys.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "escape" | "esc" => Some(Self::Escape),
            "enter" | "return" => Some(Self::Enter),
            "tab" => Some(Self::Tab),
            "backspace" => Some(Self::Backspace),
            _ => {
                if let Some(n) = lower.strip_prefix('f')
                    && let Ok(n) = n.parse::<u8>()
                    && (1..=24).contains(&n)
                {
                    return Some(Self::F(n));
                }
                let mut chars = name.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// Whether a key event is a press, repeat, or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain key press without modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the event kind.
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the modifiers.
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// True for initial presses; repeats and releases are excluded.
    #[inline]
    pub fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }
}

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Moved,
}

/// A pointer event in host cell/pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Input event routed to the modal stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<MouseEvent> for Event {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_parse() {
        assert_eq!(KeyCode::from_name("escape"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_name("Esc"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_name("F5"), Some(KeyCode::F(5)));
        assert_eq!(KeyCode::from_name("q"), Some(KeyCode::Char('q')));
        assert_eq!(KeyCode::from_name("f99"), None);
        assert_eq!(KeyCode::from_name("shift-tab"), None);
        assert_eq!(KeyCode::from_name(""), None);
    }

    #[test]
    fn key_event_defaults_to_press() {
        let event = KeyEvent::new(KeyCode::Escape);
        assert!(event.is_press());
        assert!(event.modifiers.is_empty());
        assert!(!event.with_kind(KeyEventKind::Release).is_press());
    }

    #[test]
    fn event_from_conversions() {
        let key: Event = KeyEvent::new(KeyCode::Enter).into();
        assert!(matches!(key, Event::Key(_)));
        let mouse: Event = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 1, 2).into();
        assert!(matches!(mouse, Event::Mouse(MouseEvent { x: 1, y: 2, .. })));
    }
}
