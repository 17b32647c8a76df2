#![forbid(unsafe_code)]

//! Input events delivered to a [`Document`](crate::dom::Document).

use bitflags::bitflags;

use crate::dom::ElementId;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    /// Shift+Tab as reported by terminals that fold the modifier into the code.
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Press or auto-repeat; releases are not keydowns.
    #[must_use]
    pub const fn is_keydown(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Tab in either direction.
    #[must_use]
    pub const fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
    }

    /// Whether a Tab should move focus backwards.
    #[must_use]
    pub fn is_reverse_tab(&self) -> bool {
        self.code == KeyCode::BackTab
            || (self.code == KeyCode::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Events a document understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Primary-button click on an element; bubbles towards the root.
    Click(ElementId),
}
