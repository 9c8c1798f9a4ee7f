use crate::abi::{EventKind, NO_CHAR, modifiers};

use super::ListenerKind;

/// Key fields shared by key-down and key-up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyPayload {
    /// Platform key code (`KeyboardEvent.which`).
    pub code: u32,
    /// The key's character, when the key value is a single character.
    pub chr: Option<char>,
    /// [`modifiers`] bit flags.
    pub flags: u32,
}

/// What the guest's `event_loop_cb` receives.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GuestEvent {
    Destroyed,
    AnimationFrame,
    MouseMove { x: i32, y: i32 },
    KeyDown(KeyPayload),
    KeyUp(KeyPayload),
}

impl GuestEvent {
    /// `(kind, arg0, arg1, arg2)` as passed to `event_loop_cb`.
    pub fn encode(&self) -> (u32, u32, u32, u32) {
        match *self {
            GuestEvent::Destroyed => (EventKind::Destroyed as u32, 0, 0, 0),
            GuestEvent::AnimationFrame => (EventKind::AnimationFrame as u32, 0, 0, 0),
            GuestEvent::MouseMove { x, y } => (EventKind::MouseMove as u32, x as u32, y as u32, 0),
            GuestEvent::KeyDown(key) => (
                EventKind::KeyDown as u32,
                key.code,
                char_word(key.chr),
                key.flags,
            ),
            GuestEvent::KeyUp(key) => (
                EventKind::KeyUp as u32,
                key.code,
                char_word(key.chr),
                key.flags,
            ),
        }
    }

    /// Translate a window event into what its subscribers receive.
    pub fn from_input(input: &InputEvent) -> Self {
        match input {
            InputEvent::MouseMove { page_x, page_y } => GuestEvent::MouseMove {
                x: *page_x,
                y: *page_y,
            },
            InputEvent::KeyDown(event) => GuestEvent::KeyDown(event.payload()),
            InputEvent::KeyUp(event) => GuestEvent::KeyUp(event.payload()),
        }
    }
}

fn char_word(chr: Option<char>) -> u32 {
    chr.map_or(NO_CHAR, u32::from)
}

/// A keyboard event as the window reports it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyboardEvent {
    /// Platform key code, e.g. 65 for 'A', 9 for Tab.
    pub which: u32,
    /// Key value: the produced character (`"a"`, `"A"`) or a key name (`"Tab"`, `"Shift"`).
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyboardEvent {
    pub fn new(which: u32, key: impl Into<String>) -> Self {
        Self {
            which,
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.shift {
            flags |= modifiers::SHIFT;
        }
        if self.ctrl {
            flags |= modifiers::CONTROL;
        }
        if self.alt {
            flags |= modifiers::ALT;
        }
        flags
    }

    /// The single character this key produced, if any. Named keys yield `None`.
    ///
    /// Counts Unicode scalars, not UTF-16 units: a key value outside the BMP, such as "𝄞",
    /// yields its code point where a browser `key.length === 1` test would report no char.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn payload(&self) -> KeyPayload {
        KeyPayload {
            code: self.which,
            chr: self.single_char(),
            flags: self.flags(),
        }
    }
}

/// An event raised by the window, before routing to sessions.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    MouseMove { page_x: i32, page_y: i32 },
    KeyDown(KeyboardEvent),
    KeyUp(KeyboardEvent),
}

impl InputEvent {
    pub fn listener(&self) -> ListenerKind {
        match self {
            InputEvent::MouseMove { .. } => ListenerKind::PointerMove,
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => ListenerKind::Keyboard,
        }
    }
}
