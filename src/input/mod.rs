//! Input translation for an embedded view.
//!
//! The router turns discrete embedder input calls into engine-directed
//! [`InputEvent`] messages. It carries only the state the wire format needs
//! between calls: the modifier bitmask and the last known cursor position
//! (wheel and button events are delivered relative to the last mouse
//! position). Double-click detection, drag initiation, and IME composition
//! all belong to the rendering engine.
//!
//! # Example
//!
//! ```rust
//! use webview_embed::input::{InputEvent, InputRouter};
//!
//! let mut router = InputRouter::new();
//! router.mouse_moved(120, 80);
//! let event = router.mouse_button(0, true).unwrap();
//! assert!(matches!(event, InputEvent::MouseButton { x: 120, y: 80, .. }));
//! ```

use thiserror::Error;

/// Modifier key bitmask carried on key events and tracked across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u32);

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers(0);
    /// Shift key.
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    /// Control key.
    pub const CONTROL: Modifiers = Modifiers(1 << 1);
    /// Alt key (Option on Mac).
    pub const ALT: Modifiers = Modifiers(1 << 2);
    /// Meta key (Windows key / Command on Mac).
    pub const META: Modifiers = Modifiers(1 << 3);

    /// Builds a mask from raw bits, dropping unknown bits.
    pub fn from_bits_truncate(bits: u32) -> Self {
        Modifiers(bits & (Self::SHIFT.0 | Self::CONTROL.0 | Self::ALT.0 | Self::META.0))
    }

    /// Returns the raw bitmask.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in this mask.
    pub fn contains(&self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no modifier is held.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

/// Represents the different mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button (primary).
    Left,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (secondary/context menu).
    Right,
}

impl MouseButton {
    /// Maps an embedder button id to a button, if recognized.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }

    /// Returns the wire-level button code.
    pub fn button_code(&self) -> u32 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Middle => write!(f, "middle"),
            MouseButton::Right => write!(f, "right"),
        }
    }
}

/// An engine-directed input message.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The cursor moved to a position in container coordinates.
    MouseMove {
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
    /// A button changed state at the last known cursor position.
    MouseButton {
        button: MouseButton,
        down: bool,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
    /// Scroll wheel movement at the last known cursor position.
    MouseWheel {
        delta_x: i32,
        delta_y: i32,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
    /// Committed text, post-IME.
    Text { text: String },
    /// A raw key transition.
    Key {
        pressed: bool,
        modifiers: Modifiers,
        virtual_key: i32,
        scan_code: i32,
    },
}

/// Errors that can occur while translating input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The embedder passed a button id with no wire mapping.
    #[error("unrecognized mouse button id {0}")]
    UnknownButton(u32),
}

/// Translates embedder input calls into [`InputEvent`]s.
///
/// Stateless apart from the modifier mask and the last cursor position. The
/// router never talks to a render host itself; the session forwards the
/// returned events to whichever host is currently bound (or drops them when
/// none is).
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    modifiers: Modifiers,
    cursor_x: i32,
    cursor_y: i32,
}

impl InputRouter {
    /// Creates a router with no modifiers held and the cursor at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the new cursor position and produces a move event.
    pub fn mouse_moved(&mut self, x: i32, y: i32) -> InputEvent {
        self.cursor_x = x;
        self.cursor_y = y;
        InputEvent::MouseMove {
            x,
            y,
            modifiers: self.modifiers,
        }
    }

    /// Produces a button event at the last known cursor position.
    pub fn mouse_button(&self, button_id: u32, down: bool) -> Result<InputEvent, InputError> {
        let button = MouseButton::from_id(button_id).ok_or(InputError::UnknownButton(button_id))?;
        Ok(InputEvent::MouseButton {
            button,
            down,
            x: self.cursor_x,
            y: self.cursor_y,
            modifiers: self.modifiers,
        })
    }

    /// Produces a wheel event at the last known cursor position.
    pub fn mouse_wheel(&self, delta_x: i32, delta_y: i32) -> InputEvent {
        InputEvent::MouseWheel {
            delta_x,
            delta_y,
            x: self.cursor_x,
            y: self.cursor_y,
            modifiers: self.modifiers,
        }
    }

    /// Produces a committed-text event. The text is forwarded verbatim.
    pub fn text_event(&self, text: impl Into<String>) -> InputEvent {
        InputEvent::Text { text: text.into() }
    }

    /// Updates the tracked modifier mask and produces a raw key event.
    pub fn key_event(
        &mut self,
        pressed: bool,
        modifiers: Modifiers,
        virtual_key: i32,
        scan_code: i32,
    ) -> InputEvent {
        self.modifiers = modifiers;
        InputEvent::Key {
            pressed,
            modifiers,
            virtual_key,
            scan_code,
        }
    }

    /// Last known cursor position.
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Currently held modifier mask.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_mask_ops() {
        let mask = Modifiers::SHIFT | Modifiers::CONTROL;
        assert!(mask.contains(Modifiers::SHIFT));
        assert!(mask.contains(Modifiers::CONTROL));
        assert!(!mask.contains(Modifiers::ALT));
        assert_eq!(Modifiers::from_bits_truncate(0xFFFF_FFFF).bits(), 0b1111);
        assert!(Modifiers::NONE.is_empty());
    }

    #[test]
    fn test_mouse_button_mapping() {
        assert_eq!(MouseButton::from_id(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_id(1), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_id(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_id(7), None);
    }

    #[test]
    fn test_button_uses_last_cursor_position() {
        let mut router = InputRouter::new();
        router.mouse_moved(42, 17);

        let event = router.mouse_button(2, true).unwrap();
        assert_eq!(
            event,
            InputEvent::MouseButton {
                button: MouseButton::Right,
                down: true,
                x: 42,
                y: 17,
                modifiers: Modifiers::NONE,
            }
        );

        let wheel = router.mouse_wheel(0, -120);
        assert!(matches!(wheel, InputEvent::MouseWheel { x: 42, y: 17, .. }));
    }

    #[test]
    fn test_unknown_button_is_an_error() {
        let router = InputRouter::new();
        assert_eq!(
            router.mouse_button(9, false),
            Err(InputError::UnknownButton(9))
        );
    }

    #[test]
    fn test_key_event_updates_modifier_state() {
        let mut router = InputRouter::new();
        router.key_event(true, Modifiers::CONTROL, 0x41, 30);
        assert_eq!(router.modifiers(), Modifiers::CONTROL);

        // Subsequent mouse events carry the held modifiers.
        let event = router.mouse_moved(5, 5);
        assert!(matches!(
            event,
            InputEvent::MouseMove { modifiers, .. } if modifiers == Modifiers::CONTROL
        ));

        router.key_event(false, Modifiers::NONE, 0x41, 30);
        assert!(router.modifiers().is_empty());
    }

    #[test]
    fn test_text_event_is_verbatim() {
        let router = InputRouter::new();
        let event = router.text_event("héllo☃");
        assert_eq!(
            event,
            InputEvent::Text {
                text: "héllo☃".to_string()
            }
        );
    }
}
