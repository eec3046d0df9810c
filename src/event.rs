//! Event types exchanged with the display connection and the application.
//!
//! [`SeatEvent`] is what the transport delivers, one value per protocol
//! notification. [`InputEvent`] is what the router hands to the
//! application after coalescing and translation.

use crate::focus::SurfaceId;
use crate::keyboard::{KeyEvent, KeyTranslation, ModifierMask};
use crate::pointer::{PointerFragment, PointerSnapshot};
use bitflags::bitflags;
use std::os::fd::OwnedFd;

bitflags! {
    /// Input device classes a seat offers, with the wire bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u32 {
        const POINTER = 1 << 0;
        const KEYBOARD = 1 << 1;
        const TOUCH = 1 << 2;
    }
}

impl Capabilities {
    /// Decode the wire bitmask, dropping unknown bits.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// The seat has a keyboard.
    pub fn has_keyboard(&self) -> bool {
        self.contains(Capabilities::KEYBOARD)
    }

    /// The seat has a pointer.
    pub fn has_pointer(&self) -> bool {
        self.contains(Capabilities::POINTER)
    }

    /// The seat has a touch device.
    pub fn has_touch(&self) -> bool {
        self.contains(Capabilities::TOUCH)
    }
}

/// A seat notification delivered by the display connection.
#[derive(Debug)]
pub enum SeatEvent {
    /// The seat's device classes changed.
    Capabilities(Capabilities),
    /// The seat announced its name.
    Name(String),
    /// A new keymap is available through `fd`.
    Keymap { format: u32, fd: OwnedFd, size: u32 },
    /// Keyboard focus entered `surface` with `keys` already held.
    KeyboardEnter {
        serial: u32,
        surface: SurfaceId,
        keys: Vec<u32>,
    },
    /// Keyboard focus left `surface`.
    KeyboardLeave { serial: u32, surface: SurfaceId },
    /// A key changed state.
    Key {
        serial: u32,
        time: u32,
        key: u32,
        state: u32,
    },
    /// Modifier state changed.
    Modifiers { serial: u32, mask: ModifierMask },
    /// Key repeat parameters.
    RepeatInfo { rate: i32, delay: i32 },
    /// One pointer fragment.
    Pointer(PointerFragment),
    /// End of the current pointer frame.
    PointerFrame,
}

/// A coalesced input event for the application.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum InputEvent {
    /// The seat's device classes changed.
    CapabilitiesChanged(Capabilities),
    /// Keyboard focus arrived; `pressed` lists keys already held.
    FocusEnter {
        surface: SurfaceId,
        pressed: Vec<KeyTranslation>,
    },
    /// Keyboard focus was lost.
    FocusLeave { surface: SurfaceId },
    /// A translated key press or release.
    Key(KeyEvent),
    /// One completed pointer frame.
    Pointer(PointerSnapshot),
}

impl InputEvent {
    /// Check if this is a keyboard event.
    pub fn is_keyboard(&self) -> bool {
        matches!(
            self,
            InputEvent::FocusEnter { .. } | InputEvent::FocusLeave { .. } | InputEvent::Key(_)
        )
    }

    /// Check if this is a pointer event.
    pub fn is_pointer(&self) -> bool {
        matches!(self, InputEvent::Pointer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_from_raw() {
        let caps = Capabilities::from_raw(3);
        assert!(caps.has_pointer());
        assert!(caps.has_keyboard());
        assert!(!caps.has_touch());

        let caps = Capabilities::from_raw(4 | 64);
        assert_eq!(caps, Capabilities::TOUCH);
        assert!(Capabilities::from_raw(0).is_empty());
    }

    #[test]
    fn test_event_classification() {
        assert!(InputEvent::Pointer(PointerSnapshot::default()).is_pointer());
        assert!(!InputEvent::Pointer(PointerSnapshot::default()).is_keyboard());
        assert!(
            InputEvent::FocusLeave {
                surface: SurfaceId(1)
            }
            .is_keyboard()
        );
        assert!(!InputEvent::CapabilitiesChanged(Capabilities::empty()).is_pointer());
    }
}
