//! Input focus tracking.
//!
//! Focus is a relation, not ownership: the tracker only stores surface ids.
//! A focused id that is no longer in the surface table reads as "no focus".

use std::collections::HashSet;
use std::fmt;

/// Identifier of a surface known to the display connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Keyboard and pointer focus for one seat.
#[derive(Debug, Default)]
pub struct FocusTracker {
    surfaces: HashSet<SurfaceId>,
    keyboard: Option<SurfaceId>,
    pointer: Option<SurfaceId>,
}

impl FocusTracker {
    /// Create a tracker with no known surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `surface` eligible for focus.
    pub fn register_surface(&mut self, surface: SurfaceId) {
        self.surfaces.insert(surface);
    }

    /// Forget `surface`. Focus pointing at it reads as empty from now on.
    pub fn unregister_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface);
    }

    /// Whether `surface` is in the table.
    pub fn is_registered(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains(&surface)
    }

    /// Keyboard focus moved to `surface`.
    pub fn keyboard_enter(&mut self, surface: SurfaceId) {
        self.keyboard = Some(surface);
    }

    /// Keyboard focus was lost.
    pub fn keyboard_leave(&mut self) -> Option<SurfaceId> {
        self.keyboard.take()
    }

    /// Pointer entered `surface`.
    pub fn pointer_enter(&mut self, surface: SurfaceId) {
        self.pointer = Some(surface);
    }

    /// Pointer left its surface.
    pub fn pointer_leave(&mut self) -> Option<SurfaceId> {
        self.pointer.take()
    }

    /// The surface holding keyboard focus, if it is still known.
    pub fn keyboard_focus(&self) -> Option<SurfaceId> {
        self.keyboard.filter(|s| self.surfaces.contains(s))
    }

    /// The surface under the pointer, if it is still known.
    pub fn pointer_focus(&self) -> Option<SurfaceId> {
        self.pointer.filter(|s| self.surfaces.contains(s))
    }

    /// Drop both focus slots, keeping the surface table.
    pub fn clear(&mut self) {
        self.keyboard = None;
        self.pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_focus_lifecycle() {
        let mut focus = FocusTracker::new();
        let s = SurfaceId(3);
        focus.register_surface(s);

        assert_eq!(focus.keyboard_focus(), None);
        focus.keyboard_enter(s);
        assert_eq!(focus.keyboard_focus(), Some(s));
        assert_eq!(focus.keyboard_leave(), Some(s));
        assert_eq!(focus.keyboard_focus(), None);
        assert_eq!(focus.keyboard_leave(), None);
    }

    #[test]
    fn test_unknown_surface_reads_as_no_focus() {
        let mut focus = FocusTracker::new();
        focus.keyboard_enter(SurfaceId(1));
        focus.pointer_enter(SurfaceId(1));
        assert_eq!(focus.keyboard_focus(), None);
        assert_eq!(focus.pointer_focus(), None);

        focus.register_surface(SurfaceId(1));
        assert_eq!(focus.pointer_focus(), Some(SurfaceId(1)));

        focus.unregister_surface(SurfaceId(1));
        assert!(!focus.is_registered(SurfaceId(1)));
        assert_eq!(focus.keyboard_focus(), None);
    }

    #[test]
    fn test_keyboard_and_pointer_independent() {
        let mut focus = FocusTracker::new();
        focus.register_surface(SurfaceId(1));
        focus.register_surface(SurfaceId(2));
        focus.keyboard_enter(SurfaceId(1));
        focus.pointer_enter(SurfaceId(2));
        assert_eq!(focus.keyboard_focus(), Some(SurfaceId(1)));
        assert_eq!(focus.pointer_focus(), Some(SurfaceId(2)));

        focus.pointer_leave();
        assert_eq!(focus.keyboard_focus(), Some(SurfaceId(1)));

        focus.clear();
        assert_eq!(focus.keyboard_focus(), None);
        assert!(focus.is_registered(SurfaceId(2)));
    }

    #[test]
    fn test_surface_display() {
        assert_eq!(SurfaceId(42).to_string(), "surface#42");
    }
}
