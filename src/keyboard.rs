//! Keyboard translation with hot-swappable keymaps.
//!
//! [`KeyboardTranslator`] owns the active keymap together with the xkb state
//! derived from it. The pair is installed and dropped as one unit: a failed
//! install leaves the previous pair in place, and a state is never queried
//! against a keymap other than the one it was built from.

use crate::error::{CompileError, KeymapError};
use crate::keymap::{CompiledKeymap, KeymapCompiler, KeymapFormat};
use crate::shm::ShmMapping;
use std::os::fd::OwnedFd;
use xkbcommon::xkb;

/// Offset between evdev key codes (used on the wire) and XKB key codes.
pub const EVDEV_XKB_OFFSET: u32 = 8;

/// Modifier state as reported by the compositor.
///
/// Applied wholesale; the last mask received wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierMask {
    /// Modifiers physically held down.
    pub depressed: u32,
    /// Modifiers latched until the next key press.
    pub latched: u32,
    /// Modifiers locked on (Caps Lock, Num Lock).
    pub locked: u32,
    /// Active layout group.
    pub group: u32,
}

impl ModifierMask {
    /// Create a mask from its four components.
    pub fn new(depressed: u32, latched: u32, locked: u32, group: u32) -> Self {
        Self {
            depressed,
            latched,
            locked,
            group,
        }
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyState {
    /// Key released.
    Released,
    /// Key pressed.
    Pressed,
}

impl KeyState {
    /// Decode the wire value (0 released, anything else pressed).
    pub fn from_raw(raw: u32) -> Self {
        if raw == 0 {
            KeyState::Released
        } else {
            KeyState::Pressed
        }
    }
}

/// The result of resolving one hardware key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyTranslation {
    /// The evdev code as received on the wire.
    pub code: u32,
    /// The keysym value (0 when nothing is bound).
    pub keysym: u32,
    /// The keysym name, e.g. `"a"`, `"BackSpace"`, `"NoSymbol"`.
    pub name: String,
    /// Text produced under the current modifiers; empty for non-printing keys.
    pub text: String,
}

impl KeyTranslation {
    fn unknown(code: u32) -> Self {
        Self {
            code,
            keysym: 0,
            name: "NoSymbol".to_string(),
            text: String::new(),
        }
    }

    /// No symbol is bound to this code.
    pub fn is_unknown(&self) -> bool {
        self.keysym == 0
    }

    /// The key deletes backwards.
    pub fn is_backspace(&self) -> bool {
        self.keysym == xkb::Keysym::BackSpace.raw()
    }

    /// The first character of the produced text, if any.
    pub fn char(&self) -> Option<char> {
        self.text.chars().next()
    }
}

/// A translated key press or release.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    /// Serial of the key notification.
    pub serial: u32,
    /// Timestamp in milliseconds.
    pub time: u32,
    /// Press or release.
    pub state: KeyState,
    /// What the key resolves to.
    pub translation: KeyTranslation,
}

/// Key repeat parameters announced by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct RepeatInfo {
    /// Repeats per second; 0 disables repeat.
    pub rate: i32,
    /// Delay in milliseconds before repeating starts.
    pub delay: i32,
}

/// Keymap and state, always replaced together.
struct ActiveKeymap {
    // Declared first so it drops before the keymap it was built from.
    state: xkb::State,
    keymap: CompiledKeymap,
}

/// Translates hardware key codes using the most recently installed keymap.
pub struct KeyboardTranslator {
    compiler: KeymapCompiler,
    active: Option<ActiveKeymap>,
    repeat: Option<RepeatInfo>,
}

impl Default for KeyboardTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardTranslator {
    /// Create a translator with no keymap installed.
    pub fn new() -> Self {
        Self {
            compiler: KeymapCompiler::new(),
            active: None,
            repeat: None,
        }
    }

    /// Whether a keymap is installed.
    pub fn is_ready(&self) -> bool {
        self.active.is_some()
    }

    /// The installed keymap, if any.
    pub fn keymap(&self) -> Option<&CompiledKeymap> {
        self.active.as_ref().map(|a| &a.keymap)
    }

    /// Compile `bytes` and make them the active keymap.
    ///
    /// On failure the previously installed keymap stays active.
    pub fn install_keymap(&mut self, bytes: &[u8], format: KeymapFormat) -> Result<(), KeymapError> {
        let keymap = self.compiler.compile(bytes, format)?;
        let state = xkb::State::new(keymap.xkb());

        if self.active.replace(ActiveKeymap { state, keymap }).is_some() {
            log::debug!("replaced active keymap");
        } else {
            log::debug!("installed first keymap");
        }
        Ok(())
    }

    /// Map a keymap handle received from the compositor and install it.
    ///
    /// The handle is closed and the mapping released before this returns.
    pub fn install_keymap_fd(
        &mut self,
        fd: OwnedFd,
        size: u32,
        format: KeymapFormat,
    ) -> Result<(), KeymapError> {
        if format != KeymapFormat::XkbV1 {
            return Err(CompileError::UnsupportedFormat(format.raw()).into());
        }
        let mapping = ShmMapping::map(fd, size as usize)?;
        self.install_keymap(mapping.as_bytes(), format)
    }

    /// Replace the modifier state with `mask`.
    pub fn apply_modifiers(&mut self, mask: ModifierMask) -> Result<(), KeymapError> {
        let active = self.active.as_mut().ok_or(KeymapError::NotInstalled)?;
        active
            .state
            .update_mask(mask.depressed, mask.latched, mask.locked, 0, 0, mask.group);
        Ok(())
    }

    /// The modifier mask currently applied to the state.
    pub fn modifiers(&self) -> Option<ModifierMask> {
        self.active.as_ref().map(|a| ModifierMask {
            depressed: a.state.serialize_mods(xkb::STATE_MODS_DEPRESSED),
            latched: a.state.serialize_mods(xkb::STATE_MODS_LATCHED),
            locked: a.state.serialize_mods(xkb::STATE_MODS_LOCKED),
            group: a.state.serialize_layout(xkb::STATE_LAYOUT_EFFECTIVE),
        })
    }

    /// Resolve an evdev key code under the current modifiers.
    ///
    /// Codes without a bound symbol resolve to an unknown translation.
    pub fn translate_key(&self, code: u32) -> Result<KeyTranslation, KeymapError> {
        let active = self.active.as_ref().ok_or(KeymapError::NotInstalled)?;
        let keycode = xkb::Keycode::new(code.saturating_add(EVDEV_XKB_OFFSET));

        let sym = active.state.key_get_one_sym(keycode);
        if sym == xkb::Keysym::NoSymbol {
            return Ok(KeyTranslation::unknown(code));
        }

        Ok(KeyTranslation {
            code,
            keysym: sym.raw(),
            name: xkb::keysym_get_name(sym),
            text: active.state.key_get_utf8(keycode),
        })
    }

    /// Record key repeat parameters.
    pub fn set_repeat_info(&mut self, info: RepeatInfo) {
        self.repeat = Some(info);
    }

    /// Key repeat parameters, if the compositor sent any.
    pub fn repeat_info(&self) -> Option<RepeatInfo> {
        self.repeat
    }
}

impl std::fmt::Debug for KeyboardTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardTranslator")
            .field("ready", &self.is_ready())
            .field("repeat", &self.repeat)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::testutil::{
        KEY_A, KEY_BACKSPACE, KEY_M, KEY_Q, MINIMAL_KEYMAP, keymap_handle, swapped_keymap,
    };

    const SHIFT: u32 = 1;

    fn ready() -> KeyboardTranslator {
        let mut kb = KeyboardTranslator::new();
        kb.install_keymap(MINIMAL_KEYMAP.as_bytes(), KeymapFormat::XkbV1)
            .unwrap();
        kb
    }

    #[test]
    fn test_uninitialized_translator() {
        let mut kb = KeyboardTranslator::new();
        assert!(!kb.is_ready());
        assert!(kb.keymap().is_none());
        assert!(kb.modifiers().is_none());
        assert!(matches!(kb.translate_key(KEY_A), Err(KeymapError::NotInstalled)));
        assert!(matches!(
            kb.apply_modifiers(ModifierMask::default()),
            Err(KeymapError::NotInstalled)
        ));
    }

    #[test]
    fn test_translate_plain_key() {
        let kb = ready();
        let t = kb.translate_key(KEY_A).unwrap();
        assert_eq!(t.code, KEY_A);
        assert_eq!(t.name, "a");
        assert_eq!(t.text, "a");
        assert_eq!(t.char(), Some('a'));
        assert!(!t.is_unknown());
        assert!(!t.is_backspace());
    }

    #[test]
    fn test_offset_applied_once() {
        let kb = ready();
        // <AC01> sits at XKB code 38, which is evdev 30.
        assert_eq!(kb.translate_key(KEY_A).unwrap().name, "a");
        // Looking up 38 directly would add the offset twice.
        assert!(kb.translate_key(38).unwrap().is_unknown());
    }

    #[test]
    fn test_unbound_code_is_unknown() {
        let kb = ready();
        let t = kb.translate_key(200).unwrap();
        assert!(t.is_unknown());
        assert_eq!(t.name, "NoSymbol");
        assert_eq!(t.text, "");
        assert_eq!(t.char(), None);
    }

    #[test]
    fn test_backspace_is_distinguished() {
        let kb = ready();
        let t = kb.translate_key(KEY_BACKSPACE).unwrap();
        assert!(t.is_backspace());
        assert_eq!(t.name, "BackSpace");
    }

    #[test]
    fn test_shift_modifier() {
        let mut kb = ready();
        kb.apply_modifiers(ModifierMask::new(SHIFT, 0, 0, 0)).unwrap();
        let t = kb.translate_key(KEY_M).unwrap();
        assert_eq!(t.name, "M");
        assert_eq!(t.text, "M");
        assert_eq!(kb.modifiers().unwrap().depressed, SHIFT);

        kb.apply_modifiers(ModifierMask::default()).unwrap();
        assert_eq!(kb.translate_key(KEY_M).unwrap().name, "m");
    }

    #[test]
    fn test_translation_is_deterministic() {
        let mut kb = ready();
        kb.apply_modifiers(ModifierMask::new(SHIFT, 0, 0, 0)).unwrap();
        let first = kb.translate_key(KEY_A).unwrap();
        for _ in 0..10 {
            assert_eq!(kb.translate_key(KEY_A).unwrap(), first);
        }
        assert_eq!(first.name, "A");
    }

    #[test]
    fn test_second_keymap_wins() {
        let mut kb = ready();
        kb.install_keymap(swapped_keymap().as_bytes(), KeymapFormat::XkbV1)
            .unwrap();
        assert_eq!(kb.translate_key(KEY_A).unwrap().name, "q");
        assert_eq!(kb.translate_key(KEY_Q).unwrap().name, "a");
    }

    #[test]
    fn test_new_keymap_resets_modifiers() {
        let mut kb = ready();
        kb.apply_modifiers(ModifierMask::new(SHIFT, 0, 0, 0)).unwrap();
        kb.install_keymap(MINIMAL_KEYMAP.as_bytes(), KeymapFormat::XkbV1)
            .unwrap();
        assert_eq!(kb.modifiers().unwrap(), ModifierMask::default());
        assert_eq!(kb.translate_key(KEY_M).unwrap().name, "m");
    }

    #[test]
    fn test_failed_install_keeps_previous() {
        let mut kb = ready();
        kb.apply_modifiers(ModifierMask::new(SHIFT, 0, 0, 0)).unwrap();
        let before = kb.translate_key(KEY_A).unwrap();

        let err = kb
            .install_keymap(b"xkb_keymap { garbage", KeymapFormat::XkbV1)
            .unwrap_err();
        assert!(matches!(err, KeymapError::Compile(CompileError::Malformed)));

        assert!(kb.is_ready());
        assert_eq!(kb.translate_key(KEY_A).unwrap(), before);
    }

    #[test]
    fn test_failed_first_install_stays_uninitialized() {
        let mut kb = KeyboardTranslator::new();
        assert!(kb.install_keymap(b"nope", KeymapFormat::XkbV1).is_err());
        assert!(!kb.is_ready());
    }

    #[test]
    fn test_install_from_handle() {
        let mut kb = KeyboardTranslator::new();
        let (fd, size) = keymap_handle(MINIMAL_KEYMAP);
        kb.install_keymap_fd(fd, size, KeymapFormat::XkbV1).unwrap();
        assert_eq!(kb.translate_key(KEY_Q).unwrap().name, "q");
    }

    #[test]
    fn test_install_from_short_handle_fails() {
        let mut kb = ready();
        let (fd, size) = keymap_handle(&swapped_keymap());
        let err = kb
            .install_keymap_fd(fd, size + 4096, KeymapFormat::XkbV1)
            .unwrap_err();
        assert!(matches!(err, KeymapError::Map(MapError::SizeMismatch { .. })));
        assert_eq!(kb.translate_key(KEY_A).unwrap().name, "a");
    }

    #[test]
    fn test_install_from_handle_wrong_format() {
        let mut kb = KeyboardTranslator::new();
        let (fd, size) = keymap_handle(MINIMAL_KEYMAP);
        let err = kb
            .install_keymap_fd(fd, size, KeymapFormat::NoKeymap)
            .unwrap_err();
        assert!(matches!(
            err,
            KeymapError::Compile(CompileError::UnsupportedFormat(0))
        ));
    }

    #[test]
    fn test_key_state_from_raw() {
        assert_eq!(KeyState::from_raw(0), KeyState::Released);
        assert_eq!(KeyState::from_raw(1), KeyState::Pressed);
        assert_eq!(KeyState::from_raw(2), KeyState::Pressed);
    }

    #[test]
    fn test_repeat_info() {
        let mut kb = KeyboardTranslator::new();
        assert!(kb.repeat_info().is_none());
        kb.set_repeat_info(RepeatInfo { rate: 25, delay: 600 });
        assert_eq!(kb.repeat_info(), Some(RepeatInfo { rate: 25, delay: 600 }));
    }
}
