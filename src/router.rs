//! Seat event routing.
//!
//! [`InputRouter`] is the single entry point for seat notifications. It
//! attaches and detaches the keyboard translator and pointer aggregator as
//! the seat's capabilities change, keeps focus up to date, and hands every
//! completed event to an [`InputHandler`].
//!
//! All methods are synchronous and must be called from the thread that
//! drains the display connection.

use crate::config::RouterConfig;
use crate::error::{Error, KeymapError, Result};
use crate::event::{Capabilities, InputEvent, SeatEvent};
use crate::focus::{FocusTracker, SurfaceId};
use crate::keyboard::{KeyEvent, KeyState, KeyboardTranslator, ModifierMask, RepeatInfo};
use crate::keymap::KeymapFormat;
use crate::pointer::{PointerFragment, PointerFrameAggregator};
use std::os::fd::OwnedFd;

/// Receives coalesced input events.
///
/// Implemented for any `FnMut(&InputEvent)` closure.
pub trait InputHandler {
    /// Called once per completed event.
    fn handle_event(&mut self, event: &InputEvent);
}

impl<F> InputHandler for F
where
    F: FnMut(&InputEvent),
{
    fn handle_event(&mut self, event: &InputEvent) {
        self(event);
    }
}

/// Routes seat notifications to the keyboard and pointer components.
pub struct InputRouter<H: InputHandler> {
    config: RouterConfig,
    handler: H,
    capabilities: Capabilities,
    seat_name: Option<String>,
    keyboard: Option<KeyboardTranslator>,
    pointer: Option<PointerFrameAggregator>,
    focus: FocusTracker,
}

impl<H: InputHandler> InputRouter<H> {
    /// Create a router with the default configuration.
    pub fn new(handler: H) -> Self {
        Self::with_config(RouterConfig::default(), handler)
    }

    /// Create a router with `config`.
    pub fn with_config(config: RouterConfig, handler: H) -> Self {
        Self {
            config,
            handler,
            capabilities: Capabilities::empty(),
            seat_name: None,
            keyboard: None,
            pointer: None,
            focus: FocusTracker::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The event handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The event handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the router and return its handler.
    pub fn into_handler(mut self) -> H {
        self.shutdown();
        let Self { handler, .. } = self;
        handler
    }

    /// Capabilities last reported by the seat.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Name the seat announced, if any.
    pub fn seat_name(&self) -> Option<&str> {
        self.seat_name.as_deref()
    }

    /// The attached keyboard translator.
    pub fn keyboard(&self) -> Option<&KeyboardTranslator> {
        self.keyboard.as_ref()
    }

    /// The attached pointer aggregator.
    pub fn pointer(&self) -> Option<&PointerFrameAggregator> {
        self.pointer.as_ref()
    }

    /// Focus state.
    pub fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    /// Focus state, mutably (to register and unregister surfaces).
    pub fn focus_mut(&mut self) -> &mut FocusTracker {
        &mut self.focus
    }

    /// The seat's device classes changed.
    ///
    /// Returns [`Error::KeyboardRequired`] when the seat has no keyboard and
    /// the configuration requires one.
    pub fn on_capabilities(&mut self, caps: Capabilities) -> Result<()> {
        match (caps.has_pointer(), self.pointer.is_some()) {
            (true, false) => {
                log::info!("pointer attached");
                self.pointer = Some(PointerFrameAggregator::new());
            }
            (false, true) => {
                log::info!("pointer detached");
                self.pointer = None;
                self.focus.pointer_leave();
            }
            _ => {}
        }

        match (caps.has_keyboard(), self.keyboard.is_some()) {
            (true, false) => {
                log::info!("keyboard attached");
                self.keyboard = Some(KeyboardTranslator::new());
            }
            (false, true) => {
                log::info!("keyboard detached");
                self.keyboard = None;
                if let Some(surface) = self.focus.keyboard_leave() {
                    self.handler
                        .handle_event(&InputEvent::FocusLeave { surface });
                }
            }
            _ => {}
        }

        if caps.has_touch() != self.capabilities.has_touch() {
            log::debug!("touch capability present: {}", caps.has_touch());
        }

        self.capabilities = caps;
        self.handler
            .handle_event(&InputEvent::CapabilitiesChanged(caps));

        if !caps.has_keyboard() && self.config.requires_keyboard() {
            log::error!("seat reports no keyboard but a keyboard is required");
            return Err(Error::KeyboardRequired);
        }
        Ok(())
    }

    /// Capability change expressed as two flags. Touch is left unchanged.
    pub fn on_capability_change(&mut self, has_keyboard: bool, has_pointer: bool) -> Result<()> {
        let mut caps = self.capabilities & Capabilities::TOUCH;
        caps.set(Capabilities::KEYBOARD, has_keyboard);
        caps.set(Capabilities::POINTER, has_pointer);
        self.on_capabilities(caps)
    }

    /// The seat announced its name.
    pub fn on_seat_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("seat name: {}", name);
        self.seat_name = Some(name);
    }

    /// Keyboard focus entered `surface` with `keys` already held.
    pub fn on_focus_enter(&mut self, _serial: u32, surface: SurfaceId, keys: &[u32]) {
        self.focus.keyboard_enter(surface);

        let pressed = match &self.keyboard {
            Some(kb) if kb.is_ready() => keys
                .iter()
                .filter_map(|&key| kb.translate_key(key).ok())
                .collect(),
            _ => Vec::new(),
        };
        log::debug!("keyboard enter {} with {} keys held", surface, pressed.len());

        self.handler
            .handle_event(&InputEvent::FocusEnter { surface, pressed });
    }

    /// Keyboard focus left `surface`.
    pub fn on_focus_leave(&mut self, _serial: u32, surface: SurfaceId) {
        self.focus.keyboard_leave();
        log::debug!("keyboard leave {}", surface);
        self.handler
            .handle_event(&InputEvent::FocusLeave { surface });
    }

    /// A keymap arrived through `fd`.
    ///
    /// The handle is always closed. On failure the previous keymap stays
    /// active and the error is returned for reporting.
    pub fn on_keymap(&mut self, format: u32, fd: OwnedFd, size: u32) -> Result<()> {
        let Some(kb) = self.keyboard.as_mut() else {
            log::warn!("keymap received while no keyboard is attached");
            return Ok(());
        };

        match kb.install_keymap_fd(fd, size, KeymapFormat::from_raw(format)) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("keeping previous keymap: {}", e);
                Err(e.into())
            }
        }
    }

    /// Modifier state changed.
    pub fn on_modifiers(&mut self, _serial: u32, mask: ModifierMask) -> Result<()> {
        let kb = self.ready_keyboard("modifiers")?;
        kb.apply_modifiers(mask)?;
        Ok(())
    }

    /// A key changed state.
    pub fn on_key(&mut self, serial: u32, time: u32, key: u32, state: u32) -> Result<()> {
        let kb = self.ready_keyboard("key")?;
        let translation = kb.translate_key(key)?;
        let state = KeyState::from_raw(state);

        if translation.is_backspace() {
            log::debug!("backspace {:?}", state);
        }

        let event = KeyEvent {
            serial,
            time,
            state,
            translation,
        };
        self.handler.handle_event(&InputEvent::Key(event));
        Ok(())
    }

    /// Key repeat parameters changed.
    pub fn on_repeat_info(&mut self, rate: i32, delay: i32) {
        match self.keyboard.as_mut() {
            Some(kb) => kb.set_repeat_info(RepeatInfo { rate, delay }),
            None => log::debug!("repeat info received while no keyboard is attached"),
        }
    }

    /// One pointer fragment.
    pub fn on_pointer_fragment(&mut self, fragment: PointerFragment) {
        let Some(pointer) = self.pointer.as_mut() else {
            log::debug!("pointer fragment received while no pointer is attached");
            return;
        };

        match fragment {
            PointerFragment::Enter { surface, .. } => self.focus.pointer_enter(surface),
            PointerFragment::Leave { .. } => {
                self.focus.pointer_leave();
            }
            _ => {}
        }
        pointer.apply(&fragment);
    }

    /// End of the current pointer frame; emits exactly one snapshot.
    pub fn on_pointer_frame(&mut self) {
        let Some(pointer) = self.pointer.as_mut() else {
            log::debug!("pointer frame received while no pointer is attached");
            return;
        };

        let snapshot = pointer.frame();
        log::trace!("{}", snapshot);
        self.handler.handle_event(&InputEvent::Pointer(snapshot));
    }

    /// Route one seat notification.
    pub fn dispatch(&mut self, event: SeatEvent) -> Result<()> {
        match event {
            SeatEvent::Capabilities(caps) => self.on_capabilities(caps),
            SeatEvent::Name(name) => {
                self.on_seat_name(name);
                Ok(())
            }
            SeatEvent::Keymap { format, fd, size } => self.on_keymap(format, fd, size),
            SeatEvent::KeyboardEnter {
                serial,
                surface,
                keys,
            } => {
                self.on_focus_enter(serial, surface, &keys);
                Ok(())
            }
            SeatEvent::KeyboardLeave { serial, surface } => {
                self.on_focus_leave(serial, surface);
                Ok(())
            }
            SeatEvent::Key {
                serial,
                time,
                key,
                state,
            } => self.on_key(serial, time, key, state),
            SeatEvent::Modifiers { serial, mask } => self.on_modifiers(serial, mask),
            SeatEvent::RepeatInfo { rate, delay } => {
                self.on_repeat_info(rate, delay);
                Ok(())
            }
            SeatEvent::Pointer(fragment) => {
                self.on_pointer_fragment(fragment);
                Ok(())
            }
            SeatEvent::PointerFrame => {
                self.on_pointer_frame();
                Ok(())
            }
        }
    }

    /// Release the keymap, translation state and any partial pointer frame.
    pub fn shutdown(&mut self) {
        if let Some(mut pointer) = self.pointer.take() {
            pointer.reset();
        }
        self.keyboard = None;
        self.focus.clear();
        log::info!("input router shut down");
    }

    fn ready_keyboard(&mut self, what: &str) -> Result<&mut KeyboardTranslator> {
        match self.keyboard.as_mut() {
            Some(kb) if kb.is_ready() => Ok(kb),
            _ => {
                log::debug!("{} received before a keymap was installed", what);
                Err(KeymapError::NotInstalled.into())
            }
        }
    }
}

impl<H: InputHandler> std::fmt::Debug for InputRouter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRouter")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("keyboard", &self.keyboard)
            .field("pointer", &self.pointer)
            .field("focus", &self.focus)
            .finish()
    }
}
