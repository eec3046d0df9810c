//! # seat-input
//!
//! Keyboard and pointer input for Wayland clients, decoupled from any
//! particular protocol binding.
//!
//! ## Features
//!
//! - Keymaps received through shared-memory file handles, compiled with
//!   xkbcommon and hot-swapped atomically
//! - Evdev key codes translated to keysyms and text under the current
//!   modifier state
//! - Pointer fragments coalesced into exactly one snapshot per frame
//! - Capability-driven attach and detach of keyboard and pointer, with a
//!   configurable keyboard policy
//! - Channel handlers for consuming events on another thread, and session
//!   recording (feature `recorder`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use seat_input::{InputEvent, InputRouter, ScriptedSource, run};
//!
//! let mut router = InputRouter::new(|event: &InputEvent| match event {
//!     InputEvent::Key(key) => println!("key {} {:?}", key.translation.name, key.state),
//!     InputEvent::Pointer(frame) => println!("{}", frame),
//!     _ => {}
//! });
//!
//! // A real client wraps its display connection in an `EventSource`.
//! let mut source = ScriptedSource::default();
//! let err = run(&mut source, &mut router);
//! eprintln!("input stopped: {}", err);
//! ```
//!
//! ## Architecture
//!
//! The transport delivers [`SeatEvent`]s. [`InputRouter`] owns the
//! [`KeyboardTranslator`] and [`PointerFrameAggregator`], creating them when
//! the seat gains a capability and dropping them when it loses one. Dropping
//! the translator releases the keymap and its derived state together.
//! Everything runs on the thread that drains the connection; use
//! [`channel`] to hand results to other threads.

#[cfg(not(unix))]
compile_error!("seat-input only supports Unix platforms");

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod focus;
pub mod keyboard;
pub mod keymap;
pub mod pointer;
#[cfg(feature = "recorder")]
pub mod recorder;
pub mod router;
pub mod shm;

#[cfg(test)]
mod testutil;

// Re-exports
pub use channel::{ChannelHandler, input_channel};
#[cfg(feature = "tokio")]
pub use channel::{AsyncChannelHandler, async_input_channel};
pub use config::{KeyboardPolicy, RouterConfig};
pub use error::{CompileError, Error, KeymapError, MapError, Result};
pub use event::{Capabilities, InputEvent, SeatEvent};
pub use event_loop::{EventSource, ScriptedSource, run};
pub use focus::{FocusTracker, SurfaceId};
pub use keyboard::{
    EVDEV_XKB_OFFSET, KeyEvent, KeyState, KeyTranslation, KeyboardTranslator, ModifierMask,
    RepeatInfo,
};
pub use keymap::{CompiledKeymap, KeymapCompiler, KeymapFormat};
pub use pointer::{
    Axis, AxisFrame, AxisSource, BTN_EXTRA, BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, BTN_SIDE, Button,
    ButtonEvent, ButtonState, FrameMask, PendingPointerFrame, PointerFragment,
    PointerFrameAggregator, PointerSnapshot, Position, fixed_to_f64,
};
#[cfg(feature = "recorder")]
pub use recorder::{InputRecorder, RecordedEvent, Recording};
pub use router::{InputHandler, InputRouter};
pub use shm::ShmMapping;
