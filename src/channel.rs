//! Channel-based event delivery.
//!
//! The router runs on the thread that drains the display connection. These
//! handlers forward each [`InputEvent`] to a channel so another thread (a
//! renderer, for instance) can consume them without touching input state.
//!
//! # Example (Sync)
//!
//! ```no_run
//! use seat_input::channel::input_channel;
//! use seat_input::InputRouter;
//! use std::time::Duration;
//!
//! let (handler, rx) = input_channel(100);
//! let router = InputRouter::new(handler);
//!
//! std::thread::spawn(move || {
//!     while let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
//!         println!("{:?}", event);
//!     }
//! });
//! # drop(router);
//! ```
//!
//! # Example (Async with Tokio)
//!
//! ```ignore
//! use seat_input::channel::async_input_channel;
//!
//! let (handler, mut rx) = async_input_channel();
//! let router = seat_input::InputRouter::new(handler);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//! ```

use crate::event::InputEvent;
use crate::router::InputHandler;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

/// Handler that sends events to a bounded sync channel.
///
/// Sending never blocks: when the buffer is full the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    sender: SyncSender<InputEvent>,
}

impl InputHandler for ChannelHandler {
    fn handle_event(&mut self, event: &InputEvent) {
        match self.sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::debug!("input channel full, event dropped"),
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("input channel receiver gone, event dropped")
            }
        }
    }
}

/// Create a bounded channel handler and its receiver.
///
/// # Arguments
///
/// * `capacity` - Maximum number of events to buffer. If the buffer is full,
///   new events are dropped so the input thread never waits on a consumer.
pub fn input_channel(capacity: usize) -> (ChannelHandler, Receiver<InputEvent>) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    (ChannelHandler { sender }, receiver)
}

#[cfg(feature = "tokio")]
pub use tokio_channel::*;

#[cfg(feature = "tokio")]
mod tokio_channel {
    use super::*;
    use tokio::sync::mpsc as tokio_mpsc;

    /// Handler that sends events to an unbounded tokio channel.
    #[derive(Debug, Clone)]
    pub struct AsyncChannelHandler {
        sender: tokio_mpsc::UnboundedSender<InputEvent>,
    }

    impl InputHandler for AsyncChannelHandler {
        fn handle_event(&mut self, event: &InputEvent) {
            if self.sender.send(event.clone()).is_err() {
                log::debug!("async input channel closed, event dropped");
            }
        }
    }

    /// Create an async channel handler and its receiver.
    pub fn async_input_channel() -> (AsyncChannelHandler, tokio_mpsc::UnboundedReceiver<InputEvent>) {
        let (sender, receiver) = tokio_mpsc::unbounded_channel();
        (AsyncChannelHandler { sender }, receiver)
    }
}
