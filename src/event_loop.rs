//! Blocking dispatch loop.
//!
//! The loop pulls batches of [`SeatEvent`]s from an [`EventSource`] and
//! routes them in arrival order. Recoverable routing errors are logged by
//! the router and skipped. The loop ends when the source disconnects or a
//! fatal error occurs; the router is shut down before [`run`] returns.

use crate::error::Error;
use crate::event::SeatEvent;
use crate::router::{InputHandler, InputRouter};
use std::collections::VecDeque;
use std::io;

/// A display connection that delivers seat notifications.
pub trait EventSource {
    /// Block until at least one notification is available and return them in
    /// arrival order. Any error, including an orderly close reported as
    /// [`io::ErrorKind::UnexpectedEof`], ends the loop.
    fn dispatch(&mut self) -> io::Result<Vec<SeatEvent>>;
}

/// An [`EventSource`] that replays prepared batches, then reports a close.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    batches: VecDeque<Vec<SeatEvent>>,
}

impl ScriptedSource {
    /// Create a source that yields `batches` one per dispatch.
    pub fn new(batches: impl IntoIterator<Item = Vec<SeatEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    /// Append a batch.
    pub fn push(&mut self, batch: Vec<SeatEvent>) {
        self.batches.push_back(batch);
    }

    /// Number of batches not yet dispatched.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for ScriptedSource {
    fn dispatch(&mut self) -> io::Result<Vec<SeatEvent>> {
        self.batches.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted session finished")
        })
    }
}

/// Drive `router` from `source` until the connection ends.
///
/// Returns the error that stopped the loop: [`Error::Disconnected`] when the
/// source fails, or a fatal routing error such as
/// [`Error::KeyboardRequired`].
pub fn run<S, H>(source: &mut S, router: &mut InputRouter<H>) -> Error
where
    S: EventSource + ?Sized,
    H: InputHandler,
{
    let err = loop {
        let batch = match source.dispatch() {
            Ok(batch) => batch,
            Err(e) => {
                log::info!("display connection closed: {}", e);
                break Error::Disconnected(e);
            }
        };

        if let Some(fatal) = route_batch(router, batch) {
            log::error!("stopping event loop: {}", fatal);
            break fatal;
        }
    };

    router.shutdown();
    err
}

fn route_batch<H: InputHandler>(router: &mut InputRouter<H>, batch: Vec<SeatEvent>) -> Option<Error> {
    for event in batch {
        if let Err(e) = router.dispatch(event) {
            if e.is_fatal() {
                return Some(e);
            }
            log::debug!("skipped seat event: {}", e);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyboardPolicy, RouterConfig};
    use crate::event::{Capabilities, InputEvent};
    use crate::pointer::PointerFragment;
    use crate::testutil::{KEY_A, MINIMAL_KEYMAP, keymap_handle};

    #[test]
    fn test_run_until_disconnect() {
        let (fd, size) = keymap_handle(MINIMAL_KEYMAP);
        let mut source = ScriptedSource::new([
            vec![
                SeatEvent::Capabilities(Capabilities::KEYBOARD | Capabilities::POINTER),
                SeatEvent::Keymap { format: 1, fd, size },
            ],
            vec![
                SeatEvent::Key {
                    serial: 1,
                    time: 1,
                    key: KEY_A,
                    state: 1,
                },
                SeatEvent::Pointer(PointerFragment::Motion {
                    time: 2,
                    x: 3.0,
                    y: 4.0,
                }),
                SeatEvent::PointerFrame,
            ],
        ]);

        let mut count = 0;
        let mut router = InputRouter::new(|_: &InputEvent| count += 1);
        let err = run(&mut source, &mut router);

        match err {
            Error::Disconnected(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(router.keyboard().is_none());
        assert!(router.pointer().is_none());
        assert_eq!(source.remaining(), 0);
        drop(router);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_recoverable_errors_do_not_stop_the_loop() {
        let mut source = ScriptedSource::new([
            vec![SeatEvent::Capabilities(Capabilities::KEYBOARD)],
            vec![SeatEvent::Key {
                serial: 1,
                time: 1,
                key: KEY_A,
                state: 1,
            }],
        ]);
        let mut router = InputRouter::new(|_: &InputEvent| {});
        let err = run(&mut source, &mut router);
        assert!(matches!(err, Error::Disconnected(_)));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_keyboard_required_stops_the_loop() {
        let mut source = ScriptedSource::new([
            vec![SeatEvent::Capabilities(Capabilities::POINTER)],
            vec![SeatEvent::PointerFrame],
        ]);
        let config = RouterConfig::new().with_keyboard_policy(KeyboardPolicy::Required);
        let mut router = InputRouter::with_config(config, |_: &InputEvent| {});
        let err = run(&mut source, &mut router);
        assert!(matches!(err, Error::KeyboardRequired));
        assert_eq!(source.remaining(), 1);
    }
}
