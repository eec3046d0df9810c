//! Session recording and replay.
//!
//! [`InputRecorder`] is an [`InputHandler`] that captures every coalesced
//! event together with the time elapsed since recording started. A
//! [`Recording`] can be saved as JSON and fed back to any handler later,
//! which is handy for regression tests of input-driven UI code.
//!
//! # Example
//!
//! ```no_run
//! use seat_input::recorder::{InputRecorder, Recording};
//! use seat_input::{InputEvent, InputRouter};
//!
//! let mut router = InputRouter::new(InputRecorder::new());
//! // ... dispatch seat events ...
//! let recording = router.into_handler().finish();
//! recording.save("session.json").unwrap();
//!
//! let recording = Recording::load("session.json").unwrap();
//! let mut print = |event: &InputEvent| println!("{:?}", event);
//! recording.replay(&mut print);
//! ```

use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::router::InputHandler;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

/// One captured event and when it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Offset from the start of the session.
    pub elapsed: Duration,
    /// The event as the handler saw it.
    pub event: InputEvent,
}

/// A captured input session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Wall-clock time the session started.
    pub started_at: SystemTime,
    /// Free-form label.
    pub description: Option<String>,
    /// Events in arrival order.
    pub events: Vec<RecordedEvent>,
}

impl Recording {
    fn starting_now() -> Self {
        Self {
            started_at: SystemTime::now(),
            description: None,
            events: Vec::new(),
        }
    }

    /// Attach a label.
    pub fn with_description(self, desc: impl Into<String>) -> Self {
        Self {
            description: Some(desc.into()),
            ..self
        }
    }

    /// Offset of the last event, or zero for an empty session.
    pub fn span(&self) -> Duration {
        self.events.last().map_or(Duration::ZERO, |e| e.elapsed)
    }

    /// Number of captured events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Captured events without their timestamps.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter().map(|r| &r.event)
    }

    /// Write as pretty JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| Error::RecordingIo {
            path: path.to_path_buf(),
            source,
        };
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush().map_err(io_err)?;
        log::debug!("saved {} events to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a recording written by [`Recording::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::RecordingIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Feed every captured event to `handler`, in order, without delay.
    pub fn replay<H: InputHandler + ?Sized>(&self, handler: &mut H) {
        for event in self.iter() {
            handler.handle_event(event);
        }
    }
}

/// Captures input events for later replay.
#[derive(Debug)]
pub struct InputRecorder {
    recording: Recording,
    start: Instant,
}

impl InputRecorder {
    /// Start a new recording now.
    pub fn new() -> Self {
        Self {
            recording: Recording::starting_now(),
            start: Instant::now(),
        }
    }

    /// Events captured so far.
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Stop recording and return what was captured.
    pub fn finish(self) -> Recording {
        log::debug!("recording finished with {} events", self.recording.len());
        self.recording
    }
}

impl Default for InputRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler for InputRecorder {
    fn handle_event(&mut self, event: &InputEvent) {
        self.recording.events.push(RecordedEvent {
            elapsed: self.start.elapsed(),
            event: event.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Capabilities;
    use crate::focus::SurfaceId;
    use crate::pointer::{FrameMask, Position, PointerSnapshot};

    fn sample_events() -> Vec<InputEvent> {
        let snapshot = PointerSnapshot {
            mask: FrameMask::MOTION,
            time: Some(10),
            motion: Some(Position { x: 1.0, y: 2.0 }),
            ..Default::default()
        };
        vec![
            InputEvent::CapabilitiesChanged(Capabilities::POINTER | Capabilities::KEYBOARD),
            InputEvent::Pointer(snapshot),
            InputEvent::FocusLeave {
                surface: SurfaceId(7),
            },
        ]
    }

    fn recorded(events: &[InputEvent]) -> Recording {
        let mut recorder = InputRecorder::new();
        for event in events {
            recorder.handle_event(event);
        }
        recorder.finish()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("seat_input_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_untouched_recorder_is_empty() {
        let recording = InputRecorder::new().finish();
        assert!(recording.is_empty());
        assert_eq!(recording.span(), Duration::ZERO);
        assert_eq!(recording.iter().count(), 0);
        assert!(recording.description.is_none());
    }

    #[test]
    fn test_span_tracks_last_event() {
        let mut recording = recorded(&sample_events()).with_description("span");
        recording.events[2].elapsed = Duration::from_millis(250);
        assert_eq!(recording.span(), Duration::from_millis(250));
        assert_eq!(recording.description.as_deref(), Some("span"));
    }

    #[test]
    fn test_recorder_captures_in_order() {
        let recording = recorded(&sample_events());
        assert_eq!(recording.len(), 3);
        assert!(recording.iter().eq(sample_events().iter()));
        assert!(recording.events[0].elapsed <= recording.events[2].elapsed);
    }

    #[test]
    fn test_replay_feeds_handler() {
        let recording = recorded(&sample_events());
        let mut seen = Vec::new();
        let mut collect = |event: &InputEvent| seen.push(event.clone());
        recording.replay(&mut collect);
        assert_eq!(seen, sample_events());
    }

    #[test]
    fn test_replay_into_another_recorder() {
        let recording = recorded(&sample_events());
        let mut again = InputRecorder::new();
        recording.replay(&mut again);
        assert!(again.recording().iter().eq(recording.iter()));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let recording = recorded(&sample_events()).with_description("roundtrip");
        let path = temp_path("roundtrip");
        recording.save(&path).unwrap();

        let loaded = Recording::load(&path).unwrap();
        assert_eq!(loaded.description, recording.description);
        assert_eq!(loaded.events, recording.events);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let missing = "/nonexistent/seat-input/recording.json";
        match Recording::load(missing).unwrap_err() {
            Error::RecordingIo { path, source } => {
                assert_eq!(path, std::path::Path::new(missing));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let path = temp_path("malformed");
        std::fs::write(&path, b"{\"events\": [").unwrap();
        let err = Recording::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::RecordingFormat(_)));
    }
}
