//! Error types for seat input processing.

use thiserror::Error;

/// Result type alias for seat-input operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mapping a shared-memory handle.
#[derive(Debug, Error)]
pub enum MapError {
    /// The handle could not be inspected (closed, not a file, ...).
    #[error("invalid file handle: {0}")]
    InvalidHandle(#[source] std::io::Error),

    /// The sender declared more bytes than the handle holds.
    #[error("declared size {declared} exceeds the {actual} bytes behind the handle")]
    SizeMismatch {
        /// Length announced alongside the handle.
        declared: usize,
        /// Length reported by the handle itself.
        actual: usize,
    },

    /// A zero-length region was requested.
    #[error("refusing to map an empty region")]
    EmptyRegion,

    /// The kernel refused the mapping.
    #[error("mapping refused: {0}")]
    MappingRefused(#[source] std::io::Error),
}

/// Errors that can occur while compiling keymap source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The declared keymap format is not the XKB text format.
    #[error("unsupported keymap format tag {0}")]
    UnsupportedFormat(u32),

    /// The keymap source is not valid UTF-8.
    #[error("keymap source is not valid UTF-8")]
    NotUtf8,

    /// xkbcommon rejected the keymap source.
    #[error("malformed keymap source")]
    Malformed,
}

/// Errors raised by the keyboard translator.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// The keymap handle could not be mapped.
    #[error("failed to map keymap: {0}")]
    Map(#[from] MapError),

    /// The keymap bytes could not be compiled.
    #[error("failed to compile keymap: {0}")]
    Compile(#[from] CompileError),

    /// No keymap has been installed yet.
    #[error("no keymap installed")]
    NotInstalled,
}

/// Errors that can occur while routing seat input.
#[derive(Debug, Error)]
pub enum Error {
    /// Keymap installation or translation failed.
    #[error(transparent)]
    Keymap(#[from] KeymapError),

    /// The seat reported no keyboard while the configuration requires one.
    #[error("seat has no keyboard capability but a keyboard is required")]
    KeyboardRequired,

    /// The display connection closed or failed to dispatch.
    #[error("display connection lost: {0}")]
    Disconnected(#[source] std::io::Error),

    /// A recording file could not be read or written.
    #[error("recording file {path:?}: {source}")]
    RecordingIo {
        /// The file being read or written.
        path: std::path::PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A recording could not be encoded or decoded.
    #[cfg(feature = "recorder")]
    #[error("malformed recording: {0}")]
    RecordingFormat(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error must stop the event loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::KeyboardRequired | Error::Disconnected(_))
    }
}
