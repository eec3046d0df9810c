//! Keymap compilation.
//!
//! The compositor announces keymaps with a format tag and ships the XKB text
//! source through a file handle. [`KeymapCompiler`] turns those bytes into an
//! immutable [`CompiledKeymap`].

use crate::error::CompileError;
use xkbcommon::xkb;

/// Keymap format tags carried by the keymap notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum KeymapFormat {
    /// The client gets no keymap and must interpret raw codes itself.
    NoKeymap,
    /// XKB text format, version 1.
    XkbV1,
    /// A tag this crate does not know.
    Unknown(u32),
}

impl KeymapFormat {
    /// Decode the wire tag.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => KeymapFormat::NoKeymap,
            1 => KeymapFormat::XkbV1,
            n => KeymapFormat::Unknown(n),
        }
    }

    /// The wire tag.
    pub fn raw(&self) -> u32 {
        match self {
            KeymapFormat::NoKeymap => 0,
            KeymapFormat::XkbV1 => 1,
            KeymapFormat::Unknown(n) => *n,
        }
    }
}

/// An immutable, compiled keyboard layout.
pub struct CompiledKeymap {
    keymap: xkb::Keymap,
}

impl CompiledKeymap {
    /// The underlying xkbcommon keymap.
    pub fn xkb(&self) -> &xkb::Keymap {
        &self.keymap
    }

    /// Number of layout groups defined by the keymap.
    pub fn num_layouts(&self) -> u32 {
        self.keymap.num_layouts()
    }

    /// Re-serialize the keymap as XKB text.
    pub fn to_text(&self) -> String {
        self.keymap.get_as_string(xkb::KEYMAP_FORMAT_TEXT_V1)
    }
}

impl std::fmt::Debug for CompiledKeymap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledKeymap")
            .field("layouts", &self.num_layouts())
            .finish()
    }
}

/// Compiles XKB text keymaps.
///
/// The context is created without default include paths; keymaps sent by a
/// compositor are fully resolved and never need them.
pub struct KeymapCompiler {
    context: xkb::Context,
}

impl Default for KeymapCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeymapCompiler {
    /// Create a compiler with an isolated xkb context.
    pub fn new() -> Self {
        Self {
            context: xkb::Context::new(
                xkb::CONTEXT_NO_DEFAULT_INCLUDES | xkb::CONTEXT_NO_ENVIRONMENT_NAMES,
            ),
        }
    }

    /// Compile `bytes` declared as `format`.
    ///
    /// The source ends at the first NUL byte; the terminator sent on the
    /// wire and any padding after it are ignored.
    pub fn compile(&self, bytes: &[u8], format: KeymapFormat) -> Result<CompiledKeymap, CompileError> {
        if format != KeymapFormat::XkbV1 {
            return Err(CompileError::UnsupportedFormat(format.raw()));
        }

        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let source = std::str::from_utf8(&bytes[..end]).map_err(|_| CompileError::NotUtf8)?;
        if source.trim().is_empty() {
            return Err(CompileError::Malformed);
        }

        let keymap = xkb::Keymap::new_from_string(
            &self.context,
            source.to_string(),
            xkb::KEYMAP_FORMAT_TEXT_V1,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or(CompileError::Malformed)?;

        Ok(CompiledKeymap { keymap })
    }
}
