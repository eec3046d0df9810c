//! Read-only mappings of file handles received over the display connection.
//!
//! The compositor hands out keymaps (and the renderer hands out pixel pools)
//! as a file descriptor plus a byte length. [`ShmMapping::map`] takes
//! ownership of the descriptor, so it is closed exactly once whether or not
//! the mapping succeeds, and the mapping itself is released when the
//! [`ShmMapping`] is dropped.

use crate::error::MapError;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::os::fd::OwnedFd;

/// A private, read-only memory mapping of a received file handle.
///
/// Borrowing the bytes ties them to the mapping's lifetime, so the region
/// cannot be read after it has been unmapped.
pub struct ShmMapping {
    map: Mmap,
}

impl ShmMapping {
    /// Map `len` bytes of `fd` read-only.
    ///
    /// `fd` is consumed and closed before this returns, on success and on
    /// every failure path.
    pub fn map(fd: OwnedFd, len: usize) -> Result<Self, MapError> {
        let file = File::from(fd);
        if len == 0 {
            return Err(MapError::EmptyRegion);
        }

        let actual = file.metadata().map_err(MapError::InvalidHandle)?.len();
        let actual = usize::try_from(actual).unwrap_or(usize::MAX);
        if len > actual {
            return Err(MapError::SizeMismatch {
                declared: len,
                actual,
            });
        }

        // SAFETY: the mapping is private and read-only, and `len` was checked
        // against the file size, so later writes by the sender cannot alias
        // these bytes and no page lies past the end of the file.
        let map = unsafe { MmapOptions::new().len(len).map_copy_read_only(&file) }
            .map_err(MapError::MappingRefused)?;
        // The mapping keeps its own reference to the file.
        drop(file);

        log::trace!("mapped {} bytes of shared memory", len);
        Ok(Self { map })
    }

    /// Map a handle, hand its bytes to `f`, and unmap before returning.
    pub fn with_bytes<T>(fd: OwnedFd, len: usize, f: impl FnOnce(&[u8]) -> T) -> Result<T, MapError> {
        let mapping = Self::map(fd, len)?;
        Ok(f(mapping.as_bytes()))
    }

    /// The mapped bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Always false; empty regions are rejected by [`ShmMapping::map`].
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl AsRef<[u8]> for ShmMapping {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for ShmMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShmMapping").field("len", &self.len()).finish()
    }
}
