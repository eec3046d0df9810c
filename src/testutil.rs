//! Shared test fixtures.

use std::fs::{self, File};
use std::io::Write;
use std::os::fd::OwnedFd;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A small US-style keymap that compiles without any system include path.
pub(crate) const MINIMAL_KEYMAP: &str = include_str!("../fixtures/minimal.xkb");

/// The minimal keymap with the `a` and `q` keys swapped.
pub(crate) fn swapped_keymap() -> String {
    MINIMAL_KEYMAP
        .replace("key <AC01> { [ a, A ] };", "key <AC01> { [ q, Q ] };")
        .replace("key <AD01> { [ q, Q ] };", "key <AD01> { [ a, A ] };")
}

/// Evdev code of the key labelled A on a US board.
pub(crate) const KEY_A: u32 = 30;
/// Evdev code of the key labelled Q on a US board.
pub(crate) const KEY_Q: u32 = 16;
/// Evdev code of the key labelled M on a US board.
pub(crate) const KEY_M: u32 = 50;
/// Evdev code of backspace.
pub(crate) const KEY_BACKSPACE: u32 = 14;

static HANDLE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// An unlinked file holding `bytes`, as a compositor would send it.
pub(crate) fn handle_with(bytes: &[u8]) -> OwnedFd {
    let n = HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "seat-input-test-{}-{}",
        std::process::id(),
        n
    ));
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .unwrap();
    file.write_all(bytes).unwrap();
    fs::remove_file(&path).unwrap();
    OwnedFd::from(file)
}

/// A keymap handle with the trailing NUL the display protocol includes.
pub(crate) fn keymap_handle(source: &str) -> (OwnedFd, u32) {
    let mut bytes = source.as_bytes().to_vec();
    bytes.push(0);
    let len = bytes.len() as u32;
    (handle_with(&bytes), len)
}
