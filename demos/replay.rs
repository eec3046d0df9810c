//! Replays a scripted seat session through the router and prints what the
//! application would see.
//!
//! Run with: RUST_LOG=debug cargo run --example replay

use seat_input::{
    BTN_LEFT, Capabilities, Error, InputEvent, InputRouter, ModifierMask, PointerFragment,
    ScriptedSource, SeatEvent, SurfaceId, run,
};
use std::fs::{self, File};
use std::io::{self, Write};
use std::os::fd::OwnedFd;
use std::process::ExitCode;

const KEYMAP: &str = include_str!("../fixtures/minimal.xkb");

const KEY_A: u32 = 30;
const KEY_M: u32 = 50;
const KEY_BACKSPACE: u32 = 14;
const KEY_LEFTSHIFT: u32 = 42;

/// Write the keymap to an unlinked file, the way a compositor shares it.
fn keymap_fd() -> io::Result<(OwnedFd, u32)> {
    let path = std::env::temp_dir().join(format!("seat-input-demo-{}.xkb", std::process::id()));
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    file.write_all(KEYMAP.as_bytes())?;
    file.write_all(&[0])?;
    fs::remove_file(&path)?;
    Ok((OwnedFd::from(file), KEYMAP.len() as u32 + 1))
}

fn key(serial: u32, time: u32, key: u32, state: u32) -> SeatEvent {
    SeatEvent::Key {
        serial,
        time,
        key,
        state,
    }
}

fn session(fd: OwnedFd, size: u32) -> ScriptedSource {
    let surface = SurfaceId(1);
    ScriptedSource::new([
        vec![
            SeatEvent::Name("seat0".into()),
            SeatEvent::Capabilities(Capabilities::KEYBOARD | Capabilities::POINTER),
        ],
        vec![
            SeatEvent::Keymap { format: 1, fd, size },
            SeatEvent::RepeatInfo {
                rate: 25,
                delay: 600,
            },
            SeatEvent::KeyboardEnter {
                serial: 1,
                surface,
                keys: vec![],
            },
        ],
        vec![
            key(2, 100, KEY_A, 1),
            key(3, 110, KEY_A, 0),
            key(4, 120, KEY_LEFTSHIFT, 1),
            SeatEvent::Modifiers {
                serial: 5,
                mask: ModifierMask::new(1, 0, 0, 0),
            },
            key(6, 130, KEY_M, 1),
            key(7, 140, KEY_M, 0),
            key(8, 150, KEY_LEFTSHIFT, 0),
            SeatEvent::Modifiers {
                serial: 9,
                mask: ModifierMask::default(),
            },
            key(10, 160, KEY_BACKSPACE, 1),
        ],
        vec![
            SeatEvent::Pointer(PointerFragment::Enter {
                serial: 11,
                surface,
                x: 10.0,
                y: 20.0,
            }),
            SeatEvent::PointerFrame,
            SeatEvent::Pointer(PointerFragment::Motion {
                time: 200,
                x: 12.5,
                y: 21.0,
            }),
            SeatEvent::Pointer(PointerFragment::Button {
                serial: 12,
                time: 200,
                button: BTN_LEFT,
                state: 1,
            }),
            SeatEvent::PointerFrame,
            SeatEvent::Pointer(PointerFragment::AxisSource { source: 0 }),
            SeatEvent::Pointer(PointerFragment::Axis {
                time: 210,
                axis: 0,
                value: 15.0,
            }),
            SeatEvent::Pointer(PointerFragment::AxisDiscrete {
                axis: 0,
                discrete: 1,
            }),
            SeatEvent::PointerFrame,
        ],
    ])
}

fn main() -> ExitCode {
    env_logger::init();

    let (fd, size) = match keymap_fd() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("failed to prepare keymap: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut router = InputRouter::new(|event: &InputEvent| match event {
        InputEvent::CapabilitiesChanged(caps) => println!("capabilities: {:?}", caps),
        InputEvent::FocusEnter { surface, pressed } => {
            println!("focus enter {} ({} keys held)", surface, pressed.len())
        }
        InputEvent::FocusLeave { surface } => println!("focus leave {}", surface),
        InputEvent::Key(key) if key.translation.is_backspace() => {
            println!("backspace {:?}", key.state)
        }
        InputEvent::Key(key) => println!(
            "key {:?}: {} {:?}",
            key.state, key.translation.name, key.translation.text
        ),
        InputEvent::Pointer(frame) => println!("{}", frame),
    });
    router.focus_mut().register_surface(SurfaceId(1));

    let mut source = session(fd, size);
    // Losing the display connection is fatal, even at the end of a script.
    match run(&mut source, &mut router) {
        Error::Disconnected(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            eprintln!("session finished, display connection closed");
        }
        e => eprintln!("input stopped: {}", e),
    }
    ExitCode::FAILURE
}
