//! Records a scripted session to JSON and replays it.
//!
//! Run with: cargo run --example recorder --features recorder

use seat_input::{
    Capabilities, InputEvent, InputRecorder, InputRouter, PointerFragment, Recording,
    ScriptedSource, SeatEvent, BTN_RIGHT, run,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut source = ScriptedSource::new([
        vec![SeatEvent::Capabilities(Capabilities::POINTER)],
        vec![
            SeatEvent::Pointer(PointerFragment::Motion {
                time: 1,
                x: 5.0,
                y: 5.0,
            }),
            SeatEvent::Pointer(PointerFragment::Button {
                serial: 2,
                time: 1,
                button: BTN_RIGHT,
                state: 1,
            }),
            SeatEvent::PointerFrame,
        ],
    ]);

    let mut router = InputRouter::new(InputRecorder::new());
    let reason = run(&mut source, &mut router);
    println!("input loop ended: {}", reason);

    let recording = router
        .into_handler()
        .finish()
        .with_description("scripted pointer session");
    let path = std::env::temp_dir().join("seat-input-recording.json");
    if let Err(e) = recording.save(&path) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    println!(
        "saved {} events ({:?}) to {}",
        recording.len(),
        recording.span(),
        path.display()
    );

    let loaded = match Recording::load(&path) {
        Ok(recording) => recording,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut print = |event: &InputEvent| println!("replayed: {:?}", event);
    loaded.replay(&mut print);
    ExitCode::SUCCESS
}
