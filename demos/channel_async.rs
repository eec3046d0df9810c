//! Consumes input events from an async task.
//!
//! Run with: cargo run --example channel_async --features tokio

use seat_input::{
    Capabilities, InputEvent, InputRouter, PointerFragment, ScriptedSource, SeatEvent,
    async_input_channel, run,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let (handler, mut rx) = async_input_channel();

    let mut source = ScriptedSource::new([
        vec![SeatEvent::Capabilities(Capabilities::POINTER)],
        vec![
            SeatEvent::Pointer(PointerFragment::AxisSource { source: 1 }),
            SeatEvent::Pointer(PointerFragment::Axis {
                time: 5,
                axis: 0,
                value: -3.5,
            }),
            SeatEvent::PointerFrame,
        ],
        vec![
            SeatEvent::Pointer(PointerFragment::AxisStop { time: 9, axis: 0 }),
            SeatEvent::PointerFrame,
        ],
    ]);

    let mut router = InputRouter::new(handler);
    let reason = run(&mut source, &mut router);
    drop(router);

    while let Some(event) = rx.recv().await {
        match event {
            InputEvent::Pointer(frame) => println!("{}", frame),
            other => println!("{:?}", other),
        }
    }
    println!("input loop ended: {}", reason);
}
