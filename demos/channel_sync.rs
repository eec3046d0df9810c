//! Consumes pointer frames on a second thread through a bounded channel.
//!
//! Run with: cargo run --example channel_sync

use seat_input::{
    Capabilities, InputEvent, InputRouter, PointerFragment, ScriptedSource, SeatEvent,
    input_channel, run,
};
use std::thread;

fn main() {
    env_logger::init();

    let (handler, rx) = input_channel(64);

    let consumer = thread::spawn(move || {
        let mut frames = 0;
        for event in rx.iter() {
            if let InputEvent::Pointer(frame) = event {
                frames += 1;
                println!("[render] {}", frame);
            }
        }
        frames
    });

    let mut batches = vec![vec![SeatEvent::Capabilities(Capabilities::POINTER)]];
    for i in 0..10u32 {
        batches.push(vec![
            SeatEvent::Pointer(PointerFragment::Motion {
                time: i * 16,
                x: f64::from(i) * 4.0,
                y: 100.0,
            }),
            SeatEvent::Pointer(PointerFragment::Axis {
                time: i * 16,
                axis: 1,
                value: 0.5,
            }),
            SeatEvent::PointerFrame,
        ]);
    }
    let mut source = ScriptedSource::new(batches);

    let mut router = InputRouter::new(handler);
    let reason = run(&mut source, &mut router);
    println!("input loop ended: {}", reason);

    // Dropping the handler closes the channel and lets the consumer finish.
    drop(router);
    match consumer.join() {
        Ok(frames) => println!("consumer saw {} frames", frames),
        Err(_) => eprintln!("consumer thread panicked"),
    }
}
