//! # Synthetic Gesture Feed
//!
//! A producer thread plays the role of a hand tracker: the interaction
//! point sweeps a circle through the cloud while the speed suggestion
//! swells and fades, then the hand "leaves" for a moment.
//!
//! ## What This Demonstrates
//!
//! - `gesture_feed()` - a channel for any gesture source
//! - `GestureFrame` - full-replacement emissions, newest wins
//! - Speed suggestions easing in instead of hard-setting the parameter
//!
//! ## Try This
//!
//! - Raise the emission rate; the frame loop still only keeps the newest
//! - Hold the left mouse button to override the feed with the cursor
//! - Switch modes with the number keys while the attractor sweeps
//!
//! Run with: `cargo run --example gesture_feed`

use std::thread;
use std::time::Duration;

use lumina::{GestureFrame, Lumina, Mode, Vec3};

fn main() {
    let mut field = Lumina::new().with_mode(Mode::Orbit);
    let feed = field.gesture_feed();

    thread::spawn(move || {
        let mut t = 0.0f32;
        loop {
            t += 1.0 / 60.0;
            // Eight seconds of sweep, then two with no hand in view.
            let frame = if t % 10.0 < 8.0 {
                GestureFrame::Active {
                    point: Vec3::new(3.0 * t.cos(), (t * 0.7).sin(), 3.0 * t.sin()),
                    speed_hint: Some(1.0 + (t * 0.3).sin().abs() * 3.0),
                }
            } else {
                GestureFrame::Inactive
            };
            if feed.send(frame).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(16));
        }
    });

    if let Err(err) = field.run() {
        eprintln!("{}", err);
    }
}
