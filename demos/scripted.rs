//! # Scripted Interpreter
//!
//! Drives the natural-language path end to end without a live service.
//! A canned [`Interpreter`] answers a few known phrases with the JSON a
//! real service would return, and a feed thread submits those phrases on
//! a timer while the field runs.
//!
//! ## What This Demonstrates
//!
//! - `with_interpreter()` - plug a translation service into the field
//! - `command_feed()` - submit commands programmatically
//! - `request_context()` - the exact prompt context a service receives
//! - Failure handling - an unknown phrase surfaces the generic message
//!
//! ## Try This
//!
//! - Type your own phrases in the console (they hit the same interpreter)
//! - Answer with out-of-range values and watch them clamp
//! - Return prose instead of JSON from the interpreter to see a parse failure
//!
//! Run with: `cargo run --example scripted`

use std::thread;
use std::time::Duration;

use lumina::{
    parse_response, request_context, InterpretError, Interpreter, Lumina, ParamSet, ParamUpdate,
};

struct Scripted;

impl Interpreter for Scripted {
    fn interpret(&self, prompt: &str, current: &ParamSet) -> Result<ParamUpdate, InterpretError> {
        // A live client would send this context over the wire.
        println!("-> {}", request_context(prompt, current));

        let response = match prompt {
            p if p.contains("calm") => {
                r#"{"mode": "flow", "speed": 0.4, "brightness": 0.6, "complexity": 0.2}"#
            }
            p if p.contains("crimson") => {
                r##"{"color1": "#ff0022", "color2": "#ff8800", "mode": "chaos", "speed": 3.5}"##
            }
            p if p.contains("vortex") => {
                r#"{"mode": "vortex", "complexity": 1.0, "speed": 2.0, "size": 0.03}"#
            }
            p if p.contains("galaxy") => {
                r##"{"mode": "galaxy", "count": 80000, "color1": "#0011ff", "color2": "#00ccff"}"##
            }
            _ => return Err(InterpretError::Unreachable("no canned answer".into())),
        };
        parse_response(response)
    }
}

fn main() {
    let mut field = Lumina::new().with_interpreter(Scripted);
    let feed = field.command_feed();

    thread::spawn(move || {
        let script = [
            (4, "a calm drifting haze"),
            (8, "make it a crimson storm"),
            (8, "pull everything into a vortex"),
            (8, "back to the blue galaxy"),
            (8, "something the service has never heard of"),
        ];
        for (delay, phrase) in script {
            thread::sleep(Duration::from_secs(delay));
            println!("script: {}", phrase);
            if feed.send(phrase.to_string()).is_err() {
                return;
            }
        }
    });

    if let Err(err) = field.run() {
        eprintln!("{}", err);
    }
}
