//! # Lumina
//!
//! A language-driven 3D particle field.
//!
//! Lumina renders a cloud of tens of thousands of points whose motion, color
//! and density are a single mutable parameter set. Anything that can produce
//! a partial update can steer the field: natural-language commands routed
//! through a pluggable interpreter, raw parameter JSON on the console, number
//! keys, or a gesture source feeding points and speed suggestions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lumina::prelude::*;
//!
//! fn main() {
//!     Lumina::new()
//!         .with_count(80_000)
//!         .with_mode(Mode::Vortex)
//!         .run()
//!         .unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Modes
//!
//! Exactly one kinematic rule is active at a time. The engine selects it once
//! per frame and applies it across the whole buffer:
//!
//! | Mode | Motion |
//! |------|--------|
//! | [`Mode::Orbit`] | rigid rotation around the y axis |
//! | [`Mode::Galaxy`] | differential rotation, faster near the core |
//! | [`Mode::Vortex`] | tight spiral with a complexity-scaled wave |
//! | [`Mode::Flow`] | sinusoidal drift on all three axes |
//! | [`Mode::Chaos`] | per-axis random jitter |
//! | [`Mode::Expand`] | outward march with recycling |
//!
//! ### Parameters
//!
//! A [`ParamSet`] holds the whole configuration: two gradient colors, point
//! size, speed, particle count, mode, complexity and brightness. Sources
//! never replace it wholesale; they produce a [`ParamUpdate`] that merges
//! field by field, clamping each value into its valid range. An update that
//! changes the count reseeds the buffer; palette changes recolor in place.
//!
//! ### Commands
//!
//! Free text goes through an [`Interpreter`] you plug in. The interpreter
//! runs on a worker thread, receives the current parameters alongside the
//! prompt, and answers with a partial update (or fails without touching
//! anything). One command is in flight at a time.
//!
//! ### Gestures
//!
//! A [`GestureFrame`] source can place the interaction attractor and suggest
//! a speed; suggestions ease in gradually instead of hard-setting the value.
//! The same attractor is driven by holding the left mouse button.

pub mod app;
pub mod buffer;
pub mod command;
pub mod engine;
pub mod error;
pub mod gesture;
mod gpu;
pub mod interaction;
pub mod interpret;
pub mod motion;
pub mod params;
mod shader;
pub mod time;

pub use app::Lumina;
pub use buffer::ParticleBuffer;
pub use command::{CommandError, CommandOutcome, CommandSurface};
pub use engine::{Appearance, Engine};
pub use error::{AppError, GpuError};
pub use gesture::{smooth_speed, GestureFrame};
pub use glam::{Vec2, Vec3};
pub use interaction::InteractionPoint;
pub use interpret::{parse_response, request_context, InterpretError, Interpreter};
pub use params::{Color, Mode, ParamSet, ParamUpdate};
pub use shader::SHADER_SOURCE;
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use lumina::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::Lumina;
    pub use crate::command::{CommandOutcome, CommandSurface};
    pub use crate::engine::{Appearance, Engine};
    pub use crate::gesture::GestureFrame;
    pub use crate::interaction::InteractionPoint;
    pub use crate::interpret::{InterpretError, Interpreter};
    pub use crate::params::{Color, Mode, ParamSet, ParamUpdate};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3};
}
