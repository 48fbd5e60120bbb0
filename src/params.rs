//! Simulation parameters and partial updates.
//!
//! A [`ParamSet`] is the complete configuration snapshot the engine consumes
//! each frame. External sources (the interpretation service, the console, the
//! gesture tracker) never replace it wholesale; they produce a [`ParamUpdate`]
//! that is merged over the current state with [`ParamSet::apply`], which
//! clamps every numeric field into its valid range.
//!
//! # Example
//!
//! ```ignore
//! use lumina::params::{ParamSet, ParamUpdate};
//!
//! let mut params = ParamSet::default();
//! let update = ParamUpdate::from_json(r#"{"mode": "vortex", "speed": 12.0}"#)?;
//! params.apply(&update);
//! assert_eq!(params.speed, 5.0); // clamped
//! ```

use std::fmt;

use glam::Vec3;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const MIN_SIZE: f32 = 0.01;
pub const MAX_SIZE: f32 = 0.2;
pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 5.0;
pub const MIN_COUNT: u32 = 1_000;
pub const MAX_COUNT: u32 = 100_000;
pub const MIN_COMPLEXITY: f32 = 0.0;
pub const MAX_COMPLEXITY: f32 = 1.0;
pub const MIN_BRIGHTNESS: f32 = 0.1;
pub const MAX_BRIGHTNESS: f32 = 2.0;

/// Kinematic rule applied to every particle each frame.
///
/// Exactly one mode is active at a time; the engine selects the matching
/// update rule once per frame and applies it across the whole buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rigid rotation of the whole cloud in the (x, z) plane.
    Orbit,
    /// Sinusoidal drift on all three axes.
    Flow,
    /// Tight differential rotation with a complexity-scaled vertical wave.
    Vortex,
    /// Per-axis random jitter, redrawn every frame.
    Chaos,
    /// Radial outward motion with recycling near the origin.
    Expand,
    /// Differential rotation (faster near the core) with a gentle y ripple.
    #[default]
    Galaxy,
}

impl Mode {
    /// All modes, in UI order.
    pub const ALL: [Mode; 6] = [
        Mode::Orbit,
        Mode::Flow,
        Mode::Vortex,
        Mode::Chaos,
        Mode::Expand,
        Mode::Galaxy,
    ];

    /// Lowercase name, matching the service wire format.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Orbit => "orbit",
            Mode::Flow => "flow",
            Mode::Vortex => "vortex",
            Mode::Chaos => "chaos",
            Mode::Expand => "expand",
            Mode::Galaxy => "galaxy",
        }
    }

    /// Parse a mode from its name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "orbit" => Some(Mode::Orbit),
            "flow" => Some(Mode::Flow),
            "vortex" => Some(Mode::Vortex),
            "chaos" => Some(Mode::Chaos),
            "expand" => Some(Mode::Expand),
            "galaxy" => Some(Mode::Galaxy),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An RGB color, serialized as a `#rrggbb` hex string on the service wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    /// Color from 8-bit channel values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(Vec3::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ))
    }

    /// Parse a `#rrggbb` hex string (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb8(r, g, b))
    }

    /// Format as a `#rrggbb` hex string.
    pub fn to_hex(self) -> String {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.0.x),
            to_byte(self.0.y),
            to_byte(self.0.z)
        )
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// The full parameter snapshot consumed by the engine each tick.
///
/// All fields are independently settable; merges go through [`ParamSet::apply`]
/// so out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSet {
    /// First color interpolation endpoint.
    pub color1: Color,
    /// Second color interpolation endpoint.
    pub color2: Color,
    /// Base rendered point size.
    pub size: f32,
    /// Motion-mode time/angle multiplier.
    pub speed: f32,
    /// Particle population. Changing it rebuilds the buffer.
    pub count: u32,
    /// Active kinematic rule.
    pub mode: Mode,
    /// Secondary-motion amplitude (mode-dependent).
    pub complexity: f32,
    /// Opacity multiplier.
    pub brightness: f32,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            color1: Color::rgb8(0x00, 0x11, 0xff),
            color2: Color::rgb8(0x00, 0xcc, 0xff),
            size: 0.05,
            speed: 1.0,
            count: 50_000,
            mode: Mode::Galaxy,
            complexity: 0.5,
            brightness: 1.0,
        }
    }
}

impl ParamSet {
    /// Merge a partial update over this set, clamping numeric fields into
    /// their valid ranges. Absent fields are left untouched.
    pub fn apply(&mut self, update: &ParamUpdate) {
        if let Some(c) = update.color1 {
            self.color1 = c;
        }
        if let Some(c) = update.color2 {
            self.color2 = c;
        }
        if let Some(v) = update.size {
            self.size = v.clamp(MIN_SIZE, MAX_SIZE);
        }
        if let Some(v) = update.speed {
            self.speed = v.clamp(MIN_SPEED, MAX_SPEED);
        }
        if let Some(v) = update.count {
            self.count = v.clamp(MIN_COUNT, MAX_COUNT);
        }
        if let Some(m) = update.mode {
            self.mode = m;
        }
        if let Some(v) = update.complexity {
            self.complexity = v.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY);
        }
        if let Some(v) = update.brightness {
            self.brightness = v.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
        }
    }
}

/// A partial parameter update: any subset of fields to merge over the
/// current [`ParamSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamUpdate {
    pub color1: Option<Color>,
    pub color2: Option<Color>,
    pub size: Option<f32>,
    pub speed: Option<f32>,
    pub count: Option<u32>,
    pub mode: Option<Mode>,
    pub complexity: Option<f32>,
    pub brightness: Option<f32>,
}

impl ParamUpdate {
    /// Parse an update from a JSON object, field by field.
    ///
    /// Unknown keys are ignored and known keys holding the wrong type are
    /// skipped; only the top-level shape (valid JSON, an object) is strict.
    /// Range clamping happens later, at merge time.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let value: Value = serde_json::from_str(json)?;
        let obj = value
            .as_object()
            .ok_or_else(|| serde_json::Error::custom("expected a JSON object"))?;

        let number = |key: &str| obj.get(key).and_then(Value::as_f64).map(|v| v as f32);

        Ok(Self {
            color1: obj
                .get("color1")
                .and_then(Value::as_str)
                .and_then(Color::from_hex),
            color2: obj
                .get("color2")
                .and_then(Value::as_str)
                .and_then(Color::from_hex),
            size: number("size"),
            speed: number("speed"),
            count: obj.get("count").and_then(Value::as_u64).map(|v| v as u32),
            mode: obj
                .get("mode")
                .and_then(Value::as_str)
                .and_then(Mode::from_name),
            complexity: number("complexity"),
            brightness: number("brightness"),
        })
    }
}
