//! External attractor.
//!
//! A single optional point in particle space pulls nearby particles toward
//! itself. The pull runs as a pre-step before the mode rule each frame, so
//! rotational modes sweep the attracted cluster along afterwards.

use glam::Vec3;

/// Radius inside which the attractor acts.
pub const INTERACTION_RADIUS: f32 = 3.0;

/// Gain on the linear falloff.
const ATTRACTION_GAIN: f32 = 0.02;

/// An optional attractor in particle space.
///
/// Sources replace the whole value each time they report: there is no
/// blending between an old point and a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionPoint {
    pub position: Vec3,
    pub active: bool,
}

impl InteractionPoint {
    /// An active point at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            active: true,
        }
    }

    /// No attractor; [`attract`] becomes a no-op.
    pub fn inactive() -> Self {
        Self {
            position: Vec3::ZERO,
            active: false,
        }
    }
}

impl Default for InteractionPoint {
    fn default() -> Self {
        Self::inactive()
    }
}

/// Pull particles within [`INTERACTION_RADIUS`] toward the point.
///
/// The displacement is the full vector to the point scaled by a linear
/// falloff, so the pull peaks mid-range and fades to nothing at the radius
/// and at the point itself. Particles at or beyond the radius do not move.
pub fn attract(positions: &mut [Vec3], point: &InteractionPoint) {
    if !point.active {
        return;
    }
    for p in positions {
        let to_point = point.position - *p;
        let dist = to_point.length();
        if dist < INTERACTION_RADIUS {
            *p += to_point * ((INTERACTION_RADIUS - dist) * ATTRACTION_GAIN);
        }
    }
}
