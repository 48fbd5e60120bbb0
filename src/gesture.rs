//! Gesture source contract.
//!
//! A gesture tracker (hand tracking, a synthetic feed, anything that can
//! produce a point) reports [`GestureFrame`] values on its own cadence. The
//! frame loop drains whatever arrived since the last tick and keeps only the
//! newest frame; each frame wholly replaces the current interaction state.

use glam::Vec3;

use crate::params::{MAX_SPEED, MIN_SPEED};

/// Fraction of the remaining distance a speed suggestion covers per frame.
const SPEED_SMOOTHING: f32 = 0.1;

/// One emission from a gesture source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureFrame {
    /// Nothing tracked; the interaction point turns off.
    Inactive,
    /// A tracked point in particle space, with an optional speed suggestion.
    Active {
        point: Vec3,
        speed_hint: Option<f32>,
    },
}

/// Ease `current` toward a suggested speed.
///
/// Gesture speed suggestions never hard-set the parameter; each frame moves
/// ten percent of the way, and the result is clamped into the valid speed
/// range like any other merge.
pub fn smooth_speed(current: f32, target: f32) -> f32 {
    (current + (target - current) * SPEED_SMOOTHING).clamp(MIN_SPEED, MAX_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_covers_ten_percent() {
        let next = smooth_speed(1.0, 2.0);
        assert!((next - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_eases_downward_too() {
        let next = smooth_speed(3.0, 1.0);
        assert!((next - 2.8).abs() < 1e-6);
    }

    #[test]
    fn test_smoothed_speed_is_clamped() {
        assert_eq!(smooth_speed(5.0, 100.0), MAX_SPEED);
        assert_eq!(smooth_speed(MIN_SPEED, -50.0), MIN_SPEED);
    }

    #[test]
    fn test_smoothing_converges() {
        let mut speed = 0.5;
        for _ in 0..200 {
            speed = smooth_speed(speed, 3.0);
        }
        assert!((speed - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_frames_are_plain_values() {
        let frame = GestureFrame::Active {
            point: Vec3::new(1.0, 2.0, 3.0),
            speed_hint: None,
        };
        assert_ne!(frame, GestureFrame::Inactive);
        // Copy semantics: a frame can be handed around freely.
        let copy = frame;
        assert_eq!(copy, frame);
    }
}
