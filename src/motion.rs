//! Per-frame kinematic rules.
//!
//! Each [`Mode`] names one update rule. The rule is selected once per frame
//! and applied across the whole position slice, so the per-particle loop
//! never branches on the mode. All rules read the positions they were given
//! at the start of the frame; deltas are computed from pre-step values.
//!
//! `speed` is never used raw: every rule sees it through the fixed
//! [`SPEED_SCALE`] multiplier.
//!
//! # Rule Overview
//!
//! | Mode | Motion |
//! |------|--------|
//! | ORBIT | rigid rotation in the (x, z) plane |
//! | GALAXY | differential rotation, faster near the core, with a y ripple |
//! | VORTEX | tight differential rotation, complexity-scaled y wave |
//! | FLOW | sinusoidal drift with cross-axis coupling |
//! | CHAOS | per-axis random jitter, redrawn every frame |
//! | EXPAND | outward march with recycling near the origin |

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::params::{Mode, ParamSet};

/// Fixed multiplier applied to `speed` before any rule reads it.
pub const SPEED_SCALE: f32 = 0.2;

/// Pre-move magnitude beyond which EXPAND recycles a particle.
const EXPAND_LIMIT: f32 = 10.0;

/// Advance every particle by one frame of the active mode's rule.
///
/// `elapsed` is the monotonic time since the frame loop started, in seconds.
/// Rules that wave over time read it directly instead of accumulating a
/// fixed step, so variable frame intervals are tolerated.
pub fn step(positions: &mut [Vec3], params: &ParamSet, elapsed: f32, rng: &mut SmallRng) {
    let scaled = params.speed * SPEED_SCALE;

    match params.mode {
        Mode::Orbit => orbit(positions, scaled),
        Mode::Galaxy => galaxy(positions, scaled, elapsed),
        Mode::Vortex => vortex(positions, scaled, params.complexity, elapsed),
        Mode::Flow => flow(positions, scaled, elapsed),
        Mode::Chaos => chaos(positions, scaled, rng),
        Mode::Expand => expand(positions, scaled, rng),
    }
}

/// Standard rotation in the (x, z) plane. Exactly radius-preserving.
#[inline]
fn rotate_xz(p: &mut Vec3, angle: f32) {
    let (sin, cos) = angle.sin_cos();
    let x = p.x * cos - p.z * sin;
    let z = p.x * sin + p.z * cos;
    p.x = x;
    p.z = z;
}

fn orbit(positions: &mut [Vec3], scaled: f32) {
    let angle = scaled * 0.1;
    for p in positions {
        rotate_xz(p, angle);
    }
}

fn galaxy(positions: &mut [Vec3], scaled: f32, elapsed: f32) {
    for p in positions {
        let d = (p.x * p.x + p.z * p.z).sqrt();
        // Tighter spiral near the core.
        rotate_xz(p, 1.0 / (d + 0.1) * scaled * 0.5);
        p.y += (elapsed * scaled + d * 2.0).sin() * 0.002;
    }
}

fn vortex(positions: &mut [Vec3], scaled: f32, complexity: f32, elapsed: f32) {
    for p in positions {
        let d = (p.x * p.x + p.z * p.z).sqrt();
        rotate_xz(p, 1.5 / (d + 0.5) * scaled);
        p.y += (d * 2.0 - elapsed).sin() * 0.01 * complexity;
    }
}

fn flow(positions: &mut [Vec3], scaled: f32, elapsed: f32) {
    let t = elapsed * scaled;
    for p in positions {
        // Cross-axis coupling: x drifts with y, y with x, z with itself.
        let dx = (p.y * 0.5 + t).sin() * 0.01;
        let dy = (p.x * 0.5 + t).cos() * 0.01;
        let dz = (p.z * 0.5 + t).sin() * 0.01;
        p.x += dx;
        p.y += dy;
        p.z += dz;
    }
}

fn chaos(positions: &mut [Vec3], scaled: f32, rng: &mut SmallRng) {
    for p in positions {
        p.x += (rng.gen::<f32>() - 0.5) * 0.05 * scaled;
        p.y += (rng.gen::<f32>() - 0.5) * 0.05 * scaled;
        p.z += (rng.gen::<f32>() - 0.5) * 0.05 * scaled;
    }
}

fn expand(positions: &mut [Vec3], scaled: f32, rng: &mut SmallRng) {
    for p in positions {
        let mag = p.length();
        // A particle sitting exactly at the origin has no outward direction;
        // it waits there until something else moves it.
        if mag > f32::EPSILON {
            *p += *p / mag * (0.02 * scaled);
        }
        // Recycle based on the pre-move magnitude, replacing all three
        // coordinates at once.
        if mag > EXPAND_LIMIT {
            *p = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 0.5,
                (rng.gen::<f32>() - 0.5) * 0.5,
                (rng.gen::<f32>() - 0.5) * 0.5,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamUpdate;
    use rand::SeedableRng;

    const EPS: f32 = 1e-5;

    fn test_rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn params_with(mode: Mode, speed: f32, complexity: f32) -> ParamSet {
        let mut params = ParamSet::default();
        params.apply(&ParamUpdate {
            mode: Some(mode),
            speed: Some(speed),
            complexity: Some(complexity),
            ..Default::default()
        });
        params
    }

    #[test]
    fn test_rotate_xz_preserves_radius() {
        let mut p = Vec3::new(1.7, 0.3, -2.4);
        let before = p.x * p.x + p.z * p.z;
        rotate_xz(&mut p, 1.234);
        let after = p.x * p.x + p.z * p.z;
        assert!((before - after).abs() < EPS);
        assert_eq!(p.y, 0.3);
    }

    #[test]
    fn test_orbit_rotates_by_scaled_angle() {
        let params = params_with(Mode::Orbit, 2.0, 0.5);
        let mut positions = [Vec3::new(1.0, 5.0, 0.0)];
        step(&mut positions, &params, 0.0, &mut test_rng());

        // speed 2.0 -> scaled 0.4 -> angle 0.04
        let angle = 0.04f32;
        assert!((positions[0].x - angle.cos()).abs() < EPS);
        assert!((positions[0].z - angle.sin()).abs() < EPS);
        assert_eq!(positions[0].y, 5.0);
    }

    #[test]
    fn test_galaxy_matches_reference_step() {
        let params = params_with(Mode::Galaxy, 1.0, 0.5);
        let mut positions = [Vec3::new(2.0, 0.0, 0.0)];
        step(&mut positions, &params, 0.0, &mut test_rng());

        let angle: f32 = 1.0 / 2.1 * 0.2 * 0.5;
        assert!((positions[0].x - 2.0 * angle.cos()).abs() < EPS);
        assert!((positions[0].z - 2.0 * angle.sin()).abs() < EPS);
        assert!((positions[0].y - (4.0f32).sin() * 0.002).abs() < EPS);
    }

    #[test]
    fn test_galaxy_preserves_xz_radius() {
        let params = params_with(Mode::Galaxy, 3.0, 0.5);
        let mut positions = [Vec3::new(0.4, 1.0, -2.0), Vec3::new(3.0, -1.0, 0.1)];
        let before: Vec<f32> = positions.iter().map(|p| p.x * p.x + p.z * p.z).collect();
        step(&mut positions, &params, 7.5, &mut test_rng());

        for (p, r) in positions.iter().zip(before) {
            assert!((p.x * p.x + p.z * p.z - r).abs() < EPS);
        }
    }

    #[test]
    fn test_vortex_preserves_xz_radius() {
        let params = params_with(Mode::Vortex, 5.0, 1.0);
        let mut positions = [Vec3::new(0.2, 0.0, 0.3), Vec3::new(-2.5, 2.0, 1.0)];
        let before: Vec<f32> = positions.iter().map(|p| p.x * p.x + p.z * p.z).collect();
        step(&mut positions, &params, 3.0, &mut test_rng());

        for (p, r) in positions.iter().zip(before) {
            assert!((p.x * p.x + p.z * p.z - r).abs() < EPS);
        }
    }

    #[test]
    fn test_vortex_wave_scales_with_complexity() {
        let still = params_with(Mode::Vortex, 1.0, 0.0);
        let mut positions = [Vec3::new(1.0, 0.5, 0.0)];
        step(&mut positions, &still, 2.0, &mut test_rng());
        // Zero complexity means no vertical wave at all.
        assert!((positions[0].y - 0.5).abs() < EPS);

        let full = params_with(Mode::Vortex, 1.0, 1.0);
        let mut positions = [Vec3::new(1.0, 0.5, 0.0)];
        step(&mut positions, &full, 2.0, &mut test_rng());
        let expected = 0.5 + (2.0f32 - 2.0).sin() * 0.01;
        assert!((positions[0].y - expected).abs() < EPS);
    }

    #[test]
    fn test_flow_deltas_match_formulas() {
        let params = params_with(Mode::Flow, 1.0, 0.5);
        let start = Vec3::new(1.0, 2.0, 3.0);
        let mut positions = [start];
        step(&mut positions, &params, 0.5, &mut test_rng());

        let t = 0.5 * 0.2;
        assert!((positions[0].x - (start.x + (start.y * 0.5 + t).sin() * 0.01)).abs() < EPS);
        assert!((positions[0].y - (start.y + (start.x * 0.5 + t).cos() * 0.01)).abs() < EPS);
        assert!((positions[0].z - (start.z + (start.z * 0.5 + t).sin() * 0.01)).abs() < EPS);
    }

    #[test]
    fn test_chaos_jitter_is_bounded() {
        let params = params_with(Mode::Chaos, 4.0, 0.5);
        let limit = 0.025 * 4.0 * SPEED_SCALE + EPS;
        let mut rng = test_rng();

        let start: Vec<Vec3> = (0..100).map(|i| Vec3::splat(i as f32)).collect();
        let mut positions = start.clone();
        step(&mut positions, &params, 1.0, &mut rng);

        for (p, s) in positions.iter().zip(&start) {
            assert!((p.x - s.x).abs() <= limit);
            assert!((p.y - s.y).abs() <= limit);
            assert!((p.z - s.z).abs() <= limit);
        }
    }

    #[test]
    fn test_expand_moves_outward() {
        let params = params_with(Mode::Expand, 1.0, 0.5);
        let mut positions = [Vec3::new(3.0, 0.0, 4.0)];
        step(&mut positions, &params, 0.0, &mut test_rng());

        // Unit direction (0.6, 0, 0.8) times 0.02 * 0.2.
        assert!((positions[0].x - (3.0 + 0.6 * 0.004)).abs() < EPS);
        assert!((positions[0].z - (4.0 + 0.8 * 0.004)).abs() < EPS);
        assert!((positions[0].length() - 5.004).abs() < EPS);
    }

    #[test]
    fn test_expand_recycles_far_particles() {
        let params = params_with(Mode::Expand, 5.0, 0.5);
        let mut rng = test_rng();
        let mut positions: Vec<Vec3> = (0..50).map(|i| Vec3::splat(6.0 + i as f32)).collect();
        step(&mut positions, &params, 0.0, &mut rng);

        for p in &positions {
            assert!(p.x.abs() <= 0.25 && p.y.abs() <= 0.25 && p.z.abs() <= 0.25);
        }
    }

    #[test]
    fn test_expand_keeps_near_particles() {
        let params = params_with(Mode::Expand, 1.0, 0.5);
        let mut positions = [Vec3::new(9.9, 0.0, 0.0)];
        step(&mut positions, &params, 0.0, &mut test_rng());
        // Just under the limit: marches outward, no recycle yet.
        assert!((positions[0].x - 9.904).abs() < EPS);
    }

    #[test]
    fn test_expand_leaves_origin_particle_alone() {
        let params = params_with(Mode::Expand, 1.0, 0.5);
        let mut positions = [Vec3::ZERO];
        step(&mut positions, &params, 0.0, &mut test_rng());
        assert_eq!(positions[0], Vec3::ZERO);
        assert!(positions[0].x.is_finite());
    }
}
