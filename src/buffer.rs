//! Particle attribute storage.
//!
//! [`ParticleBuffer`] owns the per-particle state the renderer uploads each
//! frame: positions (mutated every tick), colors (mutated only when the
//! appearance parameters change) and a fixed size jitter drawn at creation.
//! The three arrays always have the same length; a change in particle count
//! means a new buffer, never a resize.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;

use crate::params::Color;

/// Inner radius of the spawn shell.
const SHELL_INNER: f32 = 2.0;
/// Shell thickness; particles spawn with radius in [SHELL_INNER, SHELL_INNER + SHELL_DEPTH].
const SHELL_DEPTH: f32 = 2.0;

/// Positions, colors and size jitter for every rendered point.
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
}

impl ParticleBuffer {
    /// Seed a new buffer: uniform positions on a spherical shell, colors
    /// interpolated between the two endpoints with an independent random mix
    /// per particle, and size jitter uniform in [0, 1).
    pub fn new(count: u32, color1: Color, color2: Color, rng: &mut SmallRng) -> Self {
        let count = count as usize;
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            let r = SHELL_INNER + rng.gen::<f32>() * SHELL_DEPTH;
            let theta = rng.gen::<f32>() * TAU;
            // acos of a uniform value in [-1, 1] gives uniform density on the sphere
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();

            positions.push(Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            ));
            colors.push(color1.0.lerp(color2.0, rng.gen()));
            sizes.push(rng.gen());
        }

        Self {
            positions,
            colors,
            sizes,
        }
    }

    /// Redraw every particle color with a fresh random mix of the endpoints.
    /// Old colors are discarded, not blended.
    pub fn recolor(&mut self, color1: Color, color2: Color, rng: &mut SmallRng) {
        for color in &mut self.colors {
            *color = color1.0.lerp(color2.0, rng.gen());
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }
}
