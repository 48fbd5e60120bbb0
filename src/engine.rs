//! Frame-by-frame particle engine.
//!
//! The [`Engine`] owns the particle buffer and one RNG, and is driven from a
//! single thread: [`Engine::sync`] reconciles the buffer with the latest
//! parameter snapshot (rebuilds on count change, recolors on appearance
//! change), then [`Engine::tick`] advances one frame. Dirty flags tell the
//! presentation host which attribute streams need re-uploading.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::buffer::ParticleBuffer;
use crate::interaction::{self, InteractionPoint};
use crate::motion;
use crate::params::{ParamSet, MAX_COUNT, MIN_COUNT};

/// Material-level attributes derived from the parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Rendered point size.
    pub point_size: f32,
    /// Final opacity: the base value scaled by brightness.
    pub opacity: f32,
}

impl Appearance {
    /// Opacity before the brightness multiplier.
    pub const BASE_OPACITY: f32 = 0.8;

    fn of(params: &ParamSet) -> Self {
        Self {
            point_size: params.size,
            opacity: Self::BASE_OPACITY * params.brightness,
        }
    }
}

/// Owns the particle state and advances it one frame at a time.
pub struct Engine {
    buffer: ParticleBuffer,
    rng: SmallRng,
    applied: ParamSet,
    colors_dirty: bool,
    rebuilt: bool,
}

impl Engine {
    /// Seed a fresh buffer for `params`.
    pub fn new(params: &ParamSet) -> Self {
        let mut rng = SmallRng::from_entropy();
        let buffer = ParticleBuffer::new(params.count, params.color1, params.color2, &mut rng);
        Self {
            buffer,
            rng,
            applied: params.clone(),
            colors_dirty: true,
            rebuilt: true,
        }
    }

    /// Reconcile the buffer with a new parameter snapshot.
    ///
    /// A count change reseeds the whole buffer. Any change to the colors,
    /// size or brightness re-randomizes every particle color along the new
    /// gradient, so a fresh palette lands everywhere at once. An
    /// out-of-range count is rejected, but the rest of the snapshot still
    /// lands on the buffer kept in service. Identical snapshots do nothing.
    pub fn sync(&mut self, params: &ParamSet) {
        if params.count != self.applied.count && self.rebuild(params) {
            self.applied = params.clone();
            return;
        }
        // Count unchanged, or an out-of-range count left the old buffer in
        // place; either way the rest of the snapshot applies to it.
        if Self::appearance_changed(&self.applied, params) {
            self.buffer
                .recolor(params.color1, params.color2, &mut self.rng);
            self.colors_dirty = true;
        }
        self.applied = ParamSet {
            count: self.applied.count,
            ..params.clone()
        };
    }

    /// Advance one frame: the attractor pre-step, then the mode rule.
    pub fn tick(&mut self, params: &ParamSet, point: &InteractionPoint, elapsed: f32) {
        interaction::attract(self.buffer.positions_mut(), point);
        motion::step(self.buffer.positions_mut(), params, elapsed, &mut self.rng);
    }

    fn appearance_changed(old: &ParamSet, new: &ParamSet) -> bool {
        old.color1 != new.color1
            || old.color2 != new.color2
            || old.size != new.size
            || old.brightness != new.brightness
    }

    /// Replace the buffer with a freshly seeded one. The replacement is
    /// fully built before the old buffer is dropped; an out-of-range count
    /// leaves the current buffer in place and reports `false`.
    fn rebuild(&mut self, params: &ParamSet) -> bool {
        if !(MIN_COUNT..=MAX_COUNT).contains(&params.count) {
            return false;
        }
        self.buffer =
            ParticleBuffer::new(params.count, params.color1, params.color2, &mut self.rng);
        self.colors_dirty = true;
        self.rebuilt = true;
        true
    }

    #[inline]
    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    /// Attributes for the material, from the last synced snapshot.
    #[inline]
    pub fn appearance(&self) -> Appearance {
        Appearance::of(&self.applied)
    }

    /// True once if colors changed since the last call.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::take(&mut self.colors_dirty)
    }

    /// True once if the buffer was reseeded since the last call. The host
    /// must resize its storage before the next upload.
    pub fn take_rebuilt(&mut self) -> bool {
        std::mem::take(&mut self.rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Color, Mode, ParamUpdate};

    fn updated(base: &ParamSet, update: ParamUpdate) -> ParamSet {
        let mut params = base.clone();
        params.apply(&update);
        params
    }

    #[test]
    fn test_new_seeds_requested_count() {
        let params = ParamSet::default();
        let engine = Engine::new(&params);
        assert_eq!(engine.buffer().len(), params.count as usize);
    }

    #[test]
    fn test_sync_same_params_is_idle() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_colors_dirty();
        engine.take_rebuilt();

        engine.sync(&params.clone());
        assert!(!engine.take_colors_dirty());
        assert!(!engine.take_rebuilt());
        assert_eq!(engine.appearance(), engine.appearance());
    }

    #[test]
    fn test_sync_count_change_rebuilds() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_rebuilt();

        let bigger = updated(&params, ParamUpdate {
            count: Some(60_000),
            ..Default::default()
        });
        engine.sync(&bigger);
        assert!(engine.take_rebuilt());
        assert_eq!(engine.buffer().len(), 60_000);
        assert_eq!(engine.buffer().colors().len(), 60_000);
        assert_eq!(engine.buffer().sizes().len(), 60_000);
    }

    #[test]
    fn test_sync_rejects_raw_out_of_range_count() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_rebuilt();

        // A hand-built snapshot that skipped the merge path.
        let mut bad = params.clone();
        bad.count = 0;
        engine.sync(&bad);
        assert!(!engine.take_rebuilt());
        assert_eq!(engine.buffer().len(), params.count as usize);

        // A later valid count still goes through.
        let mut good = params;
        good.count = 2_000;
        engine.sync(&good);
        assert!(engine.take_rebuilt());
        assert_eq!(engine.buffer().len(), 2_000);
    }

    #[test]
    fn test_rejected_count_still_applies_palette() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_colors_dirty();
        engine.take_rebuilt();

        // A hand-built snapshot pairing an invalid count with a new palette.
        let red = Color::rgb8(0xff, 0x00, 0x00);
        let mut bad = params.clone();
        bad.count = 0;
        bad.color1 = red;
        bad.color2 = red;
        engine.sync(&bad);

        // The old buffer stays in service, wearing the new colors.
        assert!(!engine.take_rebuilt());
        assert!(engine.take_colors_dirty());
        assert_eq!(engine.buffer().len(), params.count as usize);
        for color in engine.buffer().colors() {
            assert!((*color - red.0).length() < 1e-6);
        }

        // The same palette arriving later with the served count is not a
        // fresh change.
        let mut settled = bad.clone();
        settled.count = params.count;
        engine.sync(&settled);
        assert!(!engine.take_colors_dirty());
        assert!(!engine.take_rebuilt());
    }

    #[test]
    fn test_sync_recolors_on_palette_change() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_colors_dirty();

        let shifted = updated(&params, ParamUpdate {
            color1: Some(Color::rgb8(0xff, 0x00, 0x00)),
            ..Default::default()
        });
        engine.sync(&shifted);
        assert!(engine.take_colors_dirty());
        assert!(!engine.take_rebuilt());
    }

    #[test]
    fn test_sync_recolors_on_brightness_change() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_colors_dirty();

        let brighter = updated(&params, ParamUpdate {
            brightness: Some(1.5),
            ..Default::default()
        });
        engine.sync(&brighter);
        assert!(engine.take_colors_dirty());
        assert!((engine.appearance().opacity - 0.8 * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mode_and_speed_changes_touch_nothing() {
        let params = ParamSet::default();
        let mut engine = Engine::new(&params);
        engine.take_colors_dirty();
        engine.take_rebuilt();

        let retuned = updated(&params, ParamUpdate {
            mode: Some(Mode::Chaos),
            speed: Some(3.0),
            complexity: Some(0.9),
            ..Default::default()
        });
        engine.sync(&retuned);
        assert!(!engine.take_colors_dirty());
        assert!(!engine.take_rebuilt());
    }

    #[test]
    fn test_appearance_values() {
        let params = updated(&ParamSet::default(), ParamUpdate {
            size: Some(0.12),
            brightness: Some(0.5),
            ..Default::default()
        });
        let engine = Engine::new(&params);
        let appearance = engine.appearance();
        assert_eq!(appearance.point_size, 0.12);
        assert!((appearance.opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_tick_keeps_lengths_in_lockstep() {
        let mut params = ParamSet::default();
        params.apply(&ParamUpdate {
            count: Some(1_000),
            ..Default::default()
        });
        let mut engine = Engine::new(&params);

        let mut elapsed = 0.0;
        for mode in Mode::ALL {
            params.apply(&ParamUpdate {
                mode: Some(mode),
                ..Default::default()
            });
            engine.sync(&params);
            for _ in 0..5 {
                elapsed += 1.0 / 60.0;
                engine.tick(&params, &InteractionPoint::inactive(), elapsed);
            }
            assert_eq!(engine.buffer().positions().len(), 1_000);
            assert_eq!(engine.buffer().colors().len(), 1_000);
            assert_eq!(engine.buffer().sizes().len(), 1_000);
        }
    }

    #[test]
    fn test_tick_runs_attractor_before_mode_rule() {
        let mut params = ParamSet::default();
        params.apply(&ParamUpdate {
            count: Some(1_000),
            mode: Some(Mode::Orbit),
            ..Default::default()
        });
        let mut engine = Engine::new(&params);

        // Place one particle by hand, attract from unit distance, and check
        // the pull happened in pre-rotation space.
        let start = glam::Vec3::new(2.0, 0.0, 0.0);
        let point = InteractionPoint::at(glam::Vec3::new(2.0, 0.0, 1.0));
        let staged = {
            let mut buffer =
                ParticleBuffer::new(1_000, params.color1, params.color2, &mut SmallRng::seed_from_u64(7));
            buffer.positions_mut()[0] = start;
            buffer
        };
        engine.buffer = staged;

        engine.tick(&params, &point, 0.0);

        let angle = params.speed * 0.2 * 0.1;
        let pulled_z = 0.04; // unit distance pull
        let expected_x = start.x * angle.cos() - pulled_z * angle.sin();
        let expected_z = start.x * angle.sin() + pulled_z * angle.cos();
        let got = engine.buffer().positions()[0];
        assert!((got.x - expected_x).abs() < 1e-5);
        assert!((got.z - expected_z).abs() < 1e-5);
    }
}
