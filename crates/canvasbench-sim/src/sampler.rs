//! Seeded random sampling for spawn parameters

use canvasbench_core::Vec2;
use rand::rngs::SmallRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

/// Deterministic source of spawn randomness.
///
/// The engine receives its sampler at construction; two engines built with
/// the same seed and fed the same ticks produce identical snapshots.
pub struct SpawnSampler {
    rng: SmallRng,
}

impl SpawnSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Returns a float in [min, max). Degenerate or unbounded spans return a bound.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if !min.is_finite() || !max.is_finite() {
            return max;
        }
        if max <= min {
            return min;
        }
        if !(max - min).is_finite() {
            // gen_range panics when the span overflows
            let t = self.next_f32();
            return (min * (1.0 - t) + max * t).clamp(min, max);
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform point inside the axis-aligned rectangle `[min, max]`
    pub fn point_in_rect(&mut self, min: Vec2, max: Vec2) -> Vec2 {
        Vec2::new(self.range(min.x, max.x), self.range(min.y, max.y))
    }

    /// Unit direction within `spread_deg` of `direction_deg`
    pub fn direction(&mut self, direction_deg: f32, spread_deg: f32) -> Vec2 {
        if spread_deg >= 180.0 {
            return Vec2::from_angle(self.range(0.0, std::f32::consts::TAU));
        }
        let offset = if spread_deg > 0.0 {
            self.range(-spread_deg, spread_deg)
        } else {
            0.0
        };
        Vec2::from_angle((direction_deg + offset).to_radians())
    }

    /// Uniformly pick one element
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// `amount` distinct indices in `0..len`, in random order
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}
