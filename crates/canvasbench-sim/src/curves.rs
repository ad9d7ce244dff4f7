//! Value-over-lifetime helpers

use std::f32::consts::TAU;

/// Fraction of the lifetime during which an entity fades out
pub const FADE_FRACTION: f32 = 0.3;

/// Opacity for an entity of the given age: fully opaque until the last 30% of
/// its lifetime, then a linear ramp down to zero. Always within [0, 1].
pub fn fade_alpha(age: f32, lifetime: f32) -> f32 {
    if lifetime.is_infinite() {
        return 1.0;
    }
    if lifetime <= 0.0 || age.is_nan() {
        return 0.0;
    }
    let fade_start = (1.0 - FADE_FRACTION) * lifetime;
    (1.0 - (age - fade_start) / (FADE_FRACTION * lifetime)).clamp(0.0, 1.0)
}

/// Wraps an angle into [0, TAU)
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Sinusoidal oscillation around `center` with the given amplitude
pub fn oscillate(center: f32, amplitude: f32, t: f32) -> f32 {
    center + amplitude * t.sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_starts_at_seventy_percent() {
        assert_eq!(fade_alpha(0.0, 10.0), 1.0);
        assert_eq!(fade_alpha(7.0, 10.0), 1.0);
        assert!((fade_alpha(8.5, 10.0) - 0.5).abs() < 1e-5);
        assert_eq!(fade_alpha(10.0, 10.0), 0.0);
        assert_eq!(fade_alpha(12.0, 10.0), 0.0);
    }

    #[test]
    fn fade_degenerate_lifetimes() {
        assert_eq!(fade_alpha(1e9, f32::INFINITY), 1.0);
        assert_eq!(fade_alpha(0.0, 0.0), 0.0);
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert!(wrap_angle(-1e-9) < TAU);
    }
}
