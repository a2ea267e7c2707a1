//! Easing curves for the UI. All of them take a progress in `[0, 1]` and
//! clamp anything outside it.

use core::f32::consts::PI;

pub const FADE_IN_SECONDS: f32 = 0.5;
pub const FADE_OUT_SECONDS: f32 = 0.3;
pub const BOUNCE_SECONDS: f32 = 0.4;
/// Grow and shrink halves together.
pub const PULSE_SECONDS: f32 = 0.2;
pub const PULSE_PEAK: f32 = 1.2;

pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

pub fn fade_alpha(elapsed: f32, duration: f32, fading_in: bool) -> f32 {
    let t = progress(elapsed, duration);
    if fading_in { t } else { 1.0 - t }
}

pub fn ease_out_bounce(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Linear up to `peak` at the halfway point, then back down to 1.
pub fn pulse_scale(t: f32, peak: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let rise = if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 };
    (peak - 1.0).mul_add(rise, 1.0)
}

/// Smooth pulse, used when the target swatch changes color.
pub fn sine_pulse(t: f32, peak: f32) -> f32 {
    (peak - 1.0).mul_add((t.clamp(0.0, 1.0) * PI).sin(), 1.0)
}
