use bevy::math::Vec2;

use crate::settings::WheelSettings;

/// Signed angle in degrees from `from` to `to`, counter-clockwise positive.
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    from.perp_dot(to).atan2(from.dot(to)).to_degrees()
}

/// A release fast and long enough to set the wheel spinning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flick {
    /// `1.0` counter-clockwise, `-1.0` clockwise.
    pub direction: f32,
    /// Scales the level's spin speed.
    pub multiplier: f32,
}

/// Turns a single pointer's down/move/up stream into drag rotations and flicks.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeTracker {
    center: Vec2,
    start: Vec2,
    last: Vec2,
    started_at: f32,
    touching: bool,
    sensitivity: f32,
    min_distance: f32,
    max_seconds: f32,
    distance_divisor: f32,
    multiplier_range: (f32, f32),
}

impl SwipeTracker {
    pub fn new(center: Vec2, settings: &WheelSettings) -> Self {
        Self {
            center,
            start: Vec2::ZERO,
            last: Vec2::ZERO,
            started_at: 0.0,
            touching: false,
            sensitivity: settings.swipe_sensitivity,
            min_distance: settings.min_swipe_distance,
            max_seconds: settings.max_flick_seconds,
            distance_divisor: settings.flick_distance_divisor,
            multiplier_range: (
                settings.min_flick_multiplier,
                settings.max_flick_multiplier,
            ),
        }
    }

    pub const fn is_touching(&self) -> bool {
        self.touching
    }

    pub const fn begin(&mut self, position: Vec2, now: f32) {
        self.start = position;
        self.last = position;
        self.started_at = now;
        self.touching = true;
    }

    /// Degrees to rotate the wheel by while it is being dragged.
    pub fn drag(&mut self, position: Vec2) -> Option<f32> {
        if !self.touching {
            return None;
        }
        let degrees = signed_angle(self.last - self.center, position - self.center);
        self.last = position;
        Some(degrees * self.sensitivity)
    }

    pub fn release(&mut self, position: Vec2, now: f32) -> Option<Flick> {
        if !self.touching {
            return None;
        }
        self.touching = false;

        let distance = self.start.distance(position);
        let elapsed = now - self.started_at;
        if distance <= self.min_distance || elapsed >= self.max_seconds {
            return None;
        }

        let swept = signed_angle(self.start - self.center, position - self.center);
        let (min, max) = self.multiplier_range;
        Some(Flick {
            direction: swept.signum(),
            multiplier: (distance / self.distance_divisor).clamp(min, max),
        })
    }

    pub const fn cancel(&mut self) {
        self.touching = false;
    }
}
