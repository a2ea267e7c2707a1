use bevy::log::warn;

use crate::palette::{Rgb, WheelColor};
use crate::settings::WheelSettings;

pub const SEGMENT_COUNT: usize = 6;
pub const SEGMENT_ANGLE: f32 = 360.0 / SEGMENT_COUNT as f32;

/// Wraps an angle into `[0, 360)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `360.0`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Index of the segment nearest the top for a wheel rotated by `rotation_angle` degrees.
pub fn segment_index(rotation_angle: f32) -> usize {
    let wrapped = wrap_degrees(rotation_angle);
    (wrapped / SEGMENT_ANGLE).round() as usize % SEGMENT_COUNT
}

/// Reported once, on the tick where a spin decays below the stop threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stopped {
    pub segment: usize,
    pub color: Rgb,
    pub wheel_color: Option<WheelColor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelMotion {
    rotation_angle: f32,
    angular_speed: f32,
    is_spinning: bool,
    segments: [Option<WheelColor>; SEGMENT_COUNT],
    friction: f32,
    reference_fps: f32,
    stop_threshold: f32,
}

impl WheelMotion {
    pub fn new(settings: &WheelSettings) -> Self {
        Self {
            rotation_angle: 0.0,
            angular_speed: 0.0,
            is_spinning: false,
            segments: [None; SEGMENT_COUNT],
            friction: settings.friction,
            reference_fps: settings.reference_fps,
            stop_threshold: settings.stop_threshold,
        }
    }

    pub const fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub const fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    pub const fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    /// Paints the wheel. Anything but exactly six colors is refused.
    pub fn set_colors(&mut self, colors: &[WheelColor]) -> bool {
        if colors.len() != SEGMENT_COUNT {
            warn!(
                "The wheel needs exactly {SEGMENT_COUNT} colors, got {}",
                colors.len()
            );
            return false;
        }
        for (segment, color) in self.segments.iter_mut().zip(colors) {
            *segment = Some(*color);
        }
        true
    }

    pub fn spin(&mut self, initial_speed: f32, direction: f32) {
        self.angular_speed = initial_speed * direction;
        self.is_spinning = true;
    }

    /// Rotates the wheel directly, as when it is dragged by the pointer.
    pub fn drag(&mut self, degrees: f32) {
        self.rotation_angle = wrap_degrees(self.rotation_angle + degrees);
    }

    /// Stops without reporting a stop.
    pub const fn halt(&mut self) {
        self.angular_speed = 0.0;
        self.is_spinning = false;
    }

    pub fn tick(&mut self, delta: f32) -> Option<Stopped> {
        if !self.is_spinning {
            return None;
        }

        self.rotation_angle = wrap_degrees(self.angular_speed.mul_add(delta, self.rotation_angle));

        // Friction is tuned per reference frame; scaling the exponent by the
        // elapsed frames keeps the decay identical at any frame rate.
        self.angular_speed *= self.friction.powf(delta * self.reference_fps);

        if self.angular_speed.abs() < self.stop_threshold {
            self.halt();
            return Some(self.at_top());
        }
        None
    }

    pub fn at_top(&self) -> Stopped {
        let segment = segment_index(self.rotation_angle);
        let wheel_color = self.segments.get(segment).copied().flatten();
        Stopped {
            segment,
            color: wheel_color.map_or(Rgb::WHITE, WheelColor::rgb),
            wheel_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn painted_wheel() -> WheelMotion {
        let mut wheel = WheelMotion::new(&WheelSettings::default());
        assert!(wheel.set_colors(&WheelColor::wheel_layout()), "six colors are accepted");
        wheel
    }

    #[test]
    fn segment_index_stays_in_range() {
        let mut angle = -1080.0_f32;
        while angle <= 1080.0 {
            assert!(segment_index(angle) < SEGMENT_COUNT, "angle {angle} out of range");
            angle += 0.37;
        }
        for edge in [359.999, -0.0001, 330.0, 29.999, 30.0, f32::NAN] {
            assert!(segment_index(edge) < SEGMENT_COUNT, "edge {edge} out of range");
        }
    }

    #[test]
    fn segment_index_rounds_to_nearest() {
        assert_eq!(segment_index(0.0), 0);
        assert_eq!(segment_index(29.0), 0);
        assert_eq!(segment_index(31.0), 1);
        assert_eq!(segment_index(120.0), 2);
        assert_eq!(segment_index(345.0), 0);
        assert_eq!(segment_index(-60.0), 5);
    }

    #[test]
    fn wrong_color_count_is_a_no_op() {
        let mut wheel = WheelMotion::new(&WheelSettings::default());
        assert!(!wheel.set_colors(&[WheelColor::Red, WheelColor::Blue]), "two colors refused");
        assert_eq!(wheel.at_top().wheel_color, None, "segments stay unpainted");
        assert_eq!(wheel.at_top().color, Rgb::WHITE, "unpainted reads as white");
    }

    #[test]
    fn spin_reports_stopped_within_bounded_ticks() {
        let mut wheel = painted_wheel();
        wheel.spin(300.0, 1.0);

        let mut ticks = 0;
        let stopped = loop {
            ticks += 1;
            if let Some(stopped) = wheel.tick(FRAME) {
                break stopped;
            }
            assert!(ticks < 200, "wheel never stopped");
        };

        // 300 * 0.95^n < 10 first holds at n = 67.
        assert!((60..=75).contains(&ticks), "stopped after {ticks} ticks");
        assert!(!wheel.is_spinning(), "stopped wheel is not spinning");
        assert!(wheel.angular_speed().abs() < f32::EPSILON, "stopped wheel has no speed");
        assert_eq!(stopped.segment, segment_index(wheel.rotation_angle()));
    }

    #[test]
    fn friction_only_ever_shrinks_the_speed() {
        let mut wheel = painted_wheel();
        wheel.spin(500.0, -1.0);
        let mut previous = wheel.angular_speed().abs();
        for _ in 0..400 {
            wheel.tick(FRAME);
            let current = wheel.angular_speed().abs();
            assert!(current <= previous, "speed grew from {previous} to {current}");
            previous = current;
        }
        assert!(previous < f32::EPSILON, "wheel should have come to rest");

        for _ in 0..100 {
            assert_eq!(wheel.tick(FRAME), None, "a resting wheel never reports again");
            assert!(wheel.angular_speed().abs() < f32::EPSILON, "speed stays zero");
        }
    }

    #[test]
    fn friction_is_frame_rate_independent() {
        let mut fast = painted_wheel();
        let mut slow = painted_wheel();
        fast.spin(400.0, 1.0);
        slow.spin(400.0, 1.0);

        for _ in 0..4 {
            fast.tick(1.0 / 120.0);
        }
        slow.tick(1.0 / 30.0);

        assert!(
            (fast.angular_speed() - slow.angular_speed()).abs() < 0.01,
            "{} vs {}",
            fast.angular_speed(),
            slow.angular_speed()
        );
    }

    #[test]
    fn rotation_stays_wrapped() {
        let mut wheel = painted_wheel();
        wheel.spin(2000.0, -1.0);
        for _ in 0..30 {
            wheel.tick(FRAME);
            let angle = wheel.rotation_angle();
            assert!((0.0..360.0).contains(&angle), "angle {angle} escaped the wrap");
        }
    }

    #[test]
    fn tiny_negative_angles_wrap_to_zero() {
        assert!(wrap_degrees(-1e-8) < 360.0, "got {}", wrap_degrees(-1e-8));
        assert!((wrap_degrees(-1e-8)).abs() < f32::EPSILON, "rounds onto zero");
        assert!((wrap_degrees(360.0)).abs() < f32::EPSILON, "full turn is zero");
        assert!((wrap_degrees(-90.0) - 270.0).abs() < 1e-4, "ordinary negatives wrap");

        let mut wheel = painted_wheel();
        wheel.drag(-1e-8);
        let angle = wheel.rotation_angle();
        assert!((0.0..360.0).contains(&angle), "angle {angle} escaped the wrap");
        assert_eq!(wheel.at_top().segment, 0, "still the first segment");
    }

    #[test]
    fn drag_moves_without_spinning() {
        let mut wheel = painted_wheel();
        wheel.drag(-120.0);
        assert!((wheel.rotation_angle() - 240.0).abs() < 1e-3, "dragged angle wraps");
        assert!(!wheel.is_spinning(), "dragging is not spinning");
        assert_eq!(wheel.tick(FRAME), None, "dragging never reports a stop");
        assert_eq!(wheel.at_top().wheel_color, Some(WheelColor::Magenta));
    }
}
