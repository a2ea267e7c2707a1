use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Maximum per-channel difference for two colors to count as the same.
pub const MATCH_TOLERANCE: f32 = 0.1;

/// A color on a 0-1 channel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Read from a segment that never had a color assigned.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Every channel must be strictly within `tolerance` of the other color.
    pub fn matches(self, other: Self, tolerance: f32) -> bool {
        (self.r - other.r).abs() < tolerance
            && (self.g - other.g).abs() < tolerance
            && (self.b - other.b).abs() < tolerance
    }
}

/// The six colors painted on the wheel, in wheel order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr,
)]
pub enum WheelColor {
    Red,
    Blue,
    Green,
    Yellow,
    Magenta,
    Cyan,
}

impl WheelColor {
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Red => Rgb::new(1.0, 0.0, 0.0),
            Self::Blue => Rgb::new(0.0, 0.0, 1.0),
            Self::Green => Rgb::new(0.0, 1.0, 0.0),
            Self::Yellow => Rgb::new(1.0, 0.92, 0.016),
            Self::Magenta => Rgb::new(1.0, 0.0, 1.0),
            Self::Cyan => Rgb::new(0.0, 1.0, 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Uniform pick over all colors, repeats included.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::iter()
            .nth(rng.usize(..Self::COUNT))
            .unwrap_or(Self::Red)
    }

    /// Layout used when the wheel is built.
    pub fn wheel_layout() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl From<Rgb> for bevy::color::Color {
    fn from(Rgb { r, g, b }: Rgb) -> Self {
        Self::srgb(r, g, b)
    }
}

impl From<WheelColor> for bevy::color::Color {
    fn from(color: WheelColor) -> Self {
        color.rgb().into()
    }
}
