//! Pixel color types shared by the mapper, the engine and the LED outputs.

use serde::{Deserialize, Serialize};

/// Hue/saturation/value color with every channel on a 0-255 scale.
///
/// Hue wraps around the full color wheel: 0 is red, 85 green, 170 blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const BLACK: Hsv = Hsv::new(0, 0, 0);

    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Same hue and saturation with a different value.
    pub const fn with_value(self, v: u8) -> Self {
        Self { v, ..self }
    }

    pub fn to_rgb(self) -> Rgb {
        if self.s == 0 {
            return Rgb::new(self.v, self.v, self.v);
        }

        let v = self.v as u32;
        let s = self.s as u32;
        // Six 43-step sectors around the wheel.
        let sector = self.h / 43;
        let remainder = (self.h as u32 - sector as u32 * 43) * 6;

        let p = (v * (255 - s)) / 255;
        let q = (v * (255 - (s * remainder) / 255)) / 255;
        let t = (v * (255 - (s * (255 - remainder)) / 255)) / 255;

        let (r, g, b) = match sector {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Rgb::new(r as u8, g as u8, b as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Byte order expected by ws281x strips in GRB-with-white mode.
    pub fn to_bgrw(self) -> [u8; 4] {
        [self.b, self.g, self.r, 0]
    }
}

impl From<Hsv> for Rgb {
    fn from(hsv: Hsv) -> Self {
        hsv.to_rgb()
    }
}

/// Scale a 0-255 channel by `velocity / 127`, rounded and clamped.
pub fn scale_by_velocity(channel: u8, velocity: u8) -> u8 {
    let velocity = velocity & 0x7F;
    ((velocity as f32 / 127.0) * channel as f32).round().clamp(0.0, 255.0) as u8
}
