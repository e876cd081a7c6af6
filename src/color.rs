use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::wrap_coordinate;

/// Hue in degrees `[0, 360)`, saturation and lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Hsl {
            h: wrap_coordinate(h, 360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    /// Vivid random color for a freshly spawned creature.
    pub fn random_vivid<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Hsl::new(rng.gen_range(0.0..360.0_f32).floor(), 80.0, 60.0)
    }

    /// Blend toward `other`; `weight` is the share kept from `self`.
    /// Hue takes the short way around the wheel.
    pub fn blend(&self, other: &Hsl, weight: f32) -> Hsl {
        let mut dh = other.h - self.h;
        if dh.abs() > 180.0 {
            dh -= 360.0 * dh.signum();
        }
        Hsl::new(
            self.h + (1.0 - weight) * dh,
            self.s * weight + other.s * (1.0 - weight),
            self.l * weight + other.l * (1.0 - weight),
        )
    }

    /// Desaturate by `factor` in `[0, 1]`.
    pub fn sickened(&self, factor: f32) -> Hsl {
        Hsl::new(self.h, self.s * (1.0 - factor.clamp(0.0, 1.0)), self.l)
    }

    /// Lift lightness toward white by `amount` in `[0, 1]`.
    pub fn whitened(&self, amount: f32) -> Hsl {
        let amount = amount.clamp(0.0, 1.0);
        Hsl::new(self.h, self.s, self.l + (100.0 - self.l) * amount)
    }

    /// RGB channels in `[0, 1]`.
    pub fn to_rgb(&self) -> (f32, f32, f32) {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = self.h / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        (r + m, g + m, b + m)
    }
}
