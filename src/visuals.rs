//! Visual configuration for particle rendering.
//!
//! This module holds everything that controls how particles look, separate
//! from the avoidance behaviour that controls how they move: the colour each
//! particle is given at construction, the particle mesh size, the light and
//! the bloom pass.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Discrete particle colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Swatch {
    Blue,
    Cyan,
    Purple,
    Green,
    Orange,
    Teal,
}

impl Swatch {
    /// Every swatch, in palette order.
    pub const ALL: [Swatch; 6] = [
        Swatch::Blue,
        Swatch::Cyan,
        Swatch::Purple,
        Swatch::Green,
        Swatch::Orange,
        Swatch::Teal,
    ];

    /// Packed 0xRRGGBB value in sRGB.
    pub fn hex(self) -> u32 {
        match self {
            Swatch::Blue => 0x7aa2f7,
            Swatch::Cyan => 0x7dcfff,
            Swatch::Purple => 0xbb9af7,
            Swatch::Green => 0x9ece6a,
            Swatch::Orange => 0xff9e64,
            Swatch::Teal => 0x73daca,
        }
    }

    /// sRGB colour, each channel 0-1.
    pub fn srgb(self) -> Vec3 {
        hex_to_srgb(self.hex())
    }

    /// Linear-light colour for shading.
    pub fn linear(self) -> Vec3 {
        let c = self.srgb();
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    }
}

/// How each particle's [`Swatch`] is chosen when a field is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPicker {
    /// Uniform random pick. `None` seeds from the clock, so every build differs.
    Random(Option<u64>),
    /// Walk the palette in order.
    Cycle,
    /// Every particle gets the same swatch.
    Fixed(Swatch),
}

impl Default for VariantPicker {
    fn default() -> Self {
        VariantPicker::Random(None)
    }
}

impl VariantPicker {
    /// Pick swatches for `count` particles.
    pub fn assign(&self, count: usize) -> Vec<Swatch> {
        match *self {
            VariantPicker::Random(seed) => {
                let seed = seed.unwrap_or_else(|| {
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_nanos() as u64)
                        .unwrap_or(42)
                });
                let mut rng = SmallRng::seed_from_u64(seed);
                (0..count)
                    .map(|_| Swatch::ALL[rng.gen_range(0..Swatch::ALL.len())])
                    .collect()
            }
            VariantPicker::Cycle => (0..count)
                .map(|i| Swatch::ALL[i % Swatch::ALL.len()])
                .collect(),
            VariantPicker::Fixed(swatch) => vec![swatch; count],
        }
    }
}

/// Half extents of the box drawn for every particle.
///
/// The long side points along local Z.
pub const PARTICLE_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.1, 0.4);

/// Bloom post-process parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Multiplier on the blurred highlights added back to the scene.
    pub strength: f32,
    /// Blur radius as a fraction of the largest kernel.
    pub radius: f32,
    /// Luminance below which pixels do not bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 4.0,
            radius: 0.5,
            threshold: 0.0,
        }
    }
}

/// Scene lighting and clear colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    /// Position of the directional light; it shines toward the origin.
    pub light_position: Vec3,
    /// Directional light intensity.
    pub intensity: f32,
    /// Flat ambient term so unlit faces are not black.
    pub ambient: f32,
    /// Background colour, packed 0xRRGGBB sRGB.
    pub background: u32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(1.0, 1.0, 2.0),
            intensity: 1.0,
            ambient: 0.08,
            background: 0x0a0a0f,
        }
    }
}

impl Lighting {
    /// Unit vector pointing from the scene toward the light.
    pub fn light_direction(&self) -> Vec3 {
        self.light_position.normalize_or_zero()
    }

    /// Background as linear RGB.
    pub fn background_linear(&self) -> Vec3 {
        let c = hex_to_srgb(self.background);
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    }
}

fn hex_to_srgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swatch_hex_decoding() {
        let orange = Swatch::Orange.srgb();
        assert!((orange.x - 1.0).abs() < 1e-6);
        assert!((orange.y - 0x9e as f32 / 255.0).abs() < 1e-6);
        assert!((orange.z - 0x64 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_is_darker_than_srgb() {
        for swatch in Swatch::ALL {
            let s = swatch.srgb();
            let l = swatch.linear();
            assert!(l.x <= s.x && l.y <= s.y && l.z <= s.z);
        }
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = VariantPicker::Random(Some(7)).assign(64);
        let b = VariantPicker::Random(Some(7)).assign(64);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cycle_and_fixed() {
        let cycled = VariantPicker::Cycle.assign(8);
        assert_eq!(cycled[0], Swatch::Blue);
        assert_eq!(cycled[6], Swatch::Blue);
        assert_eq!(cycled[7], Swatch::Cyan);

        let fixed = VariantPicker::Fixed(Swatch::Teal).assign(3);
        assert!(fixed.iter().all(|&s| s == Swatch::Teal));
    }

    #[test]
    fn test_light_direction_is_unit() {
        assert!((Lighting::default().light_direction().length() - 1.0).abs() < 1e-6);
    }
}
