use std::fmt;

use palette::{LinSrgb, Mix, Srgb};
use serde::Serialize;

/// Plain 8-bit sRGB triple, independent of the UI toolkit.
pub type Rgb8 = [u8; 3];

/// Outcome series colours used by the distribution charts.
pub const SURVIVED_COLOR: Rgb8 = [0x1f, 0x77, 0xb4];
pub const DIED_COLOR: Rgb8 = [0x88, 0x88, 0x88];

// ---------------------------------------------------------------------------
// Sequential colour themes
// ---------------------------------------------------------------------------

/// Sequential colour scheme for quantitative encodings (heatmap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blues,
    Viridis,
    Plasma,
    Magma,
    Inferno,
}

const BLUES: &[Rgb8] = &[
    [0xf7, 0xfb, 0xff],
    [0xde, 0xeb, 0xf7],
    [0xc6, 0xdb, 0xef],
    [0x9e, 0xca, 0xe1],
    [0x6b, 0xae, 0xd6],
    [0x42, 0x92, 0xc6],
    [0x21, 0x71, 0xb5],
    [0x08, 0x51, 0x9c],
    [0x08, 0x30, 0x6b],
];

const VIRIDIS: &[Rgb8] = &[
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b],
    [0xfd, 0xe7, 0x25],
];

const PLASMA: &[Rgb8] = &[
    [0x0d, 0x08, 0x87],
    [0x46, 0x03, 0x9f],
    [0x72, 0x01, 0xa8],
    [0x9c, 0x17, 0x9e],
    [0xbd, 0x37, 0x86],
    [0xd8, 0x57, 0x6b],
    [0xed, 0x79, 0x53],
    [0xfb, 0x9f, 0x3a],
    [0xfd, 0xca, 0x26],
    [0xf0, 0xf9, 0x21],
];

const MAGMA: &[Rgb8] = &[
    [0x00, 0x00, 0x04],
    [0x18, 0x0f, 0x3d],
    [0x44, 0x0f, 0x76],
    [0x72, 0x1f, 0x81],
    [0x9e, 0x2f, 0x7f],
    [0xcd, 0x40, 0x71],
    [0xf1, 0x60, 0x5d],
    [0xfd, 0x96, 0x68],
    [0xfe, 0xca, 0x8d],
    [0xfc, 0xfd, 0xbf],
];

const INFERNO: &[Rgb8] = &[
    [0x00, 0x00, 0x04],
    [0x1b, 0x0c, 0x41],
    [0x4a, 0x0c, 0x6b],
    [0x78, 0x1c, 0x6d],
    [0xa5, 0x2c, 0x60],
    [0xcf, 0x44, 0x46],
    [0xed, 0x69, 0x25],
    [0xfb, 0x9b, 0x06],
    [0xf7, 0xd1, 0x3d],
    [0xfc, 0xff, 0xa4],
];

impl ColorTheme {
    pub const ALL: [ColorTheme; 5] = [
        ColorTheme::Blues,
        ColorTheme::Viridis,
        ColorTheme::Plasma,
        ColorTheme::Magma,
        ColorTheme::Inferno,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::Blues => "blues",
            ColorTheme::Viridis => "viridis",
            ColorTheme::Plasma => "plasma",
            ColorTheme::Magma => "magma",
            ColorTheme::Inferno => "inferno",
        }
    }

    fn stops(self) -> &'static [Rgb8] {
        match self {
            ColorTheme::Blues => BLUES,
            ColorTheme::Viridis => VIRIDIS,
            ColorTheme::Plasma => PLASMA,
            ColorTheme::Magma => MAGMA,
            ColorTheme::Inferno => INFERNO,
        }
    }

    /// Colour at position `t` in `[0, 1]`, interpolated in linear light
    /// between the scheme's anchor stops. Out-of-range `t` is clamped.
    pub fn sample(self, t: f64) -> Rgb8 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t as f32 * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f32;

        let mixed = linear(stops[i]).mix(linear(stops[i + 1]), frac);
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
        [rgb.red, rgb.green, rgb.blue]
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn linear(c: Rgb8) -> LinSrgb {
    Srgb::new(c[0], c[1], c[2]).into_format::<f32>().into_linear()
}
