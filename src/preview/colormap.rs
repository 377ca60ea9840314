//! Named colour ramps for previews, evaluated by multi-stop interpolation.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    rgb: [u8; 3],
}

const fn stop(t: f64, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop { t, rgb: [r, g, b] }
}

const VIRIDIS: &[ColorStop] = &[
    stop(0.00, 68, 1, 84),
    stop(0.25, 59, 82, 139),
    stop(0.50, 33, 145, 140),
    stop(0.75, 94, 201, 98),
    stop(1.00, 253, 231, 37),
];

const MAGMA: &[ColorStop] = &[
    stop(0.00, 0, 0, 4),
    stop(0.25, 81, 18, 124),
    stop(0.50, 183, 55, 121),
    stop(0.75, 252, 137, 97),
    stop(1.00, 252, 253, 191),
];

const INFERNO: &[ColorStop] = &[
    stop(0.00, 0, 0, 4),
    stop(0.25, 87, 16, 110),
    stop(0.50, 188, 55, 84),
    stop(0.75, 249, 142, 9),
    stop(1.00, 252, 255, 164),
];

const PLASMA: &[ColorStop] = &[
    stop(0.00, 13, 8, 135),
    stop(0.25, 126, 3, 168),
    stop(0.50, 204, 71, 120),
    stop(0.75, 248, 149, 64),
    stop(1.00, 240, 249, 33),
];

const CIVIDIS: &[ColorStop] = &[
    stop(0.00, 0, 34, 78),
    stop(0.25, 65, 77, 107),
    stop(0.50, 124, 123, 120),
    stop(0.75, 188, 175, 111),
    stop(1.00, 254, 232, 56),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Gray,
    Viridis,
    Magma,
    Inferno,
    Plasma,
    Cividis,
}

impl Scheme {
    pub const ALL: [Scheme; 6] = [
        Scheme::Gray,
        Scheme::Viridis,
        Scheme::Magma,
        Scheme::Inferno,
        Scheme::Plasma,
        Scheme::Cividis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Gray => "gray",
            Scheme::Viridis => "viridis",
            Scheme::Magma => "magma",
            Scheme::Inferno => "inferno",
            Scheme::Plasma => "plasma",
            Scheme::Cividis => "cividis",
        }
    }
}

/// A scheme, optionally reversed (`viridis_r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    pub scheme: Scheme,
    pub reversed: bool,
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            scheme: Scheme::Gray,
            reversed: false,
        }
    }
}

impl Colormap {
    /// Colour at normalized position `t`; values outside [0, 1] saturate.
    pub fn evaluate(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        match self.scheme {
            Scheme::Gray => {
                let v = (t * 255.0).round() as u8;
                [v, v, v]
            }
            Scheme::Viridis => multi_stop(VIRIDIS, t),
            Scheme::Magma => multi_stop(MAGMA, t),
            Scheme::Inferno => multi_stop(INFERNO, t),
            Scheme::Plasma => multi_stop(PLASMA, t),
            Scheme::Cividis => multi_stop(CIVIDIS, t),
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn multi_stop(stops: &[ColorStop], t: f64) -> [u8; 3] {
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.t {
            let ratio = (t - lo.t) / (hi.t - lo.t);
            return [
                lerp(lo.rgb[0], hi.rgb[0], ratio),
                lerp(lo.rgb[1], hi.rgb[1], ratio),
                lerp(lo.rgb[2], hi.rgb[2], ratio),
            ];
        }
    }
    stops[stops.len() - 1].rgb
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (base, reversed) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };
        let base = if base == "grey" { "gray" } else { base };

        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == base)
            .map(|scheme| Colormap { scheme, reversed })
            .ok_or_else(|| {
                let names: Vec<_> = Scheme::ALL.iter().map(Scheme::name).collect();
                format!(
                    "unknown colormap '{}' (expected one of {}, optionally with _r)",
                    s,
                    names.join(", ")
                )
            })
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.scheme.name())?;
        if self.reversed {
            write!(f, "_r")?;
        }
        Ok(())
    }
}
