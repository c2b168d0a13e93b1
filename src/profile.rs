use std::f64::consts::PI;

use serde::Deserialize;
use uom::si::{f64::Length, length::meter};

/// A boundary driving value (temperature in K or heat flux in W/m²).
#[derive(Copy, Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Drive {
    Constant(f64),
    /// `base - scale * ln(rate * position + 1)`
    LogDecay { base: f64, scale: f64, rate: f64 },
}

impl Drive {
    /// Exhaust gas temperature seen by the outer skin, falling from 900 K at
    /// the nozzle end of the surface.
    pub fn exhaust_temperature() -> Drive {
        Drive::LogDecay {
            base: 900.0,
            scale: 100.0,
            rate: 8.0,
        }
    }

    pub fn at(&self, position: f64) -> f64 {
        match *self {
            Drive::Constant(value) => value,
            Drive::LogDecay { base, scale, rate } => base - scale * (rate * position + 1.0).ln(),
        }
    }
}

impl From<f64> for Drive {
    fn from(value: f64) -> Self {
        Drive::Constant(value)
    }
}

/// Thickness of a non-optimized layer as a function of position.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThicknessProfile {
    Constant {
        thickness: Length,
    },
    /// `amplitude * |sin(2π * frequency * span * position)| + offset`
    RectifiedSine {
        amplitude: Length,
        frequency: f64,
        span: f64,
        offset: Length,
    },
    /// `amplitude * ln(rate * position + 1) + offset`
    Logarithmic {
        amplitude: Length,
        rate: f64,
        offset: Length,
    },
    /// `amplitude / 2 * (saw(frequency * span * position) + 1) + offset`,
    /// with `saw` ramping from -1 to 1 over each period.
    Sawtooth {
        amplitude: Length,
        frequency: f64,
        span: f64,
        offset: Length,
    },
}

impl ThicknessProfile {
    pub fn carbon_fiber() -> Self {
        ThicknessProfile::RectifiedSine {
            amplitude: Length::new::<meter>(1.5e-4),
            frequency: 1.0,
            span: 2.5,
            offset: Length::new::<meter>(1e-5),
        }
    }

    pub fn glue() -> Self {
        ThicknessProfile::Logarithmic {
            amplitude: Length::new::<meter>(1e-5),
            rate: 20.0,
            offset: Length::new::<meter>(1e-6),
        }
    }

    pub fn steel() -> Self {
        ThicknessProfile::Sawtooth {
            amplitude: Length::new::<meter>(5e-4),
            frequency: 5.0,
            span: 2.5,
            offset: Length::new::<meter>(1e-5),
        }
    }

    pub fn at(&self, position: f64) -> Length {
        match *self {
            ThicknessProfile::Constant { thickness } => thickness,
            ThicknessProfile::RectifiedSine {
                amplitude,
                frequency,
                span,
                offset,
            } => amplitude * (2.0 * PI * frequency * span * position).sin().abs() + offset,
            ThicknessProfile::Logarithmic {
                amplitude,
                rate,
                offset,
            } => amplitude * (rate * position + 1.0).ln() + offset,
            ThicknessProfile::Sawtooth {
                amplitude,
                frequency,
                span,
                offset,
            } => {
                let phase = frequency * span * position;
                let saw = 2.0 * (phase - phase.floor()) - 1.0;
                amplitude / 2.0 * (saw + 1.0) + offset
            }
        }
    }
}
