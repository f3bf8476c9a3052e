use serde::Serialize;
use std::fmt;

/// One network segment of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Hop {
    #[serde(rename = "IoT-to-Edge")]
    DeviceToEdge,
    #[serde(rename = "Edge-to-Fog")]
    EdgeToFog,
    #[serde(rename = "Fog-to-Cloud")]
    FogToCloud,
}

/// The current state of a [`Hop`].
///
/// `quality` stays in `[0.5, 1.0]` (`1.0` is a perfect link) and
/// `congestion` is at least `1.0` (`1.0` is an idle link).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkConditions {
    pub quality: f64,
    pub congestion: f64,
}

impl Hop {
    pub const ALL: [Self; 3] = [Self::DeviceToEdge, Self::EdgeToFog, Self::FogToCloud];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::DeviceToEdge => 0,
            Self::EdgeToFog => 1,
            Self::FogToCloud => 2,
        }
    }

    /// Upper bound of the uniform jitter added to every transmission, in ms.
    pub const fn max_jitter_ms(self) -> f64 {
        match self {
            Self::DeviceToEdge => 5.0,
            Self::EdgeToFog => 3.0,
            Self::FogToCloud => 2.0,
        }
    }

    /// Congestion multiplier applied by the periodic spike.
    pub const fn spike_factor(self) -> f64 {
        match self {
            Self::DeviceToEdge => 1.5,
            Self::EdgeToFog => 1.3,
            Self::FogToCloud => 1.2,
        }
    }

    /// Conditions of the hop when the simulation starts.
    pub const fn initial_conditions(self) -> LinkConditions {
        match self {
            Self::DeviceToEdge => LinkConditions {
                quality: 0.95,
                congestion: 1.2,
            },
            Self::EdgeToFog => LinkConditions {
                quality: 0.98,
                congestion: 1.1,
            },
            Self::FogToCloud => LinkConditions {
                quality: 0.99,
                congestion: 1.05,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceToEdge => "IoT-to-Edge",
            Self::EdgeToFog => "Edge-to-Fog",
            Self::FogToCloud => "Fog-to-Cloud",
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LinkConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quality {:.3}, congestion {:.3}",
            self.quality, self.congestion
        )
    }
}
