mod id;

pub use self::id::NodeId;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// One layer of the pipeline.
///
/// Data only ever flows downstream: `Iot → Edge → Fog → Cloud`.
///
/// ```
/// # use efcsim_core::Tier;
/// assert!(Tier::Iot < Tier::Edge);
/// assert_eq!(Tier::Iot.downstream(), Some(Tier::Edge));
/// assert_eq!(Tier::Cloud.downstream(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    #[serde(rename = "IoT")]
    Iot,
    Edge,
    Fog,
    Cloud,
}

impl Tier {
    /// Every tier, upstream first.
    pub const ALL: [Self; 4] = [Self::Iot, Self::Edge, Self::Fog, Self::Cloud];

    /// The layer name used in the reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Iot => "IoT",
            Self::Edge => "Edge",
            Self::Fog => "Fog",
            Self::Cloud => "Cloud",
        }
    }

    /// the prefix of the [`NodeId`] of a node of this tier
    pub(crate) const fn prefix(self) -> &'static str {
        match self {
            Self::Iot => "iot",
            Self::Edge => "edge",
            Self::Fog => "fog",
            Self::Cloud => "cloud",
        }
    }

    /// The tier a node of this tier forwards its data to.
    pub const fn downstream(self) -> Option<Self> {
        match self {
            Self::Iot => Some(Self::Edge),
            Self::Edge => Some(Self::Fog),
            Self::Fog => Some(Self::Cloud),
            Self::Cloud => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.prefix().eq_ignore_ascii_case(s) || tier.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown tier `{s}'"))
    }
}
