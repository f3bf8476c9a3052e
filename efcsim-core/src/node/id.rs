use super::Tier;
use anyhow::anyhow;
use serde::{Serialize, Serializer};
use std::{fmt, str};

/// The identifier of a node of the pipeline.
///
/// A node is identified by its [`Tier`] and its position within that
/// tier. It is displayed as `<tier>-<index>`:
///
/// ```
/// # use efcsim_core::{NodeId, Tier};
/// let id = NodeId::new(Tier::Edge, 2);
/// assert_eq!(id.to_string(), "edge-2");
/// assert_eq!("edge-2".parse::<NodeId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    tier: Tier,
    index: usize,
}

impl NodeId {
    /// The one cloud data center of the pipeline.
    pub const CLOUD: Self = Self::new(Tier::Cloud, 0);

    pub const fn new(tier: Tier, index: usize) -> Self {
        Self { tier, index }
    }

    pub const fn device(index: usize) -> Self {
        Self::new(Tier::Iot, index)
    }

    pub const fn edge(index: usize) -> Self {
        Self::new(Tier::Edge, index)
    }

    pub const fn fog(index: usize) -> Self {
        Self::new(Tier::Fog, index)
    }

    #[inline]
    pub fn tier(self) -> Tier {
        self.tier
    }

    /// position of the node within its tier
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

impl str::FromStr for NodeId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tier, index) = s
            .rsplit_once('-')
            .ok_or_else(|| anyhow!("expecting `<tier>-<index>', got `{s}'"))?;
        let tier = tier.parse()?;
        let index = index.parse().map_err(|error| anyhow!("{error}"))?;
        Ok(Self::new(tier, index))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tier.prefix(), self.index)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
