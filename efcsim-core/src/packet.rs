use crate::node::NodeId;
use serde::Serialize;
use std::fmt;

/// The kind of data a [`Packet`] carries.
///
/// The data type of a packet never changes once the packet is created,
/// it drives the size of the synthesized data, the grouping at the fog
/// tier and the analytics complexity at the cloud tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Sensor,
    Image,
    Video,
    Audio,
    Text,
}

/// Processing status of a [`Packet`].
///
/// The status only moves forward: `Raw`, then `EdgeProcessed`, then one
/// of the fog statuses.
///
/// ```
/// # use efcsim_core::PacketStatus;
/// assert!(PacketStatus::Raw.precedes(PacketStatus::EdgeProcessed));
/// assert!(PacketStatus::Raw.precedes(PacketStatus::FogAggregated));
/// assert!(!PacketStatus::FogProcessed.precedes(PacketStatus::EdgeProcessed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacketStatus {
    Raw,
    EdgeProcessed,
    FogProcessed,
    FogAggregated,
}

/// One unit of sensed data travelling down the pipeline.
///
/// Packets are values: a tier never modifies a packet it received, it
/// builds a new one with the reduced size and the advanced status. The
/// received packet is consumed (and dropped) in the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    source: NodeId,
    timestamp: u64,
    size: u64,
    data_type: DataType,
    status: PacketStatus,
}

impl DataType {
    pub const ALL: [Self; 5] = [Self::Sensor, Self::Image, Self::Video, Self::Audio, Self::Text];

    /// The range of sizes (in bytes) a synthesized packet of this type
    /// takes, as `(base, span)`: sizes are drawn from `base + [0, span)`.
    ///
    /// ```
    /// # use efcsim_core::DataType;
    /// assert_eq!(DataType::Sensor.size_range(), (10, 90));
    /// ```
    pub const fn size_range(self) -> (u64, u64) {
        match self {
            Self::Sensor => (10, 90),
            Self::Image => (100_000, 900_000),
            Self::Video => (1_000_000, 9_000_000),
            Self::Audio => (50_000, 450_000),
            Self::Text => (100, 4_900),
        }
    }

    /// Multiplier of the cloud analytics cost for this type of data.
    pub const fn analytics_complexity(self) -> f64 {
        match self {
            Self::Sensor => 1.0,
            Self::Image => 2.5,
            Self::Video => 5.0,
            Self::Audio => 1.5,
            Self::Text => 1.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "SENSOR",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PacketStatus {
    const fn stage(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::EdgeProcessed => 1,
            Self::FogProcessed | Self::FogAggregated => 2,
        }
    }

    /// `true` if a packet with this status may be turned into a packet
    /// with the `next` status.
    pub const fn precedes(self, next: Self) -> bool {
        self.stage() < next.stage()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::EdgeProcessed => "EDGE_PROCESSED",
            Self::FogProcessed => "FOG_PROCESSED",
            Self::FogAggregated => "FOG_AGGREGATED",
        }
    }
}

impl fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Packet {
    /// Create a new [`PacketStatus::Raw`] packet.
    pub fn new(source: NodeId, timestamp: u64, size: u64, data_type: DataType) -> Self {
        Self {
            source,
            timestamp,
            size,
            data_type,
            status: PacketStatus::Raw,
        }
    }

    /// Build the packet resulting of processing `self`.
    ///
    /// The new packet keeps the source, timestamp and data type, its size
    /// is `size × factor` (truncated).
    pub(crate) fn processed(&self, factor: f64, status: PacketStatus) -> Self {
        debug_assert!(
            self.status.precedes(status),
            "a packet cannot go from {} to {status}",
            self.status
        );
        Self {
            size: (self.size as f64 * factor) as u64,
            status,
            ..self.clone()
        }
    }

    /// Build a packet on behalf of `source` that stands for a group of
    /// packets of the same `data_type`.
    pub(crate) fn aggregated(source: NodeId, timestamp: u64, size: u64, data_type: DataType) -> Self {
        Self {
            source,
            timestamp,
            size,
            data_type,
            status: PacketStatus::FogAggregated,
        }
    }

    /// The node that produced this packet.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The tick at which the data was sensed.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Size of the data in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn status(&self) -> PacketStatus {
        self.status
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{source}@{timestamp}] {data_type} {size} bytes ({status})",
            source = self.source,
            timestamp = self.timestamp,
            data_type = self.data_type,
            size = self.size,
            status = self.status,
        )
    }
}
