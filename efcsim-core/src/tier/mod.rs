//! The processing tiers of the pipeline: [`EdgeNode`], [`FogNode`] and
//! [`CloudDataCenter`].
//!
//! Every node buffers what it receives during a tick and drains its
//! buffers completely when it processes, nothing is carried over to the
//! next tick.

mod cloud;
mod edge;
mod fog;

pub use self::{cloud::CloudDataCenter, edge::EdgeNode, fog::FogNode};
use crate::{
    defaults::{BYTES_PER_MB, MS_PER_HOUR},
    node::NodeId,
    packet::Packet,
};
use serde::Serialize;

/// The cumulative counters of a tier node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct NodeCounters {
    pub packets_received: u64,
    pub packets_processed: u64,
    pub packets_forwarded: u64,
    /// In ms.
    pub processing_time_ms: f64,
    /// In Wh.
    pub energy_wh: f64,
    /// Data received and forwarded, in MB. Only the fog and cloud tiers
    /// account for it.
    pub bandwidth_mb: f64,
    /// Sum of the latencies of the forwarded batches, in ms.
    pub transmission_latency_ms: f64,
    /// Number of forwarded batches.
    pub transmissions: u64,
}

/// Packets sent from one node to the next one downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub from: NodeId,
    pub to: NodeId,
    pub packets: Vec<Packet>,
}

/// Read access to a tier node's identity and counters.
pub trait TierNode {
    fn id(&self) -> NodeId;

    fn counters(&self) -> &NodeCounters;

    /// `1 − forwarded / received`, `0` if nothing was received yet.
    fn data_reduction_ratio(&self) -> f64 {
        self.counters().data_reduction_ratio()
    }
}

impl NodeCounters {
    pub fn data_reduction_ratio(&self) -> f64 {
        if self.packets_received == 0 {
            return 0.0;
        }
        1.0 - self.packets_forwarded as f64 / self.packets_received as f64
    }

    /// Average processing time per processed packet (ms), `0` if nothing
    /// was processed yet.
    pub fn mean_processing_time(&self) -> f64 {
        if self.packets_processed == 0 {
            return 0.0;
        }
        self.processing_time_ms / self.packets_processed as f64
    }

    /// Average latency of the forwarded batches (ms).
    pub fn mean_transmission_latency(&self) -> f64 {
        if self.transmissions == 0 {
            return 0.0;
        }
        self.transmission_latency_ms / self.transmissions as f64
    }

    /// Account for `size` bytes processed at `capacity` bytes per ms by a
    /// node drawing `power_w`.
    fn record_processing(&mut self, size: u64, capacity: f64, power_w: f64) {
        let time = size as f64 / capacity;
        self.processing_time_ms += time;
        self.energy_wh += processing_energy_wh(power_w, time);
    }
}

impl Batch {
    pub fn new(from: NodeId, to: NodeId, packets: Vec<Packet>) -> Self {
        Self { from, to, packets }
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

/// Energy (Wh) drawn by a `power_w` node busy for `time_ms`.
pub(crate) fn processing_energy_wh(power_w: f64, time_ms: f64) -> f64 {
    power_w * (time_ms / MS_PER_HOUR)
}

pub(crate) fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}
