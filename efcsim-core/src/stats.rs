//! Pipeline statistics and observability types.
//!
//! [`PipelineStats`] provides a point-in-time snapshot of every node of
//! the pipeline. Obtain one via [`Simulation::stats`](crate::Simulation::stats).

use crate::{
    device::DeviceType,
    network::{Hop, LinkConditions},
    node::{NodeId, Tier},
    packet::DataType,
    tier::NodeCounters,
};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Snapshot of statistics for a single device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStats {
    /// The device's identifier.
    pub id: NodeId,
    pub device_type: DeviceType,
    /// The edge node the device transmits to.
    pub edge: Option<NodeId>,
    /// Remaining battery, in percent of the capacity.
    pub battery_percentage: f64,
    pub packets_generated: u64,
    pub packets_transmitted: u64,
    /// Energy spent transmitting, in mWh.
    pub energy_mwh: f64,
    /// Average transmission latency, in ms.
    pub average_latency_ms: f64,
}

/// Snapshot of statistics for a single edge node, fog node or the cloud.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    /// The node's identifier.
    pub id: NodeId,
    /// The node the tier forwards to, `None` for the cloud or an
    /// unassigned node.
    pub downstream: Option<NodeId>,
    /// The nodes allowed to send to this one.
    pub upstream: Vec<NodeId>,
    /// Packets waiting to be processed.
    pub buffered: usize,
    #[serde(flatten)]
    pub counters: NodeCounters,
}

/// Point-in-time snapshot of the entire pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Number of ticks simulated so far.
    pub tick: u64,
    pub devices: Vec<DeviceStats>,
    pub edges: Vec<NodeStats>,
    pub fogs: Vec<NodeStats>,
    pub cloud: NodeStats,
    /// Current conditions of every hop.
    pub links: BTreeMap<Hop, LinkConditions>,
    /// Packets the cloud received per data type.
    pub data_types: BTreeMap<DataType, u64>,
}

impl PipelineStats {
    /// The statistics of the device `id`.
    pub fn device(&self, id: NodeId) -> Option<&DeviceStats> {
        self.devices.iter().find(|device| device.id == id)
    }

    /// The statistics of the edge node, fog node or cloud `id`.
    pub fn node(&self, id: NodeId) -> Option<&NodeStats> {
        match id.tier() {
            Tier::Iot => None,
            Tier::Edge => self.edges.get(id.index()),
            Tier::Fog => self.fogs.get(id.index()),
            Tier::Cloud => Some(&self.cloud).filter(|cloud| cloud.id == id),
        }
    }
}

impl fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{id} {device_type}: {generated} generated, {transmitted} transmitted, battery {battery:.1}%, latency {latency:.2} ms",
            id = self.id,
            device_type = self.device_type,
            generated = self.packets_generated,
            transmitted = self.packets_transmitted,
            battery = self.battery_percentage,
            latency = self.average_latency_ms,
        )
    }
}

impl fmt::Display for NodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counters = &self.counters;
        write!(
            f,
            "{id}: {received} received, {processed} processed, {forwarded} forwarded, reduction {reduction:.1}%, {energy:.6} Wh",
            id = self.id,
            received = counters.packets_received,
            processed = counters.packets_processed,
            forwarded = counters.packets_forwarded,
            reduction = counters.data_reduction_ratio() * 100.0,
            energy = counters.energy_wh,
        )?;
        if counters.transmissions > 0 {
            write!(
                f,
                ", hop latency {:.2} ms",
                counters.mean_transmission_latency()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Nodes after {} ticks ---", self.tick)?;
        for device in &self.devices {
            writeln!(f, "{device}")?;
        }
        for node in self.edges.iter().chain(&self.fogs) {
            writeln!(f, "{node}")?;
        }
        writeln!(f, "{}", self.cloud)?;
        for (hop, conditions) in &self.links {
            writeln!(f, "{hop}: {conditions}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{NodeId, SimConfig, Simulation};

    #[test]
    fn lookup() {
        let mut config = SimConfig::default();
        config.simulation.time = 2;
        config.simulation.num_edge_nodes = 2;
        let mut simulation = Simulation::with_seed(config, 5).unwrap();
        simulation.run().unwrap();
        let stats = simulation.stats();

        let device = stats.device("iot-2".parse().unwrap()).unwrap();
        assert_eq!(device.id, NodeId::device(2));
        assert_eq!(device.edge, Some(NodeId::edge(0)));

        let edge = stats.node("edge-1".parse().unwrap()).unwrap();
        assert_eq!(edge.upstream, vec![NodeId::device(1)]);
        assert_eq!(stats.node(NodeId::CLOUD).unwrap().id, NodeId::CLOUD);

        assert!(stats.device(NodeId::device(3)).is_none());
        assert!(stats.node(NodeId::edge(2)).is_none());
        assert!(stats.node("cloud-1".parse().unwrap()).is_none());
        assert!(stats.node(NodeId::device(0)).is_none());
    }
}
