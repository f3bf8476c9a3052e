use super::{Batch, NodeCounters, TierNode};
use crate::{
    config::EdgeParams,
    data::Data as _,
    defaults::EDGE_SIZE_FACTOR,
    measure::{Ratio, sample},
    network::Hop,
    node::NodeId,
    packet::{Packet, PacketStatus},
    sim_context::SimContext,
};
use std::collections::BTreeMap;

/// A node of the edge tier.
///
/// It buffers the packets of its devices, drops a random share of them
/// (the filtering ratio), shrinks the survivors and forwards them in one
/// batch to its fog node.
#[derive(Debug, Clone)]
pub struct EdgeNode {
    id: NodeId,
    processing_capacity: f64,
    energy_consumption: f64,
    filtering_ratio: Ratio,
    fog: Option<NodeId>,
    buffers: BTreeMap<NodeId, Vec<Packet>>,
    counters: NodeCounters,
}

impl EdgeNode {
    pub fn new(index: usize, params: &EdgeParams) -> Self {
        Self {
            id: NodeId::edge(index),
            processing_capacity: params.processing_capacity,
            energy_consumption: params.energy_consumption,
            filtering_ratio: params.filtering_ratio,
            fog: None,
            buffers: BTreeMap::new(),
            counters: NodeCounters::default(),
        }
    }

    /// Accept the packets of `device` from now on.
    pub fn register_device(&mut self, device: NodeId) {
        self.buffers.entry(device).or_default();
    }

    pub fn assign_fog(&mut self, fog: NodeId) {
        self.fog = Some(fog);
    }

    pub fn fog(&self) -> Option<NodeId> {
        self.fog
    }

    pub fn devices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.buffers.keys().copied()
    }

    pub fn filtering_ratio(&self) -> Ratio {
        self.filtering_ratio
    }

    /// Buffer a packet sent by `from`.
    ///
    /// Packets from a device that is not registered to this node are
    /// dropped.
    pub fn receive(&mut self, from: NodeId, packet: Packet) {
        let Some(buffer) = self.buffers.get_mut(&from) else {
            tracing::warn!(edge = %self.id, device = %from, "packet from an unassigned device dropped");
            return;
        };
        buffer.push(packet);
        self.counters.packets_received += 1;
    }

    /// Number of packets waiting to be processed.
    pub fn buffered(&self) -> usize {
        self.buffers.values().map(Vec::len).sum()
    }

    /// Filter and process everything buffered during `tick`.
    ///
    /// Every packet costs one draw and is kept iff the draw is above the
    /// filtering ratio. Returns the batch for the fog node, if any.
    pub fn process(&mut self, tick: u64, ctx: &mut SimContext) -> Option<Batch> {
        let received: Vec<Packet> = self
            .buffers
            .values_mut()
            .flat_map(std::mem::take)
            .collect();
        let input = received.len();

        let mut kept = Vec::with_capacity(input);
        for packet in received {
            if sample::unit(ctx.rng()) <= self.filtering_ratio.value() {
                continue;
            }
            self.counters.record_processing(
                packet.size(),
                self.processing_capacity,
                self.energy_consumption,
            );
            self.counters.packets_processed += 1;
            kept.push(packet.processed(EDGE_SIZE_FACTOR, PacketStatus::EdgeProcessed));
        }

        tracing::debug!(edge = %self.id, tick, input, kept = kept.len(), "edge processing");

        if kept.is_empty() {
            return None;
        }
        let Some(fog) = self.fog else {
            tracing::warn!(edge = %self.id, tick, packets = kept.len(), "no fog node assigned, packets dropped");
            return None;
        };

        self.counters.transmission_latency_ms += ctx.latency(Hop::EdgeToFog, kept.bytes_size());
        self.counters.transmissions += 1;
        self.counters.packets_forwarded += kept.len() as u64;
        Some(Batch::new(self.id, fog, kept))
    }
}

impl TierNode for EdgeNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn counters(&self) -> &NodeCounters {
        &self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SimConfig, network::NetworkModel, packet::DataType};

    fn context() -> SimContext {
        SimContext::new(NetworkModel::from_config(&SimConfig::default()), 42)
    }

    fn edge(filtering_ratio: f64) -> EdgeNode {
        let params = EdgeParams {
            filtering_ratio: Ratio::new(filtering_ratio).unwrap(),
            ..EdgeParams::default()
        };
        let mut edge = EdgeNode::new(0, &params);
        edge.register_device(NodeId::device(0));
        edge.register_device(NodeId::device(1));
        edge.assign_fog(NodeId::fog(0));
        edge
    }

    fn packet(device: usize, size: u64) -> Packet {
        Packet::new(NodeId::device(device), 0, size, DataType::Sensor)
    }

    fn fill(edge: &mut EdgeNode, count: usize) {
        for i in 0..count {
            let device = i % 2;
            edge.receive(NodeId::device(device), packet(device, 100));
        }
    }

    // ----- 1. Filtering -----

    #[test]
    fn no_filtering_forwards_everything() {
        let mut edge = edge(0.0);
        let mut ctx = context();
        fill(&mut edge, 10);

        let batch = edge.process(0, &mut ctx).unwrap();
        assert_eq!(batch.from, NodeId::edge(0));
        assert_eq!(batch.to, NodeId::fog(0));
        assert_eq!(batch.len(), 10);
        assert!(batch.packets.iter().all(|p| p.size() == 70));
        assert!(batch.packets.iter().all(|p| p.status() == PacketStatus::EdgeProcessed));

        assert_eq!(edge.counters().packets_received, 10);
        assert_eq!(edge.counters().packets_processed, 10);
        assert_eq!(edge.counters().packets_forwarded, 10);
        assert_eq!(edge.data_reduction_ratio(), 0.0);
    }

    #[test]
    fn full_filtering_forwards_nothing() {
        let mut edge = edge(1.0);
        let mut ctx = context();
        for tick in 0..10 {
            fill(&mut edge, 10);
            assert!(edge.process(tick, &mut ctx).is_none());
        }

        assert_eq!(edge.counters().packets_received, 100);
        assert_eq!(edge.counters().packets_forwarded, 0);
        assert_eq!(edge.counters().transmissions, 0);
        assert_eq!(edge.data_reduction_ratio(), 1.0);
    }

    #[test]
    fn filtering_ratio_is_the_drop_probability() {
        let mut edge = edge(0.6);
        let mut ctx = context();
        for tick in 0..100 {
            fill(&mut edge, 100);
            edge.process(tick, &mut ctx);
        }
        let ratio = edge.data_reduction_ratio();
        assert!((ratio - 0.6).abs() < 0.03, "reduction ratio was {ratio}");
        assert!(edge.counters().packets_forwarded <= edge.counters().packets_received);
    }

    // ----- 2. Buffers -----

    #[test]
    fn buffers_drained_every_tick() {
        let mut edge = edge(0.5);
        let mut ctx = context();
        fill(&mut edge, 20);
        assert_eq!(edge.buffered(), 20);

        edge.process(0, &mut ctx);
        assert_eq!(edge.buffered(), 0);
        assert!(edge.process(1, &mut ctx).is_none());
    }

    #[test]
    fn unassigned_device_dropped() {
        let mut edge = edge(0.0);
        edge.receive(NodeId::device(7), packet(7, 100));
        assert_eq!(edge.buffered(), 0);
        assert_eq!(edge.counters().packets_received, 0);
    }

    #[test]
    fn no_fog_drops_the_batch() {
        let mut edge = EdgeNode::new(0, &EdgeParams {
            filtering_ratio: Ratio::ZERO,
            ..EdgeParams::default()
        });
        edge.register_device(NodeId::device(0));
        edge.receive(NodeId::device(0), packet(0, 100));

        assert!(edge.process(0, &mut context()).is_none());
        assert_eq!(edge.counters().packets_processed, 1);
        assert_eq!(edge.counters().packets_forwarded, 0);
    }

    // ----- 3. Accounting -----

    #[test]
    fn processing_time_and_energy() {
        let mut edge = edge(0.0);
        let mut ctx = context();
        edge.receive(NodeId::device(0), packet(0, 2_000));
        edge.receive(NodeId::device(1), packet(1, 3_000));
        edge.process(0, &mut ctx);

        let counters = edge.counters();
        // 5000 bytes at 1000 bytes per ms
        assert!((counters.processing_time_ms - 5.0).abs() < 1e-12);
        assert!((counters.energy_wh - 50.0 * 5.0 / 3_600_000.0).abs() < 1e-15);
        assert_eq!(counters.mean_processing_time(), 2.5);
        assert_eq!(counters.transmissions, 1);
        assert!(counters.transmission_latency_ms > 0.0);
    }
}
