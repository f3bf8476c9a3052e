use super::{Batch, NodeCounters, TierNode, megabytes};
use crate::{
    config::FogParams,
    data::Data as _,
    defaults::FOG_SINGLE_SIZE_FACTOR,
    measure::Ratio,
    network::Hop,
    node::NodeId,
    packet::{DataType, Packet, PacketStatus},
    sim_context::SimContext,
};
use std::collections::BTreeMap;

/// A node of the fog tier.
///
/// It combines the packets its edge nodes forwarded during a tick: all
/// the packets of a same [`DataType`] become one aggregated packet, a
/// packet alone of its type is processed individually.
#[derive(Debug, Clone)]
pub struct FogNode {
    id: NodeId,
    processing_capacity: f64,
    energy_consumption: f64,
    aggregation_ratio: Ratio,
    cloud: Option<NodeId>,
    buffers: BTreeMap<NodeId, Vec<Packet>>,
    counters: NodeCounters,
}

impl FogNode {
    pub fn new(index: usize, params: &FogParams) -> Self {
        Self {
            id: NodeId::fog(index),
            processing_capacity: params.processing_capacity,
            energy_consumption: params.energy_consumption,
            aggregation_ratio: params.aggregation_ratio,
            cloud: None,
            buffers: BTreeMap::new(),
            counters: NodeCounters::default(),
        }
    }

    /// Accept the batches of `edge` from now on.
    pub fn register_edge(&mut self, edge: NodeId) {
        self.buffers.entry(edge).or_default();
    }

    pub fn assign_cloud(&mut self, cloud: NodeId) {
        self.cloud = Some(cloud);
    }

    pub fn cloud(&self) -> Option<NodeId> {
        self.cloud
    }

    pub fn edges(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.buffers.keys().copied()
    }

    pub fn aggregation_ratio(&self) -> Ratio {
        self.aggregation_ratio
    }

    /// Buffer a batch of packets sent by `from`, accounting for the
    /// bandwidth it used.
    pub fn receive(&mut self, from: NodeId, packets: Vec<Packet>) {
        let Some(buffer) = self.buffers.get_mut(&from) else {
            tracing::warn!(fog = %self.id, edge = %from, packets = packets.len(), "batch from an unassigned edge node dropped");
            return;
        };
        self.counters.packets_received += packets.len() as u64;
        self.counters.bandwidth_mb += megabytes(packets.bytes_size());
        buffer.extend(packets);
    }

    pub fn buffered(&self) -> usize {
        self.buffers.values().map(Vec::len).sum()
    }

    /// Group everything buffered during `tick` by data type and combine
    /// every group. Returns the batch for the cloud, if any.
    pub fn process(&mut self, tick: u64, ctx: &mut SimContext) -> Option<Batch> {
        let mut groups: BTreeMap<DataType, Vec<Packet>> = BTreeMap::new();
        for packet in self.buffers.values_mut().flat_map(std::mem::take) {
            self.counters.packets_processed += 1;
            groups.entry(packet.data_type()).or_default().push(packet);
        }

        let output: Vec<Packet> = groups
            .into_iter()
            .filter_map(|(data_type, group)| match group.as_slice() {
                [] => None,
                [single] => Some(self.process_single(single)),
                _ => Some(self.aggregate(data_type, &group)),
            })
            .collect();

        tracing::debug!(fog = %self.id, tick, output = output.len(), "fog processing");

        if output.is_empty() {
            return None;
        }
        let Some(cloud) = self.cloud else {
            tracing::warn!(fog = %self.id, tick, packets = output.len(), "no cloud assigned, packets dropped");
            return None;
        };

        let size = output.bytes_size();
        self.counters.bandwidth_mb += megabytes(size);
        self.counters.transmission_latency_ms += ctx.latency(Hop::FogToCloud, size);
        self.counters.transmissions += 1;
        self.counters.packets_forwarded += output.len() as u64;
        Some(Batch::new(self.id, cloud, output))
    }

    /// Combine a group of at least two packets of the same type.
    ///
    /// The cost is the one of the whole input, the output is one packet of
    /// `round(total × aggregation ratio)` bytes stamped with the tick of
    /// the first packet.
    fn aggregate(&mut self, data_type: DataType, group: &[Packet]) -> Packet {
        let total = group.bytes_size();
        self.counters
            .record_processing(total, self.processing_capacity, self.energy_consumption);

        let size = (total as f64 * self.aggregation_ratio.value()).round() as u64;
        let timestamp = group.first().map_or(0, Packet::timestamp);
        Packet::aggregated(self.id, timestamp, size, data_type)
    }

    fn process_single(&mut self, packet: &Packet) -> Packet {
        self.counters
            .record_processing(packet.size(), self.processing_capacity, self.energy_consumption);
        packet.processed(FOG_SINGLE_SIZE_FACTOR, PacketStatus::FogProcessed)
    }
}

impl TierNode for FogNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn counters(&self) -> &NodeCounters {
        &self.counters
    }
}
