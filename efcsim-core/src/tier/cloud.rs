use super::{NodeCounters, TierNode, megabytes};
use crate::{
    config::CloudParams,
    data::Data as _,
    node::NodeId,
    packet::{DataType, Packet},
};
use std::collections::{BTreeMap, BTreeSet};

/// The cloud data center, the sink of the pipeline.
///
/// It runs the analytics of what the fog tier sends, one job per data
/// type and tick, then discards the data.
#[derive(Debug, Clone)]
pub struct CloudDataCenter {
    id: NodeId,
    processing_capacity: f64,
    energy_consumption: f64,
    fogs: BTreeSet<NodeId>,
    store: BTreeMap<DataType, Vec<Packet>>,
    distribution: BTreeMap<DataType, u64>,
    counters: NodeCounters,
}

impl CloudDataCenter {
    pub fn new(params: &CloudParams) -> Self {
        Self {
            id: NodeId::CLOUD,
            processing_capacity: params.processing_capacity,
            energy_consumption: params.energy_consumption,
            fogs: BTreeSet::new(),
            store: BTreeMap::new(),
            distribution: BTreeMap::new(),
            counters: NodeCounters::default(),
        }
    }

    pub fn register_fog(&mut self, fog: NodeId) {
        self.fogs.insert(fog);
    }

    /// The fog nodes forwarding to this data center.
    pub fn fogs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.fogs.iter().copied()
    }

    /// Store a batch of packets sent by `from`.
    pub fn receive(&mut self, from: NodeId, packets: Vec<Packet>) {
        tracing::trace!(cloud = %self.id, fog = %from, packets = packets.len(), "batch received");

        self.counters.packets_received += packets.len() as u64;
        self.counters.bandwidth_mb += megabytes(packets.bytes_size());
        for packet in packets {
            *self.distribution.entry(packet.data_type()).or_default() += 1;
            self.store.entry(packet.data_type()).or_default().push(packet);
        }
    }

    pub fn buffered(&self) -> usize {
        self.store.values().map(Vec::len).sum()
    }

    /// Run the analytics of every data type received during `tick`.
    ///
    /// The cost of a job is `size × complexity / capacity`, see
    /// [`DataType::analytics_complexity`].
    pub fn process(&mut self, tick: u64) {
        let mut jobs = 0;
        for (data_type, packets) in self.store.iter_mut() {
            if packets.is_empty() {
                continue;
            }
            let size = packets.bytes_size();
            let time = size as f64 * data_type.analytics_complexity() / self.processing_capacity;
            self.counters.processing_time_ms += time;
            self.counters.energy_wh += super::processing_energy_wh(self.energy_consumption, time);
            self.counters.packets_processed += packets.len() as u64;
            packets.clear();
            jobs += 1;
        }

        if jobs > 0 {
            tracing::debug!(cloud = %self.id, tick, jobs, "cloud analytics");
        }
    }

    /// Number of packets received per data type since the start of the run.
    pub fn data_type_distribution(&self) -> &BTreeMap<DataType, u64> {
        &self.distribution
    }
}

impl TierNode for CloudDataCenter {
    fn id(&self) -> NodeId {
        self.id
    }

    fn counters(&self) -> &NodeCounters {
        &self.counters
    }
}
