//! Time series and per-layer statistics of a simulation run.

mod report;

pub use self::report::{LayerSummary, SimulationReport, Summary};
use crate::{
    node::Tier,
    simulation::Topology,
    tier::{NodeCounters, TierNode},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Cumulative totals of one layer of the pipeline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct LayerTotals {
    /// In ms. Always `0` for the IoT layer.
    pub processing_time_ms: f64,
    /// In Wh.
    pub energy_wh: f64,
    /// Packets generated (IoT layer) or processed (other layers).
    pub packets: u64,
}

/// Observes the whole pipeline after every tick.
///
/// Every [`collect`](Self::collect) adds one point to each of the four
/// time series and refreshes the per-layer totals.
#[derive(Debug, Default, Clone)]
pub struct MetricsCollector {
    latency_ms: BTreeMap<u64, f64>,
    energy_wh: BTreeMap<u64, f64>,
    bandwidth_mb: BTreeMap<u64, f64>,
    data_reduction: BTreeMap<u64, f64>,
    layers: BTreeMap<Tier, LayerTotals>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            layers: Tier::ALL
                .into_iter()
                .map(|tier| (tier, LayerTotals::default()))
                .collect(),
            ..Self::default()
        }
    }

    /// Record the state of `topology` at the end of `tick`.
    pub fn collect(&mut self, tick: u64, topology: &Topology) {
        self.latency_ms.insert(tick, current_latency(topology));
        self.bandwidth_mb.insert(tick, current_bandwidth(topology));
        self.data_reduction.insert(tick, current_data_reduction(topology));

        self.update_layers(topology);
        let energy = self.layers.values().map(|layer| layer.energy_wh).sum();
        self.energy_wh.insert(tick, energy);
    }

    /// Refresh the layer totals from the nodes' cumulative counters.
    ///
    /// The totals after a tick are the sums of the counters at the end of
    /// that tick, collecting again without new traffic changes nothing.
    fn update_layers(&mut self, topology: &Topology) {
        let iot = topology
            .devices()
            .iter()
            .fold(LayerTotals::default(), |mut totals, device| {
                totals.energy_wh += device.energy_mwh() / 1_000.0;
                totals.packets += device.packets_generated();
                totals
            });
        self.layers.insert(Tier::Iot, iot);
        self.layers.insert(Tier::Edge, layer(topology.edges()));
        self.layers.insert(Tier::Fog, layer(topology.fogs()));
        self.layers
            .insert(Tier::Cloud, layer(std::slice::from_ref(topology.cloud())));
    }

    /// Number of collected ticks.
    pub fn ticks(&self) -> u64 {
        self.latency_ms.len() as u64
    }

    /// Mean latency (ms) over the entities with at least one sample.
    pub fn latency_series(&self) -> &BTreeMap<u64, f64> {
        &self.latency_ms
    }

    /// Total energy spent since the start of the run (Wh).
    pub fn energy_series(&self) -> &BTreeMap<u64, f64> {
        &self.energy_wh
    }

    /// Fog and cloud bandwidth used since the start of the run (MB).
    pub fn bandwidth_series(&self) -> &BTreeMap<u64, f64> {
        &self.bandwidth_mb
    }

    /// Mean data reduction ratio of the edge and fog nodes with traffic.
    pub fn data_reduction_series(&self) -> &BTreeMap<u64, f64> {
        &self.data_reduction
    }

    pub fn layers(&self) -> &BTreeMap<Tier, LayerTotals> {
        &self.layers
    }

    pub fn layer(&self, tier: Tier) -> LayerTotals {
        self.layers.get(&tier).copied().unwrap_or_default()
    }

    /// Reduce the collected metrics into the summary of the run.
    pub fn aggregate(&self) -> Summary {
        let total_energy_wh: f64 = self.layers.values().map(|layer| layer.energy_wh).sum();
        let generated = self.layer(Tier::Iot).packets;

        let layers = self
            .layers
            .iter()
            .map(|(tier, totals)| {
                let summary = LayerSummary {
                    processing_time_ms: totals.processing_time_ms,
                    energy_wh: totals.energy_wh,
                    energy_share: percentage(totals.energy_wh, total_energy_wh),
                    packets: totals.packets,
                    packet_share: percentage(totals.packets as f64, generated as f64),
                };
                (*tier, summary)
            })
            .collect();

        Summary {
            ticks: self.ticks(),
            average_latency_ms: mean(self.latency_ms.values()),
            total_energy_wh,
            average_bandwidth_mb: mean(self.bandwidth_mb.values()),
            final_bandwidth_mb: self.bandwidth_mb.values().next_back().copied().unwrap_or(0.0),
            data_reduction_ratio: mean(self.data_reduction.values()),
            layers,
        }
    }
}

fn layer<N: TierNode>(nodes: &[N]) -> LayerTotals {
    nodes
        .iter()
        .map(TierNode::counters)
        .fold(LayerTotals::default(), |mut totals, counters| {
            totals.processing_time_ms += counters.processing_time_ms;
            totals.energy_wh += counters.energy_wh;
            totals.packets += counters.packets_processed;
            totals
        })
}

fn current_latency(topology: &Topology) -> f64 {
    let devices = topology
        .devices()
        .iter()
        .filter(|device| device.latency_samples() > 0)
        .map(|device| device.average_transmission_latency());
    let tiers = tier_counters(topology)
        .filter(|counters| counters.packets_processed > 0)
        .map(NodeCounters::mean_processing_time);
    mean(devices.chain(tiers))
}

fn current_bandwidth(topology: &Topology) -> f64 {
    topology
        .fogs()
        .iter()
        .map(|fog| fog.counters().bandwidth_mb)
        .sum::<f64>()
        + topology.cloud().counters().bandwidth_mb
}

fn current_data_reduction(topology: &Topology) -> f64 {
    let edges = topology.edges().iter().map(TierNode::counters);
    let fogs = topology.fogs().iter().map(TierNode::counters);
    mean(
        edges
            .chain(fogs)
            .filter(|counters| counters.packets_received > 0)
            .map(NodeCounters::data_reduction_ratio),
    )
}

fn tier_counters(topology: &Topology) -> impl Iterator<Item = &NodeCounters> {
    let edges = topology.edges().iter().map(TierNode::counters);
    let fogs = topology.fogs().iter().map(TierNode::counters);
    edges
        .chain(fogs)
        .chain(std::iter::once(topology.cloud().counters()))
}

/// Mean of `values`, `0` if there are none.
fn mean<I, V>(values: I) -> f64
where
    I: IntoIterator<Item = V>,
    V: std::borrow::Borrow<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + *value.borrow(), count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// `part` as a percentage of `whole`, `0` if `whole` is `0`.
fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}
