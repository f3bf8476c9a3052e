//! The discrete clock of the pipeline.
//!
//! A [`Simulation`] owns the [`Topology`], the [`SimContext`] and the
//! [`MetricsCollector`] of one run. Every [`step`](Simulation::step) is
//! one tick, strictly in this order:
//!
//! 0. the network conditions drift;
//! 1. every device senses and transmits;
//! 2. every edge node filters and forwards;
//! 3. every fog node aggregates and forwards;
//! 4. the cloud runs its analytics;
//! 5. the metrics are collected.
//!
//! A stage only runs once the previous stage delivered all its batches.

use crate::{
    config::{ConfigError, SimConfig},
    device::{Device, DeviceType},
    metrics::{MetricsCollector, SimulationReport},
    network::{Hop, NetworkModel},
    node::{NodeId, Tier},
    sim_context::SimContext,
    stats::{DeviceStats, NodeStats, PipelineStats},
    tier::{Batch, CloudDataCenter, EdgeNode, FogNode, TierNode},
};
use rand_core::Rng;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("`{from}' sent a batch to `{to}' which does not exist")]
    UnknownNode { from: NodeId, to: NodeId },
    #[error("`{from}' cannot send to `{to}', data only moves one tier downstream")]
    Misrouted { from: NodeId, to: NodeId },
    #[error("cannot draw a seed from the operating system")]
    Entropy(#[from] rand::Error),
    #[error("the simulation already ran its {ticks} ticks")]
    Finished { ticks: u64 },
}

/// The nodes of the pipeline and how they are wired.
///
/// Device `i` transmits to edge `i mod edges`, edge `j` forwards to fog
/// `j mod fogs` and every fog forwards to the cloud.
#[derive(Debug, Clone)]
pub struct Topology {
    devices: Vec<Device>,
    edges: Vec<EdgeNode>,
    fogs: Vec<FogNode>,
    cloud: CloudDataCenter,
}

impl Topology {
    /// Create and wire the nodes of `config`.
    ///
    /// Devices without a configured type get a random one, drawn from
    /// `rng` in the order of the devices.
    pub fn build<R: Rng>(config: &SimConfig, rng: &mut R) -> Self {
        let sizing = &config.simulation;

        let mut cloud = CloudDataCenter::new(&config.cloud);
        let mut fogs: Vec<FogNode> = (0..sizing.num_fog_nodes)
            .map(|index| {
                let mut fog = FogNode::new(index, &config.fog);
                fog.assign_cloud(cloud.id());
                fog
            })
            .collect();

        let mut edges: Vec<EdgeNode> = (0..sizing.num_edge_nodes)
            .map(|index| EdgeNode::new(index, &config.edge))
            .collect();
        if !fogs.is_empty() {
            let count = fogs.len();
            for (index, edge) in edges.iter_mut().enumerate() {
                let fog = &mut fogs[index % count];
                fog.register_edge(edge.id());
                edge.assign_fog(fog.id());
            }
        }

        let mut devices: Vec<Device> = (0..sizing.num_iot_devices)
            .map(|index| {
                let device_type = sizing
                    .device_type
                    .unwrap_or_else(|| DeviceType::random(rng));
                Device::new(index, device_type)
            })
            .collect();
        if !edges.is_empty() {
            let count = edges.len();
            for (index, device) in devices.iter_mut().enumerate() {
                let edge = &mut edges[index % count];
                edge.register_device(device.id());
                device.assign_edge(edge.id());
            }
        }

        for fog in &fogs {
            cloud.register_fog(fog.id());
        }

        Self {
            devices,
            edges,
            fogs,
            cloud,
        }
    }

    /// Assemble already wired nodes.
    #[cfg(test)]
    pub(crate) fn from_nodes(
        devices: Vec<Device>,
        edges: Vec<EdgeNode>,
        fogs: Vec<FogNode>,
        cloud: CloudDataCenter,
    ) -> Self {
        Self {
            devices,
            edges,
            fogs,
            cloud,
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn edges(&self) -> &[EdgeNode] {
        &self.edges
    }

    pub fn fogs(&self) -> &[FogNode] {
        &self.fogs
    }

    pub fn cloud(&self) -> &CloudDataCenter {
        &self.cloud
    }

    /// Hand `batch` over to the node it is addressed to.
    ///
    /// The destination must exist and be one tier downstream of the
    /// sender. An empty batch is accepted and dropped.
    pub fn deliver(&mut self, batch: Batch) -> Result<(), SimulationError> {
        let (from, to) = (batch.from, batch.to);
        if from.tier().downstream() != Some(to.tier()) {
            return Err(SimulationError::Misrouted { from, to });
        }

        let exists = match to.tier() {
            Tier::Edge => to.index() < self.edges.len(),
            Tier::Fog => to.index() < self.fogs.len(),
            Tier::Cloud => to == self.cloud.id(),
            Tier::Iot => false,
        };
        if !exists {
            return Err(SimulationError::UnknownNode { from, to });
        }
        if batch.is_empty() {
            return Ok(());
        }

        match to.tier() {
            Tier::Edge => {
                let edge = &mut self.edges[to.index()];
                for packet in batch.packets {
                    edge.receive(from, packet);
                }
            }
            Tier::Fog => self.fogs[to.index()].receive(from, batch.packets),
            Tier::Cloud => self.cloud.receive(from, batch.packets),
            Tier::Iot => {}
        }
        Ok(())
    }

    fn deliver_all(&mut self, batches: Vec<Batch>) -> Result<(), SimulationError> {
        batches.into_iter().try_for_each(|batch| self.deliver(batch))
    }
}

/// One simulation run.
///
/// ```
/// use efcsim_core::{SimConfig, Simulation};
///
/// let mut config = SimConfig::default();
/// config.simulation.time = 5;
///
/// let mut simulation = Simulation::with_seed(config, 7)?;
/// while !simulation.is_finished() {
///     simulation.step()?;
/// }
/// assert_eq!(simulation.stats().tick, 5);
/// # Ok::<(), efcsim_core::SimulationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    ctx: SimContext,
    topology: Topology,
    metrics: MetricsCollector,
    tick: u64,
}

impl Simulation {
    /// Prepare a run of `config`.
    ///
    /// Without `simulation.seed` a fresh seed is drawn, and logged so the
    /// run can be replayed.
    pub fn new(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let seed = match config.simulation.seed {
            Some(seed) => seed,
            None => {
                let seed = SimContext::entropy_seed()?;
                tracing::info!(seed, "no seed configured, using a fresh one");
                seed
            }
        };

        let mut ctx = SimContext::new(NetworkModel::from_config(&config), seed);
        let topology = Topology::build(&config, ctx.rng());

        tracing::info!(
            seed,
            ticks = config.simulation.time,
            devices = topology.devices.len(),
            edges = topology.edges.len(),
            fogs = topology.fogs.len(),
            "simulation ready"
        );
        if topology.edges.is_empty() && !topology.devices.is_empty() {
            tracing::warn!("no edge node, the devices' data will be dropped");
        }
        if topology.fogs.is_empty() && !topology.edges.is_empty() {
            tracing::warn!("no fog node, the edge nodes' data will be dropped");
        }

        Ok(Self {
            config,
            ctx,
            topology,
            metrics: MetricsCollector::new(),
            tick: 0,
        })
    }

    /// Prepare a run of `config` with the given seed, whatever the
    /// configuration says.
    pub fn with_seed(mut config: SimConfig, seed: u64) -> Result<Self, SimulationError> {
        config.simulation.seed = Some(seed);
        Self::new(config)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.ctx.seed()
    }

    /// Number of ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn total_ticks(&self) -> u64 {
        self.config.simulation.time
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Simulate the next tick.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        if self.is_finished() {
            return Err(SimulationError::Finished {
                ticks: self.total_ticks(),
            });
        }
        let tick = self.tick;
        let ctx = &mut self.ctx;

        ctx.update_conditions(tick);

        let batches: Vec<Batch> = self
            .topology
            .devices
            .iter_mut()
            .filter_map(|device| device.on_tick(tick, ctx))
            .collect();
        self.topology.deliver_all(batches)?;

        let batches: Vec<Batch> = self
            .topology
            .edges
            .iter_mut()
            .filter_map(|edge| edge.process(tick, ctx))
            .collect();
        self.topology.deliver_all(batches)?;

        let batches: Vec<Batch> = self
            .topology
            .fogs
            .iter_mut()
            .filter_map(|fog| fog.process(tick, ctx))
            .collect();
        self.topology.deliver_all(batches)?;

        self.topology.cloud.process(tick);

        self.metrics.collect(tick, &self.topology);
        self.tick += 1;

        if self.is_finished() {
            tracing::info!(ticks = self.tick, "simulation finished");
        }
        Ok(())
    }

    /// Simulate every remaining tick and report.
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(self.report())
    }

    /// The report of the ticks simulated so far.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            seed: self.seed(),
            summary: self.metrics.aggregate(),
            latency_ms: self.metrics.latency_series().clone(),
            energy_wh: self.metrics.energy_series().clone(),
            bandwidth_mb: self.metrics.bandwidth_series().clone(),
            data_reduction: self.metrics.data_reduction_series().clone(),
            data_type_distribution: self.topology.cloud.data_type_distribution().clone(),
        }
    }

    /// Snapshot of every node of the pipeline.
    pub fn stats(&self) -> PipelineStats {
        let topology = &self.topology;
        let network = self.ctx.network();

        PipelineStats {
            tick: self.tick,
            devices: topology
                .devices
                .iter()
                .map(|device| DeviceStats {
                    id: device.id(),
                    device_type: device.device_type(),
                    edge: device.edge(),
                    battery_percentage: device.battery_percentage(),
                    packets_generated: device.packets_generated(),
                    packets_transmitted: device.packets_transmitted(),
                    energy_mwh: device.energy_mwh(),
                    average_latency_ms: device.average_transmission_latency(),
                })
                .collect(),
            edges: topology
                .edges
                .iter()
                .map(|edge| NodeStats {
                    id: edge.id(),
                    downstream: edge.fog(),
                    upstream: edge.devices().collect(),
                    buffered: edge.buffered(),
                    counters: *edge.counters(),
                })
                .collect(),
            fogs: topology
                .fogs
                .iter()
                .map(|fog| NodeStats {
                    id: fog.id(),
                    downstream: fog.cloud(),
                    upstream: fog.edges().collect(),
                    buffered: fog.buffered(),
                    counters: *fog.counters(),
                })
                .collect(),
            cloud: NodeStats {
                id: topology.cloud.id(),
                downstream: None,
                upstream: topology.cloud.fogs().collect(),
                buffered: topology.cloud.buffered(),
                counters: *topology.cloud.counters(),
            },
            links: Hop::ALL
                .into_iter()
                .map(|hop| (hop, network.conditions(hop)))
                .collect(),
            data_types: topology.cloud.data_type_distribution().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Ratio,
        packet::{DataType, Packet},
    };
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;

    fn config(ticks: u64) -> SimConfig {
        let mut config = SimConfig::default();
        config.simulation.time = ticks;
        config
    }

    fn single_sensor(ticks: u64, filtering: f64, aggregation: f64) -> SimConfig {
        let mut config = config(ticks);
        config.simulation.num_iot_devices = 1;
        config.simulation.device_type = Some(DeviceType::Sensor);
        config.edge.filtering_ratio = Ratio::new(filtering).unwrap();
        config.fog.aggregation_ratio = Ratio::new(aggregation).unwrap();
        config
    }

    // ----- 1. Scenarios -----

    #[test]
    fn no_filtering_no_compaction() {
        let mut simulation = Simulation::with_seed(single_sensor(100, 0.0, 1.0), 42).unwrap();
        simulation.run().unwrap();

        let topology = simulation.topology();
        let device = &topology.devices()[0];
        let edge = topology.edges()[0].counters();
        let fog = topology.fogs()[0].counters();
        let cloud = topology.cloud().counters();

        assert_eq!(device.packets_generated(), 100);
        assert_eq!(edge.packets_received, 100);
        assert_eq!(edge.packets_forwarded, 100);
        assert_eq!(fog.packets_received, 100);
        // one packet per tick, never aggregated
        assert_eq!(fog.packets_forwarded, 100);
        assert_eq!(cloud.packets_processed, fog.packets_forwarded);
    }

    #[test]
    fn half_rate_device() {
        let mut config = single_sensor(100, 0.0, 1.0);
        config.simulation.device_type = Some(DeviceType::Actuator);
        let mut simulation = Simulation::with_seed(config, 42).unwrap();
        simulation.run().unwrap();

        let edge = simulation.topology().edges()[0].counters();
        assert_eq!(edge.packets_received, 50);
        assert_eq!(edge.packets_forwarded, 50);
    }

    #[test]
    fn full_filtering() {
        let mut config = single_sensor(50, 1.0, 0.5);
        config.simulation.num_iot_devices = 5;
        let mut simulation = Simulation::with_seed(config, 42).unwrap();
        let report = simulation.run().unwrap();

        let topology = simulation.topology();
        assert_eq!(topology.edges()[0].counters().packets_received, 250);
        assert_eq!(topology.edges()[0].counters().packets_forwarded, 0);
        assert_eq!(topology.fogs()[0].counters().packets_received, 0);
        assert_eq!(topology.cloud().counters().packets_received, 0);
        assert_eq!(report.summary.data_reduction_ratio, 1.0);
        assert!(report.data_type_distribution.is_empty());
    }

    #[test]
    fn aggregation_per_type() {
        let mut config = single_sensor(30, 0.0, 0.5);
        config.simulation.num_iot_devices = 6;
        config.simulation.device_type = Some(DeviceType::Smartphone);
        let mut simulation = Simulation::with_seed(config, 5).unwrap();
        simulation.run().unwrap();

        let topology = simulation.topology();
        let fog = topology.fogs()[0].counters();
        // at most one output per data type and tick
        assert!(fog.packets_forwarded <= 30 * DataType::ALL.len() as u64);
        assert!(fog.packets_forwarded < fog.packets_received);
        assert_eq!(topology.cloud().counters().packets_received, fog.packets_forwarded);
    }

    #[test]
    fn round_robin_wiring() {
        let mut config = config(1);
        config.simulation.num_iot_devices = 7;
        config.simulation.num_edge_nodes = 3;
        config.simulation.num_fog_nodes = 2;
        let simulation = Simulation::with_seed(config, 0).unwrap();

        let topology = simulation.topology();
        let edges: Vec<Option<NodeId>> = topology.devices().iter().map(Device::edge).collect();
        assert_eq!(edges[0], Some(NodeId::edge(0)));
        assert_eq!(edges[4], Some(NodeId::edge(1)));
        assert_eq!(edges[6], Some(NodeId::edge(0)));
        assert_eq!(topology.edges()[2].fog(), Some(NodeId::fog(0)));
        assert_eq!(topology.edges()[1].fog(), Some(NodeId::fog(1)));
        assert_eq!(topology.edges()[0].devices().count(), 3);
        assert!(topology.fogs().iter().all(|fog| fog.cloud() == Some(NodeId::CLOUD)));
    }

    // ----- 2. Misconfigured topologies -----

    #[test]
    fn no_edge_nodes() {
        let mut config = config(10);
        config.simulation.num_edge_nodes = 0;
        let mut simulation = Simulation::with_seed(config, 1).unwrap();
        let report = simulation.run().unwrap();

        let topology = simulation.topology();
        assert!(topology.devices().iter().all(|device| device.packets_transmitted() == 0));
        assert!(topology.devices().iter().any(|device| device.packets_generated() > 0));
        assert_eq!(topology.cloud().counters().packets_received, 0);
        assert_eq!(report.summary.ticks, 10);
    }

    #[test]
    fn no_fog_nodes() {
        let mut config = single_sensor(10, 0.0, 0.5);
        config.simulation.num_fog_nodes = 0;
        let mut simulation = Simulation::with_seed(config, 1).unwrap();
        simulation.run().unwrap();

        let edge = simulation.topology().edges()[0].counters();
        assert_eq!(edge.packets_processed, 10);
        assert_eq!(edge.packets_forwarded, 0);
    }

    #[test]
    fn empty_pipeline() {
        let mut config = config(5);
        config.simulation.num_iot_devices = 0;
        let mut simulation = Simulation::with_seed(config, 1).unwrap();
        let report = simulation.run().unwrap();
        assert_eq!(report.summary.total_energy_wh, 0.0);
        assert_eq!(report.summary.average_latency_ms, 0.0);
    }

    #[test]
    fn unknown_destination() {
        let mut rng = ChaChaRng::seed_from_u64(0);
        let mut topology = Topology::build(&config(1), &mut rng);

        let batch = Batch::new(NodeId::device(0), NodeId::edge(9), Vec::new());
        assert!(matches!(
            topology.deliver(batch),
            Err(SimulationError::UnknownNode { .. })
        ));
        let batch = Batch::new(NodeId::fog(0), NodeId::new(Tier::Cloud, 1), Vec::new());
        assert!(matches!(
            topology.deliver(batch),
            Err(SimulationError::UnknownNode { .. })
        ));
    }

    #[test]
    fn only_one_tier_downstream() {
        let mut rng = ChaChaRng::seed_from_u64(0);
        let mut topology = Topology::build(&config(1), &mut rng);
        let packet = Packet::new(NodeId::device(0), 0, 10, DataType::Sensor);

        for (from, to) in [
            (NodeId::device(0), NodeId::fog(0)),
            (NodeId::device(0), NodeId::CLOUD),
            (NodeId::edge(0), NodeId::edge(0)),
            (NodeId::fog(0), NodeId::device(0)),
            (NodeId::CLOUD, NodeId::fog(0)),
        ] {
            let batch = Batch::new(from, to, vec![packet.clone()]);
            assert!(
                matches!(topology.deliver(batch), Err(SimulationError::Misrouted { .. })),
                "{from} -> {to}"
            );
        }
        assert_eq!(topology.fogs()[0].counters().packets_received, 0);
        assert_eq!(topology.cloud().counters().packets_received, 0);
    }

    #[test]
    fn empty_batch_dropped() {
        let mut rng = ChaChaRng::seed_from_u64(0);
        let mut topology = Topology::build(&config(1), &mut rng);

        let batch = Batch::new(NodeId::edge(0), NodeId::fog(0), Vec::new());
        assert!(batch.is_empty());
        topology.deliver(batch).unwrap();
        assert_eq!(topology.fogs()[0].counters().packets_received, 0);

        let packet = Packet::new(NodeId::device(0), 0, 10, DataType::Sensor);
        let batch = Batch::new(NodeId::device(0), NodeId::edge(0), vec![packet]);
        topology.deliver(batch).unwrap();
        assert_eq!(topology.edges()[0].buffered(), 1);
    }

    // ----- 3. Clock -----

    #[test]
    fn zero_ticks() {
        let mut simulation = Simulation::with_seed(config(0), 1).unwrap();
        assert!(simulation.is_finished());
        let report = simulation.run().unwrap();
        assert_eq!(report.summary.ticks, 0);
        assert!(report.latency_ms.is_empty());
    }

    #[test]
    fn step_after_the_end() {
        let mut simulation = Simulation::with_seed(config(2), 1).unwrap();
        simulation.step().unwrap();
        simulation.step().unwrap();
        assert!(matches!(
            simulation.step(),
            Err(SimulationError::Finished { ticks: 2 })
        ));
    }

    #[test]
    fn reproducible_with_same_seed() {
        let mut config = config(50);
        config.simulation.num_iot_devices = 8;
        config.simulation.num_edge_nodes = 2;

        let a = Simulation::with_seed(config.clone(), 99).unwrap().run().unwrap();
        let b = Simulation::with_seed(config.clone(), 99).unwrap().run().unwrap();
        assert_eq!(a, b);

        let c = Simulation::with_seed(config, 100).unwrap().run().unwrap();
        assert_ne!(a.energy_wh, c.energy_wh);
    }

    #[test]
    fn invalid_configuration() {
        let mut config = config(1);
        config.cloud.bandwidth = 0.0;
        assert!(matches!(
            Simulation::with_seed(config, 1),
            Err(SimulationError::Config(_))
        ));
    }

    // ----- 4. Invariants -----

    #[test]
    fn invariants_hold_every_tick() {
        let mut config = config(400);
        config.simulation.num_iot_devices = 12;
        config.simulation.num_edge_nodes = 3;
        config.simulation.num_fog_nodes = 2;
        let mut simulation = Simulation::with_seed(config, 7).unwrap();

        while !simulation.is_finished() {
            simulation.step().unwrap();
            let stats = simulation.stats();

            for device in simulation.topology().devices() {
                let battery = device.battery();
                assert!((0.0..=device.profile().battery_capacity).contains(&battery));
            }
            for node in stats.edges.iter().chain(&stats.fogs) {
                assert!(node.counters.packets_forwarded <= node.counters.packets_received);
                assert_eq!(node.buffered, 0);
                let ratio = node.counters.data_reduction_ratio();
                assert!((0.0..=1.0).contains(&ratio));
            }
            assert_eq!(stats.cloud.buffered, 0);
        }
    }

    #[test]
    fn stats_snapshot() {
        let mut config = config(3);
        config.simulation.num_iot_devices = 2;
        let mut simulation = Simulation::with_seed(config, 3).unwrap();
        simulation.run().unwrap();

        let stats = simulation.stats();
        assert_eq!(stats.tick, 3);
        assert_eq!(stats.devices.len(), 2);
        assert_eq!(stats.edges[0].upstream, vec![NodeId::device(0), NodeId::device(1)]);
        assert_eq!(stats.edges[0].downstream, Some(NodeId::fog(0)));
        assert_eq!(stats.cloud.upstream, vec![NodeId::fog(0)]);
        assert_eq!(stats.links.len(), 3);
    }
}
