//! Latency model of the three hops of the pipeline.
//!
//! Every hop has a static part (base latency and bandwidth, from the
//! configuration) and a dynamic part ([`LinkConditions`]) that drifts
//! randomly every tick and spikes every
//! [`CONGESTION_SPIKE_PERIOD`](crate::defaults::CONGESTION_SPIKE_PERIOD)
//! ticks.

mod hop;

pub use self::hop::{Hop, LinkConditions};
use crate::{config::SimConfig, defaults::CONGESTION_SPIKE_PERIOD, measure::sample};
use rand_core::Rng;

const QUALITY_RANGE: (f64, f64) = (0.5, 1.0);
const QUALITY_STEP: f64 = 0.1;
const MIN_CONGESTION: f64 = 1.0;
const CONGESTION_STEP: f64 = 0.2;
/// centre of the congestion walk, below `0.5` so congestion tends to ease
const CONGESTION_BIAS: f64 = 0.3;

/// Static and dynamic parameters of one [`Hop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopLink {
    /// Latency paid by any transmission, in ms.
    pub base_latency_ms: f64,
    /// Bytes transmitted per ms.
    pub bandwidth: f64,
    pub conditions: LinkConditions,
}

/// The network of the pipeline.
///
/// ```
/// # use efcsim_core::{Hop, NetworkModel, SimConfig};
/// let network = NetworkModel::from_config(&SimConfig::default());
///
/// let small = network.base_latency(Hop::DeviceToEdge, 10);
/// let large = network.base_latency(Hop::DeviceToEdge, 10_000);
/// assert!(small < large);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkModel {
    links: [HopLink; 3],
}

impl HopLink {
    pub fn new(base_latency_ms: f64, bandwidth: f64, hop: Hop) -> Self {
        Self {
            base_latency_ms,
            bandwidth,
            conditions: hop.initial_conditions(),
        }
    }
}

impl NetworkModel {
    pub fn new(device_to_edge: HopLink, edge_to_fog: HopLink, fog_to_cloud: HopLink) -> Self {
        Self {
            links: [device_to_edge, edge_to_fog, fog_to_cloud],
        }
    }

    /// Build the network of a configuration.
    ///
    /// The fog bandwidth (Mbps) and the cloud bandwidth (Gbps) are
    /// converted into bytes per ms with a `1024` multiplier per unit step.
    pub fn from_config(config: &SimConfig) -> Self {
        let network = &config.network;
        Self::new(
            HopLink::new(
                network.wireless_base_latency,
                network.wireless_bandwidth,
                Hop::DeviceToEdge,
            ),
            HopLink::new(
                network.edge_to_fog_latency,
                config.fog.bandwidth * 1_024.0 / 8.0,
                Hop::EdgeToFog,
            ),
            HopLink::new(
                network.fog_to_cloud_latency,
                config.cloud.bandwidth * 1_024.0 * 1_024.0 / 8.0,
                Hop::FogToCloud,
            ),
        )
    }

    pub fn link(&self, hop: Hop) -> &HopLink {
        &self.links[hop.index()]
    }

    pub fn conditions(&self, hop: Hop) -> LinkConditions {
        self.link(hop).conditions
    }

    /// Force the conditions of a hop. They are clamped to their valid
    /// ranges.
    pub fn set_conditions(&mut self, hop: Hop, conditions: LinkConditions) {
        self.links[hop.index()].conditions = LinkConditions {
            quality: conditions.quality.clamp(QUALITY_RANGE.0, QUALITY_RANGE.1),
            congestion: conditions.congestion.max(MIN_CONGESTION),
        };
    }

    /// Latency (ms) of transmitting `size` bytes over `hop`, without jitter.
    pub fn base_latency(&self, hop: Hop, size: u64) -> f64 {
        let link = self.link(hop);
        let transmission = if link.bandwidth > 0.0 {
            size as f64 / link.bandwidth
        } else {
            0.0
        };
        (link.base_latency_ms + transmission) * (1.0 / link.conditions.quality)
            * link.conditions.congestion
    }

    /// Latency (ms) of transmitting `size` bytes over `hop`.
    ///
    /// Consumes one draw of `rng` for the jitter.
    pub fn latency<R: Rng>(&self, hop: Hop, size: u64, rng: &mut R) -> f64 {
        self.base_latency(hop, size) + sample::unit(rng) * hop.max_jitter_ms()
    }

    /// Let the conditions of every hop drift for `tick`.
    ///
    /// The qualities walk first, then the congestions, in the order of
    /// [`Hop::ALL`]. Returns `true` if `tick` is a congestion spike.
    pub fn update_conditions<R: Rng>(&mut self, tick: u64, rng: &mut R) -> bool {
        for link in self.links.iter_mut() {
            let variation = (sample::unit(rng) - 0.5) * QUALITY_STEP;
            link.conditions.quality =
                (link.conditions.quality + variation).clamp(QUALITY_RANGE.0, QUALITY_RANGE.1);
        }

        for link in self.links.iter_mut() {
            let variation = (sample::unit(rng) - CONGESTION_BIAS) * CONGESTION_STEP;
            link.conditions.congestion = (link.conditions.congestion + variation).max(MIN_CONGESTION);
        }

        let spike = tick % CONGESTION_SPIKE_PERIOD == 0;
        if spike {
            for hop in Hop::ALL {
                self.links[hop.index()].conditions.congestion *= hop.spike_factor();
            }
            tracing::info!(tick, "network congestion spike");
        }
        spike
    }
}
