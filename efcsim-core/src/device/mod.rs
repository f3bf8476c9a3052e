mod profile;

pub use self::profile::{DeviceProfile, DeviceType, UnknownDeviceType};
use crate::{
    defaults::DEVICE_ENERGY_DIVISOR,
    network::Hop,
    node::NodeId,
    sim_context::SimContext,
    synth::DataSynthesizer,
    tier::Batch,
};

/// A simulated IoT device.
///
/// Every tick it may sense one packet and transmit it to its edge node,
/// paying for the transmission with its battery. A depleted battery does
/// not stop the device.
#[derive(Debug, Clone)]
pub struct Device {
    id: NodeId,
    device_type: DeviceType,
    profile: DeviceProfile,
    synthesizer: DataSynthesizer,
    edge: Option<NodeId>,
    battery: f64,
    depleted: bool,
    generated: u64,
    transmitted: u64,
    energy_mwh: f64,
    latencies: Vec<f64>,
}

impl Device {
    pub fn new(index: usize, device_type: DeviceType) -> Self {
        let profile = device_type.profile();
        Self {
            id: NodeId::device(index),
            device_type,
            profile,
            synthesizer: DataSynthesizer::for_device(device_type),
            edge: None,
            battery: profile.battery_capacity,
            depleted: false,
            generated: 0,
            transmitted: 0,
            energy_mwh: 0.0,
            latencies: Vec::new(),
        }
    }

    pub fn assign_edge(&mut self, edge: NodeId) {
        self.edge = Some(edge);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn edge(&self) -> Option<NodeId> {
        self.edge
    }

    /// `true` if the device senses data at `tick`.
    ///
    /// A device of rate `r` generates when `tick mod (1 / r) < 1`, so it
    /// never generates more than one packet per tick.
    pub fn should_generate(&self, tick: u64) -> bool {
        tick as f64 % (1.0 / self.profile.generation_rate) < 1.0
    }

    /// Sense and transmit for `tick`.
    ///
    /// Returns the packet for the edge node, if the device generated one
    /// and has an edge node assigned.
    pub fn on_tick(&mut self, tick: u64, ctx: &mut SimContext) -> Option<Batch> {
        if !self.should_generate(tick) {
            return None;
        }

        let packet = self.synthesizer.generate(self.id, tick, ctx.rng());
        self.generated += 1;

        let latency = ctx.latency(Hop::DeviceToEdge, packet.size());
        self.latencies.push(latency);

        let bandwidth = ctx.network().link(Hop::DeviceToEdge).bandwidth;
        let transmission_ms = if bandwidth > 0.0 {
            packet.size() as f64 / bandwidth
        } else {
            0.0
        };
        self.consume(self.profile.transmission_power * transmission_ms / DEVICE_ENERGY_DIVISOR);

        tracing::trace!(device = %self.id, tick, %packet, latency, "packet generated");

        let Some(edge) = self.edge else {
            tracing::warn!(device = %self.id, tick, "no edge node assigned, packet dropped");
            return None;
        };
        self.transmitted += 1;
        Some(Batch::new(self.id, edge, vec![packet]))
    }

    fn consume(&mut self, energy_mwh: f64) {
        self.energy_mwh += energy_mwh;
        self.battery -= energy_mwh;
        if self.battery <= 0.0 {
            self.battery = 0.0;
            if !self.depleted {
                self.depleted = true;
                tracing::warn!(device = %self.id, "battery depleted");
            }
        }
    }

    /// Remaining battery, in mWh.
    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn battery_percentage(&self) -> f64 {
        if self.profile.battery_capacity <= 0.0 {
            return 0.0;
        }
        self.battery / self.profile.battery_capacity * 100.0
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    pub fn packets_generated(&self) -> u64 {
        self.generated
    }

    pub fn packets_transmitted(&self) -> u64 {
        self.transmitted
    }

    /// Energy spent transmitting, in mWh.
    pub fn energy_mwh(&self) -> f64 {
        self.energy_mwh
    }

    /// Average latency of the transmissions (ms), `0` if none happened.
    pub fn average_transmission_latency(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.latencies.iter().sum::<f64>() / self.latencies.len() as f64
    }

    pub fn latency_samples(&self) -> usize {
        self.latencies.len()
    }
}
