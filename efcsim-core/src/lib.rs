/*!
# Edge-Fog-Cloud pipeline simulation

Discrete-tick simulation of a hierarchical IoT → Edge → Fog → Cloud data
pipeline. At every tick synthetic devices produce [`Packet`]s, the edge
tier filters and shrinks them, the fog tier aggregates them by
[`DataType`] and the cloud runs per-type analytics before discarding
the input. The [`MetricsCollector`] samples every tier once per tick.

```
use efcsim_core::{SimConfig, Simulation};

let mut config = SimConfig::default();
config.simulation.time = 10;

let mut simulation = Simulation::with_seed(config, 42)?;
let report = simulation.run()?;

assert_eq!(report.summary.ticks, 10);
# Ok::<(), efcsim_core::SimulationError>(())
```

All the randomness of a run is drawn from the single generator owned by
the [`SimContext`]: a given seed and configuration always produce the
same report.
*/

pub mod config;
pub mod data;
pub mod defaults;
pub mod device;
pub mod measure;
pub mod metrics;
pub mod network;
pub mod node;
pub mod packet;
pub mod sim_context;
pub mod simulation;
pub mod stats;
pub mod synth;
pub mod tier;

pub use self::{
    config::{ConfigError, SimConfig},
    device::{Device, DeviceProfile, DeviceType, UnknownDeviceType},
    measure::{Ratio, RatioError, RatioParseError},
    metrics::{LayerSummary, LayerTotals, MetricsCollector, SimulationReport, Summary},
    network::{Hop, LinkConditions, NetworkModel},
    node::{NodeId, Tier},
    packet::{DataType, Packet, PacketStatus},
    sim_context::SimContext,
    simulation::{Simulation, SimulationError, Topology},
    stats::{DeviceStats, NodeStats, PipelineStats},
    synth::DataSynthesizer,
    tier::{Batch, CloudDataCenter, EdgeNode, FogNode, NodeCounters, TierNode},
};
