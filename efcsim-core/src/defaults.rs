//! Default parameters and model constants of the pipeline.
//!
//! The `DEFAULT_*` values populate a [`SimConfig`] when a key (or the
//! whole configuration source) is missing.
//!
//! [`SimConfig`]: crate::config::SimConfig

/// Default number of ticks of a simulation run.
///
/// One tick models one second of simulated time.
///
/// ```
/// # use efcsim_core::{defaults::*, SimConfig};
/// assert_eq!(
///     SimConfig::default().simulation.time,
///     DEFAULT_SIMULATION_TIME,
/// );
/// ```
pub const DEFAULT_SIMULATION_TIME: u64 = 60;

pub const DEFAULT_NUM_IOT_DEVICES: usize = 3;
pub const DEFAULT_NUM_EDGE_NODES: usize = 1;
pub const DEFAULT_NUM_FOG_NODES: usize = 1;

/// Base latency (ms) of the wireless device → edge hop.
pub const DEFAULT_WIRELESS_BASE_LATENCY: f64 = 10.0;
/// Bandwidth of the wireless device → edge hop, in bytes per millisecond.
pub const DEFAULT_WIRELESS_BANDWIDTH: f64 = 1_000.0;
/// Base latency (ms) of the edge → fog hop.
pub const DEFAULT_EDGE_TO_FOG_LATENCY: f64 = 20.0;
/// Base latency (ms) of the fog → cloud hop.
pub const DEFAULT_FOG_TO_CLOUD_LATENCY: f64 = 50.0;

pub const DEFAULT_EDGE_PROCESSING_CAPACITY: f64 = 1_000.0;
/// Power draw of an edge node, in W.
pub const DEFAULT_EDGE_ENERGY_CONSUMPTION: f64 = 50.0;
/// Probability that an edge node drops a packet.
pub const DEFAULT_EDGE_FILTERING_RATIO: f64 = 0.6;

pub const DEFAULT_FOG_PROCESSING_CAPACITY: f64 = 5_000.0;
/// Power draw of a fog node, in W.
pub const DEFAULT_FOG_ENERGY_CONSUMPTION: f64 = 200.0;
/// Fog uplink bandwidth, in Mbps.
pub const DEFAULT_FOG_BANDWIDTH: f64 = 100.0;
/// Size factor applied when a fog node combines packets of the same type.
pub const DEFAULT_FOG_AGGREGATION_RATIO: f64 = 0.5;

pub const DEFAULT_CLOUD_PROCESSING_CAPACITY: f64 = 50_000.0;
/// Power draw of the cloud data center, in W.
pub const DEFAULT_CLOUD_ENERGY_CONSUMPTION: f64 = 1_000.0;
/// Cloud ingress bandwidth, in Gbps.
pub const DEFAULT_CLOUD_BANDWIDTH: f64 = 10.0;

/// Fraction of the size an edge node keeps when it processes a packet.
pub const EDGE_SIZE_FACTOR: f64 = 0.7;

/// Fraction of the size a fog node keeps when it processes a lone packet.
///
/// ```
/// # use efcsim_core::defaults::*;
/// assert_eq!((1_000.0 * FOG_SINGLE_SIZE_FACTOR) as u64, 900);
/// ```
pub const FOG_SINGLE_SIZE_FACTOR: f64 = 0.9;

/// Milliseconds in one hour, converts `W × ms` into `Wh`.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Converts a device's `mW × ms` transmission cost into its battery unit.
pub const DEVICE_ENERGY_DIVISOR: f64 = 3_600.0;

/// Bytes in one megabyte (MiB) for the bandwidth accounting.
///
/// ```
/// # use efcsim_core::defaults::*;
/// assert_eq!(BYTES_PER_MB, 1_024.0 * 1_024.0);
/// ```
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Every `CONGESTION_SPIKE_PERIOD` ticks all the hops get a congestion spike.
pub const CONGESTION_SPIKE_PERIOD: u64 = 300;
