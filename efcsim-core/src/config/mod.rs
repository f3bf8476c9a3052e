//! Configuration of a simulation run.
//!
//! The configuration is a flat set of `key = value` properties. Every
//! key is optional and falls back to its [default](crate::defaults), a
//! missing file is the same as an empty one.
//!
//! ```
//! use efcsim_core::SimConfig;
//!
//! let config = SimConfig::from_properties(
//!     "
//!     simulation.time = 120
//!     edge.filtering_ratio = 40%
//!     ",
//! )
//! .unwrap();
//!
//! assert_eq!(config.simulation.time, 120);
//! assert_eq!(config.edge.filtering_ratio.value(), 0.4);
//! assert_eq!(config.fog.aggregation_ratio.value(), 0.5);
//! ```

mod lexer;

use self::lexer::{Entry, Value};
use crate::{defaults::*, device::DeviceType, measure::Ratio};
use serde::Serialize;
use std::{
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read configuration file `{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: invalid value `{value}' for `{key}', expecting {expected}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("`{key}' {requirement}, got {value}")]
    OutOfRange {
        key: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    pub simulation: SimulationParams,
    pub network: NetworkParams,
    pub edge: EdgeParams,
    pub fog: FogParams,
    pub cloud: CloudParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationParams {
    /// Number of ticks to simulate.
    pub time: u64,
    pub num_iot_devices: usize,
    pub num_edge_nodes: usize,
    pub num_fog_nodes: usize,
    /// Seed of the random source, a fresh one is drawn if `None`.
    pub seed: Option<u64>,
    /// Type of every device, a random one per device if `None`.
    pub device_type: Option<DeviceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkParams {
    /// In ms.
    pub wireless_base_latency: f64,
    /// In bytes per ms.
    pub wireless_bandwidth: f64,
    /// In ms.
    pub edge_to_fog_latency: f64,
    /// In ms.
    pub fog_to_cloud_latency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeParams {
    /// Bytes processed per ms.
    pub processing_capacity: f64,
    /// In W.
    pub energy_consumption: f64,
    /// Probability to drop a packet.
    pub filtering_ratio: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FogParams {
    /// Bytes processed per ms.
    pub processing_capacity: f64,
    /// In W.
    pub energy_consumption: f64,
    /// Edge to fog bandwidth, in Mbps.
    pub bandwidth: f64,
    pub aggregation_ratio: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudParams {
    /// Bytes processed per ms.
    pub processing_capacity: f64,
    /// In W.
    pub energy_consumption: f64,
    /// Fog to cloud bandwidth, in Gbps.
    pub bandwidth: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            time: DEFAULT_SIMULATION_TIME,
            num_iot_devices: DEFAULT_NUM_IOT_DEVICES,
            num_edge_nodes: DEFAULT_NUM_EDGE_NODES,
            num_fog_nodes: DEFAULT_NUM_FOG_NODES,
            seed: None,
            device_type: None,
        }
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            wireless_base_latency: DEFAULT_WIRELESS_BASE_LATENCY,
            wireless_bandwidth: DEFAULT_WIRELESS_BANDWIDTH,
            edge_to_fog_latency: DEFAULT_EDGE_TO_FOG_LATENCY,
            fog_to_cloud_latency: DEFAULT_FOG_TO_CLOUD_LATENCY,
        }
    }
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            processing_capacity: DEFAULT_EDGE_PROCESSING_CAPACITY,
            energy_consumption: DEFAULT_EDGE_ENERGY_CONSUMPTION,
            filtering_ratio: Ratio::new_unchecked(DEFAULT_EDGE_FILTERING_RATIO),
        }
    }
}

impl Default for FogParams {
    fn default() -> Self {
        Self {
            processing_capacity: DEFAULT_FOG_PROCESSING_CAPACITY,
            energy_consumption: DEFAULT_FOG_ENERGY_CONSUMPTION,
            bandwidth: DEFAULT_FOG_BANDWIDTH,
            aggregation_ratio: Ratio::new_unchecked(DEFAULT_FOG_AGGREGATION_RATIO),
        }
    }
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            processing_capacity: DEFAULT_CLOUD_PROCESSING_CAPACITY,
            energy_consumption: DEFAULT_CLOUD_ENERGY_CONSUMPTION,
            bandwidth: DEFAULT_CLOUD_BANDWIDTH,
        }
    }
}

impl SimConfig {
    /// Load the configuration file at `path`.
    ///
    /// A missing file is not an error: the defaults are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_properties(&source),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "configuration file not found, using the defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse a properties source on top of the defaults.
    ///
    /// Unknown keys are ignored (with a warning), the last occurrence of a
    /// key wins.
    pub fn from_properties(source: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for entry in lexer::entries(source)? {
            config.apply(entry)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, entry: Entry<'_>) -> Result<(), ConfigError> {
        let Entry { key, value, .. } = entry;
        match key {
            "simulation.time" => self.simulation.time = integer(&entry)?,
            "simulation.num_iot_devices" => self.simulation.num_iot_devices = count(&entry)?,
            "simulation.num_edge_nodes" => self.simulation.num_edge_nodes = count(&entry)?,
            "simulation.num_fog_nodes" => self.simulation.num_fog_nodes = count(&entry)?,
            "simulation.seed" => {
                self.simulation.seed = match value {
                    Value::Word(word) if word.eq_ignore_ascii_case("random") => None,
                    _ => Some(integer(&entry)?),
                }
            }
            "simulation.device_type" => {
                self.simulation.device_type = match value {
                    Value::Word(word) if word.eq_ignore_ascii_case("random") => None,
                    Value::Word(word) => Some(
                        word.parse()
                            .map_err(|_| invalid(&entry, "a device type or `random'"))?,
                    ),
                    _ => return Err(invalid(&entry, "a device type or `random'")),
                }
            }
            "network.wireless.base_latency" => self.network.wireless_base_latency = real(&entry)?,
            "network.wireless.bandwidth" => self.network.wireless_bandwidth = real(&entry)?,
            "network.edge_to_fog.latency" => self.network.edge_to_fog_latency = real(&entry)?,
            "network.fog_to_cloud.latency" => self.network.fog_to_cloud_latency = real(&entry)?,
            "edge.processing_capacity" => self.edge.processing_capacity = real(&entry)?,
            "edge.energy_consumption" => self.edge.energy_consumption = real(&entry)?,
            "edge.filtering_ratio" => self.edge.filtering_ratio = ratio(&entry)?,
            "fog.processing_capacity" => self.fog.processing_capacity = real(&entry)?,
            "fog.energy_consumption" => self.fog.energy_consumption = real(&entry)?,
            "fog.bandwidth" => self.fog.bandwidth = real(&entry)?,
            "fog.aggregation_ratio" => self.fog.aggregation_ratio = ratio(&entry)?,
            "cloud.processing_capacity" => self.cloud.processing_capacity = real(&entry)?,
            "cloud.energy_consumption" => self.cloud.energy_consumption = real(&entry)?,
            "cloud.bandwidth" => self.cloud.bandwidth = real(&entry)?,
            unknown => tracing::warn!(line = entry.line, key = unknown, "unknown configuration key ignored"),
        }
        Ok(())
    }

    /// Check the parameters the models divide by or scale with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("network.wireless.bandwidth", self.network.wireless_bandwidth),
            ("edge.processing_capacity", self.edge.processing_capacity),
            ("fog.processing_capacity", self.fog.processing_capacity),
            ("fog.bandwidth", self.fog.bandwidth),
            ("cloud.processing_capacity", self.cloud.processing_capacity),
            ("cloud.bandwidth", self.cloud.bandwidth),
        ];
        for (key, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    key,
                    requirement: "must be a finite value greater than 0",
                    value,
                });
            }
        }

        let non_negative = [
            ("network.wireless.base_latency", self.network.wireless_base_latency),
            ("network.edge_to_fog.latency", self.network.edge_to_fog_latency),
            ("network.fog_to_cloud.latency", self.network.fog_to_cloud_latency),
            ("edge.energy_consumption", self.edge.energy_consumption),
            ("fog.energy_consumption", self.fog.energy_consumption),
            ("cloud.energy_consumption", self.cloud.energy_consumption),
        ];
        for (key, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    key,
                    requirement: "must be a finite value of at least 0",
                    value,
                });
            }
        }

        Ok(())
    }
}

fn invalid(entry: &Entry<'_>, expected: &'static str) -> ConfigError {
    let value = match entry.value {
        Value::Number(number) => number.to_owned(),
        Value::Percent(number) => format!("{number}%"),
        Value::Word(word) => word.to_owned(),
    };
    ConfigError::InvalidValue {
        line: entry.line,
        key: entry.key.to_owned(),
        value,
        expected,
    }
}

fn integer(entry: &Entry<'_>) -> Result<u64, ConfigError> {
    match entry.value {
        Value::Number(number) => number
            .parse()
            .map_err(|_| invalid(entry, "a positive integer")),
        _ => Err(invalid(entry, "a positive integer")),
    }
}

fn count(entry: &Entry<'_>) -> Result<usize, ConfigError> {
    usize::try_from(integer(entry)?).map_err(|_| invalid(entry, "a smaller count"))
}

fn real(entry: &Entry<'_>) -> Result<f64, ConfigError> {
    match entry.value {
        Value::Number(number) => number.parse().map_err(|_| invalid(entry, "a number")),
        _ => Err(invalid(entry, "a number")),
    }
}

fn ratio(entry: &Entry<'_>) -> Result<Ratio, ConfigError> {
    const EXPECTED: &str = "a ratio in [0, 1] or a percentage";

    let value: f64 = match entry.value {
        Value::Number(number) => number.parse().map_err(|_| invalid(entry, EXPECTED))?,
        Value::Percent(number) => {
            number.parse::<f64>().map_err(|_| invalid(entry, EXPECTED))? / 100.0
        }
        Value::Word(_) => return Err(invalid(entry, EXPECTED)),
    };
    Ratio::new(value).map_err(|_| invalid(entry, EXPECTED))
}
