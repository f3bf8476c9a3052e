use crate::measure::sample;
use rand_core::Rng;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// The kind of an IoT device, it selects the device's [`DeviceProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Sensor,
    Actuator,
    Smartphone,
    Wearable,
    /// Profile of a device of no particular kind. Never picked at random.
    Generic,
}

/// The constants describing a [`DeviceType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    /// Battery capacity, in mWh.
    pub battery_capacity: f64,
    /// Processing power, in MIPS. Informative only.
    pub processing_power: f64,
    /// Radio transmission power, in mW.
    pub transmission_power: f64,
    /// Packets generated per tick.
    pub generation_rate: f64,
    /// Probability of each data type, in the order of
    /// [`DataType::ALL`](crate::DataType::ALL).
    pub data_probabilities: [f64; 5],
}

impl DeviceType {
    pub const ALL: [Self; 5] = [
        Self::Sensor,
        Self::Actuator,
        Self::Smartphone,
        Self::Wearable,
        Self::Generic,
    ];

    /// The device types a device is randomly given.
    pub const RANDOM_POOL: [Self; 4] = [Self::Sensor, Self::Actuator, Self::Smartphone, Self::Wearable];

    /// Pick a type uniformly in [`Self::RANDOM_POOL`].
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let index = sample::below(rng, Self::RANDOM_POOL.len() as u64) as usize;
        Self::RANDOM_POOL[index]
    }

    /// ```
    /// # use efcsim_core::DeviceType;
    /// let profile = DeviceType::Wearable.profile();
    /// assert_eq!(profile.battery_capacity, 500.0);
    /// assert_eq!(profile.generation_rate, 2.0);
    /// ```
    pub const fn profile(self) -> DeviceProfile {
        match self {
            Self::Sensor => DeviceProfile {
                battery_capacity: 2_000.0,
                processing_power: 100.0,
                transmission_power: 50.0,
                generation_rate: 1.0,
                data_probabilities: [0.9, 0.05, 0.0, 0.0, 0.05],
            },
            Self::Actuator => DeviceProfile {
                battery_capacity: 3_000.0,
                processing_power: 200.0,
                transmission_power: 100.0,
                generation_rate: 0.5,
                data_probabilities: [0.7, 0.0, 0.0, 0.0, 0.3],
            },
            Self::Smartphone => DeviceProfile {
                battery_capacity: 4_000.0,
                processing_power: 2_000.0,
                transmission_power: 200.0,
                generation_rate: 5.0,
                data_probabilities: [0.2, 0.2, 0.2, 0.2, 0.2],
            },
            Self::Wearable => DeviceProfile {
                battery_capacity: 500.0,
                processing_power: 500.0,
                transmission_power: 30.0,
                generation_rate: 2.0,
                data_probabilities: [0.7, 0.1, 0.0, 0.15, 0.05],
            },
            Self::Generic => DeviceProfile {
                battery_capacity: 1_000.0,
                processing_power: 100.0,
                transmission_power: 50.0,
                generation_rate: 1.0,
                data_probabilities: [0.4, 0.15, 0.15, 0.15, 0.15],
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "SENSOR",
            Self::Actuator => "ACTUATOR",
            Self::Smartphone => "SMARTPHONE",
            Self::Wearable => "WEARABLE",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = UnknownDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|device_type| device_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDeviceType(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown device type `{0}', expecting one of sensor, actuator, smartphone, wearable or generic")]
pub struct UnknownDeviceType(String);
