use crate::{node::Tier, packet::DataType};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// One layer in the [`Summary`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct LayerSummary {
    pub processing_time_ms: f64,
    pub energy_wh: f64,
    /// Share of the total energy, in percent.
    pub energy_share: f64,
    pub packets: u64,
    /// Packets of this layer relative to the packets generated, in percent.
    pub packet_share: f64,
}

/// The summary statistics of a run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub ticks: u64,
    pub average_latency_ms: f64,
    pub total_energy_wh: f64,
    pub average_bandwidth_mb: f64,
    pub final_bandwidth_mb: f64,
    pub data_reduction_ratio: f64,
    pub layers: BTreeMap<Tier, LayerSummary>,
}

/// Everything a run produced: the summary, the time series (keyed by
/// tick) and the data types the cloud received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub summary: Summary,
    pub latency_ms: BTreeMap<u64, f64>,
    pub energy_wh: BTreeMap<u64, f64>,
    pub bandwidth_mb: BTreeMap<u64, f64>,
    pub data_reduction: BTreeMap<u64, f64>,
    pub data_type_distribution: BTreeMap<DataType, u64>,
}

impl Summary {
    pub fn layer(&self, tier: Tier) -> LayerSummary {
        self.layers.get(&tier).copied().unwrap_or_default()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;

        writeln!(f, "=== SIMULATION RESULTS ===")?;
        writeln!(f, "Ticks: {} (seed {})", summary.ticks, self.seed)?;

        writeln!(f)?;
        writeln!(f, "--- Latency ---")?;
        writeln!(f, "Average end-to-end latency: {:.2} ms", summary.average_latency_ms)?;

        writeln!(f)?;
        writeln!(f, "--- Energy Consumption ---")?;
        writeln!(f, "Total energy consumption: {:.2} Wh", summary.total_energy_wh)?;
        for (tier, label) in [
            (Tier::Iot, "IoT devices"),
            (Tier::Edge, "Edge nodes"),
            (Tier::Fog, "Fog nodes"),
            (Tier::Cloud, "Cloud"),
        ] {
            let layer = summary.layer(tier);
            writeln!(
                f,
                "  {label}: {:.2} Wh ({:.1}%)",
                layer.energy_wh, layer.energy_share
            )?;
        }

        writeln!(f)?;
        writeln!(f, "--- Bandwidth Usage ---")?;
        writeln!(f, "Average bandwidth usage: {:.2} MB", summary.average_bandwidth_mb)?;
        writeln!(f, "Final bandwidth usage: {:.2} MB", summary.final_bandwidth_mb)?;

        writeln!(f)?;
        writeln!(f, "--- Data Reduction ---")?;
        writeln!(
            f,
            "Overall data reduction ratio: {:.2}%",
            summary.data_reduction_ratio * 100.0
        )?;

        writeln!(f)?;
        writeln!(f, "--- Processing Distribution ---")?;
        writeln!(f, "Data packets generated: {}", summary.layer(Tier::Iot).packets)?;
        for (tier, label) in [(Tier::Edge, "Edge"), (Tier::Fog, "Fog"), (Tier::Cloud, "Cloud")] {
            let layer = summary.layer(tier);
            writeln!(
                f,
                "Packets processed at {label}: {} ({:.1}%)",
                layer.packets, layer.packet_share
            )?;
        }

        if !self.data_type_distribution.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Cloud Data Types ---")?;
            for (data_type, count) in &self.data_type_distribution {
                writeln!(f, "  {data_type}: {count}")?;
            }
        }

        write!(f, "==========================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SimulationReport {
        let mut layers = BTreeMap::new();
        layers.insert(
            Tier::Iot,
            LayerSummary {
                energy_wh: 1.0,
                energy_share: 25.0,
                packets: 200,
                packet_share: 100.0,
                ..Default::default()
            },
        );
        layers.insert(
            Tier::Edge,
            LayerSummary {
                processing_time_ms: 12.5,
                energy_wh: 3.0,
                energy_share: 75.0,
                packets: 80,
                packet_share: 40.0,
            },
        );

        SimulationReport {
            seed: 42,
            summary: Summary {
                ticks: 2,
                average_latency_ms: 21.4567,
                total_energy_wh: 4.0,
                average_bandwidth_mb: 0.5,
                final_bandwidth_mb: 1.0,
                data_reduction_ratio: 0.6,
                layers,
            },
            latency_ms: BTreeMap::from([(0, 20.0), (1, 22.912)]),
            energy_wh: BTreeMap::from([(0, 2.0), (1, 4.0)]),
            bandwidth_mb: BTreeMap::from([(0, 0.0), (1, 1.0)]),
            data_reduction: BTreeMap::from([(0, 0.6), (1, 0.6)]),
            data_type_distribution: BTreeMap::from([(DataType::Sensor, 30)]),
        }
    }

    #[test]
    fn display() {
        let text = report().to_string();
        assert!(text.contains("Average end-to-end latency: 21.46 ms"), "{text}");
        assert!(text.contains("  IoT devices: 1.00 Wh (25.0%)"), "{text}");
        assert!(text.contains("  Fog nodes: 0.00 Wh (0.0%)"), "{text}");
        assert!(text.contains("Overall data reduction ratio: 60.00%"), "{text}");
        assert!(text.contains("Packets processed at Edge: 80 (40.0%)"), "{text}");
        assert!(text.contains("  SENSOR: 30"), "{text}");
    }

    #[test]
    fn missing_layer_is_zero() {
        assert_eq!(report().summary.layer(Tier::Cloud), LayerSummary::default());
    }
}
