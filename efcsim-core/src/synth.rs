use crate::{
    device::DeviceType,
    measure::sample,
    node::NodeId,
    packet::{DataType, Packet},
};
use rand_core::Rng;

/// Produces the [`Packet`]s of one simulated device.
///
/// The data type of every packet is drawn from a fixed probability
/// vector over [`DataType::ALL`], its size from the range of that type
/// (see [`DataType::size_range`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DataSynthesizer {
    probabilities: [f64; 5],
}

impl DataSynthesizer {
    /// Create a synthesizer with the given probabilities, in the order
    /// of [`DataType::ALL`].
    pub fn new(probabilities: [f64; 5]) -> Self {
        Self { probabilities }
    }

    /// The synthesizer of a device of the given type.
    pub fn for_device(device_type: DeviceType) -> Self {
        Self::new(device_type.profile().data_probabilities)
    }

    pub fn probabilities(&self) -> &[f64; 5] {
        &self.probabilities
    }

    /// Synthesize one packet sensed by `source` at `tick`.
    ///
    /// The data type is drawn before the size, each consumes one draw
    /// of `rng`.
    pub fn generate<R: Rng>(&self, source: NodeId, tick: u64, rng: &mut R) -> Packet {
        let data_type = self.select_data_type(rng);
        let size = Self::sample_size(data_type, rng);
        Packet::new(source, tick, size, data_type)
    }

    /// Walk the cumulative probabilities until they reach a uniform draw.
    ///
    /// Falls back to [`DataType::Sensor`] if the probabilities sum to
    /// less than the draw.
    pub fn select_data_type<R: Rng>(&self, rng: &mut R) -> DataType {
        let draw = sample::unit(rng);
        let mut cumulative = 0.0;
        for (data_type, probability) in DataType::ALL.into_iter().zip(self.probabilities) {
            cumulative += probability;
            if draw <= cumulative {
                return data_type;
            }
        }
        DataType::Sensor
    }

    pub fn sample_size<R: Rng>(data_type: DataType, rng: &mut R) -> u64 {
        let (base, span) = data_type.size_range();
        base + sample::below(rng, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;
    use std::collections::BTreeMap;

    fn rng() -> ChaChaRng {
        ChaChaRng::seed_from_u64(42)
    }

    fn frequencies(synthesizer: &DataSynthesizer, draws: usize) -> BTreeMap<DataType, f64> {
        let mut rng = rng();
        let mut counts = BTreeMap::new();
        for _ in 0..draws {
            *counts.entry(synthesizer.select_data_type(&mut rng)).or_insert(0usize) += 1;
        }
        counts
            .into_iter()
            .map(|(data_type, count)| (data_type, count as f64 / draws as f64))
            .collect()
    }

    // ----- 1. Data type selection -----

    #[test]
    fn frequencies_converge() {
        for device_type in DeviceType::ALL {
            let synthesizer = DataSynthesizer::for_device(device_type);
            let observed = frequencies(&synthesizer, 50_000);

            for (data_type, expected) in DataType::ALL.into_iter().zip(synthesizer.probabilities) {
                let observed = observed.get(&data_type).copied().unwrap_or(0.0);
                assert!(
                    (observed - expected).abs() < 0.01,
                    "{device_type} {data_type}: observed {observed}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn never_draws_impossible_type() {
        let synthesizer = DataSynthesizer::for_device(DeviceType::Actuator);
        let observed = frequencies(&synthesizer, 10_000);
        assert!(!observed.contains_key(&DataType::Image));
        assert!(!observed.contains_key(&DataType::Video));
        assert!(!observed.contains_key(&DataType::Audio));
    }

    #[test]
    fn short_probabilities_fall_back_to_sensor() {
        let synthesizer = DataSynthesizer::new([0.0; 5]);
        let mut rng = rng();
        for _ in 0..1_000 {
            assert_eq!(synthesizer.select_data_type(&mut rng), DataType::Sensor);
        }
    }

    #[test]
    fn certain_type() {
        let synthesizer = DataSynthesizer::new([0.0, 0.0, 1.0, 0.0, 0.0]);
        let mut rng = rng();
        for _ in 0..1_000 {
            assert_eq!(synthesizer.select_data_type(&mut rng), DataType::Video);
        }
    }

    // ----- 2. Sizes -----

    #[test]
    fn sizes_in_range() {
        let mut rng = rng();
        for data_type in DataType::ALL {
            let (base, span) = data_type.size_range();
            for _ in 0..1_000 {
                let size = DataSynthesizer::sample_size(data_type, &mut rng);
                assert!((base..base + span).contains(&size), "{data_type}: {size}");
            }
        }
    }

    // ----- 3. Packets -----

    #[test]
    fn generate() {
        let synthesizer = DataSynthesizer::for_device(DeviceType::Sensor);
        let mut rng = rng();
        let packet = synthesizer.generate(NodeId::device(2), 17, &mut rng);

        assert_eq!(packet.source(), NodeId::device(2));
        assert_eq!(packet.timestamp(), 17);
        assert_eq!(packet.status(), crate::PacketStatus::Raw);
        let (base, span) = packet.data_type().size_range();
        assert!((base..base + span).contains(&packet.size()));
    }

    #[test]
    fn reproducible_with_same_seed() {
        let synthesizer = DataSynthesizer::for_device(DeviceType::Smartphone);
        let run = || {
            let mut rng = rng();
            (0..100)
                .map(|tick| synthesizer.generate(NodeId::device(0), tick, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
