use crate::network::{Hop, NetworkModel};
use rand::{RngCore as _, rngs::OsRng};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;

/// The state shared by every node of one simulation run.
///
/// All the randomness of the run is drawn from one [`ChaChaRng`], so a
/// run is fully determined by its [`seed`](Self::seed). The context is
/// passed by `&mut` to every tick call, in the pipeline order.
#[derive(Debug, Clone)]
pub struct SimContext {
    seed: u64,
    rng: ChaChaRng,
    network: NetworkModel,
}

impl SimContext {
    pub fn new(network: NetworkModel, seed: u64) -> Self {
        Self {
            seed,
            rng: ChaChaRng::seed_from_u64(seed),
            network,
        }
    }

    /// A fresh seed from the operating system's random source.
    pub fn entropy_seed() -> Result<u64, rand::Error> {
        let mut seed = [0; 8];
        OsRng.try_fill_bytes(&mut seed)?;
        Ok(u64::from_le_bytes(seed))
    }

    /// The seed the random source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut ChaChaRng {
        &mut self.rng
    }

    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NetworkModel {
        &mut self.network
    }

    /// Latency (ms) of transmitting `size` bytes over `hop` now.
    pub fn latency(&mut self, hop: Hop, size: u64) -> f64 {
        self.network.latency(hop, size, &mut self.rng)
    }

    /// Let the network conditions drift, see [`NetworkModel::update_conditions`].
    pub fn update_conditions(&mut self, tick: u64) -> bool {
        self.network.update_conditions(tick, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;

    fn context(seed: u64) -> SimContext {
        SimContext::new(NetworkModel::from_config(&SimConfig::default()), seed)
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = context(7);
        let mut b = context(7);
        for tick in 1..50 {
            a.update_conditions(tick);
            b.update_conditions(tick);
            assert_eq!(a.latency(Hop::EdgeToFog, 1_000), b.latency(Hop::EdgeToFog, 1_000));
        }
        assert_eq!(a.network(), b.network());
    }

    #[test]
    fn different_seed_different_draws() {
        let mut a = context(7);
        let mut b = context(8);
        assert_ne!(a.latency(Hop::EdgeToFog, 1_000), b.latency(Hop::EdgeToFog, 1_000));
    }

    #[test]
    fn entropy_seeds_differ() {
        let a = SimContext::entropy_seed().unwrap();
        let b = SimContext::entropy_seed().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn keeps_seed() {
        assert_eq!(context(1234).seed(), 1234);
    }
}
