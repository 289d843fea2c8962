use itertools::Itertools;
use ndarray::Array1;
use rand::Rng;
use rayon::prelude::*;

use crate::config::Config;
use crate::fitness::Fitness;
use crate::network::Network;
use crate::organism::rank_key;

/// The networks of one generation.
///
/// Scores are kept outside of the population, in an array aligned with the network vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    networks: Vec<Network>,
}

impl Population {
    /// Create `size` fresh networks with `input_count` inputs each.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        config: &Config,
        input_count: usize,
        rng: &mut R,
    ) -> Population {
        let networks = (0..size).map(|_| Network::from_config(config, input_count, rng)).collect();
        Population { networks }
    }

    pub fn from_networks(networks: Vec<Network>) -> Population {
        Population { networks }
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Network> {
        self.networks.get(index)
    }

    /// Install `network` in slot `index`, dropping the previous occupant.
    pub fn replace(&mut self, index: usize, network: Network) {
        self.networks[index] = network;
    }

    /// Score every network with the same shared weight, in parallel.
    ///
    /// The weight is stored in the networks. The returned array is aligned with
    /// [`Population::networks`].
    pub fn score<F: Fitness + ?Sized>(&mut self, weight: f64, fitness: &F) -> Array1<f64> {
        let scores: Vec<f64> = self
            .networks
            .par_iter_mut()
            .map(|network| {
                network.set_weight(weight);
                fitness.score(network)
            })
            .collect();
        Array1::from(scores)
    }

    /// Population indices ordered by descending score.
    ///
    /// NaN scores rank last, equal scores keep the lower index first.
    pub fn rank(scores: &Array1<f64>) -> Vec<usize> {
        let key = |i: usize| rank_key(scores[i]);
        (0..scores.len()).sorted_by(|&a, &b| key(b).total_cmp(&key(a)).then(a.cmp(&b))).collect()
    }
}
