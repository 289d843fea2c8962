use std::cmp::Ordering;

use crate::network::Network;

/// A network together with the shared weight it was scored with and its score.
///
/// Used to keep the all-time champion independent of the population, which is rebuilt
/// every generation. Organisms are ordered by score, NaN is treated as the lowest score.
#[derive(Debug, Clone)]
pub struct Organism {
    pub network: Network,
    pub weight: f64,
    pub score: f64,
}

impl Organism {
    pub fn new(network: Network, weight: f64, score: f64) -> Organism {
        Organism { network, weight, score }
    }

    /// Check if `score` strictly beats the score of this organism.
    pub fn is_beaten_by(&self, score: f64) -> bool {
        rank_key(score) > rank_key(self.score)
    }

    /// The network with its shared weight set to the weight of this organism.
    pub fn into_network(self) -> Network {
        let mut network = self.network;
        network.set_weight(self.weight);
        network
    }
}

/// Score used for comparisons, NaN maps to negative infinity.
pub(crate) fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

impl Ord for Organism {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_key(self.score).total_cmp(&rank_key(other.score))
    }
}

impl Eq for Organism {}

impl PartialEq for Organism {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Organism {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
