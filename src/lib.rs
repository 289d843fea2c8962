//! Weight Agnostic Neural Networks [WANN]
//! (https://weightagnostic.github.io)
//!
//! Instead of training connection weights, the topology of a network is evolved while every
//! connection shares one single weight. Networks are scored over random shared weights, so
//! that only topologies performing well regardless of the weight survive, and penalized by
//! their complexity. The weight of the final champion is tuned by a fine sweep.
#[macro_use]
extern crate generator;

pub use self::activation::ActivationFunction;
pub use self::config::{Config, WeightSweep, MAX_SWEEP_STEPS};
pub use self::error::{ConfigError, EvolveError, TopologyError};
pub use self::evolution::{
    evolve, Elitism, Evolution, Evolved, Evolver, GenerationStats, Phase, StopReason,
};
pub use self::fitness::{Fitness, TrainingData};
pub use self::mutation::Mutation;
pub use self::network::Network;
pub use self::neuron::{Neuron, NeuronIndex};
pub use self::organism::Organism;
pub use self::population::Population;

pub mod activation;
pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod mutation;
pub mod network;
pub mod neuron;
pub mod organism;
pub mod population;
