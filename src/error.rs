//! Error types of the topology operators and the evolution loop.
use thiserror::Error;

use crate::neuron::NeuronIndex;

/// A structural precondition of a topology operator did not hold.
///
/// These are expected during random search: the mutation step simply retries with
/// other nodes and eventually gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("a neuron can not be connected to itself ({0})")]
    SelfConnection(NeuronIndex),
    #[error("neuron {0} does not exist")]
    OutOfRange(NeuronIndex),
    #[error("neurons {0} and {1} have no defined order")]
    Unordered(NeuronIndex, NeuronIndex),
    #[error("the output neuron {0} can not feed another neuron")]
    FromOutput(NeuronIndex),
    #[error("the network input neuron {0} can not receive inputs")]
    IntoInput(NeuronIndex),
    #[error("can not insert a neuron between two network inputs ({0}, {1})")]
    BothInputs(NeuronIndex, NeuronIndex),
    #[error("neuron {1} already has {0} as input")]
    DuplicateEdge(NeuronIndex, NeuronIndex),
    #[error("neuron {1} does not have {0} as input")]
    MissingEdge(NeuronIndex, NeuronIndex),
    #[error("connecting {0} to {1} would introduce a cycle")]
    Cycle(NeuronIndex, NeuronIndex),
    #[error("neuron {0} has no input connection to split")]
    NothingToSplit(NeuronIndex),
}

/// An invalid [`Config`](crate::Config).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("at least one generation is required")]
    NoGenerations,
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("elite fraction {0} keeps no network of the population")]
    EmptyElite(f64),
    #[error("complexity multiplier must be positive, got {0}")]
    ComplexityMultiplier(f64),
    #[error("invalid weight sweep from {start} to {end} in steps of {step}")]
    WeightSweep { start: f64, end: f64, step: f64 },
}

/// The evolution could not produce a network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolveError {
    #[error("no training data")]
    NoTrainingData,
    #[error("training example {row} has {found} values, expected {expected}")]
    RaggedInput { row: usize, expected: usize, found: usize },
    #[error("{examples} training examples but {multipliers} output multipliers")]
    MultiplierMismatch { examples: usize, multipliers: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("implementation error: no champion network after {0} generations")]
    NoChampion(usize),
}
