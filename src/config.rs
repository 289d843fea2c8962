use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Range and resolution of the final weight sweep over the champion network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSweep {
    pub start: f64,
    /// Inclusive.
    pub end: f64,
    pub step: f64,
}

impl Default for WeightSweep {
    fn default() -> Self {
        WeightSweep { start: 0., end: 1., step: 0.0001 }
    }
}

/// Largest number of weights a sweep may visit.
pub const MAX_SWEEP_STEPS: f64 = 1e8;

impl WeightSweep {
    /// Number of weights visited.
    ///
    /// Only meaningful for a sweep accepted by [`Config::validate`].
    pub fn len(&self) -> usize {
        self.steps() as usize
    }

    /// Number of weights visited, counted in floating point.
    fn steps(&self) -> f64 {
        // tolerate the rounding of steps like 0.0001
        ((self.end - self.start) / self.step + 1e-9).floor() + 1.
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `i`-th weight of the sweep.
    pub fn weight(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }
}

/// Settings of network construction and evolution.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probability that a new network connects an input neuron to the output neuron.
    pub initial_connection_ratio: f64,
    /// Weight of freshly created networks, before evolution samples its own.
    pub shared_weight: f64,
    pub generations: usize,
    pub population_size: usize,
    /// Share of the ranked population that survives a generation unmodified.
    pub elite_fraction: f64,
    /// Attempts of a structural mutation before it is given up.
    pub max_modify_retries: usize,
    /// Stop when the best score did not improve for more than this many generations.
    pub max_stall_generations: Option<usize>,
    pub complexity_multiplier: f64,
    pub weight_sweep: WeightSweep,
    /// Seed of the random number generator, taken from the OS when `None`.
    pub random_seed: Option<u64>,
    /// Report progress at info level instead of debug.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_connection_ratio: 0.5,
            shared_weight: 0.5,
            generations: 1000,
            population_size: 100,
            elite_fraction: 1. / 3.,
            max_modify_retries: 10,
            max_stall_generations: Some(200),
            complexity_multiplier: 1.,
            weight_sweep: WeightSweep::default(),
            random_seed: None,
            verbose: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        for (name, value) in [
            ("initial connection ratio", self.initial_connection_ratio),
            ("elite fraction", self.elite_fraction),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        if self.elite_count() == 0 {
            return Err(ConfigError::EmptyElite(self.elite_fraction));
        }
        if !(self.complexity_multiplier > 0.) {
            return Err(ConfigError::ComplexityMultiplier(self.complexity_multiplier));
        }
        let WeightSweep { start, end, step } = self.weight_sweep;
        if !(step > 0.) || !(end >= start) || !start.is_finite() || !end.is_finite() {
            return Err(ConfigError::WeightSweep { start, end, step });
        }
        let steps = self.weight_sweep.steps();
        if !steps.is_finite() || steps > MAX_SWEEP_STEPS {
            return Err(ConfigError::WeightSweep { start, end, step });
        }
        Ok(())
    }

    /// Number of networks kept unmodified in every generation.
    pub fn elite_count(&self) -> usize {
        let count = (self.population_size as f64 * self.elite_fraction).floor() as usize;
        count.min(self.population_size)
    }
}
