use log::{log, Level};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::activation;
use crate::config::{Config, WeightSweep};
use crate::error::EvolveError;
use crate::fitness::{Fitness, TrainingData};
use crate::network::Network;
use crate::organism::{rank_key, Organism};
use crate::population::Population;

pub trait Evolution {
    /// Turn a scored generation into the next generation, in place.
    ///
    /// The passed score array must be aligned with the networks of the population.
    fn evolve<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        scores: &Array1<f64>,
        rng: &mut R,
    );
}

/// Keep the best networks and replace all others by mutated copies of them.
///
/// The elite are the top `max(1, floor(len * elite_fraction))` networks by score. They stay
/// in their slots unmodified. Every other slot receives a clone of a uniformly chosen elite
/// network with one [`Network::modify`] step applied. The clones are mutated in parallel, each
/// with its own random stream seeded from `rng`, so the outcome only depends on `rng`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elitism {
    pub elite_fraction: f64,
    pub max_retries: usize,
}

impl Default for Elitism {
    fn default() -> Self {
        let config = Config::default();
        Elitism { elite_fraction: config.elite_fraction, max_retries: config.max_modify_retries }
    }
}

impl Elitism {
    pub fn from_config(config: &Config) -> Elitism {
        Elitism { elite_fraction: config.elite_fraction, max_retries: config.max_modify_retries }
    }

    /// Size of the elite of a population of `len` networks.
    pub fn elite_count(&self, len: usize) -> usize {
        ((len as f64 * self.elite_fraction).floor() as usize).clamp(1, len.max(1))
    }
}

impl Evolution for Elitism {
    fn evolve<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        scores: &Array1<f64>,
        rng: &mut R,
    ) {
        if population.is_empty() {
            return;
        }
        let ranking = Population::rank(scores);
        let elite = &ranking[..self.elite_count(ranking.len())];

        // (slot, parent, seed), drawn in rank order
        let jobs: Vec<(usize, usize, u64)> = ranking[elite.len()..]
            .iter()
            .map(|&slot| (slot, elite[rng.gen_range(0..elite.len())], rng.gen()))
            .collect();

        let networks = population.networks();
        let offspring: Vec<(usize, Network)> = jobs
            .into_par_iter()
            .map(|(slot, parent, seed)| {
                let mut child = networks[parent].clone();
                child.modify(self.max_retries, &mut ChaCha8Rng::seed_from_u64(seed));
                (slot, child)
            })
            .collect();

        for (slot, child) in offspring {
            population.replace(slot, child);
        }
    }
}

/// State of an [`Evolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing happened yet: costs are not calibrated and there is no population.
    Initializing,
    /// The given generation, counting from 0, runs on the next [`Evolver::step`].
    Generation(usize),
    /// Generations are over, the weight sweep is pending.
    Finalizing,
    Done,
}

/// Why the generation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All configured generations ran.
    Generations,
    /// The best score did not improve for too long.
    Stalled,
    /// [`Evolver::finish`] was called before the loop ended.
    Interrupted,
}

/// Scores of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    /// Shared weight all networks were scored with.
    pub weight: f64,
    pub best: f64,
    pub average: f64,
    pub worst: f64,
    /// Best score seen so far, over all generations.
    pub champion: f64,
    /// Number of generations without a strictly better champion.
    pub stalled: usize,
}

/// Result of a complete evolution.
#[derive(Debug, Clone)]
pub struct Evolved {
    /// The champion network, carrying the chosen shared weight.
    pub network: Network,
    pub weight: f64,
    pub score: f64,
    pub history: Vec<GenerationStats>,
    pub stop_reason: StopReason,
}

/// Drives the generation loop one generation at a time.
///
/// Every generation draws a shared weight from `[0, 1)`, scores all networks with it, records
/// the all-time champion and hands the scores to the [`Evolution`] strategy. Afterwards
/// [`Evolver::finish`] sweeps the weight of the champion.
pub struct Evolver<F: Fitness, R: Rng, E: Evolution = Elitism> {
    config: Config,
    fitness: F,
    input_count: usize,
    rng: R,
    evolution: E,
    phase: Phase,
    population: Population,
    champion: Option<Organism>,
    stalled: usize,
    stop_reason: StopReason,
    history: Vec<GenerationStats>,
}

impl<F: Fitness, R: Rng> Evolver<F, R, Elitism> {
    /// Create an evolver with the elitist strategy configured by `config`.
    pub fn new(
        config: Config,
        fitness: F,
        input_count: usize,
        rng: R,
    ) -> Result<Self, EvolveError> {
        let evolution = Elitism::from_config(&config);
        Evolver::with_evolution(config, fitness, input_count, rng, evolution)
    }
}

impl<F: Fitness, R: Rng, E: Evolution> Evolver<F, R, E> {
    pub fn with_evolution(
        config: Config,
        fitness: F,
        input_count: usize,
        rng: R,
        evolution: E,
    ) -> Result<Self, EvolveError> {
        config.validate()?;
        Ok(Evolver {
            config,
            fitness,
            input_count,
            rng,
            evolution,
            phase: Phase::Initializing,
            population: Population::from_networks(Vec::new()),
            champion: None,
            stalled: 0,
            stop_reason: StopReason::Interrupted,
            history: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The best network seen so far.
    pub fn champion(&self) -> Option<&Organism> {
        self.champion.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    fn level(&self) -> Level {
        if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }

    fn initialize(&mut self) {
        // before any concurrent scoring
        activation::calibrate();
        self.population = Population::new(
            self.config.population_size,
            &self.config,
            self.input_count,
            &mut self.rng,
        );
        log!(
            self.level(),
            "starting evolution with population size {}, for {} generations",
            self.config.population_size,
            self.config.generations
        );
        self.phase = Phase::Generation(0);
    }

    /// Run the next generation, initializing first if needed.
    ///
    /// Returns the statistics of the generation, or `None` once the loop has ended.
    pub fn step(&mut self) -> Option<GenerationStats> {
        if self.phase == Phase::Initializing {
            self.initialize();
        }
        let generation = match self.phase {
            Phase::Generation(generation) => generation,
            _ => return None,
        };

        let weight: f64 = self.rng.gen();
        let scores = self.population.score(weight, &self.fitness);
        let ranking = Population::rank(&scores);
        let leader = ranking[0];
        let best = scores[leader];

        if self.champion.as_ref().map_or(true, |champion| champion.is_beaten_by(best)) {
            let network = self.population.networks()[leader].clone();
            self.champion = Some(Organism::new(network, weight, best));
            self.stalled = 0;
            log!(
                self.level(),
                "[generation {}] new champion with score {} at weight {}",
                generation,
                best,
                weight
            );
        } else {
            self.stalled += 1;
        }

        let stats = GenerationStats {
            generation,
            weight,
            best: *scores.max_skipnan(),
            average: scores.mean().unwrap_or(f64::NAN),
            worst: *scores.min_skipnan(),
            champion: self.champion.as_ref().map_or(best, |c| c.score),
            stalled: self.stalled,
        };
        log!(
            self.level(),
            "[generation {}] worst score = {}, average score = {}, best score = {}",
            generation,
            stats.worst,
            stats.average,
            stats.best
        );
        if self.stalled > 0 {
            log!(
                self.level(),
                "no improvement of the best score for the last {} generations",
                self.stalled
            );
        }
        self.history.push(stats);

        if self.config.max_stall_generations.map_or(false, |max| self.stalled > max) {
            self.stop_reason = StopReason::Stalled;
            self.phase = Phase::Finalizing;
        } else if generation + 1 >= self.config.generations {
            self.stop_reason = StopReason::Generations;
            self.phase = Phase::Finalizing;
        } else {
            self.evolution.evolve(&mut self.population, &scores, &mut self.rng);
            self.phase = Phase::Generation(generation + 1);
        }
        Some(stats)
    }

    /// Stop the generation loop and tune the shared weight of the champion.
    ///
    /// Every weight of the configured [`WeightSweep`] is scored; a weight replaces the one
    /// the champion was found with only if it scores strictly higher.
    pub fn finish(&mut self) -> Result<Evolved, EvolveError> {
        let champion = self.champion.clone().ok_or(EvolveError::NoChampion(self.history.len()))?;
        log!(
            self.level(),
            "[all time best network, random weight] weight = {}, score = {}",
            champion.weight,
            champion.score
        );

        let (weight, score) = sweep(&champion, &self.config.weight_sweep, &self.fitness);
        log!(
            self.level(),
            "[all time best network, swept weight] weight = {}, score = {}",
            weight,
            score
        );

        self.phase = Phase::Done;
        let mut network = champion.network;
        network.set_weight(weight);
        Ok(Evolved {
            network,
            weight,
            score,
            history: self.history.clone(),
            stop_reason: self.stop_reason,
        })
    }

    /// Run all remaining generations, then [`Evolver::finish`].
    pub fn run(mut self) -> Result<Evolved, EvolveError> {
        while self.step().is_some() {}
        self.finish()
    }
}

/// Best `(weight, score)` for the champion network, starting from its own.
fn sweep<F: Fitness + ?Sized>(champion: &Organism, range: &WeightSweep, fitness: &F) -> (f64, f64) {
    let scores: Vec<f64> = (0..range.len())
        .into_par_iter()
        .map_init(
            || champion.network.clone(),
            |network, i| {
                network.set_weight(range.weight(i));
                fitness.score(network)
            },
        )
        .collect();

    let (mut weight, mut best) = (champion.weight, champion.score);
    for (i, score) in scores.into_iter().enumerate() {
        if rank_key(score) > rank_key(best) {
            weight = range.weight(i);
            best = score;
        }
    }
    (weight, best)
}

/// Evolve a network for `data`.
pub fn evolve<R: Rng + ?Sized>(
    config: &Config,
    data: TrainingData,
    rng: &mut R,
) -> Result<Evolved, EvolveError> {
    let input_count = data.input_count();
    Evolver::new(config.clone(), data, input_count, rng)?.run()
}

impl Config {
    /// Evolve a network for the given examples and their multipliers.
    ///
    /// See [`TrainingData::new`] for the meaning of the multipliers. Uses
    /// [`Config::random_seed`], or a fresh seed that is logged.
    pub fn evolve<T: AsRef<[f64]>>(
        &self,
        rows: &[T],
        multipliers: &[f64],
    ) -> Result<Evolved, EvolveError> {
        let data = TrainingData::new(rows, multipliers)?;
        let seed = self.random_seed.unwrap_or_else(|| rand::thread_rng().gen());
        let level = if self.verbose { Level::Info } else { Level::Debug };
        log!(level, "using random seed {}", seed);
        evolve(self, data, &mut ChaCha8Rng::seed_from_u64(seed))
    }
}
