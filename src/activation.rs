//! The fixed table of activation functions a neuron can pick from.
//!
//! Besides the functions themselves the table carries a relative cost per function,
//! measured once per process by timing every function over a dense sample of `[0, 1]`.
//! The costs feed into [`Network::complexity`](crate::Network::complexity), so they depend
//! on the machine and are not reproducible across processes.
use std::f64::consts::PI;
use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use lazycell::AtomicLazyCell;
use log::debug;
use rand::distributions::{Distribution, Standard};
use rand::Rng;

/// Number of entries in the activation function table.
pub const COUNT: usize = 13;

/// Sample resolution used when timing the functions.
const CALIBRATION_RESOLUTION: f64 = 0.0001;

static COSTS: AtomicLazyCell<[f64; COUNT]> = AtomicLazyCell::NONE;

/// Index into the activation function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivationFunction {
    /// 0 below zero, then 1
    Step,
    Linear,
    /// `sin(πx)`
    Sin,
    /// Gaussian with a mean of 0 and a sigma of 1
    Gauss,
    Tanh,
    Sigmoid,
    /// `-x`
    Inv,
    Abs,
    ReLU,
    /// `cos(πx)`
    Cos,
    Squared,
    /// `x / (1 + exp(-x))`
    Swish,
    /// `ln(1 + exp(x))`
    SoftPlus,
}

use self::ActivationFunction::*;

impl ActivationFunction {
    /// All activation functions, ordered by index.
    pub const ALL: [ActivationFunction; COUNT] = [
        Step, Linear, Sin, Gauss, Tanh, Sigmoid, Inv, Abs, ReLU, Cos, Squared, Swish, SoftPlus,
    ];

    /// Position of the function in the table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a function by its table position.
    pub fn from_index(index: usize) -> Option<ActivationFunction> {
        Self::ALL.get(index).copied()
    }

    /// Apply the function.
    pub fn call(self, x: f64) -> f64 {
        match self {
            Step => {
                if x >= 0. {
                    1.
                } else {
                    0.
                }
            }
            Linear => x,
            Sin => (PI * x).sin(),
            Gauss => exp256(-(x * x) / 2.),
            Tanh => x.tanh(),
            Sigmoid => 1. / (1. + exp256(-x)),
            Inv => -x,
            Abs => x.abs(),
            ReLU => {
                if x >= 0. {
                    x
                } else {
                    0.
                }
            }
            Cos => (PI * x).cos(),
            Squared => x * x,
            Swish => x / (1. + exp256(-x)),
            SoftPlus => (1. + exp256(x)).ln(),
        }
    }

    /// Human readable name, as shown in diagrams.
    pub fn name(self) -> &'static str {
        match self {
            Step => "Step",
            Linear => "Linear",
            Sin => "Sinusoid",
            Gauss => "Gaussian",
            Tanh => "Tanh",
            Sigmoid => "Sigmoid",
            Inv => "Inverted",
            Abs => "Absolute",
            ReLU => "ReLU",
            Cos => "Cosinusoid",
            Squared => "Squared",
            Swish => "Swish",
            SoftPlus => "SoftPlus",
        }
    }

    /// Relative computational cost in `[0, 1]`, where 1 is the slowest function.
    ///
    /// Calibrates the cost table on first use.
    pub fn cost(self) -> f64 {
        calibrate()[self.index()]
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Distribution<ActivationFunction> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ActivationFunction {
        ActivationFunction::ALL[rng.gen_range(0..COUNT)]
    }
}

/// `exp(x)` approximated as `(1 + x/256)^256`.
///
/// The argument is clamped to `[-256, 256]`, which keeps the approximation monotonic
/// and finite.
fn exp256(x: f64) -> f64 {
    let mut y = 1. + x.clamp(-256., 256.) / 256.;
    for _ in 0..8 {
        y *= y;
    }
    y
}

/// Return the cost table, measuring it if this is the first call in the process.
///
/// Must happen before any concurrent scoring starts if timing noise from other threads
/// is to be avoided; the evolution loop calls it during initialization.
pub fn calibrate() -> &'static [f64; COUNT] {
    if let Some(costs) = COSTS.borrow() {
        return costs;
    }
    // A racing thread may fill the cell first, its measurement wins.
    let _ = COSTS.fill(measure());
    COSTS.borrow().unwrap_or(&[1.; COUNT])
}

fn measure() -> [f64; COUNT] {
    let start = Instant::now();
    let samples = (1. / CALIBRATION_RESOLUTION).round() as usize;
    let mut durations = [Duration::ZERO; COUNT];
    for (duration, f) in durations.iter_mut().zip(ActivationFunction::ALL.iter()) {
        let timer = Instant::now();
        for i in 0..=samples {
            black_box(f.call(black_box(i as f64 * CALIBRATION_RESOLUTION)));
        }
        *duration = timer.elapsed();
    }

    let slowest = durations.iter().max().copied().unwrap_or(Duration::ZERO);
    let mut costs = [0.; COUNT];
    if !slowest.is_zero() {
        for (cost, duration) in costs.iter_mut().zip(durations.iter()) {
            *cost = duration.as_secs_f64() / slowest.as_secs_f64();
        }
    }
    debug!("estimated activation function complexity in {:?}: {:?}", start.elapsed(), costs);
    costs
}
