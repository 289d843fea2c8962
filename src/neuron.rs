use std::fmt;

use rand::Rng;

use crate::activation::ActivationFunction;
use crate::error::TopologyError;

/// Stable handle of a neuron within the node storage of its network.
///
/// Neurons are only ever appended, so an index never changes meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NeuronIndex(pub usize);

impl NeuronIndex {
    /// The raw position in the node storage.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NeuronIndex {
    fn from(index: usize) -> Self {
        NeuronIndex(index)
    }
}

impl fmt::Display for NeuronIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the network: a list of input neurons and an activation function.
///
/// Network input neurons have no inputs and carry the externally supplied `value`
/// instead. A neuron with inputs ignores its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    activation: ActivationFunction,
    /// Ordered, without duplicates.
    inputs: Vec<NeuronIndex>,
    value: Option<f64>,
    /// Hop count from the output neuron, refreshed by
    /// [`Network::update_distances`](crate::Network::update_distances).
    distance: usize,
}

impl Neuron {
    /// Create a neuron without inputs.
    pub fn new(activation: ActivationFunction) -> Neuron {
        Neuron { activation, inputs: Vec::new(), value: None, distance: 0 }
    }

    /// Create a neuron with a uniformly chosen activation function.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Neuron {
        Neuron::new(rng.gen())
    }

    /// Create a leaf neuron holding a fixed value.
    pub fn leaf(activation: ActivationFunction, value: f64) -> Neuron {
        Neuron { value: Some(value), ..Neuron::new(activation) }
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        self.activation = activation;
    }

    /// Assign a uniformly chosen activation function.
    pub fn randomize_activation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.activation = rng.gen();
    }

    pub fn inputs(&self) -> &[NeuronIndex] {
        &self.inputs
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub(crate) fn set_distance(&mut self, distance: usize) {
        self.distance = distance;
    }

    /// Check if the given neuron is an input to this one.
    pub fn has_input(&self, neuron: NeuronIndex) -> bool {
        self.inputs.contains(&neuron)
    }

    /// Position of the given neuron in the input list.
    pub fn find_input(&self, neuron: NeuronIndex) -> Option<usize> {
        self.inputs.iter().position(|&n| n == neuron)
    }

    /// Append an input. `me` is the index of this neuron, used to refuse self loops.
    pub fn add_input(&mut self, me: NeuronIndex, neuron: NeuronIndex) -> Result<(), TopologyError> {
        if me == neuron {
            return Err(TopologyError::SelfConnection(me));
        }
        if self.has_input(neuron) {
            return Err(TopologyError::DuplicateEdge(neuron, me));
        }
        self.inputs.push(neuron);
        Ok(())
    }

    /// Remove an input, keeping the order of the remaining ones.
    pub fn remove_input(
        &mut self,
        me: NeuronIndex,
        neuron: NeuronIndex,
    ) -> Result<(), TopologyError> {
        match self.find_input(neuron) {
            Some(position) => {
                self.inputs.remove(position);
                Ok(())
            }
            None => Err(TopologyError::MissingEdge(neuron, me)),
        }
    }

    /// Evaluate this neuron recursively.
    ///
    /// `nodes` is the node storage of the owning network. Every descent into an input
    /// consumes one step of the shared `budget`; once it runs out the evaluation is cut
    /// short and reported as truncated. The activation function is applied to the mean
    /// of the weighted inputs. Inputs that point outside of `nodes` are skipped.
    pub fn evaluate(&self, nodes: &[Neuron], weight: f64, budget: &mut i64) -> (f64, bool) {
        if *budget <= 0 {
            return (0., true);
        }
        let mut sum = 0.;
        let mut counter = 0usize;
        for input in &self.inputs {
            *budget -= 1;
            let neuron = match nodes.get(input.0) {
                Some(neuron) => neuron,
                None => continue,
            };
            let (value, truncated) = neuron.evaluate(nodes, weight, budget);
            sum += value * weight;
            counter += 1;
            if truncated || *budget < 0 {
                break;
            }
        }
        if counter == 0 {
            return (self.value.unwrap_or(0.), false);
        }
        (self.activation.call(sum / counter as f64), false)
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NEURON[{},{}", self.activation, self.inputs.len())?;
        if let Some(value) = self.value {
            write!(f, ",{}", value)?;
        }
        f.write_str("]")
    }
}
