use ndarray::{Array1, Array2, ArrayView1};

use crate::error::EvolveError;
use crate::network::Network;

/// Assigns a score to a network, higher is better.
///
/// Scoring happens concurrently on many networks, each scorer call owns its network.
pub trait Fitness: Sync {
    /// Score the network with its current shared weight.
    fn score(&self, network: &mut Network) -> f64;
}

/// Labelled examples: one row of input values per example, and a signed multiplier per
/// example saying whether the output should be high (positive) or low (negative).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    inputs: Array2<f64>,
    multipliers: Array1<f64>,
}

impl TrainingData {
    /// Validate and collect the examples.
    ///
    /// A single multiplier given for several examples marks the first example as the
    /// correct one, every other example gets a multiplier of -1.
    pub fn new<R: AsRef<[f64]>>(
        rows: &[R],
        multipliers: &[f64],
    ) -> Result<TrainingData, EvolveError> {
        let first = rows.first().ok_or(EvolveError::NoTrainingData)?;
        let columns = first.as_ref().len();
        let ragged = rows
            .iter()
            .map(|r| r.as_ref().len())
            .enumerate()
            .find(|&(_, len)| len != columns);
        if let Some((row, found)) = ragged {
            return Err(EvolveError::RaggedInput { row, expected: columns, found });
        }

        let multipliers = if multipliers.len() == 1 && rows.len() > 1 {
            let mut expanded = vec![-1.; rows.len()];
            expanded[0] = multipliers[0];
            Array1::from(expanded)
        } else if multipliers.len() == rows.len() {
            Array1::from(multipliers.to_vec())
        } else {
            return Err(EvolveError::MultiplierMismatch {
                examples: rows.len(),
                multipliers: multipliers.len(),
            });
        };

        let inputs = Array2::from_shape_fn((rows.len(), columns), |(i, j)| rows[i].as_ref()[j]);
        Ok(TrainingData { inputs, multipliers })
    }

    /// One row per example.
    pub fn inputs(&self) -> &Array2<f64> {
        &self.inputs
    }

    pub fn multipliers(&self) -> &Array1<f64> {
        &self.multipliers
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values per example, which is the number of network inputs.
    pub fn input_count(&self) -> usize {
        self.inputs.ncols()
    }

    /// Iterate over `(example, multiplier)` pairs.
    pub fn examples(&self) -> impl Iterator<Item = (ArrayView1<'_, f64>, f64)> + '_ {
        self.inputs.outer_iter().zip(self.multipliers.iter().copied())
    }
}

impl Fitness for TrainingData {
    /// The multiplier weighted sum of the outputs over all examples, divided by the
    /// complexity of the network.
    fn score(&self, network: &mut Network) -> f64 {
        let mut sum = 0.;
        for (example, multiplier) in self.examples() {
            network.set_inputs(example.iter().copied());
            sum += network.output_value() * multiplier;
        }
        sum / network.complexity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction::Linear;
    use crate::neuron::NeuronIndex;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn linear_network(inputs: usize, weight: f64) -> Network {
        let mut net = Network::new(inputs, 1., weight, &mut ChaCha8Rng::seed_from_u64(1));
        for i in 0..net.node_count() {
            net.set_activation(NeuronIndex(i), Linear).unwrap();
        }
        net
    }

    #[test]
    fn empty_data_is_refused() {
        let rows: Vec<Vec<f64>> = vec![];
        assert_eq!(TrainingData::new(&rows, &[]), Err(EvolveError::NoTrainingData));
        assert_eq!(TrainingData::new(&rows, &[1.]), Err(EvolveError::NoTrainingData));
    }

    #[test]
    fn ragged_rows_are_refused() {
        let rows = vec![vec![1., 2.], vec![3., 4.], vec![5.]];
        assert_eq!(
            TrainingData::new(&rows, &[1., -1., -1.]),
            Err(EvolveError::RaggedInput { row: 2, expected: 2, found: 1 })
        );
    }

    #[test]
    fn multiplier_count_must_match() {
        let rows = [[0., 1.], [1., 0.], [1., 1.]];
        assert_eq!(
            TrainingData::new(&rows, &[1., -1.]),
            Err(EvolveError::MultiplierMismatch { examples: 3, multipliers: 2 })
        );
        assert_eq!(
            TrainingData::new(&rows, &[]),
            Err(EvolveError::MultiplierMismatch { examples: 3, multipliers: 0 })
        );
    }

    #[test]
    fn single_multiplier_marks_the_rest_as_wrong() {
        let rows = [[0., 1.], [1., 0.], [1., 1.]];
        let data = TrainingData::new(&rows, &[2.]).unwrap();
        assert_eq!(data.multipliers(), &array![2., -1., -1.]);
        assert_eq!(data.inputs(), &array![[0., 1.], [1., 0.], [1., 1.]]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.input_count(), 2);

        let single = TrainingData::new(&[[0.5]], &[1.]).unwrap();
        assert_eq!(single.multipliers(), &array![1.]);
    }

    #[test]
    fn score_is_the_weighted_output_sum_over_complexity() {
        let data = TrainingData::new(&[[1., 1.], [0., 1.]], &[1., -1.]).unwrap();
        let mut net = linear_network(2, 0.5);
        let complexity = net.complexity();
        // mean of weighted inputs: 0.5 and 0.25
        assert_abs_diff_eq!(data.score(&mut net), (0.5 - 0.25) / complexity, epsilon = 1e-12);

        net.set_weight(1.);
        assert_abs_diff_eq!(data.score(&mut net), (1. - 0.5) / complexity, epsilon = 1e-12);
    }

    #[test]
    fn unconnected_network_scores_zero() {
        let data = TrainingData::new(&[[1., 1.], [0., 1.]], &[1., -1.]).unwrap();
        let mut net = Network::new(2, 0., 0.5, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(data.score(&mut net), 0.);
    }
}
