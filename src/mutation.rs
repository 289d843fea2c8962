use std::fmt;

use log::trace;
use rand::distributions::{Distribution, Standard};
use rand::Rng;

use crate::network::Network;

/// The structural changes a single mutation step can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// Split an existing connection with a new neuron.
    InsertNode,
    /// Connect two random neurons.
    AddConnection,
    /// Pick a new activation function for a random neuron.
    ChangeActivation,
}

impl Distribution<Mutation> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Mutation {
        match rng.gen_range(0..3) {
            0 => Mutation::InsertNode,
            1 => Mutation::AddConnection,
            _ => Mutation::ChangeActivation,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mutation::InsertNode => "insert node",
            Mutation::AddConnection => "add connection",
            Mutation::ChangeActivation => "change activation",
        };
        f.write_str(name)
    }
}

impl Network {
    /// Apply one uniformly chosen [`Mutation`].
    ///
    /// Random choices often violate the preconditions of the structural operators, so
    /// inserting a node or adding a connection is tried again with fresh random neurons,
    /// up to `max_retries` more times. Returns the mutation that was applied, or `None` if
    /// every attempt was rejected, in which case the topology is unchanged.
    pub fn modify<R: Rng + ?Sized>(&mut self, max_retries: usize, rng: &mut R) -> Option<Mutation> {
        let mutation: Mutation = rng.gen();
        match mutation {
            Mutation::InsertNode => {
                for _ in 0..=max_retries {
                    match self.insert_random_node(rng) {
                        Ok(_) => return Some(mutation),
                        Err(e) => trace!("insert node rejected: {}", e),
                    }
                }
            }
            Mutation::AddConnection => {
                for _ in 0..=max_retries {
                    let (a, b) = (self.random_neuron(rng), self.random_neuron(rng));
                    match self.add_connection(a, b) {
                        Ok(()) => return Some(mutation),
                        Err(e) => trace!("add connection rejected: {}", e),
                    }
                }
            }
            Mutation::ChangeActivation => {
                self.randomize_activation_function_for_random_neuron(rng);
                return Some(mutation);
            }
        }
        trace!("gave up on {} after {} retries", mutation, max_retries);
        None
    }
}
