use std::fmt;

use generator::Gn;
use itertools::Itertools;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::activation::ActivationFunction;
use crate::config::Config;
use crate::error::TopologyError;
use crate::neuron::{Neuron, NeuronIndex};

/// Lower bound of [`Network::complexity`], keeps it usable as a divisor.
pub const MIN_COMPLEXITY: f64 = 1e-6;

/// A weight agnostic neural network.
///
/// All neurons live in one append-only vector and refer to each other by [`NeuronIndex`].
/// Neuron 0 is the output neuron, neurons `1..=n` are the network inputs. Every connection
/// is multiplied by the same shared weight.
///
/// The graph reachable from the output neuron is kept acyclic by every operator. Neurons
/// that are not reachable from the output may exist and still count towards the
/// complexity. Cloning a network gives a fully independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    nodes: Vec<Neuron>,
    inputs: Vec<NeuronIndex>,
    output: NeuronIndex,
    weight: f64,
    complexity_multiplier: f64,
}

impl Network {
    /// Create a minimal network with `input_count` input neurons.
    ///
    /// Each input is connected to the output neuron with probability `connection_ratio`.
    /// All activation functions are chosen at random.
    pub fn new<R: Rng + ?Sized>(
        input_count: usize,
        connection_ratio: f64,
        weight: f64,
        rng: &mut R,
    ) -> Network {
        let ratio = if connection_ratio.is_nan() { 0. } else { connection_ratio.clamp(0., 1.) };
        let output = NeuronIndex(0);
        let mut nodes = Vec::with_capacity(input_count + 1);
        nodes.push(Neuron::random(rng));
        let mut inputs = Vec::with_capacity(input_count);
        for i in 1..=input_count {
            let index = NeuronIndex(i);
            let mut neuron = Neuron::random(rng);
            neuron.set_value(0.);
            nodes.push(neuron);
            inputs.push(index);
            if rng.gen_bool(ratio) {
                let added = nodes[output.0].add_input(output, index);
                debug_assert!(added.is_ok());
            }
        }
        Network { nodes, inputs, output, weight, complexity_multiplier: 1. }
    }

    /// Create a network as configured by `config`.
    pub fn from_config<R: Rng + ?Sized>(
        config: &Config,
        input_count: usize,
        rng: &mut R,
    ) -> Network {
        let ratio = config.initial_connection_ratio;
        let mut network = Network::new(input_count, ratio, config.shared_weight, rng);
        network.complexity_multiplier = config.complexity_multiplier;
        network
    }

    /// All neurons, indexed by [`NeuronIndex`].
    pub fn nodes(&self) -> &[Neuron] {
        &self.nodes
    }

    pub fn neuron(&self, index: NeuronIndex) -> Option<&Neuron> {
        self.nodes.get(index.0)
    }

    /// The network input neurons, in the order input values are assigned.
    pub fn input_nodes(&self) -> &[NeuronIndex] {
        &self.inputs
    }

    pub fn output_node(&self) -> NeuronIndex {
        self.output
    }

    pub fn is_input(&self, index: NeuronIndex) -> bool {
        self.inputs.contains(&index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of connections, including those of unconnected neurons.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.inputs().len()).sum()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Set the weight shared by all connections.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn complexity_multiplier(&self) -> f64 {
        self.complexity_multiplier
    }

    pub fn set_complexity_multiplier(&mut self, multiplier: f64) {
        self.complexity_multiplier = multiplier;
    }

    /// Append an unconnected neuron.
    pub fn add_neuron(&mut self, activation: ActivationFunction) -> NeuronIndex {
        self.nodes.push(Neuron::new(activation));
        NeuronIndex(self.nodes.len() - 1)
    }

    pub fn set_activation(
        &mut self,
        index: NeuronIndex,
        activation: ActivationFunction,
    ) -> Result<(), TopologyError> {
        let neuron = self.nodes.get_mut(index.0).ok_or(TopologyError::OutOfRange(index))?;
        neuron.set_activation(activation);
        Ok(())
    }

    fn check(&self, index: NeuronIndex) -> Result<&Neuron, TopologyError> {
        self.nodes.get(index.0).ok_or(TopologyError::OutOfRange(index))
    }

    /// Pick any neuron, the output neuron included.
    pub fn random_neuron<R: Rng + ?Sized>(&self, rng: &mut R) -> NeuronIndex {
        NeuronIndex(rng.gen_range(0..self.nodes.len()))
    }

    /// Order two neurons as `(left, right)`, where left is closer to the inputs.
    ///
    /// The rules are checked in turn:
    /// 1. equal neurons have no order,
    /// 2. the output neuron is always right,
    /// 3. an existing direct connection keeps its direction,
    /// 4. network inputs are left of everything else,
    /// 5. the larger cached distance from the output is left, ties put the lower index left.
    ///
    /// Uses the cached distances, see [`Network::update_distances`].
    pub fn left_right(&self, a: NeuronIndex, b: NeuronIndex) -> Option<(NeuronIndex, NeuronIndex)> {
        if a == b {
            return None;
        }
        let (na, nb) = (self.nodes.get(a.0)?, self.nodes.get(b.0)?);
        if a == self.output {
            return Some((b, a));
        }
        if b == self.output {
            return Some((a, b));
        }
        if nb.has_input(a) {
            return Some((a, b));
        }
        if na.has_input(b) {
            return Some((b, a));
        }
        match (self.is_input(a), self.is_input(b)) {
            (true, false) => return Some((a, b)),
            (false, true) => return Some((b, a)),
            _ => {}
        }
        let a_is_left = match na.distance().cmp(&nb.distance()) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => a < b,
        };
        if a_is_left {
            Some((a, b))
        } else {
            Some((b, a))
        }
    }

    /// True if `target` can be reached from `from` by following inputs.
    pub fn depends_on(&self, from: NeuronIndex, target: NeuronIndex) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(index) = stack.pop() {
            if index == target {
                return true;
            }
            let neuron = match self.nodes.get(index.0) {
                Some(neuron) => neuron,
                None => continue,
            };
            if std::mem::replace(&mut visited[index.0], true) {
                continue;
            }
            stack.extend_from_slice(neuron.inputs());
        }
        false
    }

    /// Insert a new neuron between `a` and `b`.
    ///
    /// The pair is ordered with [`Network::left_right`]. An existing connection from left
    /// to right is replaced by `left -> new -> right`; without one the two-hop path is added.
    /// Returns the index of the new neuron.
    pub fn insert_node(
        &mut self,
        a: NeuronIndex,
        b: NeuronIndex,
        activation: ActivationFunction,
    ) -> Result<NeuronIndex, TopologyError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(TopologyError::SelfConnection(a));
        }
        self.update_distances();
        let (left, right) = self.left_right(a, b).ok_or(TopologyError::Unordered(a, b))?;
        if self.is_input(left) && self.is_input(right) {
            return Err(TopologyError::BothInputs(left, right));
        }
        if left == self.output {
            return Err(TopologyError::FromOutput(left));
        }
        if self.is_input(right) {
            return Err(TopologyError::IntoInput(right));
        }
        let existing = self.nodes[right.0].has_input(left);
        if !existing && self.depends_on(left, right) {
            return Err(TopologyError::Cycle(left, right));
        }

        let new = NeuronIndex(self.nodes.len());
        self.nodes.push(Neuron::new(activation));
        self.nodes[new.0].add_input(new, left)?;
        if existing {
            self.nodes[right.0].remove_input(right, left)?;
        }
        self.nodes[right.0].add_input(right, new)?;
        Ok(new)
    }

    /// Connect two neurons, ordered with [`Network::left_right`]: right gains left as input.
    pub fn add_connection(&mut self, a: NeuronIndex, b: NeuronIndex) -> Result<(), TopologyError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(TopologyError::SelfConnection(a));
        }
        self.update_distances();
        let (left, right) = self.left_right(a, b).ok_or(TopologyError::Unordered(a, b))?;
        if left == self.output {
            return Err(TopologyError::FromOutput(left));
        }
        if self.is_input(right) {
            return Err(TopologyError::IntoInput(right));
        }
        if self.nodes[right.0].has_input(left) {
            return Err(TopologyError::DuplicateEdge(left, right));
        }
        if self.depends_on(left, right) {
            return Err(TopologyError::Cycle(left, right));
        }
        self.nodes[right.0].add_input(right, left)
    }

    /// Give a random neuron, possibly the output or an input neuron, a random activation
    /// function. Returns the neuron that was changed.
    pub fn randomize_activation_function_for_random_neuron<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> NeuronIndex {
        let index = self.random_neuron(rng);
        self.nodes[index.0].randomize_activation(rng);
        index
    }

    /// Split a random existing connection of the connected part of the network with a new
    /// neuron that has a random activation function.
    ///
    /// Fails when the chosen neuron has no inputs to split, e.g. a network input.
    pub fn insert_random_node<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<NeuronIndex, TopologyError> {
        let connected = self.connected().map(|(index, _)| index).collect_vec();
        let chosen = *connected.choose(rng).ok_or(TopologyError::NothingToSplit(self.output))?;
        if self.is_input(chosen) {
            return Err(TopologyError::NothingToSplit(chosen));
        }
        let inputs = self.nodes[chosen.0].inputs();
        let input = *inputs.choose(rng).ok_or(TopologyError::NothingToSplit(chosen))?;
        self.insert_node(input, chosen, rng.gen())
    }

    /// Walk the network from the output neuron towards the inputs, depth first.
    ///
    /// Yields every reachable neuron once, together with its distance from the output
    /// neuron along the first path it was found on. Unconnected neurons are not visited.
    pub fn connected(&self) -> impl Iterator<Item = (NeuronIndex, usize)> + '_ {
        Gn::<()>::new_scoped(move |mut s| {
            self.walk(|index, distance| {
                s.yield_((index, distance));
            });
            done!();
        })
    }

    /// Depth first walk behind [`Network::connected`], calling `visit` for every neuron.
    fn walk<V: FnMut(NeuronIndex, usize)>(&self, mut visit: V) {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![(self.output, 0)];
        while let Some((index, distance)) = stack.pop() {
            let neuron = match self.nodes.get(index.0) {
                Some(neuron) => neuron,
                None => continue,
            };
            if std::mem::replace(&mut visited[index.0], true) {
                continue;
            }
            visit(index, distance);
            // reversed, so that the first input is walked first
            for &input in neuron.inputs().iter().rev() {
                if input.0 < visited.len() && !visited[input.0] {
                    stack.push((input, distance + 1));
                }
            }
        }
    }

    /// Number of neurons reachable from the output neuron, the output included.
    pub fn connected_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    /// Refresh the cached distance from the output of every neuron.
    /// Unconnected neurons get distance 0.
    pub fn update_distances(&mut self) {
        let mut distances = vec![0; self.nodes.len()];
        self.walk(|index, distance| distances[index.0] = distance);
        for (neuron, distance) in self.nodes.iter_mut().zip(distances) {
            neuron.set_distance(distance);
        }
    }

    /// Assign values to the network inputs, by position.
    ///
    /// Surplus values are ignored; inputs without a value keep their previous one.
    pub fn set_inputs<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        for (index, value) in self.inputs.iter().zip(values) {
            self.nodes[index.0].set_value(value);
        }
    }

    /// Assign the input values and evaluate the output neuron.
    pub fn evaluate(&mut self, values: &[f64]) -> f64 {
        self.set_inputs(values.iter().copied());
        self.output_value()
    }

    /// Evaluate the output neuron with the current input values.
    pub fn output_value(&self) -> f64 {
        let mut budget = self.evaluation_budget();
        self.nodes[self.output.0].evaluate(&self.nodes, self.weight, &mut budget).0
    }

    /// Number of recursive descents a single evaluation may take.
    fn evaluation_budget(&self) -> i64 {
        let n = self.nodes.len() as i64;
        n.saturating_mul(n).saturating_add(1)
    }

    /// Cost of the network: the connected neurons plus the activation cost of every
    /// computing neuron, scaled by the complexity multiplier. Always positive.
    pub fn complexity(&self) -> f64 {
        let connected = self.connected_count() as f64;
        let cost: f64 = self
            .nodes
            .iter()
            .filter(|n| n.value().is_none())
            .map(|n| n.activation().cost())
            .sum();
        ((connected + cost) * self.complexity_multiplier).max(MIN_COMPLEXITY)
    }

    /// The network as a petgraph graph for rendering: node `i` is neuron `i`, and every
    /// connection points from the input neuron to the neuron consuming it.
    pub fn graph(&self) -> DiGraph<ActivationFunction, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edge_count());
        for neuron in &self.nodes {
            graph.add_node(neuron.activation());
        }
        for (i, neuron) in self.nodes.iter().enumerate() {
            for input in neuron.inputs().iter().filter(|input| input.0 < self.nodes.len()) {
                graph.add_edge(NodeIndex::new(input.0), NodeIndex::new(i), ());
            }
        }
        graph
    }

    /// Check the whole graph, unconnected neurons included, for cycles.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network")?;
        writeln!(f, "\tInput nodes: {}", self.inputs.len())?;
        writeln!(f, "\tConnections to output node: {}", self.nodes[self.output.0].inputs().len())?;
        writeln!(f, "\tShared weight: {}", self.weight)?;
        for (i, neuron) in self.nodes.iter().enumerate() {
            write!(f, "\t{} {}", NeuronIndex(i), neuron)?;
            if !neuron.inputs().is_empty() {
                write!(f, " <- {}", neuron.inputs().iter().join(","))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction::*;
    use approx::assert_abs_diff_eq;
    use petgraph::algo::has_path_connecting;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn n(i: usize) -> NeuronIndex {
        NeuronIndex(i)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// Output (0) with all inputs connected and linear activation everywhere.
    fn fully_connected(inputs: usize, weight: f64) -> Network {
        let mut net = Network::new(inputs, 1., weight, &mut rng());
        for neuron in &mut net.nodes {
            neuron.set_activation(Linear);
        }
        net
    }

    #[test]
    fn new_network_connects_inputs_by_ratio() {
        let net = Network::new(5, 1., 0.5, &mut rng());
        assert_eq!(net.node_count(), 6);
        assert_eq!(net.output_node(), n(0));
        assert_eq!(net.input_nodes(), &[n(1), n(2), n(3), n(4), n(5)]);
        assert_eq!(net.nodes()[0].inputs(), net.input_nodes());
        assert!(net.input_nodes().iter().all(|&i| net.nodes()[i.0].value() == Some(0.)));

        let mut unconnected = Network::new(5, 0., 0.5, &mut rng());
        assert_eq!(unconnected.edge_count(), 0);
        assert_eq!(unconnected.connected_count(), 1);
        assert_eq!(unconnected.evaluate(&[1., 1., 1., 1., 1.]), 0.);
    }

    #[test]
    fn output_is_the_mean_of_weighted_inputs() {
        let (v1, v2, w) = (0.3, -1.7, 0.45);
        let mut net = fully_connected(2, w);
        assert_eq!(net.evaluate(&[v1, v2]), (v1 * w + v2 * w) / 2.);
    }

    #[test]
    fn evaluate_is_deterministic() {
        let mut r = rng();
        let mut net = Network::new(4, 0.7, 0.6, &mut r);
        for _ in 0..20 {
            net.modify(10, &mut r);
        }
        let input = [0.1, 0.9, -0.4, 2.];
        let first = net.evaluate(&input);
        for _ in 0..5 {
            assert_eq!(net.evaluate(&input).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn missing_input_values_keep_the_previous_ones() {
        let mut net = fully_connected(2, 1.);
        assert_eq!(net.evaluate(&[1., 3.]), 2.);
        assert_eq!(net.evaluate(&[5.]), 4.);
        assert_eq!(net.evaluate(&[5., 3., 99.]), 4.);
    }

    #[test]
    fn insert_node_replaces_the_direct_connection() {
        let mut net = fully_connected(3, 0.5);
        let input0 = net.input_nodes()[0];
        let new = net.insert_node(input0, net.output_node(), Linear).unwrap();

        assert_eq!(net.node_count(), 5);
        let output = &net.nodes()[0];
        assert!(output.has_input(new));
        assert!(!output.has_input(input0));
        assert_eq!(net.nodes()[new.0].inputs(), &[input0]);

        let graph = net.graph();
        assert!(has_path_connecting(&graph, NodeIndex::new(input0.0), NodeIndex::new(0), None));
        let distances: Vec<_> = net.connected().collect();
        assert!(distances.contains(&(input0, 2)));
    }

    #[test]
    fn insert_node_adds_a_path_where_there_was_none() {
        let mut net = Network::new(2, 0., 1., &mut rng());
        let new = net.insert_node(net.output_node(), n(2), Sigmoid).unwrap();
        assert_eq!(net.nodes()[0].inputs(), &[new]);
        assert_eq!(net.nodes()[new.0].inputs(), &[n(2)]);
        assert_eq!(net.nodes()[new.0].activation(), Sigmoid);
    }

    #[test]
    fn insert_node_rejects_malformed_requests() {
        let mut net = fully_connected(3, 1.);
        assert_eq!(net.insert_node(n(1), n(1), Linear), Err(TopologyError::SelfConnection(n(1))));
        assert_eq!(net.insert_node(n(1), n(2), Linear), Err(TopologyError::BothInputs(n(1), n(2))));
        assert_eq!(net.insert_node(n(1), n(9), Linear), Err(TopologyError::OutOfRange(n(9))));
        assert_eq!(net.node_count(), 4);
    }

    #[test]
    fn add_connection_rejects_malformed_requests() {
        let mut net = fully_connected(3, 1.);
        let edges = net.edge_count();
        assert_eq!(net.add_connection(n(2), n(2)), Err(TopologyError::SelfConnection(n(2))));
        assert_eq!(net.add_connection(n(1), n(2)), Err(TopologyError::IntoInput(n(2))));
        assert_eq!(net.add_connection(n(0), n(3)), Err(TopologyError::DuplicateEdge(n(3), n(0))));
        assert_eq!(net.add_connection(n(0), n(4)), Err(TopologyError::OutOfRange(n(4))));
        assert_eq!(net.edge_count(), edges);
    }

    #[test]
    fn add_connection_orders_by_distance() {
        let mut net = Network::new(1, 1., 1., &mut rng());
        let h1 = net.insert_node(n(1), n(0), Linear).unwrap();
        let h2 = net.insert_node(h1, n(0), Linear).unwrap();
        let h3 = net.insert_node(h2, n(0), Linear).unwrap();
        // input -> h1 -> h2 -> h3 -> output
        net.add_connection(h3, h1).unwrap();
        assert!(net.nodes()[h3.0].has_input(h1));
        assert!(!net.nodes()[h1.0].has_input(h3));
        // the output neuron always ends up on the right
        net.add_connection(n(0), h1).unwrap();
        assert!(net.nodes()[0].has_input(h1));
        assert!(net.is_acyclic());
    }

    #[test]
    fn add_connection_refuses_to_close_a_cycle() {
        let mut net = Network::new(1, 0., 1., &mut rng());
        let a = net.add_neuron(Linear);
        let c = net.add_neuron(Linear);
        let b = net.add_neuron(Linear);
        // b -> c -> a, and both a and b feed the output, b first
        net.nodes[a.0].add_input(a, c).unwrap();
        net.nodes[c.0].add_input(c, b).unwrap();
        net.nodes[b.0].add_input(b, n(1)).unwrap();
        net.nodes[0].add_input(n(0), b).unwrap();
        net.nodes[0].add_input(n(0), a).unwrap();

        // a and b tie on distance, a has the lower index and would become the left side
        net.update_distances();
        assert_eq!(net.nodes()[a.0].distance(), net.nodes()[b.0].distance());
        assert_eq!(net.left_right(a, b), Some((a, b)));
        assert_eq!(net.add_connection(a, b), Err(TopologyError::Cycle(a, b)));
        assert_eq!(net.insert_node(a, b, Linear), Err(TopologyError::Cycle(a, b)));
        assert!(net.is_acyclic());
    }

    #[test]
    fn left_right_precedence() {
        let mut net = Network::new(2, 0., 1., &mut rng());
        let h = net.add_neuron(Linear);
        assert_eq!(net.left_right(h, h), None);
        assert_eq!(net.left_right(n(0), h), Some((h, n(0))));
        assert_eq!(net.left_right(h, n(1)), Some((n(1), h)));
        net.nodes[1].add_input(n(1), h).unwrap();
        // an existing connection wins over the input rule
        assert_eq!(net.left_right(n(1), h), Some((h, n(1))));
        assert_eq!(net.left_right(n(9), h), None);
    }

    #[test]
    fn distances_are_first_seen_hop_counts() {
        let mut net = fully_connected(2, 1.);
        let h = net.insert_node(n(1), n(0), Linear).unwrap();
        let orphan = net.add_neuron(Tanh);
        net.update_distances();
        assert_eq!(net.nodes()[0].distance(), 0);
        assert_eq!(net.nodes()[h.0].distance(), 1);
        assert_eq!(net.nodes()[1].distance(), 2);
        assert_eq!(net.nodes()[2].distance(), 1);
        assert_eq!(net.nodes()[orphan.0].distance(), 0);
        assert_eq!(net.connected_count(), 4);
    }

    #[test]
    fn insert_random_node_splits_an_existing_connection() {
        let mut r = rng();
        let mut net = Network::new(3, 1., 1., &mut r);
        let before = net.edge_count();
        let mut inserted = 0;
        for _ in 0..20 {
            if net.insert_random_node(&mut r).is_ok() {
                inserted += 1;
            }
        }
        assert!(inserted > 0);
        assert_eq!(net.node_count(), 4 + inserted);
        assert_eq!(net.edge_count(), before + inserted);
        assert!(net.is_acyclic());

        let mut empty = Network::new(3, 0., 1., &mut r);
        assert_eq!(empty.insert_random_node(&mut r), Err(TopologyError::NothingToSplit(n(0))));
    }

    #[test]
    fn random_operator_sequences_keep_the_graph_well_formed() {
        for seed in 0..30 {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let mut net = Network::new(4, 0.5, 0.5, &mut r);
            for _ in 0..60 {
                match r.gen_range(0..4) {
                    0 => {
                        let _ = net.insert_random_node(&mut r);
                    }
                    1 => {
                        let (a, b) = (net.random_neuron(&mut r), net.random_neuron(&mut r));
                        let _ = net.insert_node(a, b, r.gen());
                    }
                    2 => {
                        let (a, b) = (net.random_neuron(&mut r), net.random_neuron(&mut r));
                        let before = net.complexity();
                        if net.add_connection(a, b).is_ok() {
                            assert!(net.complexity() >= before);
                        }
                    }
                    _ => {
                        net.modify(5, &mut r);
                    }
                }
                assert!(net.is_acyclic(), "seed {seed}: cycle in\n{net}");
                assert!(net.connected_count() <= net.node_count());
                for (i, neuron) in net.nodes().iter().enumerate() {
                    assert!(!neuron.has_input(n(i)), "seed {seed}: self loop at {i}");
                    assert!(neuron.inputs().iter().all(|input| input.0 < net.node_count()));
                }
                for &input in net.input_nodes() {
                    assert!(net.nodes()[input.0].inputs().is_empty());
                }
            }
        }
    }

    #[test]
    fn lazy_walk_agrees_with_count_and_distances() {
        let mut r = rng();
        let mut net = Network::new(4, 0.5, 0.5, &mut r);
        for _ in 0..40 {
            net.modify(5, &mut r);
            let walked = net.connected().collect_vec();
            assert_eq!(net.connected_count(), walked.len());

            net.update_distances();
            for &(index, distance) in &walked {
                assert_eq!(net.nodes()[index.0].distance(), distance);
            }
            for (i, neuron) in net.nodes().iter().enumerate() {
                if walked.iter().all(|&(index, _)| index.0 != i) {
                    assert_eq!(neuron.distance(), 0);
                }
            }
        }
    }

    #[test]
    fn clones_are_independent() {
        let mut r = rng();
        let mut original = Network::new(3, 0.5, 0.7, &mut r);
        original.insert_random_node(&mut r).ok();
        let input = [0.4, -0.2, 0.9];
        let expected = original.evaluate(&input);

        let mut copy = original.clone();
        for _ in 0..30 {
            let (a, b) = (copy.random_neuron(&mut r), copy.random_neuron(&mut r));
            let _ = copy.add_connection(a, b);
            copy.randomize_activation_function_for_random_neuron(&mut r);
        }
        copy.set_weight(0.1);
        copy.evaluate(&[9., 9., 9.]);
        assert_eq!(original.evaluate(&input), expected);

        let reference = copy.clone();
        original.insert_random_node(&mut r).ok();
        original.set_weight(0.3);
        assert_eq!(copy, reference);
    }

    #[test]
    fn complexity_counts_connected_neurons_and_activation_costs() {
        let mut net = fully_connected(2, 1.);
        let linear = Linear.cost();
        assert_abs_diff_eq!(net.complexity(), 3. + linear, epsilon = 1e-12);

        // unconnected neurons add their cost but not to the connected count
        let orphan = net.add_neuron(Swish);
        assert_abs_diff_eq!(net.complexity(), 3. + linear + Swish.cost(), epsilon = 1e-12);
        net.set_activation(orphan, Linear).unwrap();

        net.set_complexity_multiplier(2.);
        assert_abs_diff_eq!(net.complexity(), (3. + 2. * linear) * 2., epsilon = 1e-12);
        net.set_complexity_multiplier(0.);
        assert_eq!(net.complexity(), MIN_COMPLEXITY);
    }

    #[test]
    fn graph_mirrors_the_connections() {
        let mut net = fully_connected(3, 1.);
        net.insert_node(n(2), n(0), Cos).unwrap();
        let graph = net.graph();
        assert_eq!(graph.node_count(), net.node_count());
        assert_eq!(graph.edge_count(), net.edge_count());
        assert_eq!(graph[NodeIndex::new(4)], Cos);
        assert!(graph.find_edge(NodeIndex::new(4), NodeIndex::new(0)).is_some());
    }

    #[test]
    fn display_summarizes_the_network() {
        let net = fully_connected(3, 0.5);
        let text = net.to_string();
        assert!(text.starts_with("Network\n"));
        assert!(text.contains("Input nodes: 3"));
        assert!(text.contains("Connections to output node: 3"));
        assert!(text.contains("#0 NEURON[Linear,3] <- #1,#2,#3"));
    }
}
