//! Construction of candidate partitions
//!
//! Every pair of nodes with no edge between them seeds one candidate: the
//! two seeds start `I1` and `I2`, and each cluster repeatedly adopts the
//! successors that only it reaches. A node that ends up with successors both
//! inside its own cluster and in the opposite one is handed back to the
//! interconnected group. What is left is split into `A` and `B`.
//!
//! Seeds are enumerated in node order and every step iterates nodes in
//! order, so the candidate list is fully reproducible.
//!
//! Cost: there are O(V²) seed pairs. Each runs up to `max_growth_passes`
//! passes of O(V + E), then up to V absorption sweeps of O(V + E·Δ), where
//! Δ is the largest out-degree. The worst case is therefore O(V³·(V + E·Δ)),
//! far above quadratic: a few hundred neurons with a few thousand synapses
//! already take tens of seconds.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::cluster::{Candidate, ConnectivityAnalyzer, Label, Partition};
use crate::config::Config;
use crate::error::{ClusterError, ClusterResult};
use crate::graph::GraphView;

// While a candidate is being grown `A` stands for the whole interconnected
// group; it is only split into `A`/`B` at the end.
const INTERCONNECTED: Label = Label::A;

/// Builds candidate partitions over a dense snapshot of the graph
pub struct ClusterPartitioner<'g, G: GraphView> {
    graph: &'g G,
    config: Config,

    /// Node ids in graph order; positions are the dense indices below
    nodes: Vec<G::NodeId>,

    /// Distinct successors per node, sorted
    successors: Vec<Vec<usize>>,

    /// Distinct predecessors per node, sorted
    predecessors: Vec<Vec<usize>>,
}

impl<'g, G: GraphView> ClusterPartitioner<'g, G> {
    /// Snapshot the graph into dense adjacency lists.
    ///
    /// Fails with `InvalidPartition` if the view lists a node twice or
    /// reports a neighbour outside its node set.
    pub fn new(graph: &'g G, config: Config) -> ClusterResult<Self> {
        let nodes = graph.nodes();

        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, &node) in nodes.iter().enumerate() {
            if index.insert(node, pos).is_some() {
                return Err(ClusterError::InvalidPartition(format!(
                    "node {node:?} is listed more than once"
                )));
            }
        }

        let to_dense = |node: G::NodeId, neighbours: Vec<G::NodeId>| -> ClusterResult<Vec<usize>> {
            let mut dense = neighbours
                .into_iter()
                .map(|other| {
                    index.get(&other).copied().ok_or_else(|| {
                        ClusterError::InvalidPartition(format!(
                            "neighbour {other:?} of {node:?} is not in the node set"
                        ))
                    })
                })
                .collect::<ClusterResult<Vec<_>>>()?;
            dense.sort_unstable();
            dense.dedup();
            Ok(dense)
        };

        let mut successors = Vec::with_capacity(nodes.len());
        let mut predecessors = Vec::with_capacity(nodes.len());
        for &node in &nodes {
            successors.push(to_dense(node, graph.successors(node))?);
            predecessors.push(to_dense(node, graph.predecessors(node))?);
        }

        Ok(Self {
            graph,
            config,
            nodes,
            successors,
            predecessors,
        })
    }

    /// Pairs of distinct nodes with no edge in either direction, in node order
    pub fn seed_pairs(&self) -> Vec<(G::NodeId, G::NodeId)> {
        self.dense_seed_pairs()
            .into_iter()
            .map(|(first, second)| (self.nodes[first], self.nodes[second]))
            .collect()
    }

    fn dense_seed_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.nodes.len())
            .tuple_combinations()
            .filter(|&(first, second)| {
                let (u, v) = (self.nodes[first], self.nodes[second]);
                !self.graph.has_edge(u, v) && !self.graph.has_edge(v, u)
            })
            .collect()
    }

    /// Build every distinct candidate partition.
    ///
    /// Falls back to a single collapsed candidate, with every node
    /// interconnected, when no seed pair yields a usable split.
    pub fn candidates(&self) -> ClusterResult<Vec<Candidate<G::NodeId>>> {
        let node_count = self.nodes.len();
        if node_count == 0 {
            return Err(ClusterError::no_valid_partition("graph has no nodes"));
        }

        let seeds = self.dense_seed_pairs();
        log::info!("Exploring {} seed pairs over {} nodes", seeds.len(), node_count);

        let analyzer = ConnectivityAnalyzer::new(self.graph);
        let mut seen: HashSet<Vec<Label>> = HashSet::new();
        let mut candidates = Vec::new();

        for (first, second) in seeds {
            let labels = self.grow(first, second);

            if self.config.require_both_nonempty
                && !(labels.contains(&Label::I1) && labels.contains(&Label::I2))
            {
                log::debug!(
                    "Seed pair ({:?}, {:?}) lost an independent cluster, skipping",
                    self.nodes[first],
                    self.nodes[second]
                );
                continue;
            }

            if !seen.insert(labels.clone()) {
                continue;
            }

            let candidate = self.finish(Some((first, second)), labels, &analyzer, false)?;
            log::debug!(
                "Candidate from ({:?}, {:?}): {:?}, {} exception edges",
                self.nodes[first],
                self.nodes[second],
                candidate.sizes(),
                candidate.exceptions.len()
            );
            candidates.push(candidate);
        }

        if candidates.is_empty() {
            log::warn!(
                "No independent split exists; collapsing all {} nodes into the interconnected cluster",
                node_count
            );
            let labels = vec![INTERCONNECTED; node_count];
            candidates.push(self.finish(None, labels, &analyzer, true)?);
        }

        log::info!("Built {} distinct candidate partitions", candidates.len());

        Ok(candidates)
    }

    /// Wrap a labelling into a candidate, recording its exception edges
    fn finish(
        &self,
        seeds: Option<(usize, usize)>,
        labels: Vec<Label>,
        analyzer: &ConnectivityAnalyzer<'_, G>,
        collapsed: bool,
    ) -> ClusterResult<Candidate<G::NodeId>> {
        let partition = Partition::new(self.nodes.clone(), labels)?;
        let cross = analyzer.cross_edges(&partition)?;

        if !cross.violations.is_empty() {
            return Err(ClusterError::NoValidPartition {
                reason: format!(
                    "{} edges between I1 and I2 have a source with successors in its own cluster",
                    cross.violations.len()
                ),
                blocking_edges: cross
                    .violations
                    .iter()
                    .map(|(src, dst)| format!("{src:?} -> {dst:?}"))
                    .collect(),
            });
        }

        Ok(Candidate {
            seeds: seeds.map(|(first, second)| (self.nodes[first], self.nodes[second])),
            partition,
            exceptions: cross.exceptions,
            collapsed,
        })
    }

    /// Grow the independent pair from two seeds and label every node
    fn grow(&self, first: usize, second: usize) -> Vec<Label> {
        let mut labels = vec![INTERCONNECTED; self.nodes.len()];
        labels[first] = Label::I1;
        labels[second] = Label::I2;

        for pass in 0..self.config.max_growth_passes {
            let before = independent_counts(&labels);

            self.adopt_unique_successors(&mut labels);
            self.release_conflicted(&mut labels);

            let after = independent_counts(&labels);
            log::trace!("Pass {}: I1 {} -> {}, I2 {} -> {}", pass, before.0, after.0, before.1, after.1);

            if after.0 <= before.0 && after.1 <= before.1 {
                break;
            }
        }

        if self.config.strict_independence {
            self.release_open(&mut labels);
        }

        if self.config.absorb_residual {
            self.absorb_residual(&mut labels);
        }

        self.split_interconnected(&mut labels);

        labels
    }

    /// Interconnected nodes reached by exactly one independent cluster join it
    fn adopt_unique_successors(&self, labels: &mut [Label]) {
        let mut reached_by_first = vec![false; labels.len()];
        let mut reached_by_second = vec![false; labels.len()];

        for (node, &label) in labels.iter().enumerate() {
            let reached = match label {
                Label::I1 => &mut reached_by_first,
                Label::I2 => &mut reached_by_second,
                _ => continue,
            };
            for &succ in &self.successors[node] {
                reached[succ] = true;
            }
        }

        for node in 0..labels.len() {
            if labels[node] != INTERCONNECTED {
                continue;
            }
            match (reached_by_first[node], reached_by_second[node]) {
                (true, false) => labels[node] = Label::I1,
                (false, true) => labels[node] = Label::I2,
                _ => {}
            }
        }
    }

    /// Whether `node` has a successor in its own cluster, and one in the opposite
    fn successor_profile(&self, node: usize, labels: &[Label]) -> (bool, bool) {
        let own = labels[node];
        let opposite = own.opposite();

        let mut internal = false;
        let mut cross = false;
        for &succ in &self.successors[node] {
            if labels[succ] == own {
                internal = true;
            } else if Some(labels[succ]) == opposite {
                cross = true;
            }
        }
        (internal, cross)
    }

    /// Independent nodes whose `(internal, cross)` successor profile matches
    fn independent_with_profile(&self, labels: &[Label], profile: (bool, bool)) -> Vec<usize> {
        (0..labels.len())
            .filter(|&node| labels[node].is_independent())
            .filter(|&node| self.successor_profile(node, labels) == profile)
            .collect()
    }

    /// Nodes with successors on both sides of the independent pair go back
    /// to the interconnected group
    fn release_conflicted(&self, labels: &mut [Label]) {
        let conflicted = self.independent_with_profile(labels, (true, true));

        for node in conflicted {
            labels[node] = INTERCONNECTED;
        }
    }

    /// Drop nodes that only stay independent through the exception rule.
    /// Releasing one node can expose another, so repeat until none is left.
    fn release_open(&self, labels: &mut [Label]) {
        loop {
            let open = self.independent_with_profile(labels, (false, true));

            if open.is_empty() {
                break;
            }
            for node in open {
                labels[node] = INTERCONNECTED;
            }
        }
    }

    /// Move interconnected nodes into the smaller independent cluster when the
    /// move creates no edge between `I1` and `I2`
    fn absorb_residual(&self, labels: &mut [Label]) {
        let (mut first_size, mut second_size) = independent_counts(labels);

        loop {
            let mut moved = false;

            for node in 0..labels.len() {
                if labels[node] != INTERCONNECTED {
                    continue;
                }

                let order = if second_size < first_size {
                    [Label::I2, Label::I1]
                } else {
                    [Label::I1, Label::I2]
                };

                for target in order {
                    let other = if target == Label::I1 { Label::I2 } else { Label::I1 };
                    if self.can_absorb(node, target, other, labels) {
                        labels[node] = target;
                        if target == Label::I1 {
                            first_size += 1;
                        } else {
                            second_size += 1;
                        }
                        moved = true;
                        break;
                    }
                }
            }

            if !moved {
                break;
            }
        }
    }

    fn can_absorb(&self, node: usize, target: Label, other: Label, labels: &[Label]) -> bool {
        if self.successors[node].iter().any(|&succ| labels[succ] == other) {
            return false;
        }

        for &pred in &self.predecessors[node] {
            if pred == node {
                continue;
            }
            if labels[pred] == other {
                return false;
            }
            // An exception source must not gain an internal successor
            if labels[pred] == target && self.successors[pred].iter().any(|&succ| labels[succ] == other) {
                return false;
            }
        }

        true
    }

    /// Split the interconnected group: nodes coupled at least as much to `I1`
    /// as to `I2` go to `A`, the rest to `B`
    fn split_interconnected(&self, labels: &mut [Label]) {
        for node in 0..labels.len() {
            if labels[node] != INTERCONNECTED {
                continue;
            }

            let mut to_first = 0;
            let mut to_second = 0;
            for &neighbour in self.successors[node].iter().chain(&self.predecessors[node]).unique() {
                match labels[neighbour] {
                    Label::I1 => to_first += 1,
                    Label::I2 => to_second += 1,
                    _ => {}
                }
            }

            labels[node] = if to_first >= to_second { Label::A } else { Label::B };
        }
    }
}

fn independent_counts(labels: &[Label]) -> (usize, usize) {
    labels.iter().fold((0, 0), |(first, second), label| match label {
        Label::I1 => (first + 1, second),
        Label::I2 => (first, second + 1),
        _ => (first, second),
    })
}

#[cfg(test)]
mod tests {
    use super::ClusterPartitioner;
    use crate::cluster::{ConnectivityAnalyzer, ExceptionEdge, Label};
    use crate::config::Config;
    use crate::error::ClusterError;
    use crate::graph::GraphView;
    use petgraph::graphmap::DiGraphMap;

    fn graph(nodes: u32, edges: &[(u32, u32)]) -> DiGraphMap<u32, ()> {
        let mut graph = DiGraphMap::new();
        for node in 0..nodes {
            graph.add_node(node);
        }
        for &(src, dst) in edges {
            graph.add_edge(src, dst, ());
        }
        graph
    }

    fn complete(nodes: u32) -> DiGraphMap<u32, ()> {
        let mut edges = Vec::new();
        for src in 0..nodes {
            for dst in 0..nodes {
                if src != dst {
                    edges.push((src, dst));
                }
            }
        }
        graph(nodes, &edges)
    }

    #[test]
    fn test_seed_pairs_skip_adjacent_nodes() {
        let graph = graph(4, &[(0, 1), (2, 0)]);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();

        assert_eq!(partitioner.seed_pairs(), vec![(0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_edgeless_graph_makes_every_node_independent() {
        let graph = graph(4, &[]);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();

        let candidates = partitioner.candidates().unwrap();

        assert!(!candidates.is_empty());
        for candidate in &candidates {
            let sizes = candidate.sizes();
            assert_eq!((sizes.i1, sizes.i2), (2, 2));
            assert!(candidate.exceptions.is_empty());
            assert!(!candidate.collapsed);
        }
    }

    #[test]
    fn test_complete_graph_collapses() {
        let graph = complete(4);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();

        let candidates = partitioner.candidates().unwrap();

        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].collapsed);
        assert_eq!(candidates[0].seeds, None);
        assert_eq!(candidates[0].partition.count(Label::A), 4);
        assert!(candidates[0].exceptions.is_empty());
    }

    #[test]
    fn test_growth_records_forward_edge_as_exception() {
        // 0 -> 2 -> 1, with 3 isolated
        let graph = graph(4, &[(0, 2), (2, 1)]);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();

        let candidates = partitioner.candidates().unwrap();

        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.seeds, Some((0, 1)));
        assert_eq!(first.partition.members(Label::I1), vec![0, 2]);
        assert_eq!(first.partition.members(Label::I2), vec![1, 3]);
        assert_eq!(first.exceptions, vec![ExceptionEdge { source: 2, target: 1 }]);

        let second = &candidates[1];
        assert_eq!(second.seeds, Some((0, 3)));
        assert_eq!(second.partition.members(Label::I1), vec![0, 1, 2]);
        assert_eq!(second.partition.members(Label::I2), vec![3]);
        assert!(second.exceptions.is_empty());
    }

    #[test]
    fn test_strict_mode_leaves_no_exceptions() {
        let graph = graph(4, &[(0, 2), (2, 1)]);
        let mut config = Config::default();
        config.strict_independence = true;
        let partitioner = ClusterPartitioner::new(&graph, config).unwrap();

        let candidates = partitioner.candidates().unwrap();

        assert!(candidates.iter().all(|candidate| candidate.exceptions.is_empty()));
    }

    #[test]
    fn test_conflicted_node_returns_to_interconnected_group() {
        // 2 feeds both seeds' territory: it is adopted by I1 and then has
        // successors on both sides
        let graph = graph(5, &[(0, 2), (2, 3), (2, 4), (1, 4)]);
        let mut config = Config::default();
        config.absorb_residual = false;
        let partitioner = ClusterPartitioner::new(&graph, config).unwrap();

        let candidates = partitioner.candidates().unwrap();
        let analyzer = ConnectivityAnalyzer::new(&graph);

        assert_eq!(candidates[0].seeds, Some((0, 1)));
        assert_eq!(candidates[0].partition.members(Label::I1), vec![0, 3]);
        assert_eq!(candidates[0].partition.members(Label::I2), vec![1, 4]);
        assert_eq!(candidates[0].partition.label_of(&2), Some(Label::A));
        for candidate in &candidates {
            assert!(analyzer.violations(&candidate.partition).unwrap().is_empty());
        }
    }

    #[test]
    fn test_every_candidate_is_total_and_valid() {
        let n = 24u32;
        let edges: Vec<(u32, u32)> = (0..n)
            .flat_map(|i| [(i, (i * 7 + 3) % n), (i, (i * 5 + 1) % n), ((i * 11) % n, i)])
            .collect();
        let graph = graph(n, &edges);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();
        let analyzer = ConnectivityAnalyzer::new(&graph);

        let candidates = partitioner.candidates().unwrap();

        for candidate in &candidates {
            candidate.partition.ensure_covers(&graph).unwrap();
            assert_eq!(candidate.partition.len(), n as usize);
            assert!(analyzer.violations(&candidate.partition).unwrap().is_empty());
            assert_eq!(
                analyzer.exception_edges(&candidate.partition).unwrap(),
                candidate.exceptions
            );
        }
    }

    #[test]
    fn test_empty_graph_has_no_valid_partition() {
        let graph = DiGraphMap::<u32, ()>::new();
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();

        let result = partitioner.candidates();

        assert!(matches!(result, Err(ClusterError::NoValidPartition { .. })));
    }

    #[test]
    fn test_closed_cross_edge_reports_blocking_edge() {
        // Arrange: 0 feeds 2 inside I1 and 1 across, so 0 -> 1 has no excuse
        let graph = graph(3, &[(0, 1), (0, 2)]);
        let partitioner = ClusterPartitioner::new(&graph, Config::default()).unwrap();
        let analyzer = ConnectivityAnalyzer::new(&graph);
        let labels = vec![Label::I1, Label::I2, Label::I1];

        // Act
        let result = partitioner.finish(Some((0, 1)), labels, &analyzer, false);

        // Assert
        match result {
            Err(ClusterError::NoValidPartition { blocking_edges, .. }) => {
                assert_eq!(blocking_edges, vec!["0 -> 1".to_string()]);
            }
            other => panic!("expected NoValidPartition, got {other:?}"),
        }
    }

    /// A view whose successor lists point outside its node set
    struct DanglingView;

    impl GraphView for DanglingView {
        type NodeId = u32;

        fn nodes(&self) -> Vec<u32> {
            vec![0, 1]
        }

        fn successors(&self, node: u32) -> Vec<u32> {
            if node == 0 { vec![9] } else { Vec::new() }
        }

        fn predecessors(&self, _node: u32) -> Vec<u32> {
            Vec::new()
        }

        fn has_edge(&self, from: u32, to: u32) -> bool {
            from == 0 && to == 9
        }
    }

    #[test]
    fn test_dangling_successor_is_an_invalid_partition() {
        let view = DanglingView;
        let result = ClusterPartitioner::new(&view, Config::default());

        assert!(matches!(result, Err(ClusterError::InvalidPartition(_))));
    }
}
