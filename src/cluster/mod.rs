//! Cluster analysis module
//!
//! A partition labels every neuron with one of four clusters. `I1` and `I2`
//! are the independent pair: an edge between them is only tolerated when its
//! source has no successor inside its own cluster, and every such edge is
//! recorded as an [`ExceptionEdge`]. `A` and `B` hold the interconnected
//! remainder, which may talk to everything.

pub mod connectivity;
pub mod partitioner;
pub mod scoring;
pub mod selector;

pub use connectivity::{ConnectivityAnalyzer, NodeConnectivity};
pub use partitioner::ClusterPartitioner;
pub use scoring::{Criterion, Parameter, ScoringEngine, Selection};
pub use selector::ClusterSelector;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};
use crate::graph::GraphView;

/// Cluster label assigned to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Interconnected cluster coupled mostly to `I1`
    A,
    /// Interconnected cluster coupled mostly to `I2`
    B,
    /// First independent cluster
    I1,
    /// Second independent cluster
    I2,
}

impl Label {
    pub fn is_independent(self) -> bool {
        matches!(self, Label::I1 | Label::I2)
    }

    /// The other half of the independent pair
    pub fn opposite(self) -> Option<Label> {
        match self {
            Label::I1 => Some(Label::I2),
            Label::I2 => Some(Label::I1),
            Label::A | Label::B => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::A => "A",
            Label::B => "B",
            Label::I1 => "I1",
            Label::I2 => "I2",
        };
        f.write_str(name)
    }
}

/// Total, exclusive assignment of nodes to cluster labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<N: Eq + Hash> {
    nodes: Vec<N>,
    labels: Vec<Label>,
    index: HashMap<N, usize>,
}

impl<N: Copy + Eq + Hash + fmt::Debug> Partition<N> {
    /// Pair every node with its label. Fails when the lengths differ or a
    /// node is listed twice.
    pub fn new(nodes: Vec<N>, labels: Vec<Label>) -> ClusterResult<Self> {
        if nodes.len() != labels.len() {
            return Err(ClusterError::InvalidPartition(format!(
                "{} nodes but {} labels",
                nodes.len(),
                labels.len()
            )));
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, &node) in nodes.iter().enumerate() {
            if index.insert(node, pos).is_some() {
                return Err(ClusterError::InvalidPartition(format!(
                    "node {node:?} is labelled more than once"
                )));
            }
        }

        Ok(Self { nodes, labels, index })
    }

    /// Build a partition from `(node, label)` pairs
    pub fn from_assignments<I>(assignments: I) -> ClusterResult<Self>
    where
        I: IntoIterator<Item = (N, Label)>,
    {
        let (nodes, labels) = assignments.into_iter().unzip();
        Self::new(nodes, labels)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Labelled nodes, in the order they were supplied
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label_of(&self, node: &N) -> Option<Label> {
        self.index.get(node).map(|&pos| self.labels[pos])
    }

    /// Members of one cluster, in node order
    pub fn members(&self, label: Label) -> Vec<N> {
        self.iter()
            .filter(|&(_, l)| l == label)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (N, Label)> + '_ {
        self.nodes.iter().copied().zip(self.labels.iter().copied())
    }

    /// Check that the partition labels exactly the nodes of `graph`
    pub fn ensure_covers<G>(&self, graph: &G) -> ClusterResult<()>
    where
        G: GraphView<NodeId = N>,
    {
        let graph_nodes = graph.nodes();
        if graph_nodes.len() != self.len() {
            return Err(ClusterError::InvalidPartition(format!(
                "graph has {} nodes but the partition labels {}",
                graph_nodes.len(),
                self.len()
            )));
        }

        for node in &graph_nodes {
            if !self.index.contains_key(node) {
                return Err(ClusterError::InvalidPartition(format!(
                    "node {node:?} has no label"
                )));
            }
        }

        Ok(())
    }
}

/// Edge between the independent clusters, tolerated because `source` has no
/// successor inside its own cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExceptionEdge<N> {
    /// The justifying node
    pub source: N,
    pub target: N,
}

/// A partition produced by the partitioner, before scoring
#[derive(Debug, Clone)]
pub struct Candidate<N: Eq + Hash> {
    /// Seed pair the independent clusters were grown from
    pub seeds: Option<(N, N)>,

    pub partition: Partition<N>,

    /// Edges between I1 and I2 admitted through the exception rule
    pub exceptions: Vec<ExceptionEdge<N>>,

    /// No valid split existed and every node was left interconnected
    pub collapsed: bool,
}

impl<N: Copy + Eq + Hash + fmt::Debug> Candidate<N> {
    pub fn sizes(&self) -> ClusterSizes {
        ClusterSizes {
            i1: self.partition.count(Label::I1),
            i2: self.partition.count(Label::I2),
            a: self.partition.count(Label::A),
            b: self.partition.count(Label::B),
        }
    }
}

/// Node count of each cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterSizes {
    pub i1: usize,
    pub i2: usize,
    pub a: usize,
    pub b: usize,
}

impl ClusterSizes {
    pub fn independent(&self) -> usize {
        self.i1 + self.i2
    }

    pub fn interconnected(&self) -> usize {
        self.a + self.b
    }
}

/// One scored selection, listed when a threshold parameter admits several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary<N> {
    pub seeds: Option<(N, N)>,
    pub selection: Selection,
    pub size: usize,
    pub power_saving: f64,
    pub score: f64,
    pub exception_count: usize,
}

/// Metadata describing the selected cluster(s)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo<N: Ord> {
    /// Nodes belonging to the selected cluster(s)
    pub original_nodes: BTreeSet<N>,

    /// Number of selected nodes
    pub size: usize,

    /// Estimated power saving of the winning partition, in percent
    pub power_saving: f64,

    pub score: f64,
    pub criterion: Criterion,
    pub parameter: Parameter,
    pub selection: Selection,
    pub seeds: Option<(N, N)>,
    pub cluster_sizes: ClusterSizes,
    pub exception_count: usize,
    pub collapsed: bool,

    /// Every qualifying selection, best first; only filled for threshold parameters
    pub alternatives: Vec<CandidateSummary<N>>,
}

/// Result of [`ClusterSelector::find_clusters`]
#[derive(Debug, Clone)]
pub struct Clustering<N: Ord + Eq + Hash> {
    /// First group followed by the second, each in node order
    pub selected: Vec<N>,

    /// The two selected clusters (`I1`/`I2`, or `A`/`B`)
    pub groups: (Vec<N>, Vec<N>),

    pub info: ClusterInfo<N>,

    /// The winning partition
    pub partition: Partition<N>,

    pub exceptions: Vec<ExceptionEdge<N>>,
}

impl<N: Ord + Eq + Hash> Clustering<N> {
    /// Split into the selected node sequence and its metadata
    pub fn into_parts(self) -> (Vec<N>, ClusterInfo<N>) {
        (self.selected, self.info)
    }
}
