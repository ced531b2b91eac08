//! Per-node connectivity relative to a candidate partition

use std::collections::{HashMap, HashSet};

use crate::cluster::{ExceptionEdge, Label, Partition};
use crate::error::{ClusterError, ClusterResult};
use crate::graph::GraphView;

/// Where a node's successors fall with respect to its own cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConnectivity<N> {
    pub node: N,
    pub label: Label,

    /// Distinct successors sharing the node's cluster (a self-loop counts)
    pub internal_successors: usize,

    /// Distinct successors in any other cluster, in first-seen order
    pub inter_cluster_successors: Vec<N>,
}

impl<N> NodeConnectivity<N> {
    /// Every successor lies inside the node's own cluster
    pub fn is_cluster_closed(&self) -> bool {
        self.inter_cluster_successors.is_empty()
    }

    /// No successor lies inside the node's own cluster. Such a node may keep
    /// edges into the opposite independent cluster.
    pub fn is_cluster_open(&self) -> bool {
        self.internal_successors == 0
    }
}

/// Split of the edges running between `I1` and `I2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossEdges<N> {
    /// Edges whose source is cluster-open
    pub exceptions: Vec<ExceptionEdge<N>>,

    /// Edges breaking the independence invariant
    pub violations: Vec<(N, N)>,
}

/// Computes inter-cluster successor sets for every node of a partition.
///
/// Each call inspects every successor list once, so it is linear in the size
/// of the graph.
pub struct ConnectivityAnalyzer<'g, G> {
    graph: &'g G,
}

impl<'g, G: GraphView> ConnectivityAnalyzer<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Connectivity of every node, in partition order
    pub fn analyze(
        &self,
        partition: &Partition<G::NodeId>,
    ) -> ClusterResult<Vec<NodeConnectivity<G::NodeId>>> {
        partition.ensure_covers(self.graph)?;

        let mut report = Vec::with_capacity(partition.len());
        let mut seen = HashSet::new();

        for (node, label) in partition.iter() {
            seen.clear();
            let mut internal_successors = 0;
            let mut inter_cluster_successors = Vec::new();

            for succ in self.graph.successors(node) {
                // Parallel edges count once
                if !seen.insert(succ) {
                    continue;
                }

                let succ_label = partition.label_of(&succ).ok_or_else(|| {
                    ClusterError::InvalidPartition(format!(
                        "successor {succ:?} of {node:?} has no label"
                    ))
                })?;

                if succ_label == label {
                    internal_successors += 1;
                } else {
                    inter_cluster_successors.push(succ);
                }
            }

            report.push(NodeConnectivity {
                node,
                label,
                internal_successors,
                inter_cluster_successors,
            });
        }

        Ok(report)
    }

    /// Map every node to whether it is cluster-closed
    pub fn closure(
        &self,
        partition: &Partition<G::NodeId>,
    ) -> ClusterResult<HashMap<G::NodeId, bool>> {
        Ok(self
            .analyze(partition)?
            .into_iter()
            .map(|conn| (conn.node, conn.is_cluster_closed()))
            .collect())
    }

    /// Classify every distinct edge between `I1` and `I2`
    pub fn cross_edges(
        &self,
        partition: &Partition<G::NodeId>,
    ) -> ClusterResult<CrossEdges<G::NodeId>> {
        let mut exceptions = Vec::new();
        let mut violations = Vec::new();

        for conn in self.analyze(partition)? {
            let Some(opposite) = conn.label.opposite() else {
                continue;
            };

            for &target in &conn.inter_cluster_successors {
                if partition.label_of(&target) != Some(opposite) {
                    continue;
                }

                if conn.is_cluster_open() {
                    exceptions.push(ExceptionEdge {
                        source: conn.node,
                        target,
                    });
                } else {
                    violations.push((conn.node, target));
                }
            }
        }

        Ok(CrossEdges { exceptions, violations })
    }

    /// Edges between the independent clusters admitted by the exception rule
    pub fn exception_edges(
        &self,
        partition: &Partition<G::NodeId>,
    ) -> ClusterResult<Vec<ExceptionEdge<G::NodeId>>> {
        Ok(self.cross_edges(partition)?.exceptions)
    }

    /// Edges between the independent clusters that break the invariant
    pub fn violations(
        &self,
        partition: &Partition<G::NodeId>,
    ) -> ClusterResult<Vec<(G::NodeId, G::NodeId)>> {
        Ok(self.cross_edges(partition)?.violations)
    }
}
