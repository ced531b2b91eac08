//! Graph representation and the read-only view consumed by the partitioner

pub mod compressed;
pub mod builder;

pub use builder::GraphBuilder;
pub use compressed::CompressedGraph;

use std::fmt::Debug;
use std::hash::Hash;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::graphmap::{DiGraphMap, NodeTrait};
use petgraph::Direction;

/// Read-only capability interface over a directed graph.
///
/// The partitioner never mutates the graph. `nodes` must enumerate every node
/// exactly once in a stable order; that order drives seed enumeration and
/// therefore the reproducibility of the result.
pub trait GraphView {
    /// Opaque, comparable node identifier
    type NodeId: Copy + Eq + Ord + Hash + Debug;

    /// All nodes, in insertion order
    fn nodes(&self) -> Vec<Self::NodeId>;

    /// Direct successors of `node`; parallel edges may repeat a successor
    fn successors(&self, node: Self::NodeId) -> Vec<Self::NodeId>;

    /// Direct predecessors of `node`; parallel edges may repeat a predecessor
    fn predecessors(&self, node: Self::NodeId) -> Vec<Self::NodeId>;

    /// Whether the edge `from -> to` exists
    fn has_edge(&self, from: Self::NodeId, to: Self::NodeId) -> bool;

    /// Number of nodes
    fn node_count(&self) -> usize {
        self.nodes().len()
    }
}

impl<N, E> GraphView for DiGraphMap<N, E>
where
    N: NodeTrait + Debug,
{
    type NodeId = N;

    fn nodes(&self) -> Vec<N> {
        DiGraphMap::nodes(self).collect()
    }

    fn successors(&self, node: N) -> Vec<N> {
        self.neighbors_directed(node, Direction::Outgoing).collect()
    }

    fn predecessors(&self, node: N) -> Vec<N> {
        self.neighbors_directed(node, Direction::Incoming).collect()
    }

    fn has_edge(&self, from: N, to: N) -> bool {
        self.contains_edge(from, to)
    }

    fn node_count(&self) -> usize {
        DiGraphMap::node_count(self)
    }
}

impl<N, E> GraphView for DiGraph<N, E> {
    type NodeId = NodeIndex;

    fn nodes(&self) -> Vec<NodeIndex> {
        self.node_indices().collect()
    }

    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_directed(node, Direction::Outgoing).collect()
    }

    fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_directed(node, Direction::Incoming).collect()
    }

    fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.contains_edge(from, to)
    }

    fn node_count(&self) -> usize {
        DiGraph::node_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphView;
    use petgraph::graph::DiGraph;
    use petgraph::graphmap::DiGraphMap;

    #[test]
    fn test_graphmap_view_keeps_insertion_order() {
        let mut graph = DiGraphMap::<u32, ()>::new();
        graph.add_node(7);
        graph.add_node(3);
        graph.add_edge(3, 7, ());
        graph.add_node(5);

        assert_eq!(GraphView::nodes(&graph), vec![7, 3, 5]);
        assert_eq!(GraphView::successors(&graph, 3), vec![7]);
        assert_eq!(GraphView::predecessors(&graph, 7), vec![3]);
        assert!(GraphView::has_edge(&graph, 3, 7));
        assert!(!GraphView::has_edge(&graph, 7, 3));
    }

    #[test]
    fn test_digraph_view_reports_parallel_edges() {
        let mut graph = DiGraph::<&str, ()>::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b, ());
        graph.add_edge(a, b, ());

        assert_eq!(GraphView::node_count(&graph), 2);
        assert_eq!(GraphView::successors(&graph, a), vec![b, b]);
        assert_eq!(GraphView::predecessors(&graph, b).len(), 2);
        assert!(GraphView::has_edge(&graph, a, b));
    }
}
