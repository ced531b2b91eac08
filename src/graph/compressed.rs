//! Memory-efficient connectome representation

use std::mem;
use serde::{Serialize, Deserialize};

use crate::graph::GraphView;

/// Compressed sparse representation of a directed connectome.
///
/// Outgoing synapses are stored in CSR form and sorted per neuron so that
/// `has_edge` is a binary search. A reverse CSR index answers predecessor
/// queries without scanning the whole edge array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of neurons in the graph
    pub node_count: usize,

    /// Offset array: index where each node's outgoing edges begin
    /// offsets[i] to offsets[i+1] defines the edge range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated lists of target nodes
    pub edges: Vec<u32>,

    /// Offset array for the reverse (incoming) index
    pub reverse_offsets: Vec<u32>,

    /// Concatenated lists of source nodes, grouped by target
    pub reverse_edges: Vec<u32>,

    /// Mapping from internal node ids to neuron names
    pub node_ids: Vec<String>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count),
            reverse_offsets: Vec::with_capacity(node_count + 1),
            reverse_edges: Vec::with_capacity(edge_count),
            node_ids: Vec::with_capacity(node_count),
        }
    }

    /// Build a graph from per-node adjacency lists and names.
    ///
    /// Adjacency lists are sorted; parallel edges are kept.
    pub fn from_adjacency(mut adjacency: Vec<Vec<u32>>, node_ids: Vec<String>) -> Self {
        let node_count = adjacency.len();
        let edge_count: usize = adjacency.iter().map(|list| list.len()).sum();

        let mut graph = Self::with_capacity(node_count, edge_count);
        graph.node_ids = node_ids;

        // Forward index
        graph.offsets.push(0);
        let mut offset = 0;
        for list in &mut adjacency {
            list.sort_unstable();
            offset += list.len() as u32;
            graph.edges.extend_from_slice(list);
            graph.offsets.push(offset);
        }

        graph.rebuild_reverse_index();
        graph
    }

    /// Recompute the reverse index from the forward one
    pub fn rebuild_reverse_index(&mut self) {
        let mut in_degrees = vec![0u32; self.node_count];
        for &dst in &self.edges {
            in_degrees[dst as usize] += 1;
        }

        self.reverse_offsets.clear();
        self.reverse_offsets.push(0);
        let mut offset = 0;
        for &degree in &in_degrees {
            offset += degree;
            self.reverse_offsets.push(offset);
        }

        // Sources are visited in ascending order, so each bucket comes out sorted
        let mut current_pos = vec![0usize; self.node_count];
        let mut reverse_edges = vec![0; self.edges.len()];
        for src in 0..self.node_count {
            for &dst in self.outgoing_edges(src) {
                let dst_idx = dst as usize;
                let pos = self.reverse_offsets[dst_idx] as usize + current_pos[dst_idx];
                reverse_edges[pos] = src as u32;
                current_pos[dst_idx] += 1;
            }
        }
        self.reverse_edges = reverse_edges;
    }

    /// Get outgoing edges for a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get incoming edges for a node
    pub fn incoming_edges(&self, node: usize) -> &[u32] {
        let start = self.reverse_offsets[node] as usize;
        let end = self.reverse_offsets[node + 1] as usize;
        &self.reverse_edges[start..end]
    }

    /// Check if there's an edge from src to dst
    pub fn contains_edge(&self, src: usize, dst: u32) -> bool {
        let edges = self.outgoing_edges(src);
        edges.binary_search(&dst).is_ok()
    }

    /// Get out-degree of a node
    pub fn out_degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Get in-degree of a node
    pub fn in_degree(&self, node: usize) -> usize {
        let start = self.reverse_offsets[node] as usize;
        let end = self.reverse_offsets[node + 1] as usize;
        end - start
    }

    /// Total number of edges, parallel edges included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Neuron name for an internal id
    pub fn node_name(&self, node: u32) -> &str {
        self.node_ids
            .get(node as usize)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = (self.offsets.capacity() + self.reverse_offsets.capacity()) * mem::size_of::<u32>();
        let edges = (self.edges.capacity() + self.reverse_edges.capacity()) * mem::size_of::<u32>();
        let ids = self.node_ids.iter().map(|s| s.capacity()).sum::<usize>();

        base + offsets + edges + ids
    }
}

impl GraphView for CompressedGraph {
    type NodeId = u32;

    fn nodes(&self) -> Vec<u32> {
        (0..self.node_count as u32).collect()
    }

    fn successors(&self, node: u32) -> Vec<u32> {
        self.outgoing_edges(node as usize).to_vec()
    }

    fn predecessors(&self, node: u32) -> Vec<u32> {
        self.incoming_edges(node as usize).to_vec()
    }

    fn has_edge(&self, from: u32, to: u32) -> bool {
        self.contains_edge(from as usize, to)
    }

    fn node_count(&self) -> usize {
        self.node_count
    }
}
