//! Connectome construction module

use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing a CompressedGraph from named neurons
pub struct GraphBuilder {
    /// Mapping from neuron names to node indices
    id_to_index: HashMap<String, u32>,

    /// Neuron names, indexed by node id
    node_ids: Vec<String>,

    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Number of neurons registered so far
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Get or create a node ID for the given neuron name
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add a synapse from one neuron to another
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str) {
        let src_idx = self.get_or_create_node(src_id);
        let dst_idx = self.get_or_create_node(dst_id);

        self.adjacency_lists[src_idx as usize].push(dst_idx);
    }

    /// Build the compressed graph
    pub fn build(self) -> CompressedGraph {
        log::debug!(
            "Building connectome with {} neurons and {} synapses",
            self.node_ids.len(),
            self.adjacency_lists.iter().map(Vec::len).sum::<usize>()
        );

        CompressedGraph::from_adjacency(self.adjacency_lists, self.node_ids)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphBuilder;

    #[test]
    fn test_names_map_to_dense_ids_in_first_seen_order() {
        let mut builder = GraphBuilder::default();
        builder.add_edge("AVAL", "DA01");
        builder.add_edge("DA01", "AVAL");
        builder.get_or_create_node("PVCL");

        assert_eq!(builder.node_count(), 3);
        let graph = builder.build();
        assert_eq!(graph.node_ids, vec!["AVAL", "DA01", "PVCL"]);
        assert!(graph.contains_edge(0, 1));
        assert!(graph.contains_edge(1, 0));
        assert_eq!(graph.out_degree(2), 0);
    }
}
