//! Data preprocessing module for connectome analysis

use crate::graph::CompressedGraph;

/// Flip the direction of every synapse.
///
/// Connectome tables often list a neuron's inputs rather than its outputs;
/// reversing turns them into presynaptic -> postsynaptic edges.
pub fn reverse(graph: &CompressedGraph) -> CompressedGraph {
    let mut adjacency = vec![Vec::new(); graph.node_count];

    for (dst, list) in adjacency.iter_mut().enumerate() {
        list.extend_from_slice(graph.incoming_edges(dst));
    }

    CompressedGraph::from_adjacency(adjacency, graph.node_ids.clone())
}

/// Drop every edge from a neuron to itself
pub fn remove_self_loops(graph: &CompressedGraph) -> CompressedGraph {
    let mut removed = 0;
    let mut adjacency = Vec::with_capacity(graph.node_count);

    for node in 0..graph.node_count {
        let targets: Vec<u32> = graph
            .outgoing_edges(node)
            .iter()
            .copied()
            .filter(|&target| target as usize != node)
            .collect();
        removed += graph.out_degree(node) - targets.len();
        adjacency.push(targets);
    }

    if removed > 0 {
        log::info!("Removed {} self-loops", removed);
    }

    CompressedGraph::from_adjacency(adjacency, graph.node_ids.clone())
}
