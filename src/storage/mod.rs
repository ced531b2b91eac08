//! Results persistence module

use anyhow::{Context, Result};
use crate::cluster::Clustering;
use crate::graph::CompressedGraph;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use serde_json::{json, to_string_pretty, Value};

/// Save a clustering of `graph` to the specified directory
pub fn save_results(
    clustering: &Clustering<u32>,
    graph: &CompressedGraph,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving results to {}", output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("could not create {}", output_dir))?;

    write_json(&Path::new(output_dir).join("summary.json"), &summary_json(clustering, graph))?;
    write_json(&Path::new(output_dir).join("partition.json"), &partition_json(clustering, graph))?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Selected clusters and their metadata, with neuron names resolved
pub fn summary_json(clustering: &Clustering<u32>, graph: &CompressedGraph) -> Value {
    let info = &clustering.info;

    json!({
        "graph_stats": {
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
        },
        "criterion": info.criterion,
        "parameter": info.parameter,
        "selection": info.selection,
        "seeds": info.seeds.map(|(first, second)| [graph.node_name(first), graph.node_name(second)]),
        "clusters": [neuron_names(graph, &clustering.groups.0), neuron_names(graph, &clustering.groups.1)],
        "size": info.size,
        "score": info.score,
        "power_saving": info.power_saving,
        "cluster_sizes": info.cluster_sizes,
        "exception_count": info.exception_count,
        "collapsed": info.collapsed,
        "alternatives": info.alternatives.iter().map(|alt| {
            json!({
                "seeds": alt.seeds.map(|(first, second)| [graph.node_name(first), graph.node_name(second)]),
                "selection": alt.selection,
                "size": alt.size,
                "score": alt.score,
                "power_saving": alt.power_saving,
                "exception_count": alt.exception_count,
            })
        }).collect::<Vec<_>>(),
    })
}

/// Label of every neuron plus the exception edges of the winning partition
pub fn partition_json(clustering: &Clustering<u32>, graph: &CompressedGraph) -> Value {
    let labels: serde_json::Map<String, Value> = clustering
        .partition
        .iter()
        .map(|(node, label)| (graph.node_name(node).to_string(), json!(label)))
        .collect();

    let exceptions: Vec<Value> = clustering
        .exceptions
        .iter()
        .map(|edge| {
            json!({
                "source": graph.node_name(edge.source),
                "target": graph.node_name(edge.target),
            })
        })
        .collect();

    json!({
        "labels": labels,
        "exceptions": exceptions,
    })
}

fn neuron_names<'g>(graph: &'g CompressedGraph, nodes: &[u32]) -> Vec<&'g str> {
    nodes.iter().map(|&id| graph.node_name(id)).collect()
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("could not create {}", path.display()))?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}
