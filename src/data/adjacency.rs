//! Plain-text adjacency list loader
//!
//! One line per presynaptic neuron: the neuron name followed by the names of
//! its postsynaptic targets, separated by whitespace. Blank lines and lines
//! starting with `#` or `%` are skipped. A target repeated on a line adds a
//! parallel edge.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::{CompressedGraph, GraphBuilder};

/// Load a connectome from an adjacency list file
pub fn load_adjacency_list<P: AsRef<Path>>(path: P) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading adjacency list: {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("could not open {}", path.display()))?;

    parse_adjacency_list(BufReader::new(file))
        .with_context(|| format!("could not parse {}", path.display()))
}

/// Parse a connectome from any buffered reader
pub fn parse_adjacency_list<R: BufRead>(reader: R) -> Result<CompressedGraph> {
    let mut builder = GraphBuilder::with_capacity(1024);
    let mut synapses = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("could not read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(src) = parts.next() else {
            continue;
        };

        builder.get_or_create_node(src);
        for dst in parts {
            builder.add_edge(src, dst);
            synapses += 1;
        }
    }

    log::info!(
        "Loaded {} neurons and {} synapses",
        builder.node_count(),
        synapses
    );

    Ok(builder.build())
}
