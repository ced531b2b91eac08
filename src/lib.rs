//! Three-way partitioning of directed connectomes for power-aware
//! electro-optical hardware.
//!
//! The core splits a directed graph into an independent pair of clusters
//! (`I1`, `I2`) that do not talk to each other, except through recorded
//! exception edges, and an interconnected remainder (`A`, `B`). Candidate
//! partitions are ranked by size or by estimated power saving.
//!
//! ```
//! use connectome_partition::find_clusters;
//! use petgraph::graphmap::DiGraphMap;
//!
//! let graph = DiGraphMap::<u32, ()>::from_edges(&[(0, 1), (1, 0), (2, 3)]);
//! let (selected, info) = find_clusters(&graph, "size", "max", true)?.into_parts();
//! assert_eq!(selected.len(), info.size);
//! # Ok::<(), connectome_partition::ClusterError>(())
//! ```

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod storage;

pub use cluster::{
    Candidate, ClusterInfo, ClusterPartitioner, ClusterSelector, Clustering, ConnectivityAnalyzer,
    Criterion, ExceptionEdge, Label, Parameter, Partition, ScoringEngine, Selection,
};
pub use config::Config;
pub use error::{ClusterError, ClusterResult};
pub use graph::GraphView;

/// Find the best cluster pair of `graph` with the default configuration.
///
/// See [`ClusterSelector::find_clusters`] for the meaning of the arguments.
pub fn find_clusters<G: GraphView>(
    graph: &G,
    criterion: &str,
    parameter: &str,
    exclude_inter: bool,
) -> ClusterResult<Clustering<G::NodeId>> {
    ClusterSelector::new(graph, Config::default()).find_clusters(criterion, parameter, exclude_inter)
}
