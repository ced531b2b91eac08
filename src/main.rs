use anyhow::Result;
use clap::Parser;

use connectome_partition::cluster::ClusterSelector;
use connectome_partition::config::Config;
use connectome_partition::data::{self, preprocessing};
use connectome_partition::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "connectome-partition",
    about = "Three-way partitioning of directed connectomes for power-aware optical hardware"
)]
struct Cli {
    /// Path to the adjacency list (one line per neuron: name followed by its targets)
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: String,

    /// Ranking criterion: "size" or "power"
    #[clap(long, default_value = "power")]
    criterion: String,

    /// Direction: "max", "min", or a threshold N keeping every solution scoring above N
    #[clap(long, default_value = "max")]
    parameter: String,

    /// Only the independent pair may be selected
    #[clap(long)]
    exclude_inter: bool,

    /// Reverse every edge after loading (for tables listing a neuron's inputs)
    #[clap(long)]
    reverse: bool,

    /// Keep self-loops instead of dropping them
    #[clap(long)]
    keep_self_loops: bool,

    /// Maximum grow-and-prune passes per seed pair
    #[clap(long, default_value = "16")]
    max_growth_passes: usize,

    /// Drop nodes that would need an exception edge
    #[clap(long)]
    strict: bool,

    /// Do not absorb leftover interconnected nodes into the independent pair
    #[clap(long)]
    no_absorb: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Starting connectome partitioning");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // 1. Load data
    let mut graph = data::load_adjacency_list(&args.input)?;

    if args.reverse {
        graph = preprocessing::reverse(&graph);
    }
    if !args.keep_self_loops {
        graph = preprocessing::remove_self_loops(&graph);
    }

    log::info!(
        "Connectome has {} neurons and {} synapses ({:.1} KiB)",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage() as f64 / 1024.0
    );

    // 2. Find clusters
    let config = Config::new(
        args.max_growth_passes,
        !args.no_absorb,
        args.strict,
        true,
    );
    let clustering = ClusterSelector::new(&graph, config)
        .find_clusters(&args.criterion, &args.parameter, args.exclude_inter)?;

    let info = &clustering.info;
    log::info!(
        "Selected {} neurons ({} + {}), power saving {:.2}%",
        info.size,
        clustering.groups.0.len(),
        clustering.groups.1.len(),
        info.power_saving
    );
    if info.collapsed {
        log::warn!("No independent split exists; every neuron is interconnected");
    }
    if info.exception_count > 0 {
        log::info!("{} exception edges between the independent clusters", info.exception_count);
    }

    // 3. Save results
    storage::save_results(&clustering, &graph, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
