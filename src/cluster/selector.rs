//! Top-level cluster selection

use std::collections::BTreeSet;

use crate::cluster::scoring::CandidateResult;
use crate::cluster::{
    Candidate, ClusterInfo, ClusterPartitioner, Clustering, Parameter, ScoringEngine, Selection,
};
use crate::config::Config;
use crate::error::{ClusterError, ClusterResult};
use crate::graph::GraphView;

/// Runs the partitioner, scores every candidate and returns the winner
pub struct ClusterSelector<'g, G> {
    graph: &'g G,
    config: Config,
}

impl<'g, G: GraphView> ClusterSelector<'g, G> {
    pub fn new(graph: &'g G, config: Config) -> Self {
        Self { graph, config }
    }

    /// Find the best cluster pair under `criterion` (`size` or `power`) and
    /// `parameter` (`max`, `min`, or a numeric threshold).
    ///
    /// With `exclude_inter` set only the independent pair can be selected;
    /// otherwise the interconnected pair competes as well.
    pub fn find_clusters(
        &self,
        criterion: &str,
        parameter: &str,
        exclude_inter: bool,
    ) -> ClusterResult<Clustering<G::NodeId>> {
        // Reject bad tokens before doing any work
        let engine = ScoringEngine::from_tokens(criterion, parameter)?;
        self.select(&engine, exclude_inter)
    }

    /// Same as [`find_clusters`](Self::find_clusters) with a prepared engine
    pub fn select(
        &self,
        engine: &ScoringEngine,
        exclude_inter: bool,
    ) -> ClusterResult<Clustering<G::NodeId>> {
        log::info!(
            "Selecting clusters by {} ({}), exclude_inter = {}",
            engine.criterion(),
            engine.parameter(),
            exclude_inter
        );

        let partitioner = ClusterPartitioner::new(self.graph, self.config.clone())?;
        let candidates = partitioner.candidates()?;

        let mut results: Vec<CandidateResult<'_, G::NodeId>> = candidates
            .iter()
            .enumerate()
            .flat_map(|(order, candidate)| {
                eligible_selections(candidate, exclude_inter)
                    .into_iter()
                    .map(move |selection| engine.evaluate(candidate, selection, order))
            })
            .filter(|result| engine.qualifies(result))
            .collect();

        engine.rank(&mut results);

        let alternatives = match engine.parameter() {
            Parameter::Above(_) => results.iter().map(CandidateResult::summary).collect(),
            Parameter::Max | Parameter::Min => Vec::new(),
        };

        let winner = results.into_iter().next().ok_or_else(|| {
            ClusterError::no_valid_partition(format!(
                "no selection scored {} by {}",
                engine.parameter(),
                engine.criterion()
            ))
        })?;

        log::info!(
            "Selected {:?} pair of {} nodes, score {:.2}, power saving {:.2}%, {} exception edges",
            winner.selection,
            winner.size(),
            winner.score,
            winner.power_saving,
            winner.exception_count()
        );

        Ok(assemble(winner, alternatives))
    }
}

/// Selections a candidate can offer
fn eligible_selections<N>(candidate: &Candidate<N>, exclude_inter: bool) -> Vec<Selection>
where
    N: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    let mut selections = vec![Selection::Independent];
    if !exclude_inter && candidate.sizes().interconnected() > 0 {
        selections.push(Selection::Interconnected);
    }
    selections
}

fn assemble<N>(
    winner: CandidateResult<'_, N>,
    alternatives: Vec<crate::cluster::CandidateSummary<N>>,
) -> Clustering<N>
where
    N: Copy + Ord + std::hash::Hash + std::fmt::Debug,
{
    let candidate = winner.candidate;
    let (first, second) = winner.groups.clone();

    let selected: Vec<N> = first.iter().chain(&second).copied().collect();
    let original_nodes: BTreeSet<N> = selected.iter().copied().collect();

    let info = ClusterInfo {
        size: selected.len(),
        original_nodes,
        power_saving: winner.power_saving,
        score: winner.score,
        criterion: winner.criterion,
        parameter: winner.parameter,
        selection: winner.selection,
        seeds: candidate.seeds,
        cluster_sizes: candidate.sizes(),
        exception_count: candidate.exceptions.len(),
        collapsed: candidate.collapsed,
        alternatives,
    };

    Clustering {
        selected,
        groups: (first, second),
        info,
        partition: candidate.partition.clone(),
        exceptions: candidate.exceptions.clone(),
    }
}
