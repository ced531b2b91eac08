//! Candidate scoring and the power-saving model

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cluster::{Candidate, CandidateSummary, Label};
use crate::error::{ClusterError, ClusterResult};

/// Metric used to rank candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Number of selected nodes
    Size,
    /// Estimated power saving of the partition
    Power,
}

impl FromStr for Criterion {
    type Err = ClusterError;

    fn from_str(token: &str) -> ClusterResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "size" => Ok(Criterion::Size),
            "power" => Ok(Criterion::Power),
            _ => Err(ClusterError::unknown_criterion(token)),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Size => f.write_str("size"),
            Criterion::Power => f.write_str("power"),
        }
    }
}

/// Optimization direction applied to the criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Max,
    Min,
    /// Keep every selection scoring strictly above the threshold; the best wins
    Above(f64),
}

impl FromStr for Parameter {
    type Err = ClusterError;

    fn from_str(token: &str) -> ClusterResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Parameter::Max),
            "min" => Ok(Parameter::Min),
            other => match other.parse::<f64>() {
                Ok(threshold) if threshold.is_finite() => Ok(Parameter::Above(threshold)),
                _ => Err(ClusterError::unknown_parameter(token)),
            },
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Max => f.write_str("max"),
            Parameter::Min => f.write_str("min"),
            Parameter::Above(threshold) => write!(f, "above {threshold}"),
        }
    }
}

/// Which pair of clusters a result hands back to the caller.
///
/// Ordered by preference: on equal scores the independent pair wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// `I1` and `I2`
    Independent,
    /// `A` and `B`
    Interconnected,
}

impl Selection {
    pub fn labels(self) -> (Label, Label) {
        match self {
            Selection::Independent => (Label::I1, Label::I2),
            Selection::Interconnected => (Label::A, Label::B),
        }
    }
}

/// Percentage of optical link area saved by a partition.
///
/// Unclustered, every neuron links to every neuron: `n²`. After clustering,
/// each independent cluster links to itself and to the interconnected group,
/// the interconnected group links to everything, and every exception edge
/// costs one extra link:
///
/// ```text
/// after = r(r + g) + b(b + g) + n·g + e,   g = n - r - b
/// ```
///
/// This reduces to `n² - 2rb + e`, so the saving grows with both independent
/// clusters, shrinks with every exception, and peaks at 50% for an even split.
pub fn power_saving(node_count: usize, first: usize, second: usize, exceptions: usize) -> f64 {
    if node_count == 0 {
        return 0.0;
    }

    let n = node_count as f64;
    let r = first as f64;
    let b = second as f64;
    let g = n - r - b;

    let before = n * n;
    let after = r * (r + g) + b * (b + g) + n * g + exceptions as f64;

    (100.0 * (1.0 - after / before)).max(0.0)
}

/// A candidate scored under one criterion for one selection
#[derive(Debug, Clone)]
pub struct CandidateResult<'c, N: Eq + Hash> {
    pub candidate: &'c Candidate<N>,
    pub selection: Selection,
    pub criterion: Criterion,
    pub parameter: Parameter,
    pub score: f64,
    pub power_saving: f64,

    /// Selected clusters, each in node order
    pub groups: (Vec<N>, Vec<N>),

    // Tie-break keys
    sorted_nodes: Vec<N>,
    sorted_first: Vec<N>,
    order: usize,
}

impl<'c, N: Copy + Ord + Hash + fmt::Debug> CandidateResult<'c, N> {
    pub fn size(&self) -> usize {
        self.sorted_nodes.len()
    }

    pub fn exception_count(&self) -> usize {
        self.candidate.exceptions.len()
    }

    pub fn summary(&self) -> CandidateSummary<N> {
        CandidateSummary {
            seeds: self.candidate.seeds,
            selection: self.selection,
            size: self.size(),
            power_saving: self.power_saving,
            score: self.score,
            exception_count: self.exception_count(),
        }
    }
}

/// Scores candidates under a criterion and orders them by a direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    criterion: Criterion,
    parameter: Parameter,
}

impl ScoringEngine {
    pub fn new(criterion: Criterion, parameter: Parameter) -> Self {
        Self { criterion, parameter }
    }

    /// Parse criterion and parameter tokens
    pub fn from_tokens(criterion: &str, parameter: &str) -> ClusterResult<Self> {
        Ok(Self::new(criterion.parse()?, parameter.parse()?))
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    /// Score of one selection of a candidate
    pub fn score<N>(&self, candidate: &Candidate<N>, selection: Selection) -> f64
    where
        N: Copy + Eq + Hash + fmt::Debug,
    {
        match self.criterion {
            Criterion::Size => {
                let (first, second) = selection.labels();
                (candidate.partition.count(first) + candidate.partition.count(second)) as f64
            }
            Criterion::Power => candidate_power_saving(candidate),
        }
    }

    /// Score a candidate. `order` is its position in the candidate list and
    /// only breaks otherwise perfect ties.
    pub fn evaluate<'c, N>(
        &self,
        candidate: &'c Candidate<N>,
        selection: Selection,
        order: usize,
    ) -> CandidateResult<'c, N>
    where
        N: Copy + Ord + Hash + fmt::Debug,
    {
        let (first_label, second_label) = selection.labels();
        let first = candidate.partition.members(first_label);
        let second = candidate.partition.members(second_label);

        let sorted_first: Vec<N> = first.iter().copied().sorted().collect();
        let sorted_nodes: Vec<N> = first.iter().chain(&second).copied().sorted().collect();

        CandidateResult {
            candidate,
            selection,
            criterion: self.criterion,
            parameter: self.parameter,
            score: self.score(candidate, selection),
            power_saving: candidate_power_saving(candidate),
            groups: (first, second),
            sorted_nodes,
            sorted_first,
            order,
        }
    }

    /// Whether a result passes the threshold, if the parameter sets one
    pub fn qualifies<N: Eq + Hash>(&self, result: &CandidateResult<'_, N>) -> bool {
        match self.parameter {
            Parameter::Above(threshold) => result.score > threshold,
            Parameter::Max | Parameter::Min => true,
        }
    }

    /// Order two results, best first. Equal scores fall back to the
    /// independent selection, then fewer exception edges, then the smaller
    /// selected node set, then the smaller first group, then candidate order.
    pub fn compare<N>(&self, a: &CandidateResult<'_, N>, b: &CandidateResult<'_, N>) -> Ordering
    where
        N: Copy + Ord + Hash + fmt::Debug,
    {
        let by_score = match self.parameter {
            Parameter::Min => a.score.total_cmp(&b.score),
            Parameter::Max | Parameter::Above(_) => b.score.total_cmp(&a.score),
        };

        by_score
            .then_with(|| a.selection.cmp(&b.selection))
            .then_with(|| a.exception_count().cmp(&b.exception_count()))
            .then_with(|| a.sorted_nodes.cmp(&b.sorted_nodes))
            .then_with(|| a.sorted_first.cmp(&b.sorted_first))
            .then_with(|| a.order.cmp(&b.order))
    }

    /// Sort results best first
    pub fn rank<N>(&self, results: &mut [CandidateResult<'_, N>])
    where
        N: Copy + Ord + Hash + fmt::Debug,
    {
        results.sort_by(|a, b| self.compare(a, b));
    }
}

fn candidate_power_saving<N>(candidate: &Candidate<N>) -> f64
where
    N: Copy + Eq + Hash + fmt::Debug,
{
    let sizes = candidate.sizes();
    power_saving(
        candidate.partition.len(),
        sizes.i1,
        sizes.i2,
        candidate.exceptions.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::{power_saving, Criterion, Parameter, ScoringEngine, Selection};
    use crate::cluster::{Candidate, ExceptionEdge, Label, Partition};
    use crate::error::ClusterError;
    use approx::assert_ulps_eq;
    use std::cmp::Ordering;

    fn candidate(labels: &[Label], exceptions: Vec<ExceptionEdge<u32>>) -> Candidate<u32> {
        let nodes = (0..labels.len() as u32).collect();
        Candidate {
            seeds: None,
            partition: Partition::new(nodes, labels.to_vec()).unwrap(),
            exceptions,
            collapsed: false,
        }
    }

    #[test]
    fn test_power_saving_matches_link_area_model() {
        // Arrange: 10 neurons, R = 3, B = 4, G = 3
        // after = 3 * 6 + 4 * 7 + 10 * 3 = 76, before = 100

        // Act
        let saving = power_saving(10, 3, 4, 0);

        // Assert
        assert_ulps_eq!(saving, 24.0);
    }

    #[test]
    fn test_power_saving_is_monotonic() {
        assert_ulps_eq!(power_saving(4, 2, 2, 0), 50.0);
        assert!(power_saving(10, 3, 3, 0) < power_saving(10, 4, 3, 0));
        assert!(power_saving(10, 4, 3, 2) < power_saving(10, 4, 3, 1));
        assert_ulps_eq!(power_saving(10, 5, 0, 0), 0.0);
        assert_ulps_eq!(power_saving(0, 0, 0, 0), 0.0);
        assert_ulps_eq!(power_saving(3, 1, 1, 50), 0.0);
    }

    #[test]
    fn test_tokens_parse() {
        assert_eq!("size".parse::<Criterion>().unwrap(), Criterion::Size);
        assert_eq!(" Power ".parse::<Criterion>().unwrap(), Criterion::Power);
        assert_eq!("max".parse::<Parameter>().unwrap(), Parameter::Max);
        assert_eq!("MIN".parse::<Parameter>().unwrap(), Parameter::Min);
        assert_eq!("23".parse::<Parameter>().unwrap(), Parameter::Above(23.0));
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        assert!(matches!(
            "speed".parse::<Criterion>(),
            Err(ClusterError::UnknownCriterion { kind: "criterion", .. })
        ));
        assert!(matches!(
            "best".parse::<Parameter>(),
            Err(ClusterError::UnknownCriterion { kind: "parameter", .. })
        ));
        assert!(ScoringEngine::from_tokens("power", "NaN").is_err());
    }

    #[test]
    fn test_scores_per_criterion_and_selection() {
        use Label::*;
        let candidate = candidate(&[I1, I1, I2, A, B, B], vec![]);
        let size = ScoringEngine::new(Criterion::Size, Parameter::Max);
        let power = ScoringEngine::new(Criterion::Power, Parameter::Max);

        assert_ulps_eq!(size.score(&candidate, Selection::Independent), 3.0);
        assert_ulps_eq!(size.score(&candidate, Selection::Interconnected), 3.0);
        assert_ulps_eq!(power.score(&candidate, Selection::Independent), power_saving(6, 2, 1, 0));
    }

    #[test]
    fn test_power_tie_prefers_independent_selection() {
        // Arrange: both selections of one candidate share its power saving,
        // and the interconnected pair holds the lower node ids
        use Label::*;
        let candidate = candidate(&[A, I1, I1, I2, B], vec![]);
        let engine = ScoringEngine::new(Criterion::Power, Parameter::Max);

        // Act
        let mut results = vec![
            engine.evaluate(&candidate, Selection::Interconnected, 0),
            engine.evaluate(&candidate, Selection::Independent, 0),
        ];
        engine.rank(&mut results);

        // Assert
        assert_ulps_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].selection, Selection::Independent);
        assert_eq!(results[0].groups, (vec![1, 2], vec![3]));
    }

    #[test]
    fn test_ties_prefer_fewer_exceptions() {
        use Label::*;
        let clean = candidate(&[I1, I2, I1, I2], vec![]);
        let noisy = candidate(&[I1, I2, I1, I2], vec![ExceptionEdge { source: 0, target: 1 }]);
        let engine = ScoringEngine::new(Criterion::Size, Parameter::Max);

        let a = engine.evaluate(&noisy, Selection::Independent, 0);
        let b = engine.evaluate(&clean, Selection::Independent, 1);

        assert_eq!(engine.compare(&a, &b), Ordering::Greater);
        assert_eq!(engine.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_ties_then_prefer_smaller_node_set() {
        use Label::*;
        let low = candidate(&[I1, I2, A, A], vec![]);
        let high = candidate(&[A, A, I1, I2], vec![]);
        let engine = ScoringEngine::new(Criterion::Size, Parameter::Min);

        let mut results = vec![
            engine.evaluate(&high, Selection::Independent, 0),
            engine.evaluate(&low, Selection::Independent, 1),
        ];
        engine.rank(&mut results);

        assert_eq!(results[0].groups, (vec![0], vec![1]));
    }

    #[test]
    fn test_direction_flips_ranking() {
        use Label::*;
        let big = candidate(&[I1, I1, I2, I2], vec![]);
        let small = candidate(&[I1, A, I2, A], vec![]);
        let max = ScoringEngine::new(Criterion::Power, Parameter::Max);
        let min = ScoringEngine::new(Criterion::Power, Parameter::Min);

        let (a, b) = (
            max.evaluate(&big, Selection::Independent, 0),
            max.evaluate(&small, Selection::Independent, 1),
        );
        assert_eq!(max.compare(&a, &b), Ordering::Less);

        let (a, b) = (
            min.evaluate(&big, Selection::Independent, 0),
            min.evaluate(&small, Selection::Independent, 1),
        );
        assert_eq!(min.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_threshold_qualification() {
        use Label::*;
        let candidate = candidate(&[I1, I1, I2, I2], vec![]);
        let above_40 = ScoringEngine::new(Criterion::Power, Parameter::Above(40.0));
        let above_50 = ScoringEngine::new(Criterion::Power, Parameter::Above(50.0));

        assert!(above_40.qualifies(&above_40.evaluate(&candidate, Selection::Independent, 0)));
        assert!(!above_50.qualifies(&above_50.evaluate(&candidate, Selection::Independent, 0)));
    }
}
