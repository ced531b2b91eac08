//! Configuration management for the connectome partitioner

/// Knobs controlling how candidate partitions are built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of grow-and-prune passes per seed pair
    pub max_growth_passes: usize,

    /// Move leftover interconnected nodes into an independent cluster when
    /// doing so adds no edge between the independent clusters
    pub absorb_residual: bool,

    /// Drop every node that would only be admitted through the exception rule
    pub strict_independence: bool,

    /// Discard candidates in which either independent cluster is empty
    pub require_both_nonempty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_growth_passes: 16,
            absorb_residual: true,
            strict_independence: false,
            require_both_nonempty: true,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        max_growth_passes: usize,
        absorb_residual: bool,
        strict_independence: bool,
        require_both_nonempty: bool,
    ) -> Self {
        Self {
            max_growth_passes,
            absorb_residual,
            strict_independence,
            require_both_nonempty,
        }
    }
}
