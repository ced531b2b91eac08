//! Connectome loading and preprocessing

pub mod adjacency;
pub mod preprocessing;

pub use adjacency::{load_adjacency_list, parse_adjacency_list};
