//! Analysis of a repository's release history

pub mod release_stats;

pub use release_stats::{LeadTime, ReleaseStats, ReleaseStatsAnalyzer, VersionGroup};
