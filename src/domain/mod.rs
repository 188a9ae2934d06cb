// Domain layer - Metric records, snapshots and engine errors
pub mod error;
pub mod metrics;
pub mod snapshot;
