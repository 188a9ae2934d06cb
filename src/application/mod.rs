// Application layer - Snapshot synthesis pipeline and refresh scheduling
pub mod clock;
pub mod composer;
pub mod publication;
pub mod sample_generator;
pub mod sample_source;
pub mod scheduler;
pub mod snapshot_engine;
pub mod statistics;
