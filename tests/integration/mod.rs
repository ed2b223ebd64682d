//! Integration test modules for meterbridge
//!
//! - engine: Lifecycle, configuration, snapshot delivery
//! - metering: Per-chunk measurements against known signals
//! - chunking: Chunk-size invariance of the pipeline

pub mod chunking;
pub mod metering;
