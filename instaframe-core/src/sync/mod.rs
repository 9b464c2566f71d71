//! Display-side synchronization state

pub mod freshness;

pub use freshness::{FreshnessRecord, Verdict};
