//! Benchmark profiles for the evrec event record.
//!
//! - [`reference_profile`]: a few hundred particles over four steps
//! - [`stress_profile`]: several thousand particles over eight steps
//!
//! Both are seeded random cascades, so a given seed always benchmarks the
//! same event.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use evrec_record::Event;
use evrec_test_utils::cascade::{random_cascade, CascadeConfig};

/// Moderate cascade: 4 steps of 24 operations, up to 3 children each.
pub fn reference_profile(seed: u64) -> Event {
    random_cascade(&CascadeConfig {
        seed,
        steps: 4,
        operations_per_step: 24,
        max_children: 3,
    })
}

/// Large cascade: 8 steps of 256 operations, up to 4 children each.
pub fn stress_profile(seed: u64) -> Event {
    random_cascade(&CascadeConfig {
        seed,
        steps: 8,
        operations_per_step: 256,
        max_children: 4,
    })
}
