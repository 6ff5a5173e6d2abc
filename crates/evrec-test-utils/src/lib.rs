//! Test utilities for evrec development.
//!
//! - [`species`]: a small table of Standard Model species.
//! - [`fixtures`]: hand-built events with known topology.
//! - [`cascade`]: seeded random decay cascades for property tests and
//!   benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cascade;
pub mod fixtures;
pub mod species;
