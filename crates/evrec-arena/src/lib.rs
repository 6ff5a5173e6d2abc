//! Generational slot arenas for evrec event storage.
//!
//! An event owns one arena per object kind. Objects reference each other
//! through typed handles ([`evrec_core::ArenaKey`]) rather than pointers,
//! which keeps the cyclic particle graph free of ownership cycles.
//!
//! # Architecture
//!
//! ```text
//! Arena<K, T>
//! ├── Slot<T>[]   (generation + optional value)
//! └── free list   (vacated slot indices, LIFO reuse)
//! ```
//!
//! Removing an object bumps its slot's generation, so every outstanding
//! handle to it becomes stale and resolves to `None`. A reused slot never
//! resolves an old handle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;

pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
