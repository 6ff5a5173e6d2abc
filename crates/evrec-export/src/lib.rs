//! Interchange export for evrec events.
//!
//! [`GraphExporter`] turns a finished [`Event`](evrec_record::Event) into
//! an [`ExternalEvent`]: a flat particle list plus the interaction
//! vertices connecting them, with colour lines replaced by integer flow
//! ids. The exported view is plain data and can be handed to any
//! record-stream writer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod convert;
pub mod error;
mod format;
pub mod types;

pub use config::{EnergyUnit, ExportConfig, LengthUnit, MIN_COLOUR_FLOW_OFFSET};
pub use convert::{convert, GraphExporter};
pub use error::ExportError;
pub use types::{
    ExternalEvent, ExternalParticle, ExternalVertex, ParticleStatus, ANTI_COLOUR_INDEX,
    COLOUR_INDEX,
};
