//! # sync_adapters
//!
//! Converts each provider's raw event feed into `sync_core`'s canonical
//! [`sync_core::model::Event`]. A provider adapter owns exactly two
//! responsibilities: resolving provider ids onto catalogue ids, and
//! mapping provider-specific fields (coordinates, event-type names,
//! touch type) onto the canonical shape. None of the synchronization
//! logic lives here — `sync_core::synchronize` runs unmodified over
//! whatever an adapter produces.

pub mod datetime;
pub mod error;
pub mod id_map;
pub mod impect;
pub mod opta;
pub mod statsbomb;
pub mod wyscout;

pub use error::{AdapterError, Result};
