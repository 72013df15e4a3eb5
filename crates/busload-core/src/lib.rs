//! Core domain models for the bus-seat-occupancy push relay.
//!
//! Provides the canonical push record, the schema-tolerant payload
//! normalizer, the error taxonomy, and the persistence adapter talking to
//! the managed document store. The API and notification crates build on
//! these foundations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod normalize;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{
    BusOccupancyUpdate, CanonicalPush, DetectionSummary, GeoLocation, RecordId, StoredRecord,
};
pub use normalize::normalize_push;
