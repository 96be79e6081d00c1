//! Domain models for matching audit results.
//!
//! - `Record`: one evaluated case produced by the matcher
//! - `Batch`: an ordered run of records
//! - `Tier`: the categorical result labels

pub mod error;
pub mod record;

pub use error::{AuditError, Result};
pub use record::{normalize_tier, Batch, Record, Tier};
