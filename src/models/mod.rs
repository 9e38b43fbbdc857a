//! # Data Model
//!
//! Records as the store returns them, the typed candidates derived from them,
//! nutrient sets from either provider and the batch outcome.

pub mod candidate;
pub mod nutrients;
pub mod outcome;
pub mod record;

pub use candidate::{MigrationCandidate, RecordId};
pub use nutrients::{NutrientSet, Provenance, ServingBasis};
pub use outcome::BatchOutcome;
pub use record::{NutrientPatch, StoredRecord};
