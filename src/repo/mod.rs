//! Offline-first reconciliation between cache, remote source, and store.
//!
//! - [`ScheduleRepository`] orchestrates cache → remote → persisted-fallback
//! - [`ScheduleStore`] / [`RemoteSource`] are the narrow collaborator seams
//! - [`DataOutcome`] tells callers where data came from and whether it is
//!   stale, so degraded reads are values rather than exceptions

mod outcome;
mod repository;
mod traits;

pub use outcome::{DataOutcome, DataSource};
pub use repository::ScheduleRepository;
pub use traits::{MemoryStore, RemoteSource, ScheduleStore};
