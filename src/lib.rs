//! Offline-first data core for a university timetable client.
//!
//! The crate answers "what is happening now and next" under two sources of
//! ambiguity: a remote API that may be unreachable, and a bi-weekly
//! (odd/even) class schedule that repeats with exceptions. It provides:
//!
//! - [`cache::TtlCache`] — generic key-value cache with per-entry expiry and
//!   serialized access per instance
//! - [`cache::CacheRegistry`] — preconfigured caches per data domain
//! - [`schedule::ScheduleEngine`] — pure "next lesson" / "lessons for date" /
//!   "week view" queries over recurring lesson records
//! - [`schedule::WeekReference`] — odd/even week parity from a fixed epoch
//! - [`repo::ScheduleRepository`] — cache → remote → persisted-fallback
//!   reconciliation
//!
//! UI, persistence engines, and HTTP transport stay outside: the repository
//! reaches them only through the [`repo::ScheduleStore`] and
//! [`repo::RemoteSource`] seams, so the whole core runs against in-memory
//! doubles.

pub mod cache;
pub mod config;
pub mod error;
pub mod repo;
pub mod schedule;

pub use config::{CacheTtls, Config};
pub use error::{ConfigError, FetchError, RepoError, StoreError};
