//! In-memory TTL caching for schedule data.
//!
//! The cache side of the offline-first core:
//! - A generic [`TtlCache`] with per-entry expiry and lazy read-time eviction
//! - A [`CacheRegistry`] producing preconfigured caches per data domain

mod registry;
mod ttl;

pub use registry::CacheRegistry;
pub use ttl::TtlCache;
