//! Preconfigured caches for each data domain.

use crate::config::CacheTtls;

use super::ttl::TtlCache;

/// Factory producing the per-domain caches with their configured TTLs.
///
/// Every call yields a fresh cache — keeping one instance alive for the app's
/// lifetime is the composition root's job, not this factory's. The default
/// lifetimes reflect how volatile each domain is: faculties are reference
/// data and cheap to recheck rarely, lesson timetables barely move within a
/// term, exam schedules shift close to the session.
pub struct CacheRegistry {
  ttls: CacheTtls,
}

impl CacheRegistry {
  pub fn new(ttls: CacheTtls) -> Self {
    Self { ttls }
  }

  /// Cache for faculty lists. Default TTL: 10 minutes.
  pub fn faculties_cache<T: Clone>(&self) -> TtlCache<String, Vec<T>> {
    TtlCache::new(self.ttls.faculties())
  }

  /// Cache for group lists, keyed by faculty code. Default TTL: 5 minutes.
  pub fn groups_cache<T: Clone>(&self) -> TtlCache<String, Vec<T>> {
    TtlCache::new(self.ttls.groups())
  }

  /// Cache for lesson sets, keyed by group. Default TTL: 60 minutes.
  pub fn lessons_cache<T: Clone>(&self) -> TtlCache<String, Vec<T>> {
    TtlCache::new(self.ttls.lessons())
  }

  /// Cache for exam lists, keyed by group. Default TTL: 30 minutes.
  pub fn exams_cache<T: Clone>(&self) -> TtlCache<String, Vec<T>> {
    TtlCache::new(self.ttls.exams())
  }
}

impl Default for CacheRegistry {
  fn default() -> Self {
    Self::new(CacheTtls::default())
  }
}
