//! Reconciliation between the in-memory caches, the remote source, and the
//! persistent store.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, warn};

use crate::cache::{CacheRegistry, TtlCache};
use crate::error::{FetchError, RepoError, StoreError};
use crate::schedule::{Exam, Faculty, Group, LessonRecord, ScheduleEngine, WeekReference};

use super::outcome::DataOutcome;
use super::traits::{RemoteSource, ScheduleStore};

/// Cache key for the single faculties list.
const FACULTIES_KEY: &str = "faculties";

/// Offline-first repository over a remote source and a persistent store.
///
/// Read policy, identical for every domain:
/// 1. cache hit within TTL — served as-is;
/// 2. miss or expiry — remote fetch; success is persisted and re-cached;
/// 3. remote failure — last-known persisted data, flagged
///    [`DataSource::Offline`](super::DataSource::Offline);
/// 4. remote and store both failing is the only error surface.
///
/// The caches are plain owned values injected at construction; keeping the
/// repository alive for the app's lifetime (and therefore the caches) is the
/// composition root's concern. There is no global state.
pub struct ScheduleRepository<S, R> {
  store: S,
  remote: R,
  engine: ScheduleEngine,
  faculties_cache: TtlCache<String, Vec<Faculty>>,
  groups_cache: TtlCache<String, Vec<Group>>,
  lessons_cache: TtlCache<String, Vec<LessonRecord>>,
  exams_cache: TtlCache<String, Vec<Exam>>,
}

impl<S: ScheduleStore, R: RemoteSource> ScheduleRepository<S, R> {
  pub fn new(store: S, remote: R, registry: &CacheRegistry, weeks: WeekReference) -> Self {
    Self {
      store,
      remote,
      engine: ScheduleEngine::new(weeks),
      faculties_cache: registry.faculties_cache(),
      groups_cache: registry.groups_cache(),
      lessons_cache: registry.lessons_cache(),
      exams_cache: registry.exams_cache(),
    }
  }

  /// The pure time-query engine this repository feeds.
  pub fn engine(&self) -> &ScheduleEngine {
    &self.engine
  }

  /// All faculties.
  pub async fn faculties(&self) -> Result<DataOutcome<Vec<Faculty>>, RepoError> {
    reconcile(
      &self.faculties_cache,
      FACULTIES_KEY,
      self.remote.fetch_faculties(),
      || self.store.load_faculties(),
      |data| self.store.save_faculties(data),
    )
    .await
  }

  /// Groups of one faculty.
  pub async fn groups(&self, faculty_code: &str) -> Result<DataOutcome<Vec<Group>>, RepoError> {
    reconcile(
      &self.groups_cache,
      faculty_code,
      self.remote.fetch_groups(faculty_code),
      || self.store.load_groups(faculty_code),
      |data| self.store.save_groups(faculty_code, data),
    )
    .await
  }

  /// All recurring lessons of a group, both parities.
  pub async fn lessons(
    &self,
    group_key: &str,
  ) -> Result<DataOutcome<Vec<LessonRecord>>, RepoError> {
    reconcile(
      &self.lessons_cache,
      group_key,
      self.remote.fetch_lessons(group_key, None),
      || self.store.load_lessons(group_key),
      |data| self.store.save_lessons(group_key, data),
    )
    .await
  }

  /// Exams of a group.
  pub async fn exams(&self, group_key: &str) -> Result<DataOutcome<Vec<Exam>>, RepoError> {
    reconcile(
      &self.exams_cache,
      group_key,
      self.remote.fetch_exams(group_key),
      || self.store.load_exams(group_key),
      |data| self.store.save_exams(group_key, data),
    )
    .await
  }

  /// A group's lessons for one day of week (1 = Monday .. 6 = Saturday),
  /// ordered by start time.
  ///
  /// `is_odd_week` overrides the parity; `None` uses the current week's.
  pub async fn day_schedule(
    &self,
    group_key: &str,
    day_of_week: u8,
    is_odd_week: Option<bool>,
  ) -> Result<DataOutcome<Vec<LessonRecord>>, RepoError> {
    let outcome = self.lessons(group_key).await?;
    Ok(outcome.map(|lessons| {
      self
        .engine
        .lessons_for_day_of_week(&lessons, day_of_week, is_odd_week)
    }))
  }

  /// A group's week view starting at `start`, day-of-week to ordered lessons.
  pub async fn week_schedule(
    &self,
    group_key: &str,
    start: NaiveDate,
  ) -> Result<DataOutcome<BTreeMap<u8, Vec<LessonRecord>>>, RepoError> {
    let outcome = self.lessons(group_key).await?;
    Ok(outcome.map(|lessons| self.engine.week_schedule(&lessons, start)))
  }

  /// The group's next upcoming lesson, relative to now.
  pub async fn next_lesson(&self, group_key: &str) -> Result<Option<LessonRecord>, RepoError> {
    self
      .next_lesson_at(group_key, Local::now().naive_local())
      .await
  }

  /// The group's next lesson relative to an explicit instant.
  pub async fn next_lesson_at(
    &self,
    group_key: &str,
    now: NaiveDateTime,
  ) -> Result<Option<LessonRecord>, RepoError> {
    let outcome = self.lessons(group_key).await?;
    Ok(self.engine.next_lesson(&outcome.data, now))
  }

  /// Drop the cached lessons of one group and reconcile again, forcing a
  /// remote attempt.
  pub async fn refresh_lessons(
    &self,
    group_key: &str,
  ) -> Result<DataOutcome<Vec<LessonRecord>>, RepoError> {
    self.lessons_cache.invalidate(group_key);
    self.lessons(group_key).await
  }

  /// Drop every cached entry across all domains.
  ///
  /// Persistent data stays; wiping it belongs to the store's owner.
  pub fn invalidate_all(&self) {
    self.faculties_cache.clear();
    self.groups_cache.clear();
    self.lessons_cache.clear();
    self.exams_cache.clear();
  }
}

/// The cache → remote → persisted-fallback path shared by every domain.
///
/// The fetch future is only awaited on a cache miss; a caller that abandons
/// the returned future mid-fetch never reaches the `put`, so a cancelled
/// fetch cannot corrupt cache state.
async fn reconcile<T, Fut, L, P>(
  cache: &TtlCache<String, Vec<T>>,
  key: &str,
  fetch: Fut,
  load: L,
  persist: P,
) -> Result<DataOutcome<Vec<T>>, RepoError>
where
  T: Clone,
  Fut: Future<Output = Result<Vec<T>, FetchError>>,
  L: FnOnce() -> Result<Vec<T>, StoreError>,
  P: FnOnce(&[T]) -> Result<(), StoreError>,
{
  if let Some(cached) = cache.get(key) {
    debug!(key, "cache hit");
    return Ok(DataOutcome::from_cache(cached));
  }

  match fetch.await {
    Ok(data) => {
      // Persisting is best-effort: a broken store must not cost fresh data.
      if let Err(err) = persist(&data) {
        warn!(key, %err, "failed to persist fetched data");
      }
      cache.put(key.to_string(), data.clone());
      debug!(key, count = data.len(), "fetched from remote");
      Ok(DataOutcome::from_remote(data))
    }
    Err(fetch_err) => match load() {
      Ok(persisted) => {
        debug!(key, error = %fetch_err, "remote unavailable, serving persisted data");
        Ok(DataOutcome::offline(persisted))
      }
      Err(store_err) => {
        warn!(key, fetch = %fetch_err, store = %store_err, "no data available");
        Err(RepoError::Unavailable {
          fetch: fetch_err,
          store: store_err,
        })
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::repo::outcome::DataSource;
  use crate::repo::traits::MemoryStore;
  use crate::schedule::{LessonKind, WeekParity};
  use async_trait::async_trait;
  use parking_lot::Mutex;
  use std::sync::atomic::{AtomicU32, Ordering};

  fn lesson(id: i64, day: u8, time: &str, parity: WeekParity) -> LessonRecord {
    LessonRecord {
      id,
      group_key: "S-21".to_string(),
      day_of_week: day,
      pair_number: 1,
      time: time.to_string(),
      subject: format!("subject-{id}"),
      teacher: None,
      room: None,
      building: None,
      kind: LessonKind::Lecture,
      week_parity: parity,
    }
  }

  /// Remote double: serves canned data, optionally failing, counting calls.
  #[derive(Default)]
  struct StubRemote {
    lessons: Mutex<Vec<LessonRecord>>,
    faculties: Mutex<Vec<Faculty>>,
    groups: Mutex<Vec<Group>>,
    exams: Mutex<Vec<Exam>>,
    fail: std::sync::atomic::AtomicBool,
    calls: AtomicU32,
  }

  impl StubRemote {
    fn with_lessons(lessons: Vec<LessonRecord>) -> Self {
      let remote = Self::default();
      *remote.lessons.lock() = lessons;
      remote
    }

    fn failing() -> Self {
      let remote = Self::default();
      remote.fail.store(true, Ordering::SeqCst);
      remote
    }

    fn calls(&self) -> u32 {
      self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), FetchError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.fail.load(Ordering::SeqCst) {
        Err(FetchError::Network("connection refused".to_string()))
      } else {
        Ok(())
      }
    }
  }

  #[async_trait]
  impl RemoteSource for StubRemote {
    async fn fetch_faculties(&self) -> Result<Vec<Faculty>, FetchError> {
      self.check()?;
      Ok(self.faculties.lock().clone())
    }

    async fn fetch_groups(&self, _faculty_code: &str) -> Result<Vec<Group>, FetchError> {
      self.check()?;
      Ok(self.groups.lock().clone())
    }

    async fn fetch_lessons(
      &self,
      _group_key: &str,
      _parity: Option<WeekParity>,
    ) -> Result<Vec<LessonRecord>, FetchError> {
      self.check()?;
      Ok(self.lessons.lock().clone())
    }

    async fn fetch_exams(&self, _group_key: &str) -> Result<Vec<Exam>, FetchError> {
      self.check()?;
      Ok(self.exams.lock().clone())
    }
  }

  /// Store double where every operation fails.
  struct BrokenStore;

  impl ScheduleStore for BrokenStore {
    fn load_faculties(&self) -> Result<Vec<Faculty>, StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn save_faculties(&self, _: &[Faculty]) -> Result<(), StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn load_groups(&self, _: &str) -> Result<Vec<Group>, StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn save_groups(&self, _: &str, _: &[Group]) -> Result<(), StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn load_lessons(&self, _: &str) -> Result<Vec<LessonRecord>, StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn save_lessons(&self, _: &str, _: &[LessonRecord]) -> Result<(), StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn load_exams(&self, _: &str) -> Result<Vec<Exam>, StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
    fn save_exams(&self, _: &str, _: &[Exam]) -> Result<(), StoreError> {
      Err(StoreError("disk gone".to_string()))
    }
  }

  fn weeks() -> WeekReference {
    WeekReference::new(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
  }

  fn repo<S: ScheduleStore>(store: S, remote: StubRemote) -> ScheduleRepository<S, StubRemote> {
    ScheduleRepository::new(store, remote, &CacheRegistry::default(), weeks())
  }

  #[tokio::test]
  async fn test_remote_success_persists_and_caches() {
    let remote = StubRemote::with_lessons(vec![lesson(1, 1, "09:00", WeekParity::Both)]);
    let repo = repo(MemoryStore::new(), remote);

    let first = repo.lessons("S-21").await.unwrap();
    assert_eq!(first.source, DataSource::Remote);
    assert_eq!(first.data.len(), 1);

    // The fetch landed in the store.
    assert_eq!(repo.store.load_lessons("S-21").unwrap().len(), 1);

    // And in the cache: the second read does not hit the remote.
    let second = repo.lessons("S-21").await.unwrap();
    assert_eq!(second.source, DataSource::Cache);
    assert_eq!(second.data, first.data);
    assert_eq!(repo.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_remote_failure_serves_persisted_as_offline() {
    let store = MemoryStore::new();
    store
      .save_lessons("S-21", &[lesson(1, 1, "09:00", WeekParity::Both)])
      .unwrap();
    let repo = repo(store, StubRemote::failing());

    let outcome = repo.lessons("S-21").await.unwrap();
    assert_eq!(outcome.source, DataSource::Offline);
    assert!(outcome.is_stale());
    assert_eq!(outcome.data.len(), 1);
  }

  #[tokio::test]
  async fn test_remote_failure_with_empty_store_is_still_offline() {
    let repo = repo(MemoryStore::new(), StubRemote::failing());

    // An empty-but-readable store is a degraded success, not an error.
    let outcome = repo.lessons("S-21").await.unwrap();
    assert_eq!(outcome.source, DataSource::Offline);
    assert!(outcome.data.is_empty());
  }

  #[tokio::test]
  async fn test_remote_and_store_failure_is_unavailable() {
    let repo = repo(BrokenStore, StubRemote::failing());

    let err = repo.lessons("S-21").await.unwrap_err();
    let RepoError::Unavailable { fetch, store } = err;
    assert!(matches!(fetch, FetchError::Network(_)));
    assert_eq!(store.0, "disk gone");
  }

  #[tokio::test]
  async fn test_broken_store_does_not_block_fresh_remote_data() {
    let remote = StubRemote::with_lessons(vec![lesson(1, 1, "09:00", WeekParity::Both)]);
    let repo = repo(BrokenStore, remote);

    // Persisting fails, the data still flows through.
    let outcome = repo.lessons("S-21").await.unwrap();
    assert_eq!(outcome.source, DataSource::Remote);
    assert_eq!(outcome.data.len(), 1);
  }

  #[tokio::test]
  async fn test_day_schedule_filters_and_orders() {
    let remote = StubRemote::with_lessons(vec![
      lesson(1, 1, "09:00", WeekParity::Odd),
      lesson(2, 1, "08:00", WeekParity::Both),
      lesson(3, 2, "08:00", WeekParity::Both),
    ]);
    let repo = repo(MemoryStore::new(), remote);

    let outcome = repo.day_schedule("S-21", 1, Some(true)).await.unwrap();
    let ids: Vec<i64> = outcome.data.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(outcome.source, DataSource::Remote);
  }

  #[tokio::test]
  async fn test_week_schedule_spans_six_days() {
    let remote = StubRemote::with_lessons(vec![
      lesson(1, 1, "09:00", WeekParity::Odd),
      lesson(2, 6, "10:00", WeekParity::Both),
    ]);
    let repo = repo(MemoryStore::new(), remote);

    let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    let outcome = repo.week_schedule("S-21", start).await.unwrap();
    assert_eq!(outcome.data.len(), 6);
    assert_eq!(outcome.data[&1].len(), 1);
    assert_eq!(outcome.data[&6].len(), 1);
  }

  #[tokio::test]
  async fn test_next_lesson_at_uses_reconciled_lessons() {
    let remote = StubRemote::with_lessons(vec![
      lesson(1, 1, "09:00", WeekParity::Both),
      lesson(2, 1, "10:00", WeekParity::Both),
    ]);
    let repo = repo(MemoryStore::new(), remote);

    let now = NaiveDate::from_ymd_opt(2025, 9, 1)
      .unwrap()
      .and_hms_opt(9, 30, 0)
      .unwrap();
    let next = repo.next_lesson_at("S-21", now).await.unwrap();
    assert_eq!(next.map(|l| l.id), Some(2));
  }

  #[tokio::test]
  async fn test_refresh_lessons_forces_remote() {
    let remote = StubRemote::with_lessons(vec![lesson(1, 1, "09:00", WeekParity::Both)]);
    let repo = repo(MemoryStore::new(), remote);

    repo.lessons("S-21").await.unwrap();
    assert_eq!(repo.remote.calls(), 1);

    // A plain re-read is served from cache...
    repo.lessons("S-21").await.unwrap();
    assert_eq!(repo.remote.calls(), 1);

    // ...refresh drops the entry and fetches again.
    let refreshed = repo.refresh_lessons("S-21").await.unwrap();
    assert_eq!(refreshed.source, DataSource::Remote);
    assert_eq!(repo.remote.calls(), 2);
  }

  #[tokio::test]
  async fn test_invalidate_all_drops_every_domain() {
    let remote = StubRemote::with_lessons(vec![lesson(1, 1, "09:00", WeekParity::Both)]);
    let repo = repo(MemoryStore::new(), remote);

    repo.lessons("S-21").await.unwrap();
    repo.faculties().await.unwrap();
    repo.invalidate_all();

    repo.lessons("S-21").await.unwrap();
    repo.faculties().await.unwrap();
    // Two fetches before the wipe, two after.
    assert_eq!(repo.remote.calls(), 4);
  }

  #[tokio::test]
  async fn test_groups_cached_per_faculty() {
    let remote = StubRemote::default();
    *remote.groups.lock() = vec![Group {
      code: "S-21".to_string(),
      faculty_code: "FEU".to_string(),
      course: 2,
      education_form: None,
    }];
    let repo = repo(MemoryStore::new(), remote);

    repo.groups("FEU").await.unwrap();
    repo.groups("FEU").await.unwrap();
    // A different faculty is a different cache entry.
    repo.groups("UEF").await.unwrap();
    assert_eq!(repo.remote.calls(), 2);
  }

  #[tokio::test]
  async fn test_exams_reconcile_like_lessons() {
    let remote = StubRemote::default();
    *remote.exams.lock() = vec![Exam {
      id: 1,
      group_key: "S-21".to_string(),
      subject: "Statistics".to_string(),
      date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
      time: Some("09:00".to_string()),
      teacher: None,
      room: None,
    }];
    let repo = repo(MemoryStore::new(), remote);

    let outcome = repo.exams("S-21").await.unwrap();
    assert_eq!(outcome.source, DataSource::Remote);
    assert_eq!(repo.store.load_exams("S-21").unwrap().len(), 1);
  }
}
