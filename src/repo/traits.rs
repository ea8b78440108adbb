//! Collaborator contracts: persistent storage and remote fetch.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::{FetchError, StoreError};
use crate::schedule::{Exam, Faculty, Group, LessonRecord, WeekParity};

/// Persistent storage collaborator.
///
/// The store owns its schema, transactions, and migrations; this core only
/// reads last-known data and writes back what a fresh fetch produced.
pub trait ScheduleStore: Send + Sync {
  fn load_faculties(&self) -> Result<Vec<Faculty>, StoreError>;
  fn save_faculties(&self, faculties: &[Faculty]) -> Result<(), StoreError>;

  fn load_groups(&self, faculty_code: &str) -> Result<Vec<Group>, StoreError>;
  fn save_groups(&self, faculty_code: &str, groups: &[Group]) -> Result<(), StoreError>;

  fn load_lessons(&self, group_key: &str) -> Result<Vec<LessonRecord>, StoreError>;
  fn save_lessons(&self, group_key: &str, lessons: &[LessonRecord]) -> Result<(), StoreError>;

  fn load_exams(&self, group_key: &str) -> Result<Vec<Exam>, StoreError>;
  fn save_exams(&self, group_key: &str, exams: &[Exam]) -> Result<(), StoreError>;
}

/// Remote schedule source.
///
/// Implementations own the wire format; this core never sees it. Fetches are
/// the only suspension points in the crate.
#[async_trait]
pub trait RemoteSource: Send + Sync {
  async fn fetch_faculties(&self) -> Result<Vec<Faculty>, FetchError>;

  async fn fetch_groups(&self, faculty_code: &str) -> Result<Vec<Group>, FetchError>;

  /// Fetch a group's lessons, optionally narrowed to one week parity.
  async fn fetch_lessons(
    &self,
    group_key: &str,
    parity: Option<WeekParity>,
  ) -> Result<Vec<LessonRecord>, FetchError>;

  async fn fetch_exams(&self, group_key: &str) -> Result<Vec<Exam>, FetchError>;
}

/// Hash-map backed store.
///
/// The default when no real persistence is wired in, and the fallback double
/// in tests. Data lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
  faculties: Mutex<Vec<Faculty>>,
  groups: Mutex<HashMap<String, Vec<Group>>>,
  lessons: Mutex<HashMap<String, Vec<LessonRecord>>>,
  exams: Mutex<HashMap<String, Vec<Exam>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ScheduleStore for MemoryStore {
  fn load_faculties(&self) -> Result<Vec<Faculty>, StoreError> {
    Ok(self.faculties.lock().clone())
  }

  fn save_faculties(&self, faculties: &[Faculty]) -> Result<(), StoreError> {
    *self.faculties.lock() = faculties.to_vec();
    Ok(())
  }

  fn load_groups(&self, faculty_code: &str) -> Result<Vec<Group>, StoreError> {
    Ok(
      self
        .groups
        .lock()
        .get(faculty_code)
        .cloned()
        .unwrap_or_default(),
    )
  }

  fn save_groups(&self, faculty_code: &str, groups: &[Group]) -> Result<(), StoreError> {
    self
      .groups
      .lock()
      .insert(faculty_code.to_string(), groups.to_vec());
    Ok(())
  }

  fn load_lessons(&self, group_key: &str) -> Result<Vec<LessonRecord>, StoreError> {
    Ok(
      self
        .lessons
        .lock()
        .get(group_key)
        .cloned()
        .unwrap_or_default(),
    )
  }

  fn save_lessons(&self, group_key: &str, lessons: &[LessonRecord]) -> Result<(), StoreError> {
    self
      .lessons
      .lock()
      .insert(group_key.to_string(), lessons.to_vec());
    Ok(())
  }

  fn load_exams(&self, group_key: &str) -> Result<Vec<Exam>, StoreError> {
    Ok(self.exams.lock().get(group_key).cloned().unwrap_or_default())
  }

  fn save_exams(&self, group_key: &str, exams: &[Exam]) -> Result<(), StoreError> {
    self
      .exams
      .lock()
      .insert(group_key.to_string(), exams.to_vec());
    Ok(())
  }
}
