//! Document store for people, notes and cron logs

mod models;
mod sqlite;

pub use models::{CronLog, ExtractedData, Fields, NewNote, Note, Person, RESERVED_FIELDS};
pub use sqlite::SqliteStore;

use crate::Result;
use async_trait::async_trait;

/// Persistence used by the admin handlers
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All people, newest first
    async fn list_people(&self) -> Result<Vec<Person>>;

    async fn get_person(&self, id: &str) -> Result<Option<Person>>;

    /// Create or replace the person with `id`
    async fn put_person(&self, id: &str, fields: Fields) -> Result<Person>;

    /// Merge `patch` into an existing person.
    ///
    /// Reserved fields in the patch are ignored. `Error::NotFound` when the
    /// person does not exist.
    async fn update_person(&self, id: &str, patch: Fields) -> Result<Person>;

    /// Set `referralCount` on every listed person in one transaction
    async fn set_referral_counts(&self, counts: &[(String, u64)]) -> Result<()>;

    /// Notes on a person, newest first
    async fn list_notes(&self, person_id: &str) -> Result<Vec<Note>>;

    async fn add_note(&self, person_id: &str, note: NewNote) -> Result<Note>;

    async fn record_cron_run(&self, log: CronLog) -> Result<()>;

    /// Most recent cron runs, newest first
    async fn recent_cron_runs(&self, limit: u32) -> Result<Vec<CronLog>>;
}
