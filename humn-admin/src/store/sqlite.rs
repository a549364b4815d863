//! SQLite-backed document store
//!
//! Each document is a row with its key columns plus a JSON `data` column.
//! Timestamps are stored as Unix microseconds so ordering is numeric.

use super::models::{CronLog, Fields, NewNote, Note, Person, RESERVED_FIELDS};
use super::DocumentStore;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use humn_common::time;
use serde_json::Value;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// Document store over a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and its tables
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Internal(format!("Cannot create {}: {}", parent.display(), e)))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database (single connection so it is shared)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating tables if needed
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS people (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                person_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_person ON notes(person_id, created_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cron_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                operation TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                success INTEGER NOT NULL,
                users_processed INTEGER,
                error TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::Internal(format!("Stored timestamp out of range: {}", micros)))
}

fn parse_fields(data: &str) -> Result<Fields> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::Internal(format!("Stored document is not an object: {}", other))),
    }
}

fn without_reserved(mut fields: Fields) -> Fields {
    for key in RESERVED_FIELDS {
        fields.remove(key);
    }
    fields
}

fn person_from_row(row: &SqliteRow) -> Result<Person> {
    Ok(Person {
        id: row.try_get("id")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        fields: parse_fields(&row.try_get::<String, _>("data")?)?,
    })
}

fn note_from_row(row: &SqliteRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        body: serde_json::from_str(&row.try_get::<String, _>("data")?)?,
    })
}

fn cron_log_from_row(row: &SqliteRow) -> Result<CronLog> {
    let users_processed: Option<i64> = row.try_get("users_processed")?;
    Ok(CronLog {
        operation: row.try_get("operation")?,
        timestamp: from_micros(row.try_get("timestamp")?)?,
        success: row.try_get("success")?,
        users_processed: users_processed.map(|n| n.max(0) as u64),
        error: row.try_get("error")?,
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list_people(&self) -> Result<Vec<Person>> {
        let rows = sqlx::query("SELECT id, created_at, data FROM people ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(person_from_row).collect()
    }

    async fn get_person(&self, id: &str) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, created_at, data FROM people WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn put_person(&self, id: &str, fields: Fields) -> Result<Person> {
        let fields = without_reserved(fields);
        let data = serde_json::to_string(&fields)?;
        let now = time::now();

        // Keep the original creation time when replacing
        sqlx::query(
            r#"
            INSERT INTO people (id, created_at, data) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(id)
        .bind(to_micros(now))
        .bind(&data)
        .execute(&self.pool)
        .await?;

        debug!("Stored person {}", id);
        self.get_person(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Person {} vanished after write", id)))
    }

    async fn update_person(&self, id: &str, patch: Fields) -> Result<Person> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, created_at, data FROM people WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("person {}", id)))?;
        let mut person = person_from_row(&row)?;

        for (key, value) in without_reserved(patch) {
            person.fields.insert(key, value);
        }

        sqlx::query("UPDATE people SET data = ? WHERE id = ?")
            .bind(serde_json::to_string(&person.fields)?)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Updated person {}", id);
        Ok(person)
    }

    async fn set_referral_counts(&self, counts: &[(String, u64)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, count) in counts {
            sqlx::query(
                "UPDATE people SET data = json_set(data, '$.referralCount', ?) WHERE id = ?",
            )
            .bind(*count as i64)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_notes(&self, person_id: &str) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, person_id, created_at, data FROM notes WHERE person_id = ? ORDER BY created_at DESC, id",
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(note_from_row).collect()
    }

    async fn add_note(&self, person_id: &str, note: NewNote) -> Result<Note> {
        let stored = Note {
            id: uuid::Uuid::new_v4().to_string(),
            person_id: person_id.to_string(),
            created_at: time::now(),
            body: note,
        };

        sqlx::query("INSERT INTO notes (id, person_id, created_at, data) VALUES (?, ?, ?, ?)")
            .bind(&stored.id)
            .bind(&stored.person_id)
            .bind(to_micros(stored.created_at))
            .bind(serde_json::to_string(&stored.body)?)
            .execute(&self.pool)
            .await?;

        debug!("Added note {} to person {}", stored.id, person_id);
        Ok(stored)
    }

    async fn record_cron_run(&self, log: CronLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cron_logs (operation, timestamp, success, users_processed, error)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.operation)
        .bind(to_micros(log.timestamp))
        .bind(log.success)
        .bind(log.users_processed.map(|n| n as i64))
        .bind(&log.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_cron_runs(&self, limit: u32) -> Result<Vec<CronLog>> {
        let rows = sqlx::query(
            r#"
            SELECT operation, timestamp, success, users_processed, error
            FROM cron_logs ORDER BY timestamp DESC, id DESC LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(cron_log_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get_person() {
        let store = SqliteStore::in_memory().await.unwrap();
        let person = store
            .put_person("p1", fields(json!({"name": "Ada", "id": "spoofed"})))
            .await
            .unwrap();

        assert_eq!(person.id, "p1");
        assert_eq!(person.field_str("name"), Some("Ada"));
        assert!(!person.fields.contains_key("id"));
        assert_eq!(store.get_person("p1").await.unwrap(), Some(person));
        assert_eq!(store.get_person("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_people_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put_person("old", Fields::new()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.put_person("new", Fields::new()).await.unwrap();

        let ids: Vec<_> = store
            .list_people()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store
            .put_person("p1", fields(json!({"name": "Ada", "city": "London"})))
            .await
            .unwrap();

        let updated = store
            .update_person(
                "p1",
                fields(json!({"city": "Paris", "occupation": "Engineer", "createdAt": "1999-01-01T00:00:00Z"})),
            )
            .await
            .unwrap();

        assert_eq!(updated.field_str("name"), Some("Ada"));
        assert_eq!(updated.field_str("city"), Some("Paris"));
        assert_eq!(updated.field_str("occupation"), Some("Engineer"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_person() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.update_person("ghost", Fields::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_referral_counts_written() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put_person("a", Fields::new()).await.unwrap();
        store.put_person("b", fields(json!({"referrerId": "a"}))).await.unwrap();

        store
            .set_referral_counts(&[("a".to_string(), 1), ("b".to_string(), 0)])
            .await
            .unwrap();

        let a = store.get_person("a").await.unwrap().unwrap();
        let b = store.get_person("b").await.unwrap().unwrap();
        assert_eq!(a.fields["referralCount"], json!(1));
        assert_eq!(b.fields["referralCount"], json!(0));
        assert_eq!(b.referrer_id(), Some("a"));
    }

    #[tokio::test]
    async fn test_notes_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.add_note("p1", NewNote::text("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.add_note("p1", NewNote::text("second")).await.unwrap();
        store.add_note("p2", NewNote::text("other")).await.unwrap();

        let notes = store.list_notes("p1").await.unwrap();
        let contents: Vec<_> = notes.iter().map(|n| n.body.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
        assert!(!notes[0].body.is_from_voice);
    }

    #[tokio::test]
    async fn test_cron_log() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .record_cron_run(CronLog {
                operation: "update-referrals".into(),
                timestamp: time::now(),
                success: false,
                users_processed: None,
                error: Some("boom".into()),
            })
            .await
            .unwrap();

        let logs = store.recent_cron_runs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].success);
        assert_eq!(logs[0].error.as_deref(), Some("boom"));
    }
}
