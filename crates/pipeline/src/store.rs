//! SQLite record store implementation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, params};
use tracing::debug;

use crate::{
    EntityKind, Error, PipelineRecord, PipelineSummaryProvider, RecordId, Result, Stage,
    StageTotal,
};

/// SQLite-backed pipeline store.
///
/// The connection is shared with blocking tasks so async readers never run
/// SQLite on a runtime worker.
pub struct PipelineStore {
    conn: Arc<Mutex<Connection>>,
}

impl PipelineStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        lock(&self.conn)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                stage TEXT NOT NULL,
                value_cents INTEGER NOT NULL CHECK (value_cents >= 0),
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_stage
                ON records(kind, stage);
            "#,
        )?;
        Ok(())
    }

    /// Insert a record.
    pub fn insert(&self, record: &PipelineRecord) -> Result<()> {
        if record.value_cents < 0 {
            return Err(Error::InvalidValue(format!(
                "value must not be negative: {}",
                record.value_cents
            )));
        }

        self.conn()?.execute(
            "INSERT INTO records (id, kind, name, stage, value_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id.to_string(),
                record.kind.as_str(),
                record.name,
                record.stage.as_str(),
                record.value_cents,
                record.created_at.to_rfc3339(),
            ],
        )?;
        debug!(
            event_name = "pipeline.record.inserted",
            record_id = %record.id,
            kind = %record.kind,
            stage = %record.stage,
            "record inserted"
        );
        Ok(())
    }

    /// List records, oldest first, optionally restricted to one kind.
    pub fn list(&self, kind: Option<EntityKind>) -> Result<Vec<PipelineRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, name, stage, value_cents, created_at FROM records
             WHERE (?1 IS NULL OR kind = ?1) ORDER BY created_at, id",
        )?;

        let rows = stmt
            .query_map([kind.map(|k| k.as_str())], |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                    name: row.get(2)?,
                    stage: row.get(3)?,
                    value_cents: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }

    /// Count and value of records, grouped by kind and stage.
    ///
    /// Groups with no records are absent.
    pub fn stage_totals(&self) -> Result<Vec<StageTotal>> {
        query_stage_totals(&*self.conn()?)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| Error::Poisoned)
}

fn query_stage_totals(conn: &Connection) -> Result<Vec<StageTotal>> {
    let mut stmt = conn.prepare(
        "SELECT kind, stage, COUNT(*), COALESCE(SUM(value_cents), 0)
         FROM records GROUP BY kind, stage ORDER BY kind, stage",
    )?;

    let rows = stmt
        .query_map([], |row| {
            let kind: String = row.get(0)?;
            let stage: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            let value_cents: i64 = row.get(3)?;
            Ok((kind, stage, count, value_cents))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(kind, stage, count, value_cents)| {
            Ok::<_, Error>(StageTotal {
                kind: kind.parse()?,
                stage: stage.parse()?,
                count: u64::try_from(count).map_err(|_| {
                    Error::InvalidValue(format!("negative count for {kind}/{stage}"))
                })?,
                value_cents,
            })
        })
        .collect()
}

#[async_trait]
impl PipelineSummaryProvider for PipelineStore {
    async fn stage_totals(&self) -> Result<Vec<StageTotal>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            query_stage_totals(&guard)
        })
        .await?
    }
}

struct RawRecord {
    id: String,
    kind: String,
    name: String,
    stage: String,
    value_cents: i64,
    created_at: String,
}

impl RawRecord {
    fn into_record(self) -> Result<PipelineRecord> {
        let corrupt = |reason: String| Error::Corrupt {
            id: self.id.clone(),
            reason,
        };

        Ok(PipelineRecord {
            id: RecordId(self.id.parse().map_err(|e| corrupt(format!("id: {e}")))?),
            kind: self.kind.parse()?,
            name: self.name.clone(),
            stage: self.stage.parse::<Stage>()?,
            value_cents: self.value_cents,
            created_at: self
                .created_at
                .parse()
                .map_err(|e| corrupt(format!("created_at: {e}")))?,
        })
    }
}
