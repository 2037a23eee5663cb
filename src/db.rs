// 🗄️ Persistence Sink - SQLite
//
// Tables:
//   sources - person ids discovered on the directory page
//   data    - one row per (person, term, start_date)
//   events  - audit trail (list refreshes, per-person failures)
//
// Every write is an upsert, so re-running over the same pages is a no-op.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::Error::FromSqlConversionFailure;
use rusqlite::{params, Connection, ToSql};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::assemble::OutputRecord;
use crate::error::ScrapeError;
use crate::listing::SourceEntry;

/// What the audit trail records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Member directory re-read; subject is the list URL
    ListUpdated,
    /// Profile skipped; subject is the PARLINFO id
    PersonFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ListUpdated => "list_updated",
            EventKind::PersonFailed => "person_failed",
        }
    }
}

impl ToSql for EventKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EventKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "list_updated" => Ok(EventKind::ListUpdated),
            "person_failed" => Ok(EventKind::PersonFailed),
            other => Err(FromSqlError::Other(
                format!("unknown event kind {:?}", other).into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub recorded_at: DateTime<Utc>,
    pub kind: EventKind,
    pub subject: String,
    pub detail: serde_json::Value,
}

impl Event {
    pub fn new(kind: EventKind, subject: &str, detail: serde_json::Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            recorded_at: Utc::now(),
            kind,
            subject: subject.to_string(),
            detail,
        }
    }

    pub fn list_updated(url: &str, count: usize) -> Self {
        Self::new(EventKind::ListUpdated, url, json!({ "count": count }))
    }

    pub fn person_failed(id: &str, err: &ScrapeError) -> Self {
        Self::new(
            EventKind::PersonFailed,
            id,
            json!({ "error": err.to_string(), "data_error": err.is_data_error() }),
        )
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Dates are ISO 8601 text; "" means unknown / still running
    conn.execute(
        "CREATE TABLE IF NOT EXISTS data (
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            sort_name TEXT NOT NULL,
            given_name TEXT NOT NULL,
            family_name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            death_date TEXT NOT NULL,
            birthplace TEXT NOT NULL,
            image TEXT NOT NULL,
            source TEXT NOT NULL,
            term TEXT NOT NULL,
            constituency TEXT NOT NULL,
            faction TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (id, term, start_date)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            recorded_at TEXT NOT NULL,
            kind TEXT NOT NULL,
            subject TEXT NOT NULL,
            detail TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_data_id ON data(id)", [])?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_subject ON events(subject)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// SOURCES
// ============================================================================

/// Upsert discovered ids. Returns the number of rows written.
pub fn save_sources(conn: &Connection, entries: &[SourceEntry]) -> Result<usize> {
    let mut written = 0;
    for entry in entries {
        written += conn.execute(
            "INSERT INTO sources (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![entry.id, entry.name],
        )?;
    }
    Ok(written)
}

pub fn source_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM sources", [], |row| row.get(0))?;
    Ok(count)
}

/// Ids discovered but with no stored membership yet, in discovery order.
///
/// People who never won a seat stay pending; with a warm fetch cache that
/// costs one disk read each.
pub fn pending_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM sources
         WHERE id NOT IN (SELECT DISTINCT id FROM data)
         ORDER BY rowid",
    )?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

// ============================================================================
// RECORDS
// ============================================================================

/// Upsert output rows keyed by (id, term, start_date). Returns rows written.
pub fn save_records(conn: &Connection, records: &[OutputRecord]) -> Result<usize> {
    let mut written = 0;
    for r in records {
        written += conn.execute(
            "INSERT INTO data (
                id, name, sort_name, given_name, family_name, birth_date, death_date,
                birthplace, image, source, term, constituency, faction, start_date, end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id, term, start_date) DO UPDATE SET
                name = excluded.name,
                sort_name = excluded.sort_name,
                given_name = excluded.given_name,
                family_name = excluded.family_name,
                birth_date = excluded.birth_date,
                death_date = excluded.death_date,
                birthplace = excluded.birthplace,
                image = excluded.image,
                source = excluded.source,
                constituency = excluded.constituency,
                faction = excluded.faction,
                end_date = excluded.end_date,
                updated_at = CURRENT_TIMESTAMP",
            params![
                r.id,
                r.name,
                r.sort_name,
                r.given_name,
                r.family_name,
                r.birth_date,
                r.death_date,
                r.birthplace,
                r.image,
                r.source,
                r.term,
                r.constituency,
                r.faction,
                r.start_date,
                r.end_date,
            ],
        )?;
    }
    Ok(written)
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM data", [], |row| row.get(0))?;
    Ok(count)
}

pub fn get_records_for_person(conn: &Connection, id: &str) -> Result<Vec<OutputRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, sort_name, given_name, family_name, birth_date, death_date,
                birthplace, image, source, term, constituency, faction, start_date, end_date
         FROM data
         WHERE id = ?1
         ORDER BY start_date, term",
    )?;

    let records = stmt
        .query_map(params![id], |row| {
            Ok(OutputRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                sort_name: row.get(2)?,
                given_name: row.get(3)?,
                family_name: row.get(4)?,
                birth_date: row.get(5)?,
                death_date: row.get(6)?,
                birthplace: row.get(7)?,
                image: row.get(8)?,
                source: row.get(9)?,
                term: row.get(10)?,
                constituency: row.get(11)?,
                faction: row.get(12)?,
                start_date: row.get(13)?,
                end_date: row.get(14)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

// ============================================================================
// EVENTS
// ============================================================================

pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    conn.execute(
        "INSERT INTO events (event_id, recorded_at, kind, subject, detail)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.event_id,
            event.recorded_at.to_rfc3339(),
            event.kind,
            event.subject,
            event.detail.to_string(),
        ],
    )?;

    Ok(())
}

/// Events about one subject (a person id or the list URL), newest first
pub fn events_for(conn: &Connection, subject: &str) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, recorded_at, kind, subject, detail
         FROM events
         WHERE subject = ?1
         ORDER BY recorded_at DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![subject], |row| {
            let recorded_at: String = row.get(1)?;
            let detail: String = row.get(4)?;

            Ok(Event {
                event_id: row.get(0)?,
                recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                    .map_err(|e| FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc),
                kind: row.get(2)?,
                subject: row.get(3)?,
                detail: serde_json::from_str(&detail)
                    .map_err(|e| FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
