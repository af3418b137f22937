//! SQLite-backed delivery log and exposure lookup.
//!
//! Every delivery attempt is appended to `delivery_events`. A caller's exposure set is
//! the distinct non-null `ad_id` of that caller's events; rows are never deleted.
//! `caller_candidates` holds each caller's pre-ranked ad ids, in rank order.

use crate::domain::{AdId, DeliveryEvent};
use crate::exposure::ExposureSet;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use std::fs;
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS delivery_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    caller_id TEXT NOT NULL,
    query TEXT NOT NULL,
    ad_id TEXT,
    received_at TEXT NOT NULL,
    completed_at TEXT,
    detail TEXT
);
CREATE INDEX IF NOT EXISTS idx_delivery_events_caller ON delivery_events(caller_id, id);
CREATE INDEX IF NOT EXISTS idx_delivery_events_ad ON delivery_events(ad_id);
CREATE TABLE IF NOT EXISTS caller_candidates (
    caller_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    ad_id TEXT NOT NULL,
    PRIMARY KEY (caller_id, position)
);
";

/// How long a connection waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How much of a caller's history counts as exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposureWindow {
    /// Every ad ever shown stays excluded.
    #[default]
    Unbounded,
    /// Only the ads of the K most recent deliveries are excluded.
    MostRecent(usize),
}

impl From<Option<usize>> for ExposureWindow {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(k) => ExposureWindow::MostRecent(k),
            None => ExposureWindow::Unbounded,
        }
    }
}

pub struct ExposureStore {
    conn: Connection,
    window: ExposureWindow,
}

impl ExposureStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA).context("Failed to initialize delivery_events schema")?;
        Ok(Self { conn, window: ExposureWindow::default() })
    }

    pub fn with_window(mut self, window: ExposureWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> ExposureWindow {
        self.window
    }

    pub fn shown_ads(&self, caller_id: &str) -> Result<ExposureSet> {
        shown_ads_in(&self.conn, caller_id, self.window)
    }

    pub fn record(&self, event: &DeliveryEvent) -> Result<()> {
        insert_event(&self.conn, event)
    }

    /// All events of `caller_id`, oldest first.
    pub fn history(&self, caller_id: &str) -> Result<Vec<DeliveryEvent>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT caller_id, query, ad_id, received_at, completed_at, detail
            FROM delivery_events
            WHERE caller_id = ?1
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map(params![caller_id], |row| {
            Ok(DeliveryEvent {
                caller_id: row.get(0)?,
                query: row.get(1)?,
                ad_id: row.get::<_, Option<String>>(2)?.map(AdId::from),
                received_at: row.get(3)?,
                completed_at: row.get(4)?,
                detail: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Most recent time `ad_id` was delivered to any caller.
    pub fn last_accessed(&self, ad_id: &AdId) -> Result<Option<DateTime<Utc>>> {
        let last = self.conn.query_row(
            "SELECT MAX(completed_at) FROM delivery_events WHERE ad_id = ?1",
            params![ad_id.as_str()],
            |row| row.get::<_, Option<DateTime<Utc>>>(0),
        )?;
        Ok(last)
    }

    /// Replace the caller's pre-ranked candidate list.
    ///
    /// Storing an empty list clears it, and the caller falls back to the whole catalog.
    pub fn save_candidates(&mut self, caller_id: &str, ranked_ids: &[AdId]) -> Result<()> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM caller_candidates WHERE caller_id = ?1", params![caller_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO caller_candidates(caller_id, position, ad_id) VALUES(?1, ?2, ?3)",
            )?;
            for (position, id) in ranked_ids.iter().enumerate() {
                stmt.execute(params![caller_id, position as i64, id.as_str()])?;
            }
        }
        tx.commit().context("Failed to store caller candidates")?;

        tracing::debug!(caller = caller_id, candidates = ranked_ids.len(), "stored candidates");
        Ok(())
    }

    /// The caller's pre-ranked ad ids in rank order, or `None` if none were stored.
    pub fn candidates(&self, caller_id: &str) -> Result<Option<Vec<AdId>>> {
        let mut stmt = self.conn.prepare(
            "SELECT ad_id FROM caller_candidates WHERE caller_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![caller_id], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for id in rows {
            ids.push(AdId::from(id?));
        }
        Ok(if ids.is_empty() { None } else { Some(ids) })
    }

    /// Read the caller's exposure set, let `select` pick an ad, and log the outcome, all
    /// inside one immediate transaction. Returns the recorded event.
    ///
    /// Holding the write lock for the whole sequence serializes concurrent deliveries, so
    /// the same ad cannot be handed to one caller twice by racing requests.
    pub fn select_and_record<F>(
        &mut self,
        caller_id: &str,
        query: &str,
        select: F,
    ) -> Result<DeliveryEvent>
    where
        F: FnOnce(&ExposureSet) -> Option<AdId>,
    {
        let received_at = Utc::now();
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let shown = shown_ads_in(&tx, caller_id, self.window)?;
        let chosen = select(&shown);
        let detail = match &chosen {
            Some(_) => "delivered",
            None => "no unseen ads",
        };
        let event = DeliveryEvent {
            caller_id: caller_id.to_string(),
            query: query.to_string(),
            ad_id: chosen,
            received_at,
            completed_at: Some(Utc::now()),
            detail: Some(detail.to_string()),
        };
        insert_event(&tx, &event)?;
        tx.commit()?;

        tracing::debug!(
            caller = caller_id,
            shown = shown.len(),
            ad = ?event.ad_id,
            "recorded delivery"
        );
        Ok(event)
    }
}

fn shown_ads_in(conn: &Connection, caller_id: &str, window: ExposureWindow) -> Result<ExposureSet> {
    let mut shown = ExposureSet::new();
    match window {
        ExposureWindow::Unbounded => {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT ad_id FROM delivery_events WHERE caller_id = ?1 AND ad_id IS NOT NULL",
            )?;
            let ids = stmt.query_map(params![caller_id], |row| row.get::<_, String>(0))?;
            for id in ids {
                shown.insert(AdId::from(id?));
            }
        }
        ExposureWindow::MostRecent(k) => {
            let mut stmt = conn.prepare(
                "
                SELECT ad_id FROM delivery_events
                WHERE caller_id = ?1 AND ad_id IS NOT NULL
                ORDER BY id DESC
                LIMIT ?2
                ",
            )?;
            let ids = stmt.query_map(params![caller_id, k as i64], |row| row.get::<_, String>(0))?;
            for id in ids {
                shown.insert(AdId::from(id?));
            }
        }
    }
    Ok(shown)
}

fn insert_event(conn: &Connection, event: &DeliveryEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO delivery_events(caller_id, query, ad_id, received_at, completed_at, detail)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.caller_id,
            event.query,
            event.ad_id.as_ref().map(AdId::as_str),
            event.received_at,
            event.completed_at,
            event.detail,
        ],
    )
    .context("Failed to record delivery event")?;
    Ok(())
}
