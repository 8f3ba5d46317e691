//! SQLite-backed store with two tables: `locations` (region metadata) and
//! `temperatures` (time-series values). Upserts are idempotent on natural
//! keys and each batch runs in one transaction, so a partially-parsed batch
//! never leaves the file half-written.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::{Dataset, DatasetRow, Location, TemperatureReading};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locations (
    region_id   TEXT PRIMARY KEY,
    region_name TEXT NOT NULL,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS temperatures (
    region_id  TEXT NOT NULL REFERENCES locations(region_id),
    valid_time TEXT NOT NULL,
    min_temp   REAL,
    max_temp   REAL,
    PRIMARY KEY (region_id, valid_time)
);
";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection and make sure the schema exists. A connection is
    /// opened per operation and dropped on every exit path.
    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Whether a usable prior snapshot is present: the file exists and holds
    /// at least one temperature row.
    pub fn exists(&self) -> Result<bool, StoreError> {
        if !self.path.exists() {
            return Ok(false);
        }
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM temperatures", [], |row| {
            row.get(0)
        })?;
        Ok(count > 0)
    }

    /// Insert or update region metadata, keyed on `region_id`. The whole
    /// batch commits or rolls back as a unit.
    pub fn upsert_locations(&self, locations: &[Location]) -> Result<(), StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO locations (region_id, region_name, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(region_id) DO UPDATE SET
                     region_name = excluded.region_name,
                     latitude = excluded.latitude,
                     longitude = excluded.longitude",
            )?;
            for location in locations {
                stmt.execute(params![
                    location.region_id,
                    location.region_name,
                    location.latitude,
                    location.longitude,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = locations.len(), "upserted locations");
        Ok(())
    }

    /// Insert or update readings, keyed on `(region_id, valid_time)`.
    /// Last write wins on the value columns.
    pub fn upsert_readings(&self, readings: &[TemperatureReading]) -> Result<(), StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO temperatures (region_id, valid_time, min_temp, max_temp)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(region_id, valid_time) DO UPDATE SET
                     min_temp = excluded.min_temp,
                     max_temp = excluded.max_temp",
            )?;
            for reading in readings {
                stmt.execute(params![
                    reading.region_id,
                    reading.valid_time.format(DATE_FORMAT).to_string(),
                    reading.min_temp,
                    reading.max_temp,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = readings.len(), "upserted temperature readings");
        Ok(())
    }

    /// Full join of readings with region metadata, ordered by region name
    /// then date. Never mutates.
    pub fn read_all(&self) -> Result<Dataset, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT l.region_id, l.region_name, l.latitude, l.longitude,
                    t.valid_time, t.min_temp, t.max_temp
             FROM temperatures t
             JOIN locations l ON t.region_id = l.region_id
             ORDER BY l.region_name, t.valid_time",
        )?;

        let rows = stmt.query_map([], |row| {
            let valid_time: String = row.get(4)?;
            let valid_time = NaiveDate::parse_from_str(&valid_time, DATE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(DatasetRow {
                region_id: row.get(0)?,
                region_name: row.get(1)?,
                latitude: row.get(2)?,
                longitude: row.get(3)?,
                valid_time,
                min_temp: row.get(5)?,
                max_temp: row.get(6)?,
            })
        })?;

        let mut dataset_rows = Vec::new();
        for row in rows {
            dataset_rows.push(row?);
        }

        Ok(Dataset::new(dataset_rows))
    }
}
