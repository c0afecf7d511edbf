//! CSV-backed stores shared by the pipeline components.
//!
//! Two files make up the entire storage and transport layer:
//! - the **raw store** (`pollution.csv`), append-only, owned by the generator;
//! - the **derived store** (`dashboard.csv`), fully rewritten on every
//!   transformer pass and read by the dashboard API.
//!
//! Appends flush the whole batch before returning, so a concurrent reader
//! sees either none or all of a tick's rows. The derived store is replaced
//! via a temp file and an atomic rename, so a reader never observes a
//! half-written table.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::models::{DerivedReading, Reading};

// ---

/// Header row of the raw store. Field order matches `Reading`.
pub const RAW_HEADER: [&str; 3] = ["entity_id", "pollutant_value", "timestamp"];

/// Header row of the derived store. Field order matches `DerivedReading`.
pub const DERIVED_HEADER: [&str; 8] = [
    "entity_id",
    "pollutant_value",
    "timestamp",
    "risk_level",
    "route_a",
    "route_b",
    "route_c",
    "best_route",
];

/// Result of a snapshot read: the rows that parsed, plus how many were
/// skipped because they failed schema parsing.
#[derive(Debug)]
pub struct Snapshot<T> {
    // ---
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> Snapshot<T> {
    fn empty() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

// ---

/// Append a batch of readings to the raw store.
///
/// Creates the file with its header row if it is absent or empty; never
/// truncates or reorders existing content. The whole batch is flushed
/// before returning.
pub fn append_readings(path: &Path, readings: &[Reading]) -> StoreResult<()> {
    // ---
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(RAW_HEADER)?;
    }
    for reading in readings {
        writer.serialize(reading)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a full snapshot of the raw store.
///
/// A missing or empty file is a normal "no data yet" state and reads as an
/// empty snapshot. Rows that fail schema parsing are skipped and counted.
pub fn read_readings(path: &Path) -> StoreResult<Snapshot<Reading>> {
    // ---
    read_snapshot(path)
}

/// Read a full snapshot of the derived store, with the same missing-file
/// and malformed-row semantics as [`read_readings`].
pub fn read_derived(path: &Path) -> StoreResult<Snapshot<DerivedReading>> {
    // ---
    read_snapshot(path)
}

/// Replace the derived store with the given rows.
///
/// The table is written to a sibling temp file and moved into place with an
/// atomic rename; the header row is present even when there are no rows.
pub fn write_derived(path: &Path, rows: &[DerivedReading]) -> StoreResult<()> {
    // ---
    let tmp = tmp_path(path);

    {
        let file = File::create(&tmp)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer.write_record(DERIVED_HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

// ---

fn read_snapshot<T: serde::de::DeserializeOwned>(path: &Path) -> StoreResult<Snapshot<T>> {
    // ---
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::empty()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let mut snapshot = Snapshot::empty();
    for row in reader.deserialize::<T>() {
        match row {
            Ok(parsed) => snapshot.rows.push(parsed),
            Err(e) => {
                snapshot.skipped += 1;
                tracing::debug!("Skipping malformed row in {}: {}", path.display(), e);
            }
        }
    }

    Ok(snapshot)
}

/// Temp-file path next to the target so the rename stays on one filesystem.
fn tmp_path(path: &Path) -> PathBuf {
    // ---
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
