//! Derivation pass from the raw store to the derived store.
//!
//! Batch-poll model: each pass reads the entire raw store, derives every row
//! independently, and atomically replaces the derived store. The derived
//! table is always a pure function of the current raw snapshot, so rerunning
//! a pass over unchanged input produces identical output.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::StoreResult;
use crate::models::DerivedReading;
use crate::store;

// ---

/// Outcome of one transformer pass.
#[derive(Debug)]
pub struct PassOutcome {
    // ---
    /// Rows published to the derived store.
    pub rows: usize,
    /// Raw rows skipped because they failed schema parsing.
    pub skipped: usize,
}

/// Run one derivation pass.
///
/// A missing or empty raw store publishes an empty derived table (header
/// only) — downstream consumers see "no data yet", never an error.
pub fn process(config: &Config) -> StoreResult<PassOutcome> {
    // ---
    let snapshot = store::read_readings(&config.raw_store)?;
    if snapshot.skipped > 0 {
        warn!(
            "Skipped {} malformed rows in {}",
            snapshot.skipped,
            config.raw_store.display()
        );
    }

    let derived: Vec<DerivedReading> = snapshot
        .rows
        .iter()
        .map(|reading| reading.to_derived(&config.thresholds, &config.route_offsets))
        .collect();

    store::write_derived(&config.derived_store, &derived)?;

    Ok(PassOutcome {
        rows: derived.len(),
        skipped: snapshot.skipped,
    })
}

/// Run the transformer loop on its fixed interval, forever.
pub async fn run(config: Arc<Config>) {
    // ---
    let mut ticker = tokio::time::interval(config.transformer_interval);
    loop {
        ticker.tick().await;
        match process(&config) {
            Ok(outcome) => debug!(
                "Published {} derived rows to {}",
                outcome.rows,
                config.derived_store.display()
            ),
            Err(e) => error!("Derivation pass failed, will retry next tick: {}", e),
        }
    }
}
