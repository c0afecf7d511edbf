//! Synthetic pollution feed.
//!
//! Stands in for live sensors: every tick draws one pollutant value per
//! configured city and appends the whole batch to the raw store. The loop
//! runs until the process is stopped; a failed append is logged and retried
//! on the next tick, so the feed is at-least-once (duplicate rows after a
//! partial failure are acceptable for a simulation).

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{error, info};

use crate::config::Config;
use crate::error::StoreResult;
use crate::models::Reading;
use crate::store;

// ---

/// Produce one reading per configured city and append the batch to the raw
/// store. Returns the number of readings appended.
pub fn tick(config: &Config) -> StoreResult<usize> {
    // ---
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    let readings: Vec<Reading> = config
        .cities
        .iter()
        .map(|city| Reading {
            entity_id: city.name.clone(),
            pollutant_value: rng.gen_range(config.pollutant_min..=config.pollutant_max),
            timestamp: now,
        })
        .collect();

    store::append_readings(&config.raw_store, &readings)?;
    Ok(readings.len())
}

/// Run the generator loop on its fixed interval, forever.
pub async fn run(config: Arc<Config>) {
    // ---
    let mut ticker = tokio::time::interval(config.generator_interval);
    loop {
        ticker.tick().await;
        match tick(&config) {
            Ok(count) => info!(
                "Appended {} readings to {}",
                count,
                config.raw_store.display()
            ),
            Err(e) => error!("Raw store append failed, will retry next tick: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn test_config(dir: &std::path::Path) -> Config {
        // ---
        Config {
            raw_store: dir.join("pollution.csv"),
            derived_store: dir.join("dashboard.csv"),
            ..Config::default()
        }
    }

    #[test]
    fn test_tick_appends_one_reading_per_city() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let count = tick(&config).unwrap();
        assert_eq!(count, config.cities.len());

        let snapshot = store::read_readings(&config.raw_store).unwrap();
        assert_eq!(snapshot.rows.len(), config.cities.len());

        let names: Vec<&str> = snapshot.rows.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(names, vec!["Delhi", "Mumbai", "Kanpur"]);
    }

    #[test]
    fn test_tick_values_stay_in_range() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        for _ in 0..10 {
            tick(&config).unwrap();
        }

        let snapshot = store::read_readings(&config.raw_store).unwrap();
        assert_eq!(snapshot.rows.len(), 10 * config.cities.len());
        for reading in &snapshot.rows {
            assert!(reading.pollutant_value >= config.pollutant_min);
            assert!(reading.pollutant_value <= config.pollutant_max);
        }
    }

    #[test]
    fn test_ticks_accumulate_append_only() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        tick(&config).unwrap();
        let first = store::read_readings(&config.raw_store).unwrap().rows;

        tick(&config).unwrap();
        let second = store::read_readings(&config.raw_store).unwrap().rows;

        // Earlier rows are still there, in their original order
        assert_eq!(second.len(), 2 * first.len());
        for (before, after) in first.iter().zip(second.iter()) {
            assert_eq!(before.entity_id, after.entity_id);
            assert_eq!(before.pollutant_value, after.pollutant_value);
        }
    }
}
