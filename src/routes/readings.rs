use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::DerivedReading;
use crate::store;

// ---

pub fn router() -> Router<Arc<Config>> {
    // ---
    Router::new().route("/readings", get(handler))
}

/// Dashboard-facing row: a derived reading joined with the city's map
/// position from configuration. Coordinates are absent for entities not in
/// the configured city set.
#[derive(Debug, Serialize)]
pub struct ReadingRow {
    // ---
    #[serde(flatten)]
    pub reading: DerivedReading,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

async fn handler(
    Query(params): Query<ReadingsQuery>,
    State(config): State<Arc<Config>>,
) -> impl IntoResponse {
    // ---
    debug!("GET /readings - {:?}", params);

    // The dashboard treats an empty list as its waiting state, so a store
    // that is missing or momentarily unreadable returns 200 with no rows
    // rather than an error page.
    let snapshot = match store::read_derived(&config.derived_store) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to read derived store: {}", e);
            return (StatusCode::OK, Json(Vec::<ReadingRow>::new())).into_response();
        }
    };
    if snapshot.skipped > 0 {
        info!(
            "Skipped {} malformed rows in {}",
            snapshot.skipped,
            config.derived_store.display()
        );
    }

    let filtered = apply_filters(snapshot.rows, &params);
    info!("GET /readings - returning {} rows", filtered.len());

    let rows: Vec<ReadingRow> = filtered
        .into_iter()
        .map(|reading| {
            let coords = config.cities.iter().find(|c| c.name == reading.entity_id);
            ReadingRow {
                lat: coords.map(|c| c.lat),
                lon: coords.map(|c| c.lon),
                reading,
            }
        })
        .collect();

    (StatusCode::OK, Json(rows)).into_response()
}

// ---

/// Query parameters for filtering derived readings
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    entity_id: Option<String>,
    /// Keep only the most recent row per entity.
    latest: Option<bool>,
    limit: Option<u32>,
}

/// Apply query filters to derived readings
fn apply_filters(rows: Vec<DerivedReading>, params: &ReadingsQuery) -> Vec<DerivedReading> {
    // ---
    let rows: Vec<DerivedReading> = rows
        .into_iter()
        .filter(|r| {
            params
                .entity_id
                .as_ref()
                .map_or(true, |id| &r.entity_id == id)
        })
        .collect();

    let rows = if params.latest.unwrap_or(false) {
        latest_per_entity(rows)
    } else {
        rows
    };

    rows.into_iter()
        .take(params.limit.unwrap_or(1000) as usize)
        .collect()
}

/// Keep the most recent row per entity (by timestamp), preserving the order
/// in which entities first appeared.
pub fn latest_per_entity(rows: Vec<DerivedReading>) -> Vec<DerivedReading> {
    // ---
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, DerivedReading> = HashMap::new();

    for row in rows {
        match best.get(&row.entity_id) {
            Some(current) if current.timestamp >= row.timestamp => {}
            Some(_) => {
                best.insert(row.entity_id.clone(), row);
            }
            None => {
                order.push(row.entity_id.clone());
                best.insert(row.entity_id.clone(), row);
            }
        }
    }

    order.into_iter().filter_map(|id| best.remove(&id)).collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{Reading, RiskThresholds, RouteOffsets};
    use chrono::{TimeZone, Utc};

    fn derived(entity: &str, value: f64, minute: u32) -> DerivedReading {
        // ---
        Reading {
            entity_id: entity.to_string(),
            pollutant_value: value,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 11, minute, 0).unwrap(),
        }
        .to_derived(&RiskThresholds::default(), &RouteOffsets::default())
    }

    #[test]
    fn test_entity_filter() {
        // ---
        let rows = vec![derived("Delhi", 320.0, 0), derived("Mumbai", 90.0, 0)];
        let params = ReadingsQuery {
            entity_id: Some("Delhi".to_string()),
            latest: None,
            limit: None,
        };

        let filtered = apply_filters(rows, &params);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entity_id, "Delhi");
    }

    #[test]
    fn test_limit() {
        // ---
        let rows = vec![
            derived("Delhi", 100.0, 0),
            derived("Delhi", 110.0, 1),
            derived("Delhi", 120.0, 2),
        ];
        let params = ReadingsQuery {
            entity_id: None,
            latest: None,
            limit: Some(2),
        };

        assert_eq!(apply_filters(rows, &params).len(), 2);
    }

    #[test]
    fn test_latest_per_entity() {
        // ---
        let rows = vec![
            derived("Delhi", 320.0, 0),
            derived("Mumbai", 90.0, 1),
            derived("Delhi", 75.0, 2),
        ];

        let latest = latest_per_entity(rows);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].entity_id, "Delhi");
        assert_eq!(latest[0].pollutant_value, 75.0);
        assert_eq!(latest[1].entity_id, "Mumbai");
    }

    #[test]
    fn test_latest_keeps_earlier_row_on_equal_timestamps() {
        // ---
        let rows = vec![derived("Delhi", 320.0, 0), derived("Delhi", 75.0, 0)];

        let latest = latest_per_entity(rows);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].pollutant_value, 320.0);
    }
}
