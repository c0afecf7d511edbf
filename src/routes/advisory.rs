use std::sync::Arc;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::advisory::{self, Advisory};
use crate::config::Config;
use crate::models::DerivedReading;
use crate::routes::latest_per_entity;
use crate::store;

// ---

pub fn router() -> Router<Arc<Config>> {
    // ---
    Router::new().route("/advisory", get(handler))
}

/// Query parameters for the advisory endpoint. `entity_id` names a city
/// directly; `question` is free text scanned for a configured city name
/// ("Is it safe in Delhi?"). With neither, the first city with data is used.
#[derive(Debug, Deserialize)]
pub struct AdvisoryQuery {
    entity_id: Option<String>,
    question: Option<String>,
}

/// JSON response body for the `/advisory` endpoint.
#[derive(Debug, Serialize)]
struct AdvisoryResponse {
    entity_id: String,
    pollutant_value: f64,
    risk_level: String,
    advice: Advisory,
}

async fn handler(
    Query(params): Query<AdvisoryQuery>,
    State(config): State<Arc<Config>>,
) -> impl IntoResponse {
    // ---
    debug!("GET /advisory - {:?}", params);

    let snapshot = match store::read_derived(&config.derived_store) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to read derived store: {}", e);
            return waiting_response();
        }
    };

    let latest = latest_per_entity(snapshot.rows);
    if latest.is_empty() {
        return waiting_response();
    }

    let Some(row) = select_city(&latest, &params, &config) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No readings for that city yet" })),
        )
            .into_response();
    };

    let response = AdvisoryResponse {
        entity_id: row.entity_id.clone(),
        pollutant_value: row.pollutant_value,
        risk_level: row.risk_level.to_string(),
        advice: advisory::for_risk(row.risk_level),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// The dashboard renders this as its neutral waiting indicator.
fn waiting_response() -> axum::response::Response {
    // ---
    (
        StatusCode::OK,
        Json(json!({ "status": "waiting for data" })),
    )
        .into_response()
}

/// Resolve which city the request is about.
fn select_city<'a>(
    latest: &'a [DerivedReading],
    params: &AdvisoryQuery,
    config: &Config,
) -> Option<&'a DerivedReading> {
    // ---
    if let Some(entity_id) = &params.entity_id {
        return latest
            .iter()
            .find(|r| r.entity_id.eq_ignore_ascii_case(entity_id));
    }

    if let Some(question) = &params.question {
        let question = question.to_lowercase();
        for city in &config.cities {
            if question.contains(&city.name.to_lowercase()) {
                return latest.iter().find(|r| r.entity_id == city.name);
            }
        }
    }

    latest.first()
}
