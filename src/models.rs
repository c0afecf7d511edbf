//! Data models for the pollution pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Route names in declaration order. An exact tie between route scores
/// resolves to the earliest entry here.
pub const ROUTE_NAMES: [&str; 3] = ["Route A", "Route B", "Route C"];

/// Raw pollution reading as appended by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub entity_id: String,
    pub pollutant_value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Health-risk tier derived from a pollutant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    // ---
    Good,
    Moderate,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ---
        let label = match self {
            RiskLevel::Good => "Good",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Unhealthy => "Unhealthy",
            RiskLevel::VeryUnhealthy => "Very Unhealthy",
            RiskLevel::Hazardous => "Hazardous",
        };
        f.write_str(label)
    }
}

/// Risk-classification thresholds. A value equal to a threshold falls into
/// the band below it (strict `>` at every boundary).
///
/// Must be strictly ascending; `Config` validates this at startup.
#[derive(Debug, Clone)]
pub struct RiskThresholds {
    // ---
    pub moderate: f64,
    pub unhealthy: f64,
    pub very_unhealthy: f64,
    pub hazardous: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate: 100.0,
            unhealthy: 150.0,
            very_unhealthy: 200.0,
            hazardous: 300.0,
        }
    }
}

impl RiskThresholds {
    /// Classify a pollutant value into its risk tier.
    ///
    /// Total over all finite values; every value maps to exactly one tier.
    pub fn classify(&self, value: f64) -> RiskLevel {
        // ---
        if value > self.hazardous {
            RiskLevel::Hazardous
        } else if value > self.very_unhealthy {
            RiskLevel::VeryUnhealthy
        } else if value > self.unhealthy {
            RiskLevel::Unhealthy
        } else if value > self.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Good
        }
    }
}

/// Fixed additive offsets applied to the pollutant value to estimate the
/// exposure on each named route.
#[derive(Debug, Clone)]
pub struct RouteOffsets {
    // ---
    pub route_a: f64,
    pub route_b: f64,
    pub route_c: f64,
}

impl Default for RouteOffsets {
    fn default() -> Self {
        Self {
            route_a: 20.0,
            route_b: -30.0,
            route_c: 10.0,
        }
    }
}

/// Derived reading published to the dashboard store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedReading {
    // ---
    pub entity_id: String,
    pub pollutant_value: f64,
    pub timestamp: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub route_a: f64,
    pub route_b: f64,
    pub route_c: f64,
    pub best_route: String,
}

impl DerivedReading {
    /// Route scores keyed by route name, in declaration order.
    pub fn route_scores(&self) -> [(&'static str, f64); 3] {
        // ---
        [
            (ROUTE_NAMES[0], self.route_a),
            (ROUTE_NAMES[1], self.route_b),
            (ROUTE_NAMES[2], self.route_c),
        ]
    }
}

/// Derivation from raw reading to dashboard row
impl Reading {
    // ---
    pub fn to_derived(&self, thresholds: &RiskThresholds, offsets: &RouteOffsets) -> DerivedReading {
        // ---
        let risk_level = thresholds.classify(self.pollutant_value);

        let route_a = self.pollutant_value + offsets.route_a;
        let route_b = self.pollutant_value + offsets.route_b;
        let route_c = self.pollutant_value + offsets.route_c;

        let best_route = best_route(route_a, route_b, route_c).to_string();

        DerivedReading {
            entity_id: self.entity_id.clone(),
            pollutant_value: self.pollutant_value,
            timestamp: self.timestamp,
            risk_level,
            route_a,
            route_b,
            route_c,
            best_route,
        }
    }
}

/// Pick the route with the lowest exposure score. Strict `<` keeps the
/// earliest route in declaration order on an exact tie.
fn best_route(route_a: f64, route_b: f64, route_c: f64) -> &'static str {
    // ---
    let scores = [route_a, route_b, route_c];
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score < scores[best] {
            best = i;
        }
    }
    ROUTE_NAMES[best]
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_test_reading(value: f64) -> Reading {
        // ---
        Reading {
            entity_id: "Delhi".to_string(),
            pollutant_value: value,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_risk_classification_bands() {
        // ---
        let t = RiskThresholds::default();

        assert_eq!(t.classify(0.0), RiskLevel::Good);
        assert_eq!(t.classify(50.0), RiskLevel::Good);
        assert_eq!(t.classify(120.0), RiskLevel::Moderate);
        assert_eq!(t.classify(180.0), RiskLevel::Unhealthy);
        assert_eq!(t.classify(250.0), RiskLevel::VeryUnhealthy);
        assert_eq!(t.classify(450.0), RiskLevel::Hazardous);
    }

    #[test]
    fn test_risk_classification_boundaries() {
        // ---
        let t = RiskThresholds::default();

        // A threshold value itself falls into the band below it
        assert_eq!(t.classify(100.0), RiskLevel::Good);
        assert_eq!(t.classify(100.0001), RiskLevel::Moderate);

        assert_eq!(t.classify(150.0), RiskLevel::Moderate);
        assert_eq!(t.classify(150.0001), RiskLevel::Unhealthy);

        assert_eq!(t.classify(200.0), RiskLevel::Unhealthy);
        assert_eq!(t.classify(200.0001), RiskLevel::VeryUnhealthy);

        assert_eq!(t.classify(300.0), RiskLevel::VeryUnhealthy);
        assert_eq!(t.classify(300.0001), RiskLevel::Hazardous);
    }

    #[test]
    fn test_risk_classification_deterministic() {
        // ---
        let t = RiskThresholds::default();
        for v in [0.0, 99.9, 100.0, 151.0, 225.5, 300.0, 1000.0] {
            assert_eq!(t.classify(v), t.classify(v));
        }
    }

    #[test]
    fn test_route_scores_from_offsets() {
        // ---
        let raw = create_test_reading(320.0);
        let derived = raw.to_derived(&RiskThresholds::default(), &RouteOffsets::default());

        assert_eq!(derived.risk_level, RiskLevel::Hazardous);
        assert_eq!(derived.route_a, 340.0);
        assert_eq!(derived.route_b, 290.0);
        assert_eq!(derived.route_c, 330.0);
        assert_eq!(derived.best_route, "Route B");
    }

    #[test]
    fn test_route_derivation_is_pure() {
        // ---
        let raw = create_test_reading(222.0);
        let a = raw.to_derived(&RiskThresholds::default(), &RouteOffsets::default());
        let b = raw.to_derived(&RiskThresholds::default(), &RouteOffsets::default());

        assert_eq!(a.route_a, b.route_a);
        assert_eq!(a.route_b, b.route_b);
        assert_eq!(a.route_c, b.route_c);
        assert_eq!(a.best_route, b.best_route);
    }

    #[test]
    fn test_best_route_tie_break() {
        // ---
        // Identical offsets tie all three scores; declaration order wins
        let offsets = RouteOffsets {
            route_a: 5.0,
            route_b: 5.0,
            route_c: 5.0,
        };
        let derived = create_test_reading(80.0).to_derived(&RiskThresholds::default(), &offsets);
        assert_eq!(derived.best_route, "Route A");

        // A two-way tie between B and C also resolves by declaration order
        let offsets = RouteOffsets {
            route_a: 10.0,
            route_b: -5.0,
            route_c: -5.0,
        };
        let derived = create_test_reading(80.0).to_derived(&RiskThresholds::default(), &offsets);
        assert_eq!(derived.best_route, "Route B");
    }

    #[test]
    fn test_best_route_is_a_known_route() {
        // ---
        for v in [0.0, 75.0, 160.0, 320.0] {
            let derived = create_test_reading(v)
                .to_derived(&RiskThresholds::default(), &RouteOffsets::default());
            assert!(ROUTE_NAMES.contains(&derived.best_route.as_str()));

            let scores = derived.route_scores();
            let min = scores.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
            let (_, best_score) = scores
                .iter()
                .find(|(name, _)| *name == derived.best_route)
                .unwrap();
            assert_eq!(*best_score, min);
        }
    }

    #[test]
    fn test_data_preservation() {
        // ---
        let raw = create_test_reading(210.0);
        let derived = raw.to_derived(&RiskThresholds::default(), &RouteOffsets::default());

        assert_eq!(derived.entity_id, "Delhi");
        assert_eq!(derived.pollutant_value, 210.0);
        assert_eq!(derived.timestamp, raw.timestamp);
    }

    #[test]
    fn test_risk_level_serializes_with_spaces() {
        // ---
        let json = serde_json::to_string(&RiskLevel::VeryUnhealthy).unwrap();
        assert_eq!(json, "\"Very Unhealthy\"");

        let back: RiskLevel = serde_json::from_str("\"Very Unhealthy\"").unwrap();
        assert_eq!(back, RiskLevel::VeryUnhealthy);

        assert_eq!(RiskLevel::VeryUnhealthy.to_string(), "Very Unhealthy");
    }
}
