//! Templated health guidance per risk tier.
//!
//! The dashboard's "AI assistant" is a fixed template keyed on the risk
//! tier; no model call is involved. Kept as data so the advice text stays
//! in one place.

use serde::Serialize;

use crate::models::RiskLevel;

// ---

/// Advice bundle for one risk tier.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Advisory {
    // ---
    pub mask: &'static str,
    pub ventilation: &'static str,
    pub outdoor: &'static str,
    pub route: &'static str,
}

/// Advice for a risk tier.
pub fn for_risk(level: RiskLevel) -> Advisory {
    // ---
    match level {
        RiskLevel::Hazardous => Advisory {
            mask: "Use N95 or KN95 mask.",
            ventilation: "Keep windows closed.",
            outdoor: "Avoid outdoor activity.",
            route: "Avoid high-traffic routes.",
        },
        RiskLevel::VeryUnhealthy => Advisory {
            mask: "Use N95 mask outdoors.",
            ventilation: "Limit natural ventilation.",
            outdoor: "Limit outdoor exposure.",
            route: "Prefer low-traffic routes.",
        },
        RiskLevel::Unhealthy => Advisory {
            mask: "Consider wearing a mask.",
            ventilation: "Avoid peak pollution hours.",
            outdoor: "Reduce prolonged exposure.",
            route: "Choose greener routes.",
        },
        RiskLevel::Moderate => Advisory {
            mask: "Sensitive groups should wear mask.",
            ventilation: "Ventilation acceptable.",
            outdoor: "Short outdoor activity allowed.",
            route: "Normal routes acceptable.",
        },
        RiskLevel::Good => Advisory {
            mask: "Mask not required.",
            ventilation: "Safe ventilation.",
            outdoor: "Outdoor activity safe.",
            route: "All routes safe.",
        },
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::RiskThresholds;

    #[test]
    fn test_advice_tracks_risk_tier() {
        // ---
        assert_eq!(for_risk(RiskLevel::Good).mask, "Mask not required.");
        assert_eq!(for_risk(RiskLevel::Hazardous).mask, "Use N95 or KN95 mask.");
        assert_eq!(
            for_risk(RiskLevel::VeryUnhealthy).route,
            "Prefer low-traffic routes."
        );
    }

    #[test]
    fn test_advice_composes_with_classification() {
        // ---
        let thresholds = RiskThresholds::default();
        let advisory = for_risk(thresholds.classify(320.0));
        assert_eq!(advisory.outdoor, "Avoid outdoor activity.");

        let advisory = for_risk(thresholds.classify(42.0));
        assert_eq!(advisory.outdoor, "Outdoor activity safe.");
    }
}
