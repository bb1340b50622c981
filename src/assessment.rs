//! assessment.rs — Output types for a single risk computation.
//!
//! A `RiskAssessment` is request-scoped and immutable: prevalence percentage,
//! the tier derived from it, a cosmetic confidence figure, the condition label
//! resolved from the assessment indicator, and the templated recommendation.

use serde::{Deserialize, Serialize};

/// Risk tier derived solely from the clamped prevalence value.
/// Boundaries: <15 Low, <25 Moderate, else High (inclusive-low, exclusive-high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub const LOW_CEILING: f64 = 15.0;
    pub const MODERATE_CEILING: f64 = 25.0;

    pub fn from_prevalence(prevalence: f64) -> Self {
        if prevalence < Self::LOW_CEILING {
            RiskTier::Low
        } else if prevalence < Self::MODERATE_CEILING {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    /// Display form used as `risk_level` on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }

    /// Lowercase form used as `risk_class` (the client styles badges with it).
    pub fn css_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }
}

/// Condition naming resolved from the assessment indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionLabel {
    /// Short name interpolated into recommendations ("anxiety", "depression", ...).
    pub name: &'static str,
    /// Longer display form ("anxiety disorder", ...).
    pub display: &'static str,
}

impl ConditionLabel {
    /// Substring rules: a "Depressive Disorder" indicator without "Anxiety"
    /// means depression, "Anxiety Disorder" without "Depressive" means
    /// anxiety, anything else (including unknown indicators) is the combined
    /// label.
    pub fn from_indicator(indicator: &str) -> Self {
        if indicator.contains("Depressive Disorder") && !indicator.contains("Anxiety") {
            Self {
                name: "depression",
                display: "depressive disorder",
            }
        } else if indicator.contains("Anxiety Disorder") && !indicator.contains("Depressive") {
            Self {
                name: "anxiety",
                display: "anxiety disorder",
            }
        } else {
            Self {
                name: "anxiety or depression",
                display: "anxiety or depressive disorder",
            }
        }
    }
}

/// Recommendation sentence for a tier, with the condition name interpolated.
pub fn recommendation_for(tier: RiskTier, condition: &ConditionLabel) -> String {
    match tier {
        RiskTier::Low => format!(
            "Your demographic group shows relatively lower prevalence of {} symptoms \
             compared to the general population. However, continue monitoring your \
             mental health and practice good self-care.",
            condition.name
        ),
        RiskTier::Moderate => format!(
            "Your demographic group shows moderate prevalence of {} symptoms. If you're \
             experiencing any concerning symptoms, we encourage you to speak with a \
             healthcare professional for personalized guidance.",
            condition.name
        ),
        RiskTier::High => format!(
            "Your demographic group shows higher prevalence of {} symptoms. This means a \
             significant portion of people with similar demographics experience these \
             conditions. If you have any symptoms or concerns, we strongly recommend \
             consulting with a mental health professional.",
            condition.name
        ),
    }
}

/// Complete result of one estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Clamped prevalence percentage.
    pub prevalence: f64,
    pub tier: RiskTier,
    /// Cosmetic confidence in [92, 98); not derived from the inputs.
    pub confidence: f64,
    pub condition: ConditionLabel,
    pub recommendation: String,
}

impl RiskAssessment {
    /// Assemble the derived parts from a clamped prevalence and an indicator.
    pub fn from_parts(prevalence: f64, confidence: f64, indicator: &str) -> Self {
        let tier = RiskTier::from_prevalence(prevalence);
        let condition = ConditionLabel::from_indicator(indicator);
        let recommendation = recommendation_for(tier, &condition);
        Self {
            prevalence,
            tier,
            confidence,
            condition,
            recommendation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_low_exclusive_high() {
        assert_eq!(RiskTier::from_prevalence(8.0), RiskTier::Low);
        assert_eq!(RiskTier::from_prevalence(14.999), RiskTier::Low);
        assert_eq!(RiskTier::from_prevalence(15.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_prevalence(24.999), RiskTier::Moderate);
        assert_eq!(RiskTier::from_prevalence(25.0), RiskTier::High);
        assert_eq!(RiskTier::from_prevalence(65.0), RiskTier::High);
    }

    #[test]
    fn condition_label_substring_rules() {
        let dep = ConditionLabel::from_indicator("Symptoms of Depressive Disorder");
        assert_eq!(dep.name, "depression");
        let anx = ConditionLabel::from_indicator("Symptoms of Anxiety Disorder");
        assert_eq!(anx.name, "anxiety");
        let both = ConditionLabel::from_indicator(
            "Symptoms of Anxiety Disorder or Depressive Disorder",
        );
        assert_eq!(both.name, "anxiety or depression");
        // Unknown indicators get the combined label, consistent with the
        // permissive-input policy.
        let odd = ConditionLabel::from_indicator("Something else entirely");
        assert_eq!(odd.display, "anxiety or depressive disorder");
    }

    #[test]
    fn recommendation_mentions_condition_name() {
        let c = ConditionLabel::from_indicator("Symptoms of Anxiety Disorder");
        for tier in [RiskTier::Low, RiskTier::Moderate, RiskTier::High] {
            let r = recommendation_for(tier, &c);
            assert!(r.contains("anxiety"), "tier {:?}: {}", tier, r);
        }
    }

    #[test]
    fn serialize_assessment_shape() {
        let a = RiskAssessment::from_parts(26.4, 94.2, "Symptoms of Anxiety Disorder");
        let v = serde_json::to_value(&a).expect("serialize");
        assert_eq!(v["tier"], serde_json::json!("High"));
        assert_eq!(v["condition"]["name"], serde_json::json!("anxiety"));
        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 94.2).abs() < 1e-9);
    }
}
