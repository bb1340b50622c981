//! # Additive Strategy
//! The fallback formula: a fixed base rate plus per-factor deltas, clamped to
//! a narrower [5, 45] band. Same tier thresholds, labels and confidence draw
//! as the multiplicative strategy; the two deliberately disagree on scale and
//! must never be mixed within one response.

use rand::Rng;

use crate::assessment::RiskAssessment;
use crate::estimator::factors::FactorTables;
use crate::estimator::{CONFIDENCE_MAX, CONFIDENCE_MIN, JITTER_SPAN};
use crate::profile::{DemographicProfile, FACTOR_FIELDS};

pub const PREVALENCE_FLOOR: f64 = 5.0;
pub const PREVALENCE_CEILING: f64 = 45.0;

/// Rate before jitter and clamping: base + indicator delta + field deltas.
pub fn pre_jitter_rate(profile: &DemographicProfile, tables: &FactorTables) -> f64 {
    let mut rate = tables.additive_base() + tables.delta("indicator", &profile.indicator);
    for field in FACTOR_FIELDS {
        rate += tables.delta(field, profile.field(field));
    }
    rate
}

pub fn assess<R: Rng + ?Sized>(
    profile: &DemographicProfile,
    tables: &FactorTables,
    rng: &mut R,
) -> RiskAssessment {
    let rate = pre_jitter_rate(profile, tables);
    let jitter: f64 = rng.random_range(-JITTER_SPAN..=JITTER_SPAN);
    let prevalence = (rate + jitter).clamp(PREVALENCE_FLOOR, PREVALENCE_CEILING);
    let confidence: f64 = rng.random_range(CONFIDENCE_MIN..CONFIDENCE_MAX);
    RiskAssessment::from_parts(prevalence, confidence, &profile.indicator)
}
