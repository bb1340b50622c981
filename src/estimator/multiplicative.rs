//! # Multiplicative Strategy
//! Pure, testable logic that maps `(profile, tables)` → `RiskAssessment`.
//! The only non-determinism is the injected RNG (jitter + confidence draw),
//! so a seeded generator reproduces results exactly.
//!
//! Policy: start from the indicator base rate, apply the factor tables in a
//! fixed field order, jitter, clamp to [8, 65], then derive tier, condition
//! and recommendation from the clamped value.

use rand::Rng;

use crate::assessment::RiskAssessment;
use crate::estimator::factors::FactorTables;
use crate::estimator::{CONFIDENCE_MAX, CONFIDENCE_MIN, JITTER_SPAN};
use crate::profile::{DemographicProfile, FACTOR_FIELDS};

pub const PREVALENCE_FLOOR: f64 = 8.0;
pub const PREVALENCE_CEILING: f64 = 65.0;

/// Rate before jitter and clamping. Exposed so the adjustment chain itself
/// stays testable without fixing a seed.
pub fn pre_jitter_rate(profile: &DemographicProfile, tables: &FactorTables) -> f64 {
    let mut rate = tables.base_rate(&profile.indicator);
    for field in FACTOR_FIELDS {
        rate *= tables.multiplier(field, profile.field(field));
    }
    rate
}

/// Full assessment with the two random draws taken from `rng`.
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
