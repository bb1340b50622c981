// src/estimator/mod.rs
//! Scoring pipeline entry: strategy selection and the stateful estimator rim
//! around the pure scoring functions.

pub mod additive;
pub mod factors;
pub mod multiplicative;

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assessment::RiskAssessment;
use crate::profile::DemographicProfile;

// Re-export convenient types.
pub use factors::{FactorHandle, FactorTables};

/// Uniform jitter half-width in percentage points, shared by both strategies.
pub const JITTER_SPAN: f64 = 2.0;
/// Confidence is sampled uniformly from [92, 98).
pub const CONFIDENCE_MIN: f64 = 92.0;
pub const CONFIDENCE_MAX: f64 = 98.0;

/// Which scoring formula serves `/predict`. Selected by configuration, never
/// by deployment layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Multiplicative,
    Additive,
}

impl Strategy {
    /// Parse a config/env value. Unknown strings fall back to the default
    /// with a warning, consistent with the permissive-input policy.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiplicative" => Strategy::Multiplicative,
            "additive" => Strategy::Additive,
            "" => Strategy::default(),
            other => {
                warn!(value = other, "unknown scoring strategy, using default");
                Strategy::default()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Multiplicative => "multiplicative",
            Strategy::Additive => "additive",
        }
    }
}

/// The strategy seam: both formulas honor the same
/// `DemographicProfile → RiskAssessment` contract.
pub trait ScoringStrategy: Send + Sync {
    fn assess(
        &self,
        profile: &DemographicProfile,
        tables: &FactorTables,
        rng: &mut dyn RngCore,
    ) -> RiskAssessment;
}

pub struct MultiplicativeStrategy;

impl ScoringStrategy for MultiplicativeStrategy {
    fn assess(
        &self,
        profile: &DemographicProfile,
        tables: &FactorTables,
        rng: &mut dyn RngCore,
    ) -> RiskAssessment {
        multiplicative::assess(profile, tables, rng)
    }
}

pub struct AdditiveStrategy;

impl ScoringStrategy for AdditiveStrategy {
    fn assess(
        &self,
        profile: &DemographicProfile,
        tables: &FactorTables,
        rng: &mut dyn RngCore,
    ) -> RiskAssessment {
        additive::assess(profile, tables, rng)
    }
}

/// Stateful rim: owns the RNG so handlers stay oblivious to randomness.
/// Seeding it makes the whole service deterministic, which the tests use.
pub struct Estimator {
    strategy: Strategy,
    scorer: Box<dyn ScoringStrategy>,
    rng: Mutex<StdRng>,
}

impl Estimator {
    pub fn new(strategy: Strategy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let scorer: Box<dyn ScoringStrategy> = match strategy {
            Strategy::Multiplicative => Box::new(MultiplicativeStrategy),
            Strategy::Additive => Box::new(AdditiveStrategy),
        };
        Self {
            strategy,
            scorer,
            rng: Mutex::new(rng),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn assess(&self, profile: &DemographicProfile, tables: &FactorTables) -> RiskAssessment {
        let mut rng = self.rng.lock().expect("estimator rng poisoned");
        self.scorer.assess(profile, tables, &mut *rng)
    }

    /// Assess with a caller-provided RNG, bypassing the internal one.
    pub fn assess_with_rng<R: Rng + ?Sized>(
        &self,
        profile: &DemographicProfile,
        tables: &FactorTables,
        rng: &mut R,
    ) -> RiskAssessment {
        match self.strategy {
            Strategy::Multiplicative => multiplicative::assess(profile, tables, rng),
            Strategy::Additive => additive::assess(profile, tables, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parsing_is_permissive() {
        assert_eq!(
            Strategy::parse_or_default("multiplicative"),
            Strategy::Multiplicative
        );
        assert_eq!(Strategy::parse_or_default("ADDITIVE"), Strategy::Additive);
        assert_eq!(Strategy::parse_or_default(" additive "), Strategy::Additive);
        assert_eq!(
            Strategy::parse_or_default("bayesian"),
            Strategy::Multiplicative
        );
        assert_eq!(Strategy::parse_or_default(""), Strategy::Multiplicative);
    }

    #[test]
    fn seeded_estimator_is_deterministic() {
        let tables = FactorTables::embedded();
        let profile = DemographicProfile {
            indicator: "Symptoms of Anxiety Disorder".into(),
            age_group: "18 - 29 years".into(),
            sex: "Female".into(),
            ..Default::default()
        };
        let a = Estimator::new(Strategy::Multiplicative, Some(42)).assess(&profile, &tables);
        let b = Estimator::new(Strategy::Multiplicative, Some(42)).assess(&profile, &tables);
        assert_eq!(a, b);
    }

    #[test]
    fn strategies_disagree_on_scale() {
        // A stacked profile saturates both clamps; the ceilings differ, which
        // is exactly why the strategies must not be conflated.
        let tables = FactorTables::embedded();
        let profile = DemographicProfile {
            indicator: "Symptoms of Anxiety Disorder or Depressive Disorder".into(),
            age_group: "18 - 29 years".into(),
            disability: "With disability".into(),
            gender_identity: "Transgender".into(),
            sexual_orientation: "Bisexual".into(),
            employment: "Unemployed".into(),
            ..Default::default()
        };
        let m = Estimator::new(Strategy::Multiplicative, Some(1)).assess(&profile, &tables);
        let a = Estimator::new(Strategy::Additive, Some(1)).assess(&profile, &tables);
        assert!((m.prevalence - 65.0).abs() < 1e-9);
        assert!((a.prevalence - 45.0).abs() < 1e-9);
    }
}
