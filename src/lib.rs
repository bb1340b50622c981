// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod assessment;
pub mod chatbot;
pub mod config;
pub mod estimator;
pub mod history;
pub mod metrics;
pub mod profile;

// ---- Re-exports for stable public API ----
// Convenient router access: `crate_root::api::router` and `crate_root::router`
pub use crate::api::{router, AppState};
pub use crate::assessment::{ConditionLabel, RiskAssessment, RiskTier};
pub use crate::estimator::{Estimator, Strategy};
pub use crate::profile::DemographicProfile;
