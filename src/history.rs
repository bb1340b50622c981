//! history.rs — bounded in-memory log of recent assessments for the debug
//! endpoints. Fingerprints only, no profile data, no persistence.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assessment::{RiskAssessment, RiskTier};

#[derive(Debug, Clone)]
pub struct AssessmentEntry {
    pub ts_unix: u64,
    pub tier: RiskTier,
    pub prevalence: f64,
    pub confidence: f64,
    pub condition: &'static str,
}

#[derive(Debug)]
pub struct AssessmentHistory {
    inner: Mutex<Vec<AssessmentEntry>>,
    cap: usize,
}

impl AssessmentHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, a: &RiskAssessment) {
        let entry = AssessmentEntry {
            ts_unix: now_unix(),
            tier: a.tier,
            prevalence: a.prevalence,
            confidence: a.confidence,
            condition: a.condition.name,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<AssessmentEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
