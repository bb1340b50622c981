//! Demographic input record submitted by the assessment form.
//!
//! Every field is a free-form categorical string matched against the factor
//! tables. Missing fields deserialize to the empty string, and an empty or
//! unrecognized value is simply neutral for scoring — never an error. The
//! whole record is echoed back as `user_inputs` in the prediction response.

use serde::{Deserialize, Serialize};

/// Field names in the order the factor adjustments are applied.
/// `indicator` is handled separately (it selects the base rate).
pub const FACTOR_FIELDS: [&str; 10] = [
    "age_group",
    "sex",
    "race_ethnicity",
    "education",
    "disability",
    "gender_identity",
    "sexual_orientation",
    "marital_status",
    "employment",
    "state",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicProfile {
    #[serde(default)]
    pub indicator: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub race_ethnicity: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub disability: String,
    #[serde(default)]
    pub gender_identity: String,
    #[serde(default)]
    pub sexual_orientation: String,
    #[serde(default)]
    pub marital_status: String,
    #[serde(default)]
    pub employment: String,
    #[serde(default)]
    pub state: String,
}

impl DemographicProfile {
    /// Value of a factor field by name; unknown names yield an empty string
    /// (neutral downstream).
    pub fn field(&self, name: &str) -> &str {
        match name {
            "age_group" => &self.age_group,
            "sex" => &self.sex,
            "race_ethnicity" => &self.race_ethnicity,
            "education" => &self.education,
            "disability" => &self.disability,
            "gender_identity" => &self.gender_identity,
            "sexual_orientation" => &self.sexual_orientation,
            "marital_status" => &self.marital_status,
            "employment" => &self.employment,
            "state" => &self.state,
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let p: DemographicProfile =
            serde_json::from_str(r#"{ "indicator": "Symptoms of Anxiety Disorder" }"#)
                .expect("partial profile parses");
        assert_eq!(p.indicator, "Symptoms of Anxiety Disorder");
        assert_eq!(p.age_group, "");
        assert_eq!(p.disability, "");
    }

    #[test]
    fn field_lookup_covers_all_factor_fields() {
        let mut p = DemographicProfile::default();
        p.sex = "Female".into();
        p.state = "Utah".into();
        assert_eq!(p.field("sex"), "Female");
        assert_eq!(p.field("state"), "Utah");
        for name in FACTOR_FIELDS {
            // No factor field panics and unknown names stay neutral.
            let _ = p.field(name);
        }
        assert_eq!(p.field("no_such_field"), "");
    }

    #[test]
    fn round_trips_all_fields() {
        let p = DemographicProfile {
            indicator: "Symptoms of Depressive Disorder".into(),
            age_group: "30 - 39 years".into(),
            sex: "Male".into(),
            race_ethnicity: "Hispanic or Latino".into(),
            education: "High school diploma or GED".into(),
            disability: "With disability".into(),
            gender_identity: "Transgender".into(),
            sexual_orientation: "Bisexual".into(),
            marital_status: "Married".into(),
            employment: "Employed".into(),
            state: "Kentucky".into(),
        };
        let v = serde_json::to_value(&p).expect("serialize");
        let back: DemographicProfile = serde_json::from_value(v).expect("deserialize");
        assert_eq!(p, back);
    }
}
