use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::MetricSample;

/// Inclusive acceptable range for one metric, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineRange(pub f64, pub f64);

impl BaselineRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }
}

/// Named set of acceptable ranges per metric.
pub type BaselineProfile = BTreeMap<String, BaselineRange>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    Within,
    Close,
    NeedsWork,
}

impl BaselineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineStatus::Within => "within",
            BaselineStatus::Close => "close",
            BaselineStatus::NeedsWork => "needs work",
        }
    }
}

impl fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a single value against a range. Values outside the range but
/// inside a 10%-of-width margin on either side are `Close`.
pub fn baseline_status(value: f64, range: BaselineRange) -> BaselineStatus {
    let (min, max) = (range.min(), range.max());
    if value >= min && value <= max {
        return BaselineStatus::Within;
    }
    let margin = (max - min) * 0.1;
    if value >= min - margin && value <= max + margin {
        return BaselineStatus::Close;
    }
    BaselineStatus::NeedsWork
}

/// Evaluate a metric sample against a profile. Iteration is driven by the
/// profile: metrics absent from either side are omitted from the result.
pub fn evaluate(sample: &MetricSample, profile: &BaselineProfile) -> BTreeMap<String, BaselineStatus> {
    let mut result = BTreeMap::new();
    for (name, range) in profile {
        if let Some(value) = sample.get(name) {
            result.insert(name.clone(), baseline_status(*value, *range));
        }
    }
    result
}

/// Reference data: named baseline profiles, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineProfiles {
    profiles: BTreeMap<String, BaselineProfile>,
}

impl BaselineProfiles {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let profiles: BTreeMap<String, BaselineProfile> = serde_json::from_str(json)?;
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Option<&BaselineProfile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Built-in cohort presets used when no baselines file is configured.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();

        let mut club = BaselineProfile::new();
        club.insert("arm_cock_peak_deg".into(), BaselineRange(115.0, 160.0));
        club.insert("elbow_extension_peak_deg".into(), BaselineRange(150.0, 180.0));
        club.insert("torso_lean_deg".into(), BaselineRange(0.0, 18.0));
        club.insert("penultimate_last_ratio".into(), BaselineRange(1.2, 1.8));
        club.insert("jump_time_s".into(), BaselineRange(0.25, 0.5));
        club.insert("time_to_contact_s".into(), BaselineRange(0.5, 0.95));
        profiles.insert("club_indoor".to_string(), club);

        let mut elite = BaselineProfile::new();
        elite.insert("arm_cock_peak_deg".into(), BaselineRange(125.0, 160.0));
        elite.insert("elbow_extension_peak_deg".into(), BaselineRange(160.0, 180.0));
        elite.insert("torso_lean_deg".into(), BaselineRange(0.0, 12.0));
        elite.insert("penultimate_last_ratio".into(), BaselineRange(1.3, 1.8));
        elite.insert("jump_time_s".into(), BaselineRange(0.3, 0.5));
        elite.insert("time_to_contact_s".into(), BaselineRange(0.55, 0.9));
        profiles.insert("elite_indoor".to_string(), elite);

        Self { profiles }
    }
}
