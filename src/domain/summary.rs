use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Numeric measurements keyed by metric name. Partial: a metric the
/// analyzer could not compute is simply absent, never zero.
pub type MetricSample = BTreeMap<String, f64>;

pub const METRIC_ARM_COCK_PEAK_DEG: &str = "arm_cock_peak_deg";
pub const METRIC_ELBOW_EXTENSION_PEAK_DEG: &str = "elbow_extension_peak_deg";
pub const METRIC_TORSO_LEAN_DEG: &str = "torso_lean_deg";
pub const METRIC_PENULTIMATE_LAST_RATIO: &str = "penultimate_last_ratio";
pub const METRIC_JUMP_TIME_S: &str = "jump_time_s";
pub const METRIC_TIME_TO_CONTACT_S: &str = "time_to_contact_s";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_cock_peak_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbow_extension_peak_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torso_lean_deg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penultimate_last_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump_time_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_contact_s: Option<f64>,
}

/// Frame indices of the approach events the analyzer detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFrames {
    pub plant: u32,
    pub max_cm: u32,
    pub takeoff: u32,
    pub apex: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub drill_id: String,
    pub focus: String,
}

/// The summary document written next to the overlay artifact. Every field
/// beyond the message is optional so a stand-in analyzer can emit a valid
/// document without inventing measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub angles: AngleMetrics,
    #[serde(default)]
    pub timing: TimingMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_frames: Option<KeyFrames>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisSummary {
    /// Flatten the present metric fields into a name -> value sample for
    /// the baseline evaluator.
    pub fn metric_sample(&self) -> MetricSample {
        let mut sample = MetricSample::new();
        let mut insert = |name: &str, value: Option<f64>| {
            if let Some(v) = value {
                sample.insert(name.to_string(), v);
            }
        };
        insert(METRIC_ARM_COCK_PEAK_DEG, self.angles.arm_cock_peak_deg);
        insert(
            METRIC_ELBOW_EXTENSION_PEAK_DEG,
            self.angles.elbow_extension_peak_deg,
        );
        insert(METRIC_TORSO_LEAN_DEG, self.angles.torso_lean_deg);
        insert(
            METRIC_PENULTIMATE_LAST_RATIO,
            self.timing.penultimate_last_ratio,
        );
        insert(METRIC_JUMP_TIME_S, self.timing.jump_time_s);
        insert(METRIC_TIME_TO_CONTACT_S, self.timing.time_to_contact_s);
        sample
    }
}
