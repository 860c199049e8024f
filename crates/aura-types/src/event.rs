use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::reading::SensorReading;
use crate::temporal::Timestamp;

/// Broad classification of a health event.
///
/// The set is open: producers may send labels outside the known variants,
/// which are carried verbatim in [`AnomalyClass::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnomalyClass {
    Normal,
    Warning,
    Critical,
    /// Reserved for the genesis entry.
    Initialized,
    Other(String),
}

impl AnomalyClass {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Initialized => "Initialized",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for AnomalyClass {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Normal" => Self::Normal,
            "Warning" => Self::Warning,
            "Critical" => Self::Critical,
            "Initialized" => Self::Initialized,
            _ => Self::Other(label),
        }
    }
}

impl From<AnomalyClass> for String {
    fn from(class: AnomalyClass) -> Self {
        match class {
            AnomalyClass::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for AnomalyClass {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for AnomalyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a ledger entry: one observed health event for one subject.
///
/// Field declaration order is the canonical serialization order and must not
/// change, or previously computed digests stop verifying.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEvent {
    pub subject_id: String,
    /// Exact condition label, e.g. "High Stress".
    pub condition: String,
    pub anomaly_class: AnomalyClass,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    pub heart_rate: f64,
    pub temperature: f64,
    pub respiratory_rate: f64,
    pub spo2: f64,
    /// Caller-supplied time of the event. The ledger fills this in when the
    /// event is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<Timestamp>,
}

impl HealthEvent {
    pub fn new(
        subject_id: impl Into<String>,
        condition: impl Into<String>,
        anomaly_class: AnomalyClass,
        confidence: f64,
        reading: SensorReading,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            condition: condition.into(),
            anomaly_class,
            confidence,
            heart_rate: reading.heart_rate,
            temperature: reading.temperature,
            respiratory_rate: reading.respiratory_rate,
            spo2: reading.spo2,
            recorded_at: None,
        }
    }

    /// Set the caller-supplied event time.
    pub fn at(mut self, recorded_at: Timestamp) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// The sensor aggregates of this event.
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            heart_rate: self.heart_rate,
            respiratory_rate: self.respiratory_rate,
            temperature: self.temperature,
            spo2: self.spo2,
        }
    }

    /// Shape check performed at the boundary before an event is appended.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.subject_id.trim().is_empty() {
            return Err(TypeError::EmptyField("subjectId"));
        }
        if self.condition.trim().is_empty() {
            return Err(TypeError::EmptyField("condition"));
        }
        if !self.confidence.is_finite() {
            return Err(TypeError::NonFinite {
                field: "confidence",
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TypeError::OutOfRange {
                field: "confidence",
                value: self.confidence,
            });
        }
        self.reading().validate()
    }
}
