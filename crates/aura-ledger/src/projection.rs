use std::collections::HashMap;
use std::time::Duration;

use aura_types::{AnomalyClass, Digest, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;

use crate::entry::Entry;
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Number of days covered by the daily trend.
pub const TREND_DAYS: u64 = 7;

/// Flattened view of one entry as the dashboard and report generator
/// consume it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub entry_id: u64,
    pub subject_id: String,
    pub condition: String,
    pub status: AnomalyClass,
    pub confidence: f64,
    /// RFC 3339 rendering of the entry time.
    pub timestamp: String,
    pub digest: Digest,
    pub previous_digest: Digest,
    pub sensor_data: SensorData,
}

/// Sensor aggregates keyed with the short labels the dashboard uses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SensorData {
    #[serde(rename = "HR")]
    pub hr: f64,
    #[serde(rename = "Resp")]
    pub resp: f64,
    #[serde(rename = "Temp")]
    pub temp: f64,
    #[serde(rename = "SpO2")]
    pub spo2: f64,
}

impl From<&Entry> for EventRecord {
    fn from(entry: &Entry) -> Self {
        let payload = entry.payload();
        Self {
            entry_id: entry.sequence_number(),
            subject_id: payload.subject_id.clone(),
            condition: payload.condition.clone(),
            status: payload.anomaly_class.clone(),
            confidence: payload.confidence,
            timestamp: entry.recorded_at().to_rfc3339(),
            digest: entry.digest(),
            previous_digest: entry.previous_digest(),
            sensor_data: SensorData {
                hr: payload.heart_rate,
                resp: payload.respiratory_rate,
                temp: payload.temperature,
                spo2: payload.spo2,
            },
        }
    }
}

/// Aggregate statistics over every non-genesis entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_events: u64,
    pub warning_count: u64,
    pub critical_count: u64,
    /// Mean confidence as a percentage, 0 when there are no events.
    pub average_confidence: f64,
    /// Condition with the most events, "N/A" when there are none.
    pub most_frequent_condition: String,
    /// Events per UTC day for the last [`TREND_DAYS`] days, oldest first.
    pub daily_trend: Vec<DailyCount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

impl LedgerStats {
    /// Compute statistics over `entries` as of `now`. Genesis is skipped.
    pub fn compute(entries: &[Entry], now: Timestamp) -> Self {
        let events: Vec<&Entry> = entries.iter().filter(|e| !e.is_genesis()).collect();

        let today = now.utc_day();
        let mut daily_trend: Vec<DailyCount> = (0..TREND_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(chrono::Days::new(back)))
            .map(|day| DailyCount { day, count: 0 })
            .collect();

        if events.is_empty() {
            return Self {
                total_events: 0,
                warning_count: 0,
                critical_count: 0,
                average_confidence: 0.0,
                most_frequent_condition: "N/A".into(),
                daily_trend,
            };
        }

        let count_class = |class: AnomalyClass| {
            events
                .iter()
                .filter(|e| e.payload().anomaly_class == class)
                .count() as u64
        };

        let confidence_sum: f64 = events.iter().map(|e| e.payload().confidence).sum();

        let window_start = now.saturating_sub(Duration::from_secs(TREND_DAYS * 24 * 60 * 60));
        for entry in events.iter().filter(|e| e.recorded_at() > window_start) {
            let day = entry.recorded_at().utc_day();
            if let Some(bucket) = daily_trend.iter_mut().find(|d| d.day == day) {
                bucket.count += 1;
            }
        }

        Self {
            total_events: events.len() as u64,
            warning_count: count_class(AnomalyClass::Warning),
            critical_count: count_class(AnomalyClass::Critical),
            average_confidence: confidence_sum / events.len() as f64 * 100.0,
            most_frequent_condition: most_frequent(&events),
            daily_trend,
        }
    }
}

/// Counts newest first, the order records are shown in, so ties go to the
/// condition whose latest event is most recent.
fn most_frequent(events: &[&Entry]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for entry in events.iter().rev() {
        let condition = entry.payload().condition.as_str();
        let count = counts.entry(condition).or_insert(0);
        if *count == 0 {
            order.push(condition);
        }
        *count += 1;
    }

    let mut best: Option<(&str, u64)> = None;
    for condition in order {
        let count = counts[condition];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition.to_string())
        .unwrap_or_else(|| "N/A".into())
}

/// Read-side projections over a ledger.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Every non-genesis entry as an [`EventRecord`], newest first.
    pub fn records<R: LedgerReader>(reader: &R) -> Result<Vec<EventRecord>, LedgerError> {
        Ok(reader
            .all_entries()?
            .iter()
            .rev()
            .filter(|e| !e.is_genesis())
            .map(EventRecord::from)
            .collect())
    }

    pub fn stats<R: LedgerReader>(reader: &R, now: Timestamp) -> Result<LedgerStats, LedgerError> {
        Ok(LedgerStats::compute(&reader.all_entries()?, now))
    }
}
