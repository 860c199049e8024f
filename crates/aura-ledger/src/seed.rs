//! Genesis payload and the illustrative history a seeded ledger starts with.

use std::time::Duration;

use aura_types::{AnomalyClass, HealthEvent, SensorReading, Timestamp};

/// Subject identifier reserved for the genesis entry.
pub const GENESIS_SUBJECT: &str = "SYSTEM";
/// Condition label reserved for the genesis entry.
pub const GENESIS_CONDITION: &str = "Genesis";
/// How far before construction the genesis entry is dated.
pub const GENESIS_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Subject the seeded history belongs to.
pub const SEED_SUBJECT: &str = "U12345";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// Sentinel payload of sequence 0.
pub fn genesis_event() -> HealthEvent {
    HealthEvent::new(
        GENESIS_SUBJECT,
        GENESIS_CONDITION,
        AnomalyClass::Initialized,
        1.0,
        SensorReading::zero(),
    )
}

/// Historical events appended after genesis by a seeded ledger, oldest
/// first, each dated relative to `now`.
pub fn historical_events(now: Timestamp) -> Vec<HealthEvent> {
    use AnomalyClass::{Critical, Normal, Warning};

    #[rustfmt::skip]
    let rows: [(&str, f64, [f64; 4], AnomalyClass, u64); 9] = [
        ("High Stress",   0.88, [88.0, 22.0, 37.5, 96.5], Warning,  10 * HOUR),
        ("Anxiety Spike", 0.94, [89.0, 26.0, 37.8, 94.2], Critical,  8 * HOUR),
        ("Fatigue",       0.82, [54.0, 12.0, 36.3, 95.1], Warning,   6 * HOUR),
        ("High Temp",     0.91, [85.0, 24.0, 38.6, 97.0], Critical,  4 * HOUR),
        ("Critical",      0.98, [88.0, 28.0, 38.1, 92.5], Critical,  3 * HOUR),
        ("Fatigue",       0.85, [58.0, 11.0, 36.2, 96.3], Warning,   2 * HOUR),
        ("High Stress",   0.89, [86.0, 21.0, 37.4, 97.1], Warning,       HOUR),
        ("Normal",        0.98, [75.0, 16.0, 36.8, 98.5], Normal,   30 * MINUTE),
        ("Anxiety Spike", 0.96, [89.0, 27.0, 37.9, 93.8], Critical, 10 * MINUTE),
    ];

    rows.into_iter()
        .map(|(condition, confidence, [hr, resp, temp, spo2], class, age_secs)| {
            HealthEvent::new(
                SEED_SUBJECT,
                condition,
                class,
                confidence,
                SensorReading::new(hr, resp, temp, spo2),
            )
            .at(now.saturating_sub(Duration::from_secs(age_secs)))
        })
        .collect()
}
