//! Persisted model metadata and the annotated entries built from it.
//!
//! `metadata.json` is written by the training pipeline and may be missing
//! fields. `ModelRecord` is the lenient on-disk shape; `ModelEntry` is the
//! fully populated view handed to callers.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key that must never be persisted; activity is derived from the pointer.
const ACTIVE_KEY: &str = "active";

/// Local date-time layouts accepted for `trainDate`, interpreted as UTC.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Trained-at timestamp.
///
/// Keeps the string it was parsed from so rewriting a record during backfill
/// does not reformat a date the trainer wrote.
#[derive(Debug, Clone)]
pub struct TrainDate {
    raw: String,
    at: DateTime<Utc>,
}

impl TrainDate {
    /// Parse an RFC 3339 timestamp or an ISO local date-time.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self { raw: raw.to_string(), at: at.with_timezone(&Utc) });
        }
        for format in LOCAL_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Self { raw: raw.to_string(), at: Utc.from_utc_datetime(&naive) });
            }
        }
        Err(format!("unrecognized trainDate '{}'", raw))
    }

    /// Current wall-clock time, millisecond precision.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let at = at.trunc_subsecs(3);
        Self { raw: at.to_rfc3339_opts(SecondsFormat::Millis, true), at }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.at
    }
}

impl PartialEq for TrainDate {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for TrainDate {}

impl PartialOrd for TrainDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TrainDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl Serialize for TrainDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TrainDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TrainDate::parse(&raw).map_err(D::Error::custom)
    }
}

/// `null` or absent becomes the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null`, absent or blank becomes `None`.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn optional_train_date<'de, D>(deserializer: D) -> Result<Option<TrainDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(raw) => TrainDate::parse(&raw).map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}

/// Contents of `<model>/metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub user: String,
    #[serde(default, deserialize_with = "nullable")]
    pub train_time: String,
    #[serde(default, deserialize_with = "nullable")]
    pub accuracy: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    #[serde(
        default,
        deserialize_with = "optional_train_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub train_date: Option<TrainDate>,
    /// Fields written by the trainer that the registry does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which fields a backfill populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub id_generated: bool,
    pub train_date_set: bool,
}

impl BackfillReport {
    pub fn is_empty(&self) -> bool {
        !self.id_generated && !self.train_date_set
    }
}

impl ModelRecord {
    /// Parse metadata JSON. A stray `active` key is discarded.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_str(json)?;
        record.extra.remove(ACTIVE_KEY);
        Ok(record)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn needs_backfill(&self) -> bool {
        self.id.is_none() || self.train_date.is_none()
    }

    /// Fill a missing identifier and trained-at timestamp.
    ///
    /// Populated fields are never touched, so applying this to an already
    /// backfilled record is a no-op.
    pub fn backfill<F>(&mut self, now: F) -> BackfillReport
    where
        F: FnOnce() -> TrainDate,
    {
        let mut report = BackfillReport::default();
        if self.id.is_none() {
            self.id = Some(Uuid::new_v4().to_string());
            report.id_generated = true;
        }
        if self.train_date.is_none() {
            self.train_date = Some(now());
            report.train_date_set = true;
        }
        report
    }

    /// Build the caller-facing entry. Returns `None` until backfilled.
    pub fn to_entry(&self, name: &str) -> Option<ModelEntry> {
        Some(ModelEntry {
            id: self.id.clone()?,
            name: name.to_string(),
            user: self.user.clone(),
            train_time: self.train_time.clone(),
            accuracy: self.accuracy,
            version: self.version.clone(),
            train_date: self.train_date.clone()?,
            active: false,
        })
    }
}

/// A discovered model, annotated with whether the pointer names it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    pub user: String,
    pub train_time: String,
    pub accuracy: f64,
    pub version: String,
    pub train_date: TrainDate,
    pub active: bool,
}

/// Newest first; equal timestamps fall back to name ascending.
pub fn listing_order(a: &ModelEntry, b: &ModelEntry) -> Ordering {
    b.train_date
        .cmp(&a.train_date)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> TrainDate {
        TrainDate::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_and_local() {
        let utc = date("2024-05-01T10:00:00Z");
        let offset = date("2024-05-01T12:00:00+02:00");
        let local = date("2024-05-01T10:00:00");
        let spaced = date("2024-05-01 10:00:00.250");
        let minutes = date("2024-05-01T10:00");

        assert_eq!(utc, offset);
        assert_eq!(utc, local);
        assert_eq!(utc, minutes);
        assert!(spaced > utc);
        assert_eq!(offset.as_str(), "2024-05-01T12:00:00+02:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TrainDate::parse("yesterday").is_err());
        assert!(TrainDate::parse("2024-13-01T00:00:00").is_err());
    }

    #[test]
    fn test_now_roundtrips_through_its_own_string() {
        let now = TrainDate::now();
        let reparsed = date(now.as_str());
        assert_eq!(now, reparsed);
        assert!(now.as_str().ends_with('Z'));
    }

    #[test]
    fn test_record_leniency() {
        let record = ModelRecord::from_json(
            r#"{"id": "", "name": "m", "user": null, "accuracy": null, "trainDate": ""}"#,
        )
        .unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.user, "");
        assert_eq!(record.accuracy, 0.0);
        assert_eq!(record.train_date, None);
        assert!(record.needs_backfill());
    }

    #[test]
    fn test_active_key_is_dropped_and_extra_preserved() {
        let record = ModelRecord::from_json(
            r#"{"id": "x", "name": "m", "trainDate": "2024-01-01T00:00:00Z",
                "active": true, "epochs": 12}"#,
        )
        .unwrap();
        assert!(!record.extra.contains_key("active"));
        assert_eq!(record.extra.get("epochs"), Some(&Value::from(12)));

        let json = String::from_utf8(record.to_json().unwrap()).unwrap();
        assert!(!json.contains("\"active\""));
        assert!(json.contains("\"epochs\""));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(ModelRecord::from_json("{ not json").is_err());
        assert!(ModelRecord::from_json("[1, 2]").is_err());
        assert!(ModelRecord::from_json(r#"{"accuracy": "high"}"#).is_err());
        assert!(ModelRecord::from_json(r#"{"trainDate": "soon"}"#).is_err());
    }

    #[test]
    fn test_backfill_fills_only_missing_fields() {
        let mut record = ModelRecord::from_json(r#"{"name": "m"}"#).unwrap();
        let report = record.backfill(|| date("2024-02-02T00:00:00Z"));
        assert!(report.id_generated);
        assert!(report.train_date_set);
        assert!(Uuid::parse_str(record.id.as_deref().unwrap()).is_ok());

        let snapshot = record.clone();
        let report = record.backfill(|| date("2030-01-01T00:00:00Z"));
        assert!(report.is_empty());
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_backfill_keeps_existing_id() {
        let mut record = ModelRecord::from_json(r#"{"id": "keep-me"}"#).unwrap();
        let report = record.backfill(TrainDate::now);
        assert!(!report.id_generated);
        assert!(report.train_date_set);
        assert_eq!(record.id.as_deref(), Some("keep-me"));
    }

    #[test]
    fn test_to_entry_requires_backfill() {
        let mut record = ModelRecord::from_json(r#"{"user": "alice", "accuracy": 0.93}"#).unwrap();
        assert!(record.to_entry("m").is_none());
        record.backfill(TrainDate::now);
        let entry = record.to_entry("m").unwrap();
        assert_eq!(entry.name, "m");
        assert_eq!(entry.user, "alice");
        assert!(!entry.active);
    }

    #[test]
    fn test_listing_order_ties_break_on_name() {
        let mk = |name: &str, raw: &str| ModelEntry {
            id: name.into(),
            name: name.into(),
            user: String::new(),
            train_time: String::new(),
            accuracy: 0.0,
            version: String::new(),
            train_date: date(raw),
            active: false,
        };
        let mut entries = vec![
            mk("b", "2024-01-01T00:00:00Z"),
            mk("c", "2024-06-01T00:00:00Z"),
            mk("a", "2024-01-01T00:00:00Z"),
        ];
        entries.sort_by(listing_order);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
