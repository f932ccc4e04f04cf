//! Deduplicate, validate and normalize capacity records
//!
//! The four steps are independent; [`Pipeline`] applies them in the
//! conventional order: dedup, completeness, range, normalize.

use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::record::{Field, NormalizedRecord, Record};

/// Fixed format of the joined `date time` string
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Collapse records sharing `(location, date, time)` to the first occurrence
///
/// Input order is kept. Absent values compare equal to each other.
pub fn dedup(records: Vec<Record>) -> Vec<Record> {
    debug!(count = records.len(), "dedup: called");
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let key = (record.location.clone(), record.date.clone(), record.time.clone());
        if seen.insert(key) {
            kept.push(record);
        }
    }

    debug!(kept = kept.len(), "dedup: done");
    kept
}

/// Fail on the first required field (in [`Field::REQUIRED`] order) that is
/// absent in any record
pub fn validate_complete(records: &[Record]) -> Result<(), ValidationError> {
    debug!(count = records.len(), "validate_complete: called");
    for field in Field::REQUIRED {
        let count = records.iter().filter(|r| r.is_missing(field)).count();
        if count > 0 {
            debug!(%field, count, "validate_complete: missing values");
            return Err(ValidationError::MissingValue { field, count });
        }
    }
    Ok(())
}

/// Fail if any `free_slots` is negative
pub fn validate_non_negative(records: &[Record]) -> Result<(), ValidationError> {
    debug!(count = records.len(), "validate_non_negative: called");
    let count = records
        .iter()
        .filter(|r| r.free_slots.is_some_and(|n| n < 0))
        .count();

    if count > 0 {
        return Err(ValidationError::NegativeValue { count });
    }
    Ok(())
}

/// Parse `date` + `time` as `dd.mm.yyyy hh:mm`
///
/// Absent parts are left out of the joined string, so a record missing
/// either one never parses. Unparseable input gives `None`.
pub fn parse_timestamp(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let joined = [date, time].into_iter().flatten().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&joined, TIMESTAMP_FORMAT).ok()
}

/// Replace `date` and `time` with a combined timestamp
pub fn normalize(record: Record) -> NormalizedRecord {
    let timestamp = parse_timestamp(record.date.as_deref(), record.time.as_deref());
    if timestamp.is_none() {
        debug!(date = ?record.date, time = ?record.time, "normalize: unparseable timestamp");
    }

    NormalizedRecord {
        location: record.location,
        timestamp,
        free_slots: record.free_slots,
    }
}

/// Normalize every record; never fails
pub fn normalize_timestamps(records: Vec<Record>) -> Vec<NormalizedRecord> {
    debug!(count = records.len(), "normalize_timestamps: called");
    records.into_iter().map(normalize).collect()
}

/// Counts from one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub input: usize,
    pub duplicates: usize,
    pub output: usize,
    pub null_timestamps: usize,
}

/// All four steps in order
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Dedup and both validators; returns the deduplicated records
    pub fn check(&self, records: Vec<Record>) -> Result<Vec<Record>, ValidationError> {
        let deduped = dedup(records);
        validate_complete(&deduped)?;
        validate_non_negative(&deduped)?;
        Ok(deduped)
    }

    /// Dedup, validate, then normalize
    pub fn run(&self, records: Vec<Record>) -> Result<(Vec<NormalizedRecord>, PipelineReport), ValidationError> {
        let input = records.len();
        debug!(input, "Pipeline::run: called");

        let checked = self.check(records)?;
        let duplicates = input - checked.len();
        let normalized = normalize_timestamps(checked);
        let null_timestamps = normalized.iter().filter(|r| r.timestamp.is_none()).count();

        if null_timestamps > 0 {
            warn!(null_timestamps, "Pipeline::run: records with unparseable timestamps");
        }

        let report = PipelineReport {
            input,
            duplicates,
            output: normalized.len(),
            null_timestamps,
        };
        info!(?report, "Pipeline::run: done");
        Ok((normalized, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_dedup_collapses_duplicates() {
        let records = vec![
            Record::new("A", "01.01.2024", "10:00", 5),
            Record::new("A", "01.01.2024", "10:00", 5),
        ];
        assert_eq!(dedup(records).len(), 1);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let records = vec![
            Record::new("A", "01.01.2024", "10:00", 5),
            Record::new("B", "01.01.2024", "10:00", 1),
            Record::new("A", "01.01.2024", "10:00", 9),
        ];

        let deduped = dedup(records);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].free_slots, Some(5));
        assert_eq!(deduped[1].location.as_deref(), Some("B"));
    }

    #[test]
    fn test_dedup_missing_keys_compare_equal() {
        let records = vec![Record::default(), Record::default()];
        assert_eq!(dedup(records).len(), 1);
    }

    #[test]
    fn test_validate_complete_fails_on_missing_date() {
        let mut record = Record::new("A", "01.01.2024", "10:00", 5);
        record.date = None;

        let err = validate_complete(&[record]).unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingValue {
                field: Field::Date,
                count: 1
            }
        );
        assert_eq!(err.to_string(), "Missing values in date (1 record(s))");
    }

    #[test]
    fn test_validate_complete_reports_first_field() {
        let records = vec![
            Record {
                free_slots: None,
                ..Record::new("A", "01.01.2024", "10:00", 0)
            },
            Record {
                location: None,
                ..Record::new("A", "01.01.2024", "10:00", 0)
            },
        ];

        assert!(matches!(
            validate_complete(&records),
            Err(ValidationError::MissingValue {
                field: Field::Location,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_complete_passes() {
        assert!(validate_complete(&[Record::new("A", "01.01.2024", "10:00", 0)]).is_ok());
        assert!(validate_complete(&[]).is_ok());
    }

    #[test]
    fn test_validate_non_negative() {
        let err = validate_non_negative(&[
            Record::new("A", "01.01.2024", "10:00", -1),
            Record::new("B", "01.01.2024", "10:00", 3),
        ])
        .unwrap_err();
        assert_eq!(err, ValidationError::NegativeValue { count: 1 });

        assert!(validate_non_negative(&[Record::new("A", "01.01.2024", "10:00", 0)]).is_ok());
        assert!(validate_non_negative(&[Record::default()]).is_ok());
    }

    #[test]
    fn test_normalize_combines_date_and_time() {
        let record = Record {
            date: Some("01.01.2024".to_string()),
            time: Some("10:00".to_string()),
            ..Default::default()
        };

        let normalized = normalize(record);

        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(normalized.timestamp, Some(expected));

        let json = serde_json::to_value(&normalized).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("date").is_none());
        assert!(json.get("time").is_none());
    }

    #[test]
    fn test_normalize_malformed_is_none() {
        assert_eq!(parse_timestamp(Some("2024-01-01"), Some("10:00")), None);
        assert_eq!(parse_timestamp(Some("31.02.2024"), Some("10:00")), None);
        assert_eq!(parse_timestamp(Some("01.01.2024"), None), None);
        assert_eq!(parse_timestamp(None, Some("10:00")), None);

        let ts = parse_timestamp(Some("15.06.2024"), Some("23:45")).unwrap();
        assert_eq!(ts.hour(), 23);
        assert_eq!(ts.minute(), 45);
    }

    #[test]
    fn test_pipeline_run() {
        let records = vec![
            Record::new("A", "01.01.2024", "10:00", 5),
            Record::new("A", "01.01.2024", "10:00", 5),
            Record::new("B", "1/1/2024", "10:00", 2),
        ];

        let (normalized, report) = Pipeline::new().run(records).unwrap();

        assert_eq!(normalized.len(), 2);
        assert_eq!(
            report,
            PipelineReport {
                input: 3,
                duplicates: 1,
                output: 2,
                null_timestamps: 1,
            }
        );
    }

    #[test]
    fn test_pipeline_halts_on_negative() {
        let records = vec![Record::new("A", "01.01.2024", "10:00", -3)];
        assert_eq!(
            Pipeline::new().run(records).unwrap_err(),
            ValidationError::NegativeValue { count: 1 }
        );
    }
}
