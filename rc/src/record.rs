//! Capacity record types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One capacity observation as it arrives; any field may be missing
///
/// The source dataset headers (`Sted`, `Dato`, `Klokkeslett`,
/// `Antall_ledige_plasser`) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, alias = "Sted")]
    pub location: Option<String>,

    /// `dd.mm.yyyy`
    #[serde(default, alias = "Dato")]
    pub date: Option<String>,

    /// `hh:mm`
    #[serde(default, alias = "Klokkeslett")]
    pub time: Option<String>,

    #[serde(default, alias = "Antall_ledige_plasser")]
    pub free_slots: Option<i64>,
}

impl Record {
    pub fn new(location: &str, date: &str, time: &str, free_slots: i64) -> Self {
        Self {
            location: Some(location.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            free_slots: Some(free_slots),
        }
    }

    /// Deduplication identity
    pub fn key(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (self.location.as_deref(), self.date.as_deref(), self.time.as_deref())
    }

    /// Whether `field` is absent
    pub fn is_missing(&self, field: Field) -> bool {
        match field {
            Field::Location => self.location.is_none(),
            Field::Date => self.date.is_none(),
            Field::Time => self.time.is_none(),
            Field::FreeSlots => self.free_slots.is_none(),
        }
    }
}

/// Record with `date` and `time` folded into one timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub location: Option<String>,
    /// `None` when the date/time pair did not parse
    pub timestamp: Option<NaiveDateTime>,
    pub free_slots: Option<i64>,
}

/// Required record fields, in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Location,
    Date,
    Time,
    FreeSlots,
}

impl Field {
    pub const REQUIRED: [Field; 4] = [Field::Location, Field::Date, Field::Time, Field::FreeSlots];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::FreeSlots => write!(f, "free_slots"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_dataset_headers() {
        let record: Record =
            serde_json::from_str(r#"{"Sted": "Sentrum", "Dato": "01.01.2024", "Klokkeslett": "10:00", "Antall_ledige_plasser": 5}"#)
                .unwrap();
        assert_eq!(record, Record::new("Sentrum", "01.01.2024", "10:00", 5));
    }

    #[test]
    fn test_deserialize_missing_and_null() {
        let record: Record = serde_json::from_str(r#"{"location": "Sentrum", "date": null}"#).unwrap();
        assert_eq!(record.location.as_deref(), Some("Sentrum"));
        assert!(record.is_missing(Field::Date));
        assert!(record.is_missing(Field::Time));
        assert!(record.is_missing(Field::FreeSlots));
        assert!(!record.is_missing(Field::Location));
    }

    #[test]
    fn test_key_ignores_free_slots() {
        let a = Record::new("A", "01.01.2024", "10:00", 5);
        let b = Record::new("A", "01.01.2024", "10:00", 7);
        assert_eq!(a.key(), b.key());
    }
}
