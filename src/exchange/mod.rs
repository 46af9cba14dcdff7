//! Backup exchange formats for goalstash
//!
//! Converts between the in-memory list of goals with their transactions and
//! a portable text form:
//! - JSON: a nested `{version, timestamp, data}` document
//! - CSV: a flat, spreadsheet-friendly table with one row per goal followed
//!   by one row per transaction
//!
//! Both directions are pure functions; file handling lives in
//! [`crate::backup`]. Documents carry a schema version and are upgraded
//! through [`migrations::MIGRATIONS`] when read.

pub mod csv;
pub mod draft;
pub mod json;
pub mod legacy;
pub mod migrations;

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::GoalStashResult;
use crate::models::GoalWithTransactions;

pub use legacy::{parse_legacy_deadline, parse_legacy_deadline_in};

/// Schema version written by this build (deadlines as epoch milliseconds)
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Oldest schema version that can still be read (deadlines as date strings)
pub const OLDEST_SCHEMA_VERSION: u32 = 1;

/// Portable backup formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackupFormat {
    /// Nested JSON document (lossless, includes images)
    #[default]
    Json,
    /// Flat CSV table (spreadsheet-compatible, no images)
    Csv,
}

impl BackupFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Format implied by a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for BackupFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for BackupFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| format!("unknown backup format '{}'", s))
    }
}

/// Versioned backup envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupPayload {
    /// Schema version (the declared version when read from a document)
    pub version: u32,
    /// When the backup was created, epoch milliseconds
    pub timestamp: i64,
    pub data: Vec<GoalWithTransactions>,
}

impl BackupPayload {
    /// Wrap data in an envelope stamped with the current version and time
    pub fn new(data: Vec<GoalWithTransactions>) -> Self {
        Self::with_timestamp(data, Utc::now().timestamp_millis())
    }

    /// Wrap data with an explicit creation timestamp
    pub fn with_timestamp(data: Vec<GoalWithTransactions>, timestamp: i64) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            timestamp,
            data,
        }
    }

    pub fn goal_count(&self) -> usize {
        self.data.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.data.iter().map(|g| g.transactions.len()).sum()
    }
}

/// Serialize a payload into the given format
pub fn serialize(payload: &BackupPayload, format: BackupFormat) -> GoalStashResult<String> {
    match format {
        BackupFormat::Json => json::to_json_string(payload, true),
        BackupFormat::Csv => csv::to_csv_string(payload),
    }
}

/// Parse a document in the given format, upgrading older schemas
pub fn deserialize(text: &str, format: BackupFormat) -> GoalStashResult<BackupPayload> {
    match format {
        BackupFormat::Json => json::from_json_str(text),
        BackupFormat::Csv => csv::from_csv_str(text),
    }
}

/// Guess the format of a document from its first characters
pub fn detect_format(text: &str) -> Option<BackupFormat> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('{') {
        return Some(BackupFormat::Json);
    }

    let first_line = trimmed.lines().next()?;
    let key = first_line.split(',').next()?.replace(' ', "");
    if key.eq_ignore_ascii_case("SchemaVersion") {
        return Some(BackupFormat::Csv);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoalStashError;
    use crate::models::{Goal, GoalId, GoalPriority, Transaction, TransactionId, TransactionType};

    /// Strip store-assigned identifiers so payloads can be compared after import
    fn without_ids(mut data: Vec<GoalWithTransactions>) -> Vec<GoalWithTransactions> {
        for aggregate in &mut data {
            aggregate.goal.id = GoalId::UNASSIGNED;
            for txn in &mut aggregate.transactions {
                txn.id = TransactionId::UNASSIGNED;
                txn.owner_goal_id = GoalId::UNASSIGNED;
            }
        }
        data
    }

    fn sample_data() -> Vec<GoalWithTransactions> {
        let mut laptop = Goal::new("Laptop", 1000.0, 1_735_689_600_000);
        laptop.id = GoalId::new(1);
        let mut gift = Transaction::new(laptop.id, TransactionType::Deposit, 1_700_000_000_000, 250.0);
        gift.id = TransactionId::new(1);
        gift.notes = "gift".into();
        let mut oops = Transaction::new(laptop.id, TransactionType::Withdraw, 1_700_000_500_000, 20.5);
        oops.id = TransactionId::new(2);

        let mut car = Goal::new("Car, used", 7500.25, 0);
        car.id = GoalId::new(2);
        car.priority = GoalPriority::High;
        car.reminder = true;
        car.goal_icon_id = Some("Car".into());
        car.additional_notes = "Prefer \"hybrid\"".into();

        let mut archived = Goal::new("Old phone", 300.0, 0);
        archived.id = GoalId::new(3);
        archived.archived = true;
        archived.priority = GoalPriority::Low;
        let mut paid = Transaction::new(archived.id, TransactionType::Deposit, 1, 300.0);
        paid.id = TransactionId::new(3);

        vec![
            GoalWithTransactions::new(laptop, vec![gift, oops]),
            GoalWithTransactions::without_transactions(car),
            GoalWithTransactions::new(archived, vec![paid]),
        ]
    }

    #[test]
    fn test_round_trip_both_formats() {
        let payload = BackupPayload::with_timestamp(sample_data(), 1_700_000_999_000);

        for format in [BackupFormat::Json, BackupFormat::Csv] {
            let text = serialize(&payload, format).unwrap();
            assert_eq!(detect_format(&text), Some(format));

            let restored = deserialize(&text, format).unwrap();
            assert_eq!(restored.version, CURRENT_SCHEMA_VERSION);
            assert_eq!(restored.timestamp, payload.timestamp);
            assert_eq!(
                without_ids(restored.data),
                without_ids(payload.data.clone()),
                "round trip through {} changed the data",
                format
            );
        }
    }

    #[test]
    fn test_future_version_is_rejected_in_both_formats() {
        let json = r#"{"version":99,"timestamp":0,"data":[]}"#;
        assert!(matches!(
            deserialize(json, BackupFormat::Json),
            Err(GoalStashError::UnsupportedSchemaVersion { found: 99, .. })
        ));

        let csv = "Schema Version,99\nTimestamp,0\n\
                   Goal ID,Title,Target Amount,Deadline,Priority,Reminder,Goal Icon ID,Archived,Additional Notes,Transaction ID,Type,Timestamp,Amount,Notes\n";
        assert!(matches!(
            deserialize(csv, BackupFormat::Csv),
            Err(GoalStashError::UnsupportedSchemaVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("  {\"version\":2}"), Some(BackupFormat::Json));
        assert_eq!(detect_format("SchemaVersion,1\n"), Some(BackupFormat::Csv));
        assert_eq!(detect_format("hello"), None);
        assert_eq!(detect_format(""), None);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<BackupFormat>(), Ok(BackupFormat::Csv));
        assert_eq!(BackupFormat::from_extension("json"), Some(BackupFormat::Json));
        assert!("yaml".parse::<BackupFormat>().is_err());
    }

    #[test]
    fn test_counts() {
        let payload = BackupPayload::new(sample_data());
        assert_eq!(payload.goal_count(), 3);
        assert_eq!(payload.transaction_count(), 3);
        assert_eq!(payload.version, CURRENT_SCHEMA_VERSION);
    }
}
