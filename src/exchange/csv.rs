//! Flat CSV backup format
//!
//! Layout:
//!
//! ```text
//! Schema Version,2
//! Timestamp,1700000000000
//! Goal ID,Title,Target Amount,...,Transaction ID,Type,Timestamp,Amount,Notes
//! 1,Laptop,1000.0,1735689600000,Normal,false,,false,,,,,,
//! 1,,,,,,,,,1,Deposit,1700000000000,250.0,gift
//! ```
//!
//! Every goal gets one row with the goal columns filled, followed by one row
//! per transaction with only the owning goal id and the transaction columns
//! filled. Fields are quoted when they contain delimiters. Images are not
//! carried.

use std::collections::HashMap;
use std::io::Write;

use ::csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::error::{GoalStashError, GoalStashResult};
use crate::models::{GoalId, Transaction, TransactionId, TransactionType};

use super::draft::{AggregateDraft, GoalDraft, PayloadDraft, RawDeadline};
use super::{migrations, BackupPayload};

/// Key of the first line
pub const SCHEMA_VERSION_KEY: &str = "Schema Version";

/// Key of the second line
pub const TIMESTAMP_KEY: &str = "Timestamp";

/// Column header (third line)
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Goal ID",
    "Title",
    "Target Amount",
    "Deadline",
    "Priority",
    "Reminder",
    "Goal Icon ID",
    "Archived",
    "Additional Notes",
    "Transaction ID",
    "Type",
    "Timestamp",
    "Amount",
    "Notes",
];

pub const COLUMN_COUNT: usize = 14;

const GOAL_ID: usize = 0;
const TITLE: usize = 1;
const TARGET_AMOUNT: usize = 2;
const DEADLINE: usize = 3;
const PRIORITY: usize = 4;
const REMINDER: usize = 5;
const GOAL_ICON_ID: usize = 6;
const ARCHIVED: usize = 7;
const ADDITIONAL_NOTES: usize = 8;
const TRANSACTION_ID: usize = 9;
const TYPE: usize = 10;
const TIMESTAMP: usize = 11;
const AMOUNT: usize = 12;
const NOTES: usize = 13;

/// Write a payload as CSV
pub fn write_csv<W: Write>(payload: &BackupPayload, writer: W) -> GoalStashResult<()> {
    let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);

    csv.write_record([SCHEMA_VERSION_KEY, payload.version.to_string().as_str()])?;
    csv.write_record([TIMESTAMP_KEY, payload.timestamp.to_string().as_str()])?;
    csv.write_record(HEADER)?;

    for aggregate in &payload.data {
        let goal = &aggregate.goal;
        let mut row = vec![String::new(); COLUMN_COUNT];
        row[GOAL_ID] = goal.id.value().to_string();
        row[TITLE] = goal.title.clone();
        row[TARGET_AMOUNT] = format!("{:?}", goal.target_amount);
        row[DEADLINE] = goal.deadline.to_string();
        row[PRIORITY] = goal.priority.as_str().to_string();
        row[REMINDER] = goal.reminder.to_string();
        row[GOAL_ICON_ID] = goal.goal_icon_id.clone().unwrap_or_default();
        row[ARCHIVED] = goal.archived.to_string();
        row[ADDITIONAL_NOTES] = goal.additional_notes.clone();
        csv.write_record(&row)?;

        for txn in &aggregate.transactions {
            let mut row = vec![String::new(); COLUMN_COUNT];
            row[GOAL_ID] = goal.id.value().to_string();
            row[TRANSACTION_ID] = txn.id.value().to_string();
            row[TYPE] = txn.transaction_type.as_str().to_string();
            row[TIMESTAMP] = txn.timestamp.to_string();
            row[AMOUNT] = format!("{:?}", txn.amount);
            row[NOTES] = txn.notes.clone();
            csv.write_record(&row)?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Serialize a payload to a CSV string
pub fn to_csv_string(payload: &BackupPayload) -> GoalStashResult<String> {
    let mut buf = Vec::new();
    write_csv(payload, &mut buf)?;
    String::from_utf8(buf).map_err(|e| GoalStashError::Csv(e.to_string()))
}

/// Parse a CSV document, upgrading older schemas
pub fn from_csv_str(text: &str) -> GoalStashResult<BackupPayload> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let version_record = records
        .next()
        .ok_or_else(|| GoalStashError::Parse("missing Schema Version line".into()))??;
    let version = header_value(&version_record, SCHEMA_VERSION_KEY)?
        .parse::<u32>()
        .map_err(|_| invalid_header(&version_record, SCHEMA_VERSION_KEY))?;

    let timestamp_record = records
        .next()
        .ok_or_else(|| GoalStashError::Parse("missing Timestamp line".into()))??;
    let timestamp = header_value(&timestamp_record, TIMESTAMP_KEY)?
        .parse::<i64>()
        .map_err(|_| invalid_header(&timestamp_record, TIMESTAMP_KEY))?;

    // Later schemas may change the column layout; refuse before reading rows
    migrations::check_version(version)?;

    let header = records
        .next()
        .ok_or_else(|| GoalStashError::Parse("missing column header line".into()))??;
    check_header(&header)?;

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(parse_row(&record)?);
    }
    debug!("Parsed {} CSV data rows (schema v{})", rows.len(), version);

    let mut draft = PayloadDraft {
        version,
        timestamp,
        data: group_rows(rows),
    };
    migrations::upgrade(&mut draft)?;
    draft.finish()
}

fn header_value<'r>(record: &'r StringRecord, key: &str) -> GoalStashResult<&'r str> {
    let found = record.get(0).unwrap_or_default();
    if !normalized_key(found).eq_ignore_ascii_case(&normalized_key(key)) {
        return Err(GoalStashError::Parse(format!(
            "expected '{}' line, found '{}'",
            key, found
        )));
    }
    record
        .get(1)
        .map(str::trim)
        .ok_or_else(|| invalid_header(record, key))
}

/// The column header must name the known columns in order
fn check_header(header: &StringRecord) -> GoalStashResult<()> {
    if header.len() != COLUMN_COUNT {
        return Err(GoalStashError::Parse(format!(
            "column header has {} columns, expected {}",
            header.len(),
            COLUMN_COUNT
        )));
    }

    for (index, (found, expected)) in header.iter().zip(HEADER).enumerate() {
        if !normalized_key(found).eq_ignore_ascii_case(&normalized_key(expected)) {
            return Err(GoalStashError::Parse(format!(
                "column {} of the header is '{}', expected '{}'",
                index + 1,
                found.trim(),
                expected
            )));
        }
    }
    Ok(())
}

fn normalized_key(key: &str) -> String {
    key.chars().filter(|c| !c.is_whitespace()).collect()
}

fn invalid_header(record: &StringRecord, key: &str) -> GoalStashError {
    GoalStashError::Parse(format!(
        "invalid {} line: '{}'",
        key,
        record.iter().collect::<Vec<_>>().join(",")
    ))
}

/// One data row after field mapping
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// 1-based line number in the source document
    pub line: u64,
    /// Value of the Goal ID column, if present
    pub goal_id: Option<GoalId>,
    /// Goal columns, present when Target Amount is filled
    pub goal: Option<GoalDraft>,
    /// Transaction columns, present when Transaction ID or Type is filled
    pub transaction: Option<Transaction>,
}

/// Map the fields of one data row
pub fn parse_row(record: &StringRecord) -> GoalStashResult<CsvRow> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    if record.len() != COLUMN_COUNT {
        return Err(GoalStashError::Parse(format!(
            "line {}: expected {} columns, found {}",
            line,
            COLUMN_COUNT,
            record.len()
        )));
    }

    let field = |index: usize| record.get(index).unwrap_or_default();
    let trimmed = |index: usize| field(index).trim();

    let goal_id = if trimmed(GOAL_ID).is_empty() {
        None
    } else {
        Some(parse_field::<GoalId>(trimmed(GOAL_ID), HEADER[GOAL_ID], line)?)
    };

    let goal = if trimmed(TARGET_AMOUNT).is_empty() {
        None
    } else {
        let id = goal_id.ok_or_else(|| {
            GoalStashError::Parse(format!("line {}: goal row without a Goal ID", line))
        })?;
        Some(GoalDraft {
            id,
            title: field(TITLE).to_string(),
            target_amount: parse_amount(trimmed(TARGET_AMOUNT), HEADER[TARGET_AMOUNT], line)?,
            deadline: RawDeadline::Text(trimmed(DEADLINE).to_string()),
            goal_image: None,
            additional_notes: field(ADDITIONAL_NOTES).to_string(),
            priority: parse_field(trimmed(PRIORITY), HEADER[PRIORITY], line)?,
            reminder: parse_bool(trimmed(REMINDER)),
            goal_icon_id: Some(trimmed(GOAL_ICON_ID))
                .filter(|icon| !icon.is_empty())
                .map(str::to_string),
            archived: parse_bool(trimmed(ARCHIVED)),
        })
    };

    let transaction = if trimmed(TRANSACTION_ID).is_empty() && trimmed(TYPE).is_empty() {
        None
    } else {
        let id = if trimmed(TRANSACTION_ID).is_empty() {
            TransactionId::UNASSIGNED
        } else {
            parse_field(trimmed(TRANSACTION_ID), HEADER[TRANSACTION_ID], line)?
        };
        let transaction_type: TransactionType = parse_field(trimmed(TYPE), HEADER[TYPE], line)?;
        let mut txn = Transaction::new(
            goal_id.unwrap_or(GoalId::UNASSIGNED),
            transaction_type,
            parse_field(trimmed(TIMESTAMP), HEADER[TIMESTAMP], line)?,
            parse_amount(trimmed(AMOUNT), HEADER[AMOUNT], line)?,
        );
        txn.id = id;
        txn.notes = field(NOTES).to_string();
        Some(txn)
    };

    if goal.is_none() && transaction.is_none() {
        return Err(GoalStashError::Parse(format!(
            "line {}: row carries neither goal nor transaction data",
            line
        )));
    }

    Ok(CsvRow {
        line,
        goal_id,
        goal,
        transaction,
    })
}

fn parse_field<T>(raw: &str, column: &str, line: u64) -> GoalStashResult<T>
where
    T: std::str::FromStr,
{
    raw.parse::<T>().map_err(|_| {
        GoalStashError::Parse(format!("line {}: invalid {} '{}'", line, column, raw))
    })
}

/// Anything other than a case-insensitive "true" is false
fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Amounts must be finite; `f64` parsing alone lets `NaN` and `inf` through
fn parse_amount(raw: &str, column: &str, line: u64) -> GoalStashResult<f64> {
    let amount: f64 = parse_field(raw, column, line)?;
    if !amount.is_finite() {
        return Err(GoalStashError::Parse(format!(
            "line {}: invalid {} '{}'",
            line, column, raw
        )));
    }
    Ok(amount)
}

/// Rebuild goal aggregates from mapped rows
///
/// A goal row opens a new aggregate unless it repeats the id of a goal seen
/// earlier and also carries a transaction, which is how older writers laid
/// out every transaction row. Transaction rows attach to the goal named in
/// their Goal ID column, or to the most recent goal when that column is
/// blank. Rows that match no goal are dropped.
pub fn group_rows(rows: Vec<CsvRow>) -> Vec<AggregateDraft> {
    let mut groups: Vec<AggregateDraft> = Vec::new();
    let mut by_id: HashMap<GoalId, usize> = HashMap::new();

    for row in rows {
        let current = groups.len().checked_sub(1);
        let owner = match row.goal_id {
            Some(id) if current.is_some_and(|i| groups[i].goal.id == id) => current,
            Some(id) => by_id.get(&id).copied(),
            None => current,
        };

        if let Some(goal) = row.goal {
            match (owner, row.transaction.is_some()) {
                (Some(_), true) => {}
                _ => {
                    by_id.insert(goal.id, groups.len());
                    groups.push(AggregateDraft {
                        goal,
                        transactions: Vec::new(),
                    });
                    if let (Some(txn), Some(last)) = (row.transaction, groups.last_mut()) {
                        attach(last, txn);
                    }
                    continue;
                }
            }
        }

        let Some(txn) = row.transaction else {
            continue;
        };

        match owner {
            Some(index) => attach(&mut groups[index], txn),
            None => warn!(
                "Dropping transaction on line {}: no goal with id {} precedes it",
                row.line,
                row.goal_id
                    .map(|id| id.value().to_string())
                    .unwrap_or_else(|| "<blank>".into())
            ),
        }
    }

    groups
}

fn attach(group: &mut AggregateDraft, mut txn: Transaction) {
    txn.owner_goal_id = group.goal.id;
    group.transactions.push(txn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::CURRENT_SCHEMA_VERSION;
    use crate::models::{Goal, GoalPriority, GoalWithTransactions};

    const HEADER_LINE: &str = "Goal ID,Title,Target Amount,Deadline,Priority,Reminder,Goal Icon ID,Archived,Additional Notes,Transaction ID,Type,Timestamp,Amount,Notes";

    fn document(version: u32, rows: &[&str]) -> String {
        let mut text = format!("Schema Version,{}\nTimestamp,1700000000000\n{}\n", version, HEADER_LINE);
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    fn laptop_payload() -> BackupPayload {
        let mut goal = Goal::new("Laptop", 1000.0, 1_735_689_600_000);
        goal.id = GoalId::new(1);
        let mut txn = Transaction::new(goal.id, TransactionType::Deposit, 1_700_000_000_000, 250.0);
        txn.id = TransactionId::new(1);
        txn.notes = "gift".into();
        BackupPayload::with_timestamp(
            vec![GoalWithTransactions::new(goal, vec![txn])],
            1_700_000_999_000,
        )
    }

    #[test]
    fn test_laptop_layout_and_round_trip() {
        let payload = laptop_payload();
        let text = to_csv_string(&payload).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], format!("Schema Version,{}", CURRENT_SCHEMA_VERSION));
        assert_eq!(lines[1], "Timestamp,1700000999000");
        assert_eq!(lines[2], HEADER_LINE);
        assert_eq!(lines[3], "1,Laptop,1000.0,1735689600000,Normal,false,,false,,,,,,");
        assert_eq!(lines[4], "1,,,,,,,,,1,Deposit,1700000000000,250.0,gift");
        assert_eq!(lines.len(), 5);

        let restored = from_csv_str(&text).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_goal_without_transactions_is_one_row() {
        let mut payload = laptop_payload();
        payload.data[0].transactions.clear();
        let text = to_csv_string(&payload).unwrap();
        assert_eq!(text.lines().count(), 4);

        let restored = from_csv_str(&text).unwrap();
        assert_eq!(restored.data.len(), 1);
        assert!(restored.data[0].transactions.is_empty());
    }

    #[test]
    fn test_bad_amount_is_a_parse_error() {
        let text = document(
            2,
            &[
                "1,Laptop,1000.0,0,Normal,false,,false,,,,,,",
                "1,,,,,,,,,1,Deposit,1700000000000,abc,gift",
            ],
        );
        let err = from_csv_str(&text).unwrap_err();
        assert!(matches!(err, GoalStashError::Parse(ref msg) if msg.contains("Amount 'abc'")));
    }

    #[test]
    fn test_non_finite_amounts_are_parse_errors() {
        let target = document(2, &["1,Laptop,inf,0,Normal,false,,false,,,,,,"]);
        let err = from_csv_str(&target).unwrap_err();
        assert!(matches!(err, GoalStashError::Parse(ref msg) if msg.contains("Target Amount 'inf'")));

        for literal in ["NaN", "infinity", "-inf"] {
            let row = format!("1,,,,,,,,,1,Deposit,1,{},", literal);
            let text = document(2, &["1,Laptop,1000.0,0,Normal,false,,false,,,,,,", &row]);
            let err = from_csv_str(&text).unwrap_err();
            assert!(
                matches!(err, GoalStashError::Parse(ref msg) if msg.contains(&format!("Amount '{}'", literal))),
                "{} was accepted",
                literal
            );
        }
    }

    #[test]
    fn test_unknown_enum_literals_fail() {
        let priority = document(2, &["1,Laptop,1000.0,0,Urgent,false,,false,,,,,,"]);
        assert!(from_csv_str(&priority).unwrap_err().is_parse());

        let kind = document(
            2,
            &[
                "1,Laptop,1000.0,0,Normal,false,,false,,,,,,",
                "1,,,,,,,,,1,Refund,1,5.0,",
            ],
        );
        assert!(from_csv_str(&kind).unwrap_err().is_parse());
    }

    #[test]
    fn test_future_version_fails_before_rows() {
        let text = document(CURRENT_SCHEMA_VERSION + 1, &["garbage"]);
        assert!(matches!(
            from_csv_str(&text),
            Err(GoalStashError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_v1_legacy_deadline() {
        let text = document(1, &["1,Trip,800.0,25/12/2023,High,true,Plane,false,,,,,,"]);
        let payload = from_csv_str(&text).unwrap();
        assert_eq!(payload.version, 1);
        let goal = &payload.data[0].goal;
        assert_eq!(goal.deadline, super::super::parse_legacy_deadline("25/12/2023"));
        assert_eq!(goal.priority, GoalPriority::High);
        assert!(goal.reminder);
        assert_eq!(goal.goal_icon_id.as_deref(), Some("Plane"));
    }

    #[test]
    fn test_v1_blank_deadline_means_none() {
        let text = document(1, &["1,Trip,800.0,,Normal,false,,false,,,,,,"]);
        let payload = from_csv_str(&text).unwrap();
        assert_eq!(payload.data[0].goal.deadline, 0);
    }

    #[test]
    fn test_v2_text_deadline_fails() {
        let text = document(2, &["1,Trip,800.0,25/12/2023,Normal,false,,false,,,,,,"]);
        assert!(matches!(from_csv_str(&text), Err(GoalStashError::Parse(_))));
    }

    #[test]
    fn test_historical_repeated_goal_layout() {
        let text = document(
            1,
            &[
                "4,Bike,250.0,2023/12/25,Normal,false,,false,,7,Deposit,10,100.0,first",
                "4,Bike,250.0,2023/12/25,Normal,false,,false,,8,Deposit,20,50.0,second",
                "5,Desk,120.0,,Low,false,,true,,,,,,",
            ],
        );
        let payload = from_csv_str(&text).unwrap();
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[0].goal.title, "Bike");
        assert_eq!(payload.data[0].transactions.len(), 2);
        assert_eq!(payload.data[0].transactions[1].notes, "second");
        assert_eq!(payload.data[0].saved_amount(), 150.0);
        assert!(payload.data[1].goal.archived);
    }

    #[test]
    fn test_orphan_transaction_is_dropped() {
        let text = document(
            2,
            &[
                "9,,,,,,,,,1,Deposit,1,5.0,orphan",
                "1,Laptop,1000.0,0,Normal,false,,false,,,,,,",
                "1,,,,,,,,,2,Deposit,2,6.0,kept",
            ],
        );
        let payload = from_csv_str(&text).unwrap();
        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.data[0].transactions.len(), 1);
        assert_eq!(payload.data[0].transactions[0].notes, "kept");
    }

    #[test]
    fn test_wrong_column_count_fails() {
        let text = document(2, &["1,Laptop,1000.0,0,Normal"]);
        assert!(matches!(from_csv_str(&text), Err(GoalStashError::Parse(ref m)) if m.contains("columns")));
    }

    #[test]
    fn test_missing_header_lines_fail() {
        assert!(from_csv_str("").unwrap_err().is_parse());
        assert!(from_csv_str("Schema Version,2\n").unwrap_err().is_parse());
        assert!(from_csv_str("Version,2\nTimestamp,0\n").unwrap_err().is_parse());
        assert!(from_csv_str("Schema Version,two\nTimestamp,0\n").unwrap_err().is_parse());
    }

    #[test]
    fn test_reordered_header_is_rejected() {
        let swapped = HEADER_LINE.replace("Title,Target Amount", "Target Amount,Title");
        let text = format!("Schema Version,2\nTimestamp,0\n{}\n", swapped);
        let err = from_csv_str(&text).unwrap_err();
        assert!(matches!(err, GoalStashError::Parse(ref msg) if msg.contains("column 2")));

        let loose = format!("Schema Version,2\nTimestamp,0\n{}\n", HEADER_LINE.to_uppercase().replace(' ', ""));
        assert!(from_csv_str(&loose).unwrap().data.is_empty());
    }

    #[test]
    fn test_compact_schema_key_is_accepted() {
        let text = "SchemaVersion,2\nTimestamp,0\n".to_string() + HEADER_LINE + "\n";
        let payload = from_csv_str(&text).unwrap();
        assert!(payload.data.is_empty());
    }

    #[test]
    fn test_delimiters_in_text_survive() {
        let mut payload = laptop_payload();
        payload.data[0].goal.title = "Laptop, 16\"".into();
        payload.data[0].goal.additional_notes = "line one\nline two".into();
        payload.data[0].transactions[0].notes = "from mum, dad".into();

        let restored = from_csv_str(&to_csv_string(&payload).unwrap()).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_group_rows_attaches_blank_owner_to_current_goal() {
        let goal_row = CsvRow {
            line: 4,
            goal_id: Some(GoalId::new(3)),
            goal: Some(GoalDraft {
                id: GoalId::new(3),
                title: "Camera".into(),
                target_amount: 600.0,
                deadline: RawDeadline::Millis(0),
                goal_image: None,
                additional_notes: String::new(),
                priority: GoalPriority::Normal,
                reminder: false,
                goal_icon_id: None,
                archived: false,
            }),
            transaction: None,
        };
        let txn_row = CsvRow {
            line: 5,
            goal_id: None,
            goal: None,
            transaction: Some(Transaction::new(
                GoalId::UNASSIGNED,
                TransactionType::Deposit,
                1,
                60.0,
            )),
        };

        let groups = group_rows(vec![txn_row.clone(), goal_row, txn_row]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].transactions.len(), 1);
        assert_eq!(groups[0].transactions[0].owner_goal_id, GoalId::new(3));
    }
}
