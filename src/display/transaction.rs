//! Transaction display formatting
//!
//! Formats a goal's deposits and withdrawals as a register with a running
//! balance.

use chrono::{Local, TimeZone};

use crate::config::settings::Settings;
use crate::models::{Transaction, TransactionType};

/// Format an epoch-millisecond timestamp with the configured date format
pub fn format_date<Tz: TimeZone>(millis: i64, tz: &Tz, date_format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(date_format).to_string(),
        None => "-".to_string(),
    }
}

/// Format a single transaction for display (register row)
pub fn format_transaction_row(txn: &Transaction, settings: &Settings) -> String {
    let (withdrawn, deposited) = match txn.transaction_type {
        TransactionType::Deposit => (String::new(), settings.format_amount(txn.amount)),
        TransactionType::Withdraw => (settings.format_amount(txn.amount), String::new()),
        TransactionType::Invalid => (String::new(), String::new()),
    };

    format!(
        "{:<8} {:<12} {:>12} {:>12}  {}",
        txn.id.to_string(),
        format_date(txn.timestamp, &Local, &settings.date_format),
        withdrawn,
        deposited,
        truncate(&txn.notes, 30).trim_end()
    )
}

/// Format a goal's transactions as a register with a running balance
pub fn format_transaction_register(transactions: &[Transaction], settings: &Settings) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8} {:<12} {:>12} {:>12}  {}\n",
        "ID", "Date", "Withdrawn", "Deposited", "Notes"
    ));
    output.push_str(&"-".repeat(62));
    output.push('\n');

    let mut running_balance = 0.0;
    for txn in transactions {
        running_balance += txn.signed_amount();
        output.push_str(&format_transaction_row(txn, settings));
        output.push('\n');
    }

    output.push_str(&"-".repeat(62));
    output.push('\n');
    output.push_str(&format!(
        "{:>34}  {}\n",
        "Balance:",
        settings.format_amount(running_balance)
    ));

    output
}

/// Format a short transaction summary (one line)
pub fn format_transaction_short(txn: &Transaction, settings: &Settings) -> String {
    format!(
        "{} {} of {} on {}",
        txn.id,
        txn.transaction_type,
        settings.format_amount(txn.amount),
        format_date(txn.timestamp, &Local, &settings.date_format)
    )
}

/// Pad or cut a string to exactly `max_len` characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
