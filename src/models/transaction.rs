//! Transaction model
//!
//! A single deposit into or withdrawal from a goal.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{GoalId, TransactionId};

/// Kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdraw,
    /// Kept for rows the original app could not classify; has no effect on balances
    Invalid,
}

impl TransactionType {
    /// Variant name as written to backups
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdraw",
            Self::Invalid => "Invalid",
        }
    }

    /// Sign applied to the amount when folding a balance
    pub fn sign(&self) -> f64 {
        match self {
            Self::Deposit => 1.0,
            Self::Withdraw => -1.0,
            Self::Invalid => 0.0,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(Self::Deposit),
            "Withdraw" => Ok(Self::Withdraw),
            "Invalid" => Ok(Self::Invalid),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// A transaction against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "transactionId", default)]
    pub id: TransactionId,

    /// The goal this transaction belongs to
    pub owner_goal_id: GoalId,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// When the transaction happened, epoch milliseconds
    #[serde(rename = "timeStamp")]
    pub timestamp: i64,

    /// Always non-negative; the direction comes from the type
    pub amount: f64,

    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    /// Create a new, unassigned transaction
    pub fn new(
        owner_goal_id: GoalId,
        transaction_type: TransactionType,
        timestamp: i64,
        amount: f64,
    ) -> Self {
        Self {
            id: TransactionId::UNASSIGNED,
            owner_goal_id,
            transaction_type,
            timestamp,
            amount,
            notes: String::new(),
        }
    }

    /// Create a deposit stamped with the current time
    pub fn deposit(owner_goal_id: GoalId, amount: f64, notes: impl Into<String>) -> Self {
        let mut txn = Self::new(
            owner_goal_id,
            TransactionType::Deposit,
            Utc::now().timestamp_millis(),
            amount,
        );
        txn.notes = notes.into();
        txn
    }

    /// Create a withdrawal stamped with the current time
    pub fn withdraw(owner_goal_id: GoalId, amount: f64, notes: impl Into<String>) -> Self {
        let mut txn = Self::new(
            owner_goal_id,
            TransactionType::Withdraw,
            Utc::now().timestamp_millis(),
            amount,
        );
        txn.notes = notes.into();
        txn
    }

    /// Amount with the direction applied
    pub fn signed_amount(&self) -> f64 {
        self.transaction_type.sign() * self.amount
    }

    /// The timestamp in the given zone
    pub fn timestamp_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.timestamp_millis_opt(self.timestamp).single()
    }
}
