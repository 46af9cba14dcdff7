//! Goal aggregate
//!
//! A goal joined with its transaction history. Never persisted as such; the
//! store materializes it on demand.

use serde::{Deserialize, Serialize};

use super::goal::Goal;
use super::transaction::Transaction;

/// A goal paired with its ordered transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithTransactions {
    pub goal: Goal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl GoalWithTransactions {
    pub fn new(goal: Goal, transactions: Vec<Transaction>) -> Self {
        Self { goal, transactions }
    }

    /// Wrap a goal that has no transactions yet
    pub fn without_transactions(goal: Goal) -> Self {
        Self::new(goal, Vec::new())
    }

    /// Amount currently saved: deposits minus withdrawals
    pub fn saved_amount(&self) -> f64 {
        self.transactions
            .iter()
            .fold(0.0, |acc, txn| acc + txn.signed_amount())
    }

    /// Amount still needed to reach the target (never negative)
    pub fn remaining_amount(&self) -> f64 {
        (self.goal.target_amount - self.saved_amount()).max(0.0)
    }

    /// Whether the target has been reached
    pub fn is_achieved(&self) -> bool {
        self.saved_amount() >= self.goal.target_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalId, TransactionType};

    fn laptop() -> GoalWithTransactions {
        let mut goal = Goal::new("Laptop", 1000.0, 0);
        goal.id = GoalId::new(1);
        GoalWithTransactions::new(
            goal,
            vec![
                Transaction::new(GoalId::new(1), TransactionType::Deposit, 1, 400.0),
                Transaction::new(GoalId::new(1), TransactionType::Withdraw, 2, 150.0),
                Transaction::new(GoalId::new(1), TransactionType::Invalid, 3, 999.0),
            ],
        )
    }

    #[test]
    fn test_saved_amount_folds_deposits_and_withdrawals() {
        assert_eq!(laptop().saved_amount(), 250.0);
    }

    #[test]
    fn test_remaining_amount() {
        assert_eq!(laptop().remaining_amount(), 750.0);
        assert!(!laptop().is_achieved());
    }

    #[test]
    fn test_empty_aggregate() {
        let aggregate = GoalWithTransactions::without_transactions(Goal::new("Bike", 50.0, 0));
        assert_eq!(aggregate.saved_amount(), 0.0);
        assert_eq!(aggregate.remaining_amount(), 50.0);
    }
}
