//! Goal service
//!
//! Provides business logic for goal management: CRUD operations,
//! validation, and recording deposits and withdrawals.

use tracing::info;

use crate::error::{GoalStashError, GoalStashResult};
use crate::models::{
    Goal, GoalId, GoalImage, GoalPriority, GoalWithTransactions, Transaction, TransactionId,
    TransactionType,
};
use crate::storage::Storage;

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

/// Fields for a new goal
#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: f64,
    /// Epoch milliseconds, 0 for no deadline
    pub deadline: i64,
    pub priority: GoalPriority,
    pub reminder: bool,
    pub goal_icon_id: Option<String>,
    pub additional_notes: String,
    pub goal_image: Option<GoalImage>,
}

/// Changes to an existing goal; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct GoalEdit {
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    /// `Some(0)` clears the deadline
    pub deadline: Option<i64>,
    pub priority: Option<GoalPriority>,
    pub reminder: Option<bool>,
    /// `Some(None)` clears the icon
    pub goal_icon_id: Option<Option<String>>,
    pub additional_notes: Option<String>,
    /// `Some(None)` clears the image
    pub goal_image: Option<Option<GoalImage>>,
}

impl GoalEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.target_amount.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.reminder.is_none()
            && self.goal_icon_id.is_none()
            && self.additional_notes.is_none()
            && self.goal_image.is_none()
    }
}

impl<'a> GoalService<'a> {
    /// Create a new goal service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new goal
    pub fn create(&self, new_goal: NewGoal) -> GoalStashResult<Goal> {
        let mut goal = Goal::new(new_goal.title.trim(), new_goal.target_amount, new_goal.deadline);
        goal.priority = new_goal.priority;
        goal.reminder = new_goal.reminder;
        goal.goal_icon_id = new_goal.goal_icon_id;
        goal.additional_notes = new_goal.additional_notes;
        goal.goal_image = new_goal.goal_image;

        goal.validate()
            .map_err(|e| GoalStashError::Validation(e.to_string()))?;

        let goal = self.storage.goals.upsert(goal)?;
        self.storage.goals.save()?;

        info!("Created goal {} ({})", goal.id, goal.title);
        Ok(goal)
    }

    /// Get a goal by ID
    pub fn get(&self, id: GoalId) -> GoalStashResult<Option<Goal>> {
        self.storage.goals.get(id)
    }

    /// Get a goal with its transactions, failing when it does not exist
    pub fn get_with_transactions(&self, id: GoalId) -> GoalStashResult<GoalWithTransactions> {
        self.storage
            .goal_with_transactions(id)?
            .ok_or_else(|| GoalStashError::goal_not_found(id.to_string()))
    }

    /// Find a goal by ID (`7` or `goal-7`) or by title
    pub fn find(&self, identifier: &str) -> GoalStashResult<Option<Goal>> {
        if let Ok(id) = identifier.parse::<GoalId>() {
            if let Some(goal) = self.storage.goals.get(id)? {
                return Ok(Some(goal));
            }
        }

        self.storage.goals.find_by_title(identifier)
    }

    /// Like [`find`](Self::find), but a missing goal is an error
    pub fn resolve(&self, identifier: &str) -> GoalStashResult<Goal> {
        self.find(identifier)?
            .ok_or_else(|| GoalStashError::goal_not_found(identifier))
    }

    /// Get goals with their transactions
    pub fn list(&self, include_archived: bool) -> GoalStashResult<Vec<GoalWithTransactions>> {
        let mut result = Vec::new();
        for goal in self.storage.goals.get_all()? {
            if goal.archived && !include_archived {
                continue;
            }
            let transactions = self.storage.transactions.get_by_goal(goal.id)?;
            result.push(GoalWithTransactions::new(goal, transactions));
        }
        Ok(result)
    }

    /// Apply changes to a goal
    pub fn edit(&self, id: GoalId, edit: GoalEdit) -> GoalStashResult<Goal> {
        let mut goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalStashError::goal_not_found(id.to_string()))?;

        if let Some(title) = edit.title {
            goal.title = title.trim().to_string();
        }
        if let Some(target_amount) = edit.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(deadline) = edit.deadline {
            goal.deadline = deadline;
        }
        if let Some(priority) = edit.priority {
            goal.priority = priority;
        }
        if let Some(reminder) = edit.reminder {
            goal.reminder = reminder;
        }
        if let Some(icon) = edit.goal_icon_id {
            goal.goal_icon_id = icon;
        }
        if let Some(notes) = edit.additional_notes {
            goal.additional_notes = notes;
        }
        if let Some(image) = edit.goal_image {
            goal.goal_image = image;
        }

        goal.validate()
            .map_err(|e| GoalStashError::Validation(e.to_string()))?;

        let goal = self.storage.goals.upsert(goal)?;
        self.storage.goals.save()?;
        Ok(goal)
    }

    /// Archive or unarchive a goal
    pub fn set_archived(&self, id: GoalId, archived: bool) -> GoalStashResult<Goal> {
        let mut goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalStashError::goal_not_found(id.to_string()))?;

        if goal.archived == archived {
            let state = if archived { "archived" } else { "active" };
            return Err(GoalStashError::Validation(format!(
                "Goal '{}' is already {}",
                goal.title, state
            )));
        }

        goal.archived = archived;
        let goal = self.storage.goals.upsert(goal)?;
        self.storage.goals.save()?;
        Ok(goal)
    }

    /// Delete a goal and all of its transactions
    ///
    /// Returns the deleted goal and how many transactions went with it.
    pub fn delete(&self, id: GoalId) -> GoalStashResult<(Goal, usize)> {
        let goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalStashError::goal_not_found(id.to_string()))?;

        let removed = self.storage.transactions.delete_by_goal(id)?;
        self.storage.goals.delete(id)?;
        self.storage.save_all()?;

        info!("Deleted goal {} with {} transactions", id, removed);
        Ok((goal, removed))
    }

    /// Record a deposit; `timestamp` defaults to now
    pub fn deposit(
        &self,
        id: GoalId,
        amount: f64,
        notes: &str,
        timestamp: Option<i64>,
    ) -> GoalStashResult<Transaction> {
        self.record(Transaction::deposit(id, amount, notes), timestamp)
    }

    /// Record a withdrawal; cannot take out more than is saved
    pub fn withdraw(
        &self,
        id: GoalId,
        amount: f64,
        notes: &str,
        timestamp: Option<i64>,
    ) -> GoalStashResult<Transaction> {
        self.record(Transaction::withdraw(id, amount, notes), timestamp)
    }

    fn record(&self, mut txn: Transaction, timestamp: Option<i64>) -> GoalStashResult<Transaction> {
        let (id, amount) = (txn.owner_goal_id, txn.amount);
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GoalStashError::Validation(format!(
                "Amount must be greater than zero (got {})",
                amount
            )));
        }

        let aggregate = self.get_with_transactions(id)?;
        if txn.transaction_type == TransactionType::Withdraw && amount > aggregate.saved_amount() {
            return Err(GoalStashError::Validation(format!(
                "Cannot withdraw {:.2}: only {:.2} saved for '{}'",
                amount,
                aggregate.saved_amount(),
                aggregate.goal.title
            )));
        }

        if let Some(timestamp) = timestamp {
            txn.timestamp = timestamp;
        }

        let txn = self.storage.transactions.upsert(txn)?;
        self.storage.transactions.save()?;

        info!(
            "Recorded {} of {} for goal {}",
            txn.transaction_type, txn.amount, id
        );
        Ok(txn)
    }

    /// Delete a single transaction
    pub fn delete_transaction(&self, id: TransactionId) -> GoalStashResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| GoalStashError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;
        Ok(txn)
    }
}
