//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::GoalStashError;
use crate::models::{GoalId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: goal_id -> transaction_ids
    by_goal: RwLock<HashMap<GoalId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_goal: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the goal index
    pub fn load(&self) -> Result<(), GoalStashError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_goal = self.by_goal.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        by_goal.clear();

        for txn in file_data.transactions {
            by_goal.entry(txn.owner_goal_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), GoalStashError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, GoalStashError> {
        let data = self.data.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions in id order
    pub fn get_all(&self) -> Result<Vec<Transaction>, GoalStashError> {
        let data = self.data.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by_key(|t| t.id);
        Ok(transactions)
    }

    /// Get transactions for a goal, oldest first
    pub fn get_by_goal(&self, goal_id: GoalId) -> Result<Vec<Transaction>, GoalStashError> {
        let data = self.data.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let by_goal = self.by_goal.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let ids = by_goal.get(&goal_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut transactions: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id).cloned())
            .collect();
        transactions.sort_by_key(|t| (t.timestamp, t.id));
        Ok(transactions)
    }

    /// Insert or update a transaction
    ///
    /// An unassigned id is replaced by the next free one; the stored
    /// transaction is returned.
    pub fn upsert(&self, mut txn: Transaction) -> Result<Transaction, GoalStashError> {
        let mut data = self.data.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_goal = self.by_goal.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if !txn.id.is_assigned() {
            txn.id = next_free_id(&data);
        }

        // Remove from old index if updating
        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = by_goal.get_mut(&old.owner_goal_id) {
                ids.retain(|&id| id != txn.id);
            }
        }

        by_goal.entry(txn.owner_goal_id).or_default().push(txn.id);
        data.insert(txn.id, txn.clone());
        Ok(txn)
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, GoalStashError> {
        let mut data = self.data.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_goal = self.by_goal.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(txn) = data.remove(&id) {
            if let Some(ids) = by_goal.get_mut(&txn.owner_goal_id) {
                ids.retain(|&tid| tid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Delete every transaction of a goal, returning how many were removed
    pub fn delete_by_goal(&self, goal_id: GoalId) -> Result<usize, GoalStashError> {
        let mut data = self.data.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_goal = self.by_goal.write().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let ids = by_goal.remove(&goal_id).unwrap_or_default();
        Ok(ids.iter().filter(|id| data.remove(id).is_some()).count())
    }

    /// Id the next inserted transaction will receive
    pub fn next_id(&self) -> Result<TransactionId, GoalStashError> {
        let data = self.data.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(next_free_id(&data))
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, GoalStashError> {
        let data = self.data.read().map_err(|e| {
            GoalStashError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}

fn next_free_id(data: &HashMap<TransactionId, Transaction>) -> TransactionId {
    data.keys()
        .max()
        .map(|id| id.next())
        .unwrap_or(TransactionId::new(1))
}
