//! Storage layer for goalstash
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation, plus the [`GoalStore`] seam the backup orchestrator works
//! against.

pub mod file_io;
pub mod goals;
pub mod transactions;

pub use file_io::{read_json, write_json_atomic, write_text_atomic};
pub use goals::GoalRepository;
pub use transactions::TransactionRepository;

use tracing::{debug, info};

use crate::config::paths::AppPaths;
use crate::error::GoalStashError;
use crate::models::{GoalId, GoalWithTransactions, TransactionId};

/// The store operations backups need
pub trait GoalStore {
    /// Every goal with its transactions, goals in id order
    fn goals_with_transactions(&self) -> Result<Vec<GoalWithTransactions>, GoalStashError>;

    /// Insert goals and their transactions under fresh identifiers
    ///
    /// Incoming ids are ignored so imported data never collides with
    /// existing rows. Returns the ids the goals were stored under.
    fn insert_goal_with_transactions(
        &self,
        data: Vec<GoalWithTransactions>,
    ) -> Result<Vec<GoalId>, GoalStashError>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: AppPaths,
    pub goals: GoalRepository,
    pub transactions: TransactionRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: AppPaths) -> Result<Self, GoalStashError> {
        paths.ensure_directories()?;

        Ok(Self {
            goals: GoalRepository::new(paths.goals_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), GoalStashError> {
        self.goals.load()?;
        self.transactions.load()?;
        debug!(
            "Loaded {} goals and {} transactions",
            self.goals.count()?,
            self.transactions.count()?
        );
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), GoalStashError> {
        self.goals.save()?;
        self.transactions.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// One goal with its transactions
    pub fn goal_with_transactions(
        &self,
        id: GoalId,
    ) -> Result<Option<GoalWithTransactions>, GoalStashError> {
        match self.goals.get(id)? {
            Some(goal) => {
                let transactions = self.transactions.get_by_goal(id)?;
                Ok(Some(GoalWithTransactions::new(goal, transactions)))
            }
            None => Ok(None),
        }
    }
}

impl GoalStore for Storage {
    fn goals_with_transactions(&self) -> Result<Vec<GoalWithTransactions>, GoalStashError> {
        self.goals
            .get_all()?
            .into_iter()
            .map(|goal| {
                let transactions = self.transactions.get_by_goal(goal.id)?;
                Ok(GoalWithTransactions::new(goal, transactions))
            })
            .collect()
    }

    fn insert_goal_with_transactions(
        &self,
        data: Vec<GoalWithTransactions>,
    ) -> Result<Vec<GoalId>, GoalStashError> {
        let mut inserted = Vec::with_capacity(data.len());

        for GoalWithTransactions {
            mut goal,
            transactions,
        } in data
        {
            goal.id = GoalId::UNASSIGNED;
            let stored = self.goals.upsert(goal)?;

            for mut txn in transactions {
                txn.id = TransactionId::UNASSIGNED;
                txn.owner_goal_id = stored.id;
                self.transactions.upsert(txn)?;
            }

            inserted.push(stored.id);
        }

        self.save_all()?;
        info!("Inserted {} goals", inserted.len());
        Ok(inserted)
    }
}
