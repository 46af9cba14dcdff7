//! Goal repository for JSON storage
//!
//! Manages loading and saving goals to goals.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::GoalStashError;
use crate::models::{Goal, GoalId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable goal data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    goals: Vec<Goal>,
}

/// Repository for goal persistence
pub struct GoalRepository {
    path: PathBuf,
    data: RwLock<HashMap<GoalId, Goal>>,
}

impl GoalRepository {
    /// Create a new goal repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load goals from disk
    pub fn load(&self) -> Result<(), GoalStashError> {
        let file_data: GoalData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for goal in file_data.goals {
            data.insert(goal.id, goal);
        }

        Ok(())
    }

    /// Save goals to disk
    pub fn save(&self) -> Result<(), GoalStashError> {
        let goals = self.get_all()?;
        write_json_atomic(&self.path, &GoalData { goals })
    }

    /// Get a goal by ID
    pub fn get(&self, id: GoalId) -> Result<Option<Goal>, GoalStashError> {
        let data = self
            .data
            .read()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all goals in id order
    pub fn get_all(&self) -> Result<Vec<Goal>, GoalStashError> {
        let data = self
            .data
            .read()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut goals: Vec<_> = data.values().cloned().collect();
        goals.sort_by_key(|g| g.id);
        Ok(goals)
    }

    /// Find a goal by title (case-insensitive)
    pub fn find_by_title(&self, title: &str) -> Result<Option<Goal>, GoalStashError> {
        let data = self
            .data
            .read()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let title = title.trim().to_lowercase();
        let mut matches: Vec<_> = data
            .values()
            .filter(|g| g.title.trim().to_lowercase() == title)
            .cloned()
            .collect();
        matches.sort_by_key(|g| g.id);
        Ok(matches.into_iter().next())
    }

    /// Insert or update a goal
    ///
    /// An unassigned id is replaced by the next free one; the stored goal is
    /// returned.
    pub fn upsert(&self, mut goal: Goal) -> Result<Goal, GoalStashError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if !goal.id.is_assigned() {
            goal.id = next_free_id(&data);
        }
        data.insert(goal.id, goal.clone());
        Ok(goal)
    }

    /// Delete a goal
    pub fn delete(&self, id: GoalId) -> Result<bool, GoalStashError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Id the next inserted goal will receive
    pub fn next_id(&self) -> Result<GoalId, GoalStashError> {
        let data = self
            .data
            .read()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(next_free_id(&data))
    }

    /// Count goals
    pub fn count(&self) -> Result<usize, GoalStashError> {
        let data = self
            .data
            .read()
            .map_err(|e| GoalStashError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

fn next_free_id(data: &HashMap<GoalId, Goal>) -> GoalId {
    data.keys()
        .max()
        .map(|id| id.next())
        .unwrap_or(GoalId::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, GoalRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("goals.json");
        let repo = GoalRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.next_id().unwrap(), GoalId::new(1));
    }

    #[test]
    fn test_upsert_assigns_ids() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let first = repo.upsert(Goal::new("Laptop", 1000.0, 0)).unwrap();
        let second = repo.upsert(Goal::new("Bike", 250.0, 0)).unwrap();

        assert_eq!(first.id, GoalId::new(1));
        assert_eq!(second.id, GoalId::new(2));
        assert_eq!(repo.get(second.id).unwrap().unwrap().title, "Bike");
    }

    #[test]
    fn test_upsert_updates_existing() {
        let (_temp_dir, repo) = create_test_repo();
        let mut goal = repo.upsert(Goal::new("Laptop", 1000.0, 0)).unwrap();
        goal.target_amount = 1200.0;
        repo.upsert(goal.clone()).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(goal.id).unwrap().unwrap().target_amount, 1200.0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let goal = repo.upsert(Goal::new("Laptop", 1000.0, 42)).unwrap();
        repo.save().unwrap();

        let repo2 = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.get(goal.id).unwrap(), Some(goal));
        assert_eq!(repo2.next_id().unwrap(), GoalId::new(2));
    }

    #[test]
    fn test_find_by_title() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Goal::new("Summer Trip", 800.0, 0)).unwrap();

        assert!(repo.find_by_title("summer trip").unwrap().is_some());
        assert!(repo.find_by_title("winter trip").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let goal = repo.upsert(Goal::new("Laptop", 1000.0, 0)).unwrap();

        assert!(repo.delete(goal.id).unwrap());
        assert!(!repo.delete(goal.id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
