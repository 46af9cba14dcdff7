//! Backup restoration for goalstash
//!
//! Reads JSON or CSV backups, validates them, and inserts their goals into a
//! store. A backup is parsed completely before anything is inserted, so a
//! malformed file leaves the store untouched.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::config::paths::AppPaths;
use crate::error::{GoalStashError, GoalStashResult};
use crate::exchange::{self, BackupFormat, BackupPayload, CURRENT_SCHEMA_VERSION};
use crate::models::GoalId;
use crate::storage::GoalStore;

/// Handles restoring from backups
pub struct RestoreManager {
    backup_dir: PathBuf,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
        }
    }

    /// Resolve a backup given either as a path or as a name in the backup directory
    pub fn resolve(&self, backup: &str) -> GoalStashResult<PathBuf> {
        let direct = PathBuf::from(backup);
        if direct.is_file() {
            return Ok(direct);
        }

        let in_backup_dir = self.backup_dir.join(backup);
        if in_backup_dir.is_file() {
            return Ok(in_backup_dir);
        }

        Err(GoalStashError::backup_not_found(backup))
    }

    /// Read and parse a backup file
    ///
    /// The format comes from the file extension, falling back to sniffing the
    /// contents.
    pub fn read_backup(&self, backup_path: &Path) -> GoalStashResult<(BackupFormat, BackupPayload)> {
        let contents = fs::read_to_string(backup_path)
            .map_err(|e| GoalStashError::Io(format!("Failed to read backup file: {}", e)))?;

        let format = backup_path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(BackupFormat::from_extension)
            .or_else(|| exchange::detect_format(&contents))
            .ok_or_else(|| {
                GoalStashError::Backup(format!(
                    "Unrecognized backup format: {}",
                    backup_path.display()
                ))
            })?;

        let payload = exchange::deserialize(&contents, format)?;
        Ok((format, payload))
    }

    /// Insert every goal of a backup into the store
    ///
    /// Goals are added alongside existing data under fresh identifiers.
    pub fn restore_from_file<S: GoalStore + ?Sized>(
        &self,
        store: &S,
        backup_path: &Path,
    ) -> GoalStashResult<RestoreResult> {
        let (format, payload) = self.read_backup(backup_path)?;

        let transactions_restored = payload.transaction_count();
        let schema_version = payload.version;
        let backup_date = millis_to_datetime(payload.timestamp);

        let goal_ids = store.insert_goal_with_transactions(payload.data)?;
        info!(
            "Restored {} goals and {} transactions from {}",
            goal_ids.len(),
            transactions_restored,
            backup_path.display()
        );

        Ok(RestoreResult {
            format,
            schema_version,
            backup_date,
            goal_ids,
            transactions_restored,
        })
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> GoalStashResult<ValidationResult> {
        let (format, payload) = self.read_backup(backup_path)?;

        let invalid_goals = payload
            .data
            .iter()
            .filter(|g| g.goal.validate().is_err())
            .count();
        if invalid_goals > 0 {
            warn!(
                "{} goals in {} would fail validation if edited",
                invalid_goals,
                backup_path.display()
            );
        }

        Ok(ValidationResult {
            format,
            schema_version: payload.version,
            backup_date: millis_to_datetime(payload.timestamp),
            goal_count: payload.goal_count(),
            transaction_count: payload.transaction_count(),
            invalid_goals,
        })
    }
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Result of a restore operation
#[derive(Debug)]
pub struct RestoreResult {
    pub format: BackupFormat,
    /// Schema version declared by the backup
    pub schema_version: u32,
    /// Date the backup was created
    pub backup_date: Option<DateTime<Utc>>,
    /// Ids the restored goals were stored under
    pub goal_ids: Vec<GoalId>,
    pub transactions_restored: usize,
}

impl RestoreResult {
    pub fn goals_restored(&self) -> usize {
        self.goal_ids.len()
    }

    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        format!(
            "Restored {} goals and {} transactions",
            self.goals_restored(),
            self.transactions_restored
        )
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    pub format: BackupFormat,
    /// Schema version of the backup
    pub schema_version: u32,
    /// Date the backup was created
    pub backup_date: Option<DateTime<Utc>>,
    pub goal_count: usize,
    pub transaction_count: usize,
    /// Goals that would be rejected by the goal service (e.g. zero target)
    pub invalid_goals: usize,
}

impl ValidationResult {
    /// Whether restoring would need a schema upgrade
    pub fn needs_upgrade(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION
    }

    /// Get a summary of the backup contents
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} backup (v{}): {} goals, {} transactions",
            self.format, self.schema_version, self.goal_count, self.transaction_count
        );
        if self.needs_upgrade() {
            summary.push_str(&format!(", upgraded to v{} on restore", CURRENT_SCHEMA_VERSION));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::manager::BackupManager;
    use crate::config::settings::BackupRetention;
    use crate::models::{Goal, Transaction, TransactionType};
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn create_test_env() -> (RestoreManager, BackupManager, Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = AppPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();

        let backup_manager = BackupManager::new(&paths, BackupRetention::default());
        let restore_manager = RestoreManager::new(&paths);

        (restore_manager, backup_manager, storage, temp_dir)
    }

    fn seed(storage: &Storage) {
        let goal = storage.goals.upsert(Goal::new("Laptop", 1000.0, 0)).unwrap();
        storage
            .transactions
            .upsert(Transaction::new(goal.id, TransactionType::Deposit, 1, 250.0))
            .unwrap();
        storage.goals.upsert(Goal::new("Bike", 300.0, 0)).unwrap();
        storage.save_all().unwrap();
    }

    #[test]
    fn test_restore_appends_with_fresh_ids() {
        for format in [BackupFormat::Json, BackupFormat::Csv] {
            let (restore_manager, backup_manager, storage, _temp) = create_test_env();
            seed(&storage);
            let before = storage.goals.count().unwrap();
            let backup_path = backup_manager.create_backup(&storage, format).unwrap();

            let result = restore_manager.restore_from_file(&storage, &backup_path).unwrap();

            assert_eq!(result.format, format);
            assert_eq!(result.goals_restored(), 2);
            assert_eq!(result.transactions_restored, 1);
            assert_eq!(storage.goals.count().unwrap(), before + 2);
            assert!(result.goal_ids.iter().all(|id| id.value() > before as i64));
        }
    }

    #[test]
    fn test_validate_backup() {
        let (restore_manager, backup_manager, storage, _temp) = create_test_env();
        seed(&storage);

        let backup_path = backup_manager.create_backup(&storage, BackupFormat::Csv).unwrap();
        let result = restore_manager.validate_backup(&backup_path).unwrap();

        assert_eq!(result.format, BackupFormat::Csv);
        assert_eq!(result.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(result.goal_count, 2);
        assert_eq!(result.transaction_count, 1);
        assert!(result.backup_date.is_some());
        assert!(!result.needs_upgrade());
    }

    #[test]
    fn test_malformed_backup_leaves_store_untouched() {
        let (restore_manager, _backup_manager, storage, temp) = create_test_env();
        seed(&storage);

        let path = temp.path().join("broken.csv");
        fs::write(
            &path,
            "Schema Version,2\nTimestamp,0\n\
             Goal ID,Title,Target Amount,Deadline,Priority,Reminder,Goal Icon ID,Archived,Additional Notes,Transaction ID,Type,Timestamp,Amount,Notes\n\
             1,Laptop,1000.0,0,Normal,false,,false,,,,,,\n\
             1,,,,,,,,,1,Deposit,1,abc,\n",
        )
        .unwrap();

        let err = restore_manager.restore_from_file(&storage, &path).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(storage.goals.count().unwrap(), 2);
    }

    #[test]
    fn test_format_is_sniffed_without_extension() {
        let (restore_manager, _backup_manager, _storage, temp) = create_test_env();

        let path = temp.path().join("exported-backup");
        fs::write(&path, r#"{"version":2,"timestamp":0,"data":[]}"#).unwrap();
        let (format, payload) = restore_manager.read_backup(&path).unwrap();
        assert_eq!(format, BackupFormat::Json);
        assert!(payload.data.is_empty());

        let unknown = temp.path().join("mystery");
        fs::write(&unknown, "hello").unwrap();
        assert!(matches!(
            restore_manager.read_backup(&unknown),
            Err(GoalStashError::Backup(_))
        ));
    }

    #[test]
    fn test_resolve_by_name_or_path() {
        let (restore_manager, backup_manager, storage, _temp) = create_test_env();
        let path = backup_manager.create_backup(&storage, BackupFormat::Json).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(restore_manager.resolve(&name).unwrap(), path);
        assert_eq!(
            restore_manager.resolve(path.to_str().unwrap()).unwrap(),
            path
        );
        assert!(restore_manager.resolve("nope.json").unwrap_err().is_not_found());
    }

    #[test]
    fn test_summaries() {
        let validation = ValidationResult {
            format: BackupFormat::Json,
            schema_version: 1,
            backup_date: None,
            goal_count: 3,
            transaction_count: 7,
            invalid_goals: 0,
        };
        assert!(validation.needs_upgrade());
        assert!(validation.summary().contains("3 goals, 7 transactions"));
        assert!(validation.summary().contains("upgraded"));

        let restore = RestoreResult {
            format: BackupFormat::Csv,
            schema_version: 2,
            backup_date: None,
            goal_ids: vec![GoalId::new(4)],
            transactions_restored: 2,
        };
        assert_eq!(restore.summary(), "Restored 1 goals and 2 transactions");
    }
}
