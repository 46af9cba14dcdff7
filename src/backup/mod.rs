//! Backup system for goalstash
//!
//! Provides rolling backups with configurable retention policies and restore
//! functionality.
//!
//! # Architecture
//!
//! - `BackupManager`: creates backups from a [`GoalStore`](crate::storage::GoalStore)
//!   and enforces retention
//! - `RestoreManager`: validates backups and restores them into a store
//!
//! # Backup Format
//!
//! Backups are JSON or CSV documents produced by [`crate::exchange`], named
//! `backup-YYYYMMDD-HHMMSS-mmm.{json|csv}`.
//!
//! # Retention Policy
//!
//! By default, the system keeps:
//! - 30 daily backups
//! - 12 monthly backups (first backup of each month)
//!
//! # Example
//!
//! ```rust,ignore
//! use goalstash::backup::{BackupManager, RestoreManager};
//! use goalstash::config::{paths::AppPaths, settings::BackupRetention};
//! use goalstash::exchange::BackupFormat;
//! use goalstash::storage::Storage;
//!
//! let paths = AppPaths::new()?;
//! let storage = Storage::new(paths.clone())?;
//! storage.load_all()?;
//!
//! let backup_manager = BackupManager::new(&paths, BackupRetention::default());
//! let (backup_path, _deleted) =
//!     backup_manager.create_backup_with_retention(&storage, BackupFormat::Csv)?;
//!
//! // Later, restore from backup
//! let restore_manager = RestoreManager::new(&paths);
//! let result = restore_manager.restore_from_file(&storage, &backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupInfo, BackupManager};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
