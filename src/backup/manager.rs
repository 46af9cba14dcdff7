//! Backup manager for goalstash
//!
//! Handles rolling backups with configurable retention policies. Backups are
//! dated JSON or CSV documents in the backup directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::paths::AppPaths;
use crate::config::settings::BackupRetention;
use crate::error::{GoalStashError, GoalStashResult};
use crate::exchange::{self, BackupFormat, BackupPayload};
use crate::storage::{write_text_atomic, GoalStore};

const BACKUP_PREFIX: &str = "backup-";

/// Metadata about a backup
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// Format implied by the extension
    pub format: BackupFormat,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Whether this is the first backup of its month (kept longer)
    pub is_monthly: bool,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: &AppPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    /// Write every goal and its transactions to a new backup file
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup<S: GoalStore + ?Sized>(
        &self,
        store: &S,
        format: BackupFormat,
    ) -> GoalStashResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            GoalStashError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        let now = Utc::now();
        let filename = format!(
            "{}{}-{:03}.{}",
            BACKUP_PREFIX,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis(),
            format.extension()
        );
        let backup_path = self.backup_dir.join(&filename);
        if backup_path.exists() {
            return Err(GoalStashError::Backup(format!(
                "Backup {} already exists",
                filename
            )));
        }

        let payload = BackupPayload::with_timestamp(
            store.goals_with_transactions()?,
            now.timestamp_millis(),
        );
        let contents = exchange::serialize(&payload, format)?;
        write_text_atomic(&backup_path, &contents)?;

        info!(
            "Created {} backup {} ({} goals, {} transactions)",
            format,
            filename,
            payload.goal_count(),
            payload.transaction_count()
        );
        Ok(backup_path)
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> GoalStashResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            GoalStashError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                GoalStashError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        // The oldest backup of each calendar month is the monthly one
        backups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut months_seen = HashSet::new();
        for backup in &mut backups {
            let month = (backup.created_at.year(), backup.created_at.month());
            backup.is_monthly = months_seen.insert(month);
        }

        backups.reverse();
        Ok(backups)
    }

    /// Enforce retention policy by deleting old backups
    pub fn enforce_retention(&self) -> GoalStashResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        let (monthly, daily): (Vec<_>, Vec<_>) =
            backups.into_iter().partition(|b| b.is_monthly);

        for backup in daily.into_iter().skip(self.retention.daily_count as usize) {
            fs::remove_file(&backup.path).map_err(|e| {
                GoalStashError::Io(format!("Failed to delete old backup: {}", e))
            })?;
            debug!("Deleted old backup {}", backup.filename);
            deleted.push(backup.path);
        }

        for backup in monthly.into_iter().skip(self.retention.monthly_count as usize) {
            fs::remove_file(&backup.path).map_err(|e| {
                GoalStashError::Io(format!("Failed to delete old monthly backup: {}", e))
            })?;
            debug!("Deleted old monthly backup {}", backup.filename);
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention<S: GoalStore + ?Sized>(
        &self,
        store: &S,
        format: BackupFormat,
    ) -> GoalStashResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(store, format)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get a specific backup by filename
    pub fn get_backup(&self, filename: &str) -> GoalStashResult<Option<BackupInfo>> {
        if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
            return Err(GoalStashError::Backup(format!(
                "Invalid backup name: {}",
                filename
            )));
        }

        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == filename))
    }

    /// Get the most recent backup
    pub fn get_latest_backup(&self) -> GoalStashResult<Option<BackupInfo>> {
        let backups = self.list_backups()?;
        Ok(backups.into_iter().next())
    }
}

/// Build backup info from a file named `backup-YYYYMMDD-HHMMSS[-mmm].{json|csv}`
fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_str()?.to_string();
    let format = BackupFormat::from_extension(path.extension()?.to_str()?)?;

    let stem = path.file_stem()?.to_str()?;
    let created_at = parse_backup_timestamp(stem.strip_prefix(BACKUP_PREFIX)?)?;

    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        format,
        created_at,
        size_bytes: metadata.len(),
        is_monthly: false,
    })
}

/// Parse a backup timestamp from the filename date part
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    // YYYYMMDD-HHMMSS or YYYYMMDD-HHMMSS-mmm
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let year: i32 = date_part.get(0..4)?.parse().ok()?;
    let month: u32 = date_part.get(4..6)?.parse().ok()?;
    let day: u32 = date_part.get(6..8)?.parse().ok()?;
    let hour: u32 = time_part.get(0..2)?.parse().ok()?;
    let minute: u32 = time_part.get(2..4)?.parse().ok()?;
    let second: u32 = time_part.get(4..6)?.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    let datetime = chrono::NaiveDateTime::new(date, time);

    Some(DateTime::from_naive_utc_and_offset(datetime, Utc))
}
