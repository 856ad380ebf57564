//! Timestamped copies of the blog database.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use crate::db::SqliteStore;

const PREFIX: &str = "iiot_bay_database_backup_";

#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl BackupInfo {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Copy `db_path` into `backup_dir` and check the copy opens with its posts.
pub fn create(db_path: &Path, backup_dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    if !db_path.exists() {
        bail!("Database not found: {}", db_path.display());
    }
    fs::create_dir_all(backup_dir)
        .with_context(|| format!("Failed to create {}", backup_dir.display()))?;

    let target = backup_dir.join(format!("{PREFIX}{}.db", now.format("%Y%m%d_%H%M%S")));
    fs::copy(db_path, &target).with_context(|| {
        format!("Failed to copy {} to {}", db_path.display(), target.display())
    })?;

    let posts = SqliteStore::open(&target)
        .and_then(|s| s.count())
        .with_context(|| format!("Backup {} failed verification", target.display()))?;
    info!(path = %target.display(), posts, "backup created");
    Ok(target)
}

/// Every `.db` file in `backup_dir`, newest name first.
pub fn list(backup_dir: &Path) -> Result<Vec<BackupInfo>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }
    let mut backups = Vec::new();
    for entry in fs::read_dir(backup_dir)
        .with_context(|| format!("Failed to read {}", backup_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "db") {
            continue;
        }
        let meta = fs::metadata(&path)?;
        backups.push(BackupInfo {
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH).into(),
            path,
        });
    }
    backups.sort_by(|a, b| b.path.cmp(&a.path));
    Ok(backups)
}

/// Replace `db_path` with the named backup, after taking a safety backup of
/// the current database. Returns the safety backup's path.
pub fn restore(db_path: &Path, backup_dir: &Path, file_name: &str, now: DateTime<Local>) -> Result<PathBuf> {
    let source = backup_dir.join(file_name);
    if !source.is_file() {
        bail!("Backup not found: {}", source.display());
    }
    let safety = create(db_path, backup_dir, now).context("Safety backup failed, restore aborted")?;
    fs::copy(&source, db_path)
        .with_context(|| format!("Failed to restore {} to {}", source.display(), db_path.display()))?;
    info!(from = %source.display(), safety = %safety.display(), "database restored");
    Ok(safety)
}
