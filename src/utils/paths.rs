//! Path Utilities
//!
//! Resolves the application directory (~/.mentor/) and the files inside it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Mentor directory (~/.mentor/)
pub fn mentor_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".mentor"))
}

/// Get the config file path (~/.mentor/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(mentor_dir()?.join("config.json"))
}

/// Get the database file path (~/.mentor/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(mentor_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Mentor directory, creating if it doesn't exist
pub fn ensure_mentor_dir() -> AppResult<PathBuf> {
    let path = mentor_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
