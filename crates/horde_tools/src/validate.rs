//! Data validation utilities.
//!
//! Unlike the runtime loader, validation is strict: every table file must
//! be present and parse, and the assembled data must pass
//! [`GameData::validate`].

use std::fs;
use std::path::Path;

use horde_core::config::SimulationConfig;
use horde_core::data::{parse_table, GameData, ItemTable, UpgradeTable, WeaponTable, ZombieTable};
use horde_core::error::GameError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Table files expected in a data directory.
pub const TABLE_FILES: [&str; 5] = [
    "weapons.ron",
    "zombies.ron",
    "items.ron",
    "upgrades.ron",
    "config.ron",
];

/// Validation failure.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The path is not a directory.
    #[error("Data directory not found: {0}")]
    DirectoryNotFound(String),
    /// Filesystem failure.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// RON encoding failed during export.
    #[error("Failed to encode '{file}': {message}")]
    Encode {
        /// Table file.
        file: String,
        /// Error message.
        message: String,
    },
    /// One or more tables are missing, malformed or inconsistent.
    #[error("{} problem(s):\n  {}", .0.len(), .0.join("\n  "))]
    Invalid(Vec<String>),
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str, problems: &mut Vec<String>) -> Option<T> {
    let path = dir.join(file);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            problems.push(format!("{file}: {e}"));
            return None;
        }
    };
    match parse_table(file, &contents) {
        Ok(table) => {
            tracing::debug!(file, "parsed");
            Some(table)
        }
        Err(e) => {
            problems.push(e.to_string());
            None
        }
    }
}

/// Validate all RON data files in a directory.
///
/// # Errors
///
/// Returns every problem found, not just the first.
pub fn validate_data_directory(path: &Path) -> Result<GameData, ValidateError> {
    if !path.is_dir() {
        return Err(ValidateError::DirectoryNotFound(path.display().to_string()));
    }
    let mut problems = Vec::new();
    let weapons: Option<WeaponTable> = read_table(path, "weapons.ron", &mut problems);
    let zombies: Option<ZombieTable> = read_table(path, "zombies.ron", &mut problems);
    let items: Option<ItemTable> = read_table(path, "items.ron", &mut problems);
    let upgrades: Option<UpgradeTable> = read_table(path, "upgrades.ron", &mut problems);
    let _config: Option<SimulationConfig> = read_table(path, "config.ron", &mut problems);

    let (Some(weapons), Some(zombies), Some(items), Some(upgrades)) =
        (weapons, zombies, items, upgrades)
    else {
        return Err(ValidateError::Invalid(problems));
    };

    let data = GameData::new(weapons, zombies, items, upgrades);
    match data.validate() {
        Ok(()) if problems.is_empty() => {
            tracing::info!(weapons = data.weapons.len(), "data tables valid");
            Ok(data)
        }
        Ok(()) => Err(ValidateError::Invalid(problems)),
        Err(GameError::InvalidData(errors)) => {
            problems.extend(errors);
            Err(ValidateError::Invalid(problems))
        }
        Err(other) => {
            problems.push(other.to_string());
            Err(ValidateError::Invalid(problems))
        }
    }
}

fn write_table<T: Serialize>(dir: &Path, file: &str, table: &T) -> Result<(), ValidateError> {
    let config = ron::ser::PrettyConfig::new().depth_limit(4);
    let text = ron::ser::to_string_pretty(table, config).map_err(|e| ValidateError::Encode {
        file: file.to_string(),
        message: e.to_string(),
    })?;
    let path = dir.join(file);
    fs::write(&path, text).map_err(|source| ValidateError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write the built-in tables to `dir`, creating it if needed.
///
/// # Errors
///
/// Fails on IO or encoding errors.
pub fn export_builtin(dir: &Path) -> Result<(), ValidateError> {
    fs::create_dir_all(dir).map_err(|source| ValidateError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    write_table(dir, "weapons.ron", &WeaponTable::default())?;
    write_table(dir, "zombies.ron", &ZombieTable::default())?;
    write_table(dir, "items.ron", &ItemTable::default())?;
    write_table(dir, "upgrades.ron", &UpgradeTable::default())?;
    write_table(dir, "config.ron", &SimulationConfig::default())?;
    tracing::info!(dir = %dir.display(), "built-in tables exported");
    Ok(())
}
