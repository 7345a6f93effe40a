//! Table loading for the headless shell.
//!
//! Reads the RON tables from a data directory. A missing file falls back to
//! the built-in table with a warning; a file that exists but does not parse
//! or validate is an error.

use std::fs;
use std::path::{Path, PathBuf};

use horde_core::config::SimulationConfig;
use horde_core::data::{parse_table, GameData, ItemTable, UpgradeTable, WeaponTable, ZombieTable};
use horde_core::error::GameError;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur during data loading.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read a file.
    #[error("IO error reading '{path}': {message}")]
    Io {
        /// File path.
        path: String,
        /// OS error.
        message: String,
    },
    /// Directory not found.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    /// Parse or validation failure from the core.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Tables and tuning loaded from one directory.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    /// Simulation tuning.
    pub config: SimulationConfig,
    /// Static tables.
    pub data: GameData,
}

/// Resolve the default data directory.
///
/// Looks in order at:
/// 1. Environment variable `HORDE_DATA_DIR`
/// 2. `./assets/data` (repo root)
/// 3. `../../assets/data` (running from a crate directory)
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("HORDE_DATA_DIR") {
        let path = PathBuf::from(dir);
        if path.exists() {
            return Some(path);
        }
    }
    ["assets/data", "../../assets/data"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn load_or_default<T: DeserializeOwned + Default>(
    dir: &Path,
    file: &str,
) -> Result<T, DataLoadError> {
    let path = dir.join(file);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "table missing, using built-in defaults");
        return Ok(T::default());
    }
    let contents = fs::read_to_string(&path).map_err(|e| DataLoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let table = parse_table(&path.display().to_string(), &contents)?;
    tracing::debug!(path = %path.display(), "table loaded");
    Ok(table)
}

/// Load and validate every table under `dir`.
pub fn load_data_dir(dir: &Path) -> Result<DataSet, DataLoadError> {
    if !dir.is_dir() {
        return Err(DataLoadError::DirectoryNotFound(dir.display().to_string()));
    }
    let weapons: WeaponTable = load_or_default(dir, "weapons.ron")?;
    let zombies: ZombieTable = load_or_default(dir, "zombies.ron")?;
    let items: ItemTable = load_or_default(dir, "items.ron")?;
    let upgrades: UpgradeTable = load_or_default(dir, "upgrades.ron")?;
    let config: SimulationConfig = load_or_default(dir, "config.ron")?;

    let data = GameData::new(weapons, zombies, items, upgrades);
    data.validate()?;
    tracing::info!(
        dir = %dir.display(),
        weapons = data.weapons.len(),
        zombies = data.zombies.zombies.len(),
        "game data loaded"
    );
    Ok(DataSet { config, data })
}

/// Load from `dir`, or from the default directory, or fall back to the
/// built-in tables.
pub fn load_or_builtin(dir: Option<&Path>) -> Result<DataSet, DataLoadError> {
    match dir.map(Path::to_path_buf).or_else(default_data_dir) {
        Some(dir) => load_data_dir(&dir),
        None => {
            tracing::info!("no data directory found, using built-in tables");
            Ok(DataSet::default())
        }
    }
}
