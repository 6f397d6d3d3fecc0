// ⚙️ Configuration - paths, separators and thresholds as data
//
// Loaded from a JSON file. Every field has a default so an empty object
// (or no file at all) is a valid configuration.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "PALI_FAMILIES_CONFIG";

/// Environment variable overriding `db_path`
pub const DB_ENV: &str = "PALI_FAMILIES_DB";

/// Config file picked up from the working directory when no env var is set
pub const DEFAULT_CONFIG_FILE: &str = "families.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding headwords and groups
    pub db_path: PathBuf,

    /// Flashcard TSV for compound families (None = no export)
    pub compound_tsv_path: Option<PathBuf>,

    /// Flashcard TSV for sets (None = no export)
    pub set_tsv_path: Option<PathBuf>,

    /// Separator inside `family_compound`
    pub compound_separator: String,

    /// Separator inside `family_set`
    pub set_separator: String,

    /// Sets with fewer members are reported
    pub min_set_members: usize,

    /// Flashcard rows whose HTML exceeds this many characters are dropped
    pub max_export_html_len: usize,

    /// Base forms must be strictly shorter than this to count as compounds
    pub max_compound_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("dpd.db"),
            compound_tsv_path: None,
            set_tsv_path: None,
            compound_separator: " ".to_string(),
            set_separator: ";".to_string(),
            min_set_members: 3,
            max_export_html_len: 131_072,
            max_compound_len: 30,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Config::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Resolve configuration the way the binaries do:
    /// 1. `PALI_FAMILIES_CONFIG` if set
    /// 2. `families.json` in the working directory if present
    /// 3. defaults
    ///
    /// `PALI_FAMILIES_DB` then overrides the database path.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Config::from_file(PathBuf::from(path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Config::default(),
        };

        if let Some(db_path) = env::var_os(DB_ENV) {
            config.db_path = PathBuf::from(db_path);
        }

        Ok(config)
    }
}
