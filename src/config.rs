use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ShopProfile;

/// Default ledger database file.
pub const DEFAULT_DATABASE: &str = "sales.db";
/// Default directory for generated invoices.
pub const DEFAULT_INVOICES_DIR: &str = "invoices";
/// File name of the tabular ledger written next to the database.
pub const LEDGER_EXPORT_FILE: &str = "sales.csv";

/// Where things live and who the shop is.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub invoices_dir: PathBuf,
    pub shop: ShopProfile,
}

impl Settings {
    pub fn new(database: impl Into<PathBuf>, invoices_dir: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            invoices_dir: invoices_dir.into(),
            shop: ShopProfile::default(),
        }
    }

    pub fn with_shop(mut self, shop: ShopProfile) -> Self {
        self.shop = shop;
        self
    }

    /// Path of the CSV ledger export kept beside the database.
    pub fn ledger_export_path(&self) -> PathBuf {
        match self.database.parent() {
            Some(dir) => dir.join(LEDGER_EXPORT_FILE),
            None => PathBuf::from(LEDGER_EXPORT_FILE),
        }
    }

    /// SQLite connection URL, creating the database file when missing.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database.display())
    }
}

/// Load a shop profile from a JSON file. Missing keys keep their defaults.
pub fn load_shop_profile(path: &Path) -> Result<ShopProfile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shop profile: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid shop profile: {}", path.display()))
}
