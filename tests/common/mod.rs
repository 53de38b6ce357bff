// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use kanak::application::SalesService;
use kanak::config::Settings;
use kanak::domain::RawSale;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Settings pointing at a ledger and invoices directory inside `temp`
pub fn test_settings(temp: &TempDir) -> Settings {
    Settings::new(
        temp.path().join("sales.db"),
        temp.path().join("invoices"),
    )
}

/// Helper to create a test service with a temporary ledger
pub async fn test_service() -> Result<(SalesService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = SalesService::open(&test_settings(&temp_dir)).await?;
    Ok((service, temp_dir))
}

/// Helper to build a local timestamp
pub fn at(date_str: &str, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

/// 22 carat, 10 g at 600/g, making 500, discount 200, 3% intra-state GST.
/// Grand total 5974.00.
pub fn sample_sale() -> RawSale {
    RawSale {
        customer: "Asha Rao".into(),
        phone: "9876543210".into(),
        rate_per_gram: "600".into(),
        carat: "22".into(),
        weight_grams: "10".into(),
        making_charge: "500".into(),
        discount: "200".into(),
        gst_rate: "3".into(),
        gst_type: "Intra-state (CGST+SGST)".into(),
    }
}

/// Sorted file names in a directory; empty when the directory is missing
pub fn files_in(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
