mod repository;

pub use repository::*;

/// SQL migration for the sales ledger
pub const MIGRATION_001_SALES: &str = include_str!("migrations/001_sales.sql");
