use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{Breakdown, LedgerEntry, Sale, SaleId, TaxRegime, LEDGER_TIMESTAMP_FORMAT};

use super::MIGRATION_001_SALES;

const SALE_COLUMNS: &str = "id, recorded_at, customer, phone, carat, weight_grams, rate_per_gram, \
    gold_value_cents, making_charge, discount, taxable_value_cents, gst_type, gst_rate, \
    cgst_cents, sgst_cents, igst_cents, gst_total_cents, grand_total_cents, invoice_file";

/// Repository for the sales ledger.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database by URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_SALES)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Append a sale to the ledger and return its row id.
    pub async fn append_sale(&self, entry: &LedgerEntry) -> Result<SaleId> {
        let sale = &entry.sale;
        let b = &entry.breakdown;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (recorded_at, customer, phone, carat, weight_grams, rate_per_gram,
                gold_value_cents, making_charge, discount, taxable_value_cents, gst_type, gst_rate,
                cgst_cents, sgst_cents, igst_cents, gst_total_cents, grand_total_cents, invoice_file)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.recorded_at.format(LEDGER_TIMESTAMP_FORMAT).to_string())
        .bind(&sale.customer)
        .bind(&sale.phone)
        .bind(i64::from(sale.carat))
        .bind(sale.weight_grams)
        .bind(sale.rate_per_gram)
        .bind(b.gold_value)
        .bind(sale.making_charge)
        .bind(sale.discount)
        .bind(b.taxable_value)
        .bind(sale.regime.label())
        .bind(sale.gst_rate)
        .bind(b.cgst)
        .bind(b.sgst)
        .bind(b.igst)
        .bind(b.tax_total)
        .bind(b.grand_total)
        .bind(&entry.invoice_file)
        .execute(&self.pool)
        .await
        .context("Failed to append sale")?;

        let id = result.last_insert_rowid();
        debug!(sale_id = id, "appended ledger row");
        Ok(id)
    }

    /// Record the invoice file name on a row whose name is still empty.
    pub async fn set_invoice_file(&self, id: SaleId, invoice_file: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE sales SET invoice_file = ? WHERE id = ? AND invoice_file = ''")
                .bind(invoice_file)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update invoice file")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Sale #{} not found or already has an invoice file", id);
        }
        debug!(sale_id = id, invoice_file, "back-filled invoice file");
        Ok(())
    }

    /// Get a sale by row id.
    pub async fn get_sale(&self, id: SaleId) -> Result<Option<LedgerEntry>> {
        let query = format!("SELECT {} FROM sales WHERE id = ?", SALE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch sale")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    /// The most recently appended sale.
    pub async fn latest_sale(&self) -> Result<Option<LedgerEntry>> {
        let query = format!("SELECT {} FROM sales ORDER BY id DESC LIMIT 1", SALE_COLUMNS);
        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch latest sale")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    /// List sales in append order. With a limit, only the most recent ones.
    pub async fn list_sales(&self, limit: Option<usize>) -> Result<Vec<LedgerEntry>> {
        let query = match limit {
            Some(lim) => format!(
                "SELECT * FROM (SELECT {} FROM sales ORDER BY id DESC LIMIT {}) ORDER BY id",
                SALE_COLUMNS, lim
            ),
            None => format!("SELECT {} FROM sales ORDER BY id", SALE_COLUMNS),
        };

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Sales whose invoice file name was never filled in.
    pub async fn sales_missing_invoice(&self) -> Result<Vec<LedgerEntry>> {
        let query = format!(
            "SELECT {} FROM sales WHERE invoice_file = '' ORDER BY id",
            SALE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales missing an invoice")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Count ledger rows.
    pub async fn count_sales(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM sales")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count sales")?;
        Ok(row.get("count"))
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let recorded_at_str: String = row.get("recorded_at");
        let gst_type: String = row.get("gst_type");
        let carat: i64 = row.get("carat");
        let carat = u8::try_from(carat).context("Invalid carat")?;

        let sale = Sale {
            customer: row.get("customer"),
            phone: row.get("phone"),
            carat,
            weight_grams: row.get("weight_grams"),
            rate_per_gram: row.get("rate_per_gram"),
            making_charge: row.get("making_charge"),
            discount: row.get("discount"),
            gst_rate: row.get("gst_rate"),
            regime: TaxRegime::from_label(&gst_type)
                .ok_or_else(|| anyhow::anyhow!("Invalid GST type: {}", gst_type))?,
        };

        let breakdown = Breakdown {
            purity: f64::from(carat) / 24.0,
            gold_value: row.get("gold_value_cents"),
            taxable_value: row.get("taxable_value_cents"),
            tax_total: row.get("gst_total_cents"),
            cgst: row.get("cgst_cents"),
            sgst: row.get("sgst_cents"),
            igst: row.get("igst_cents"),
            grand_total: row.get("grand_total_cents"),
        };

        Ok(LedgerEntry {
            id: row.get("id"),
            recorded_at: NaiveDateTime::parse_from_str(&recorded_at_str, LEDGER_TIMESTAMP_FORMAT)
                .context("Invalid recorded_at timestamp")?,
            sale,
            breakdown,
            invoice_file: row.get("invoice_file"),
        })
    }
}
