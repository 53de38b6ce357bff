use anyhow::Context;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::{
    compute, format_cents, validate, Breakdown, LedgerEntry, RawSale, Sale, SaleId, ShopProfile,
};
use crate::io::{render, InvoiceDocument, InvoiceStore};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the sale workflow over the ledger and the
/// invoice directory. This is the only entry point a front-end needs.
pub struct SalesService {
    repo: Repository,
    invoices: InvoiceStore,
    shop: ShopProfile,
}

/// Result of a completed sale
#[derive(Debug, Clone)]
pub struct Submission {
    pub sale_id: SaleId,
    pub invoice_path: PathBuf,
    pub invoice_file: String,
    pub breakdown: Breakdown,
    /// Set when the invoice exists but its name could not be recorded on the
    /// ledger row. The sale still counts as completed.
    pub backfill_error: Option<String>,
}

/// Priced sale that has not been recorded
#[derive(Debug, Clone)]
pub struct Quote {
    pub sale: Sale,
    pub breakdown: Breakdown,
    pub preview: InvoiceDocument,
}

/// Ledger health summary
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_sales: i64,
    /// Rows whose invoice file name was never filled in
    pub missing_invoice: Vec<LedgerEntry>,
    /// Rows naming an invoice file that is not in the invoices directory
    pub missing_files: Vec<LedgerEntry>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.missing_invoice.is_empty() && self.missing_files.is_empty()
    }
}

impl SalesService {
    pub fn new(repo: Repository, invoices: InvoiceStore, shop: ShopProfile) -> Self {
        Self {
            repo,
            invoices,
            shop,
        }
    }

    /// Open the ledger described by `settings`, creating it when missing.
    pub async fn open(settings: &Settings) -> Result<Self, AppError> {
        if let Some(dir) = settings.database.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }

        let repo = Repository::init(&settings.database_url()).await?;
        debug!(database = %settings.database.display(), "ledger opened");

        Ok(Self::new(
            repo,
            InvoiceStore::new(&settings.invoices_dir),
            settings.shop.clone(),
        ))
    }

    pub fn invoices(&self) -> &InvoiceStore {
        &self.invoices
    }

    pub fn shop(&self) -> &ShopProfile {
        &self.shop
    }

    // ========================
    // Sale workflow
    // ========================

    /// Validate, price and record a sale, then write its invoice.
    ///
    /// Steps stop at the first failure and nothing is rolled back. If the
    /// invoice cannot be written the ledger keeps a row with an empty invoice
    /// file name.
    pub async fn submit(
        &self,
        raw: &RawSale,
        issued_at: NaiveDateTime,
    ) -> Result<Submission, AppError> {
        let sale = validate(raw)?;
        let breakdown = compute(&sale);
        debug!(customer = %sale.customer, grand_total = %format_cents(breakdown.grand_total), "sale priced");

        let entry = LedgerEntry::new(issued_at, sale, breakdown);
        let sale_id = self
            .repo
            .append_sale(&entry)
            .await
            .map_err(AppError::Ledger)?;

        let document = render(&entry.sale, &breakdown, &self.shop, issued_at);
        let invoice_path = self
            .invoices
            .write(&document)
            .map_err(|cause| AppError::Invoice { sale_id, cause })?;
        debug!(sale_id, path = %invoice_path.display(), "invoice written");

        let backfill_error = match self
            .repo
            .set_invoice_file(sale_id, &document.file_name)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(sale_id, error = %e, "invoice written but ledger row not updated");
                Some(format!("{:#}", e))
            }
        };

        info!(
            sale_id,
            invoice = %document.file_name,
            grand_total = %format_cents(breakdown.grand_total),
            "sale recorded"
        );

        Ok(Submission {
            sale_id,
            invoice_path,
            invoice_file: document.file_name,
            breakdown,
            backfill_error,
        })
    }

    /// Validate and price a sale without writing anything.
    pub fn quote(&self, raw: &RawSale, issued_at: NaiveDateTime) -> Result<Quote, AppError> {
        let sale = validate(raw)?;
        let breakdown = compute(&sale);
        let preview = render(&sale, &breakdown, &self.shop, issued_at);
        Ok(Quote {
            sale,
            breakdown,
            preview,
        })
    }

    // ========================
    // Ledger queries
    // ========================

    /// Get one ledger row.
    pub async fn get_sale(&self, id: SaleId) -> Result<LedgerEntry, AppError> {
        self.repo
            .get_sale(id)
            .await?
            .ok_or(AppError::SaleNotFound(id))
    }

    /// The most recently recorded sale, if any.
    pub async fn latest_sale(&self) -> Result<Option<LedgerEntry>, AppError> {
        Ok(self.repo.latest_sale().await?)
    }

    /// List ledger rows in the order they were recorded.
    pub async fn list_sales(&self, limit: Option<usize>) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self.repo.list_sales(limit).await?)
    }

    /// Count ledger rows.
    pub async fn count_sales(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_sales().await?)
    }

    /// Report rows left without an invoice and invoices missing on disk.
    /// Nothing is repaired.
    pub async fn check(&self) -> Result<IntegrityReport, AppError> {
        let total_sales = self.repo.count_sales().await?;
        let missing_invoice = self.repo.sales_missing_invoice().await?;
        let missing_files = self
            .repo
            .list_sales(None)
            .await?
            .into_iter()
            .filter(|entry| {
                entry.has_invoice() && !self.invoices.dir().join(&entry.invoice_file).exists()
            })
            .collect();

        Ok(IntegrityReport {
            total_sales,
            missing_invoice,
            missing_files,
        })
    }
}
