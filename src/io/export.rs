use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::SalesService;
use crate::domain::{format_cents, Cents, LedgerEntry, LEDGER_HEADER, LEDGER_TIMESTAMP_FORMAT};

/// Full ledger dump for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: NaiveDateTime,
    pub sales: Vec<LedgerEntry>,
}

/// Exporter for writing the sales ledger out in tabular or JSON form
pub struct Exporter<'a> {
    service: &'a SalesService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a SalesService) -> Self {
        Self { service }
    }

    /// Export the ledger as CSV with the fixed 18-column header
    pub async fn export_ledger_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let sales = self.service.list_sales(None).await?;
        write_ledger_csv(writer, &sales)
    }

    /// Export the whole ledger as a JSON snapshot
    pub async fn export_ledger_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let sales = self.service.list_sales(None).await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Local::now().naive_local(),
            sales,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write ledger rows in the sales-sheet layout. Zero tax components are left
/// blank, as on the shop's original sheet.
pub fn write_ledger_csv<W: Write>(writer: W, sales: &[LedgerEntry]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(LEDGER_HEADER)?;

    let mut count = 0;
    for entry in sales {
        let sale = &entry.sale;
        let b = &entry.breakdown;

        csv_writer.write_record(&[
            entry.recorded_at.format(LEDGER_TIMESTAMP_FORMAT).to_string(),
            sale.customer.clone(),
            sale.phone.clone(),
            sale.carat.to_string(),
            sale.weight_grams.to_string(),
            sale.rate_per_gram.to_string(),
            format_cents(b.gold_value),
            sale.making_charge.to_string(),
            sale.discount.to_string(),
            format_cents(b.taxable_value),
            sale.regime.label().to_string(),
            sale.gst_rate.to_string(),
            blank_if_zero(b.cgst),
            blank_if_zero(b.sgst),
            blank_if_zero(b.igst),
            format_cents(b.tax_total),
            format_cents(b.grand_total),
            entry.invoice_file.clone(),
        ])?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

fn blank_if_zero(cents: Cents) -> String {
    if cents == 0 {
        String::new()
    } else {
        format_cents(cents)
    }
}
