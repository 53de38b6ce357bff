use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Breakdown, Sale};

pub type SaleId = i64;

/// Column headers of the sales ledger, in order.
pub const LEDGER_HEADER: [&str; 18] = [
    "DateTime",
    "Customer",
    "Phone",
    "Carat",
    "Weight(g)",
    "Rate_per_gram",
    "Gold_Value",
    "Making",
    "Discount",
    "Taxable_Value",
    "GST_Type",
    "GST_Rate(%)",
    "CGST",
    "SGST",
    "IGST",
    "GST_Total",
    "Grand_Total",
    "Invoice_File",
];

/// Format used for the ledger's DateTime column and the invoice date.
pub const LEDGER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the sales ledger.
///
/// Rows are append-only. The single permitted change is filling in
/// `invoice_file` once the invoice document exists; until then it is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Assigned by the repository on append; 0 before that
    pub id: SaleId,
    pub recorded_at: NaiveDateTime,
    pub sale: Sale,
    pub breakdown: Breakdown,
    pub invoice_file: String,
}

impl LedgerEntry {
    /// A fresh row awaiting its invoice file name.
    pub fn new(recorded_at: NaiveDateTime, sale: Sale, breakdown: Breakdown) -> Self {
        Self {
            id: 0,
            recorded_at,
            sale,
            breakdown,
            invoice_file: String::new(),
        }
    }

    /// Returns true once the invoice file name has been back-filled.
    pub fn has_invoice(&self) -> bool {
        !self.invoice_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{compute, TaxRegime};
    use chrono::NaiveDate;

    #[test]
    fn test_new_entry_has_no_invoice() {
        let sale = Sale {
            customer: "Asha Rao".into(),
            phone: "9876543210".into(),
            carat: 22,
            weight_grams: 10.0,
            rate_per_gram: 600.0,
            making_charge: 0.0,
            discount: 0.0,
            gst_rate: 3.0,
            regime: TaxRegime::Intrastate,
        };
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let breakdown = compute(&sale);
        let entry = LedgerEntry::new(at, sale, breakdown);

        assert_eq!(entry.id, 0);
        assert!(!entry.has_invoice());
        assert_eq!(
            entry.recorded_at.format(LEDGER_TIMESTAMP_FORMAT).to_string(),
            "2024-03-01 10:30:00"
        );
    }

    #[test]
    fn test_header_shape() {
        assert_eq!(LEDGER_HEADER.len(), 18);
        assert_eq!(LEDGER_HEADER[0], "DateTime");
        assert_eq!(LEDGER_HEADER[17], "Invoice_File");
    }
}
