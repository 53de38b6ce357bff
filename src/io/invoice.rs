use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{
    format_cents, to_cents, Breakdown, Sale, ShopProfile, TaxRegime, LEDGER_TIMESTAMP_FORMAT,
};

/// Extension of generated invoice documents.
pub const INVOICE_EXTENSION: &str = "csv";

/// How strongly a row should stand out when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Strong,
    Strongest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub cells: Vec<String>,
    pub emphasis: Emphasis,
}

impl InvoiceRow {
    fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            emphasis: Emphasis::Normal,
        }
    }

    fn blank() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// A label/amount pair right-aligned under the Amount column.
    fn total(label: &str, amount: String) -> Self {
        Self::new(["", "", "", label]).with_cell(amount)
    }

    fn with_cell(mut self, cell: impl Into<String>) -> Self {
        self.cells.push(cell.into());
        self
    }

    fn emphasized(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

/// A rendered invoice, ready to be persisted or displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub file_name: String,
    pub issued_at: NaiveDateTime,
    pub rows: Vec<InvoiceRow>,
}

impl InvoiceDocument {
    /// Find the first row whose first non-empty cell is `label` and return
    /// the next non-empty cell.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows.iter().find_map(|row| {
            let mut cells = row.cells.iter().filter(|c| !c.is_empty());
            match cells.next() {
                Some(first) if first == label => cells.next().map(String::as_str),
                _ => None,
            }
        })
    }

    /// Plain-text layout for terminals. Emphasized rows get a rule above them.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            match row.emphasis {
                Emphasis::Normal => {}
                Emphasis::Strong => out.push_str(&format!("{}\n", "-".repeat(72))),
                Emphasis::Strongest => out.push_str(&format!("{}\n", "=".repeat(72))),
            }

            let mut line = String::new();
            for (i, cell) in row.cells.iter().enumerate() {
                if i == 0 {
                    line.push_str(&format!("{:<22}", cell));
                } else {
                    line.push_str(&format!("{:>13}", cell));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');

            if row.emphasis == Emphasis::Strongest {
                out.push_str(&format!("{}\n", "=".repeat(72)));
            }
        }
        out
    }
}

/// Invoice file name for a given issue time, unique to the second.
pub fn invoice_file_name(issued_at: NaiveDateTime) -> String {
    format!(
        "Invoice_{}.{}",
        issued_at.format("%Y%m%d_%H%M%S"),
        INVOICE_EXTENSION
    )
}

/// Render one sale as an itemized invoice. Pure: the only time input is
/// `issued_at`.
pub fn render(
    sale: &Sale,
    breakdown: &Breakdown,
    shop: &ShopProfile,
    issued_at: NaiveDateTime,
) -> InvoiceDocument {
    let mut rows = vec![
        InvoiceRow::new([shop.name.as_str()]).emphasized(Emphasis::Strong),
        InvoiceRow::new([shop.address.as_str()]),
        InvoiceRow::new([
            format!("Phone: {}", shop.phone),
            String::new(),
            format!("GSTIN: {}", shop.gstin),
        ]),
        InvoiceRow::blank(),
        InvoiceRow::new([
            "Invoice Date".to_string(),
            issued_at.format(LEDGER_TIMESTAMP_FORMAT).to_string(),
        ]),
        InvoiceRow::new(["Customer", sale.customer.as_str()]),
        InvoiceRow::new(["Phone", sale.phone.as_str()]),
        InvoiceRow::blank(),
        InvoiceRow::new([
            "Description",
            "Carat",
            "Weight (g)",
            "Rate per g (₹)",
            "Amount (₹)",
        ])
        .emphasized(Emphasis::Strong),
        InvoiceRow::new([
            "Gold Value".to_string(),
            sale.carat.to_string(),
            sale.weight_grams.to_string(),
            sale.rate_per_gram.to_string(),
            format_cents(breakdown.gold_value),
        ]),
        InvoiceRow::new(["Making Charges", "", "", ""])
            .with_cell(format_cents(to_cents(sale.making_charge))),
        InvoiceRow::new(["Discount", "", "", ""])
            .with_cell(format_cents(-to_cents(sale.discount).abs())),
        InvoiceRow::total("Taxable Value", format_cents(breakdown.taxable_value))
            .emphasized(Emphasis::Strong),
        InvoiceRow::blank(),
        InvoiceRow::new(["GST Type", sale.regime.label()]),
        InvoiceRow::new(["GST Rate (%)".to_string(), sale.gst_rate.to_string()]),
        InvoiceRow::blank(),
    ];

    match sale.regime {
        TaxRegime::Intrastate => {
            rows.push(InvoiceRow::new(["CGST".to_string(), format_cents(breakdown.cgst)]));
            rows.push(InvoiceRow::new(["SGST".to_string(), format_cents(breakdown.sgst)]));
        }
        TaxRegime::Interstate => {
            rows.push(InvoiceRow::new(["IGST".to_string(), format_cents(breakdown.igst)]));
        }
    }

    rows.extend([
        InvoiceRow::blank(),
        InvoiceRow::total("GST Total", format_cents(breakdown.tax_total))
            .emphasized(Emphasis::Strong),
        InvoiceRow::total("Grand Total", format_cents(breakdown.grand_total))
            .emphasized(Emphasis::Strongest),
        InvoiceRow::blank(),
        InvoiceRow::blank(),
        InvoiceRow::new([shop.footer.as_str()]),
    ]);

    InvoiceDocument {
        file_name: invoice_file_name(issued_at),
        issued_at,
        rows,
    }
}

/// Directory of invoice documents, one file per sale.
#[derive(Debug, Clone)]
pub struct InvoiceStore {
    dir: PathBuf,
}

impl InvoiceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the invoices directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!(
                "Failed to create invoices directory: {}",
                self.dir.display()
            )
        })
    }

    /// Write a document as a spreadsheet file and return its path.
    /// An existing file is never overwritten.
    pub fn write(&self, document: &InvoiceDocument) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(&document.file_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create invoice file: {}", path.display()))?;

        Self::write_or_remove(&path, file, document)?;
        Ok(path)
    }

    /// Fill a freshly created file, deleting it again if any row fails so a
    /// retry can reuse the name.
    fn write_or_remove<W: Write>(
        path: &Path,
        writer: W,
        document: &InvoiceDocument,
    ) -> Result<()> {
        if let Err(e) = Self::write_rows(writer, document) {
            let _ = fs::remove_file(path);
            return Err(e.context(format!("Failed to write invoice file: {}", path.display())));
        }
        Ok(())
    }

    fn write_rows<W: Write>(writer: W, document: &InvoiceDocument) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        for (i, row) in document.rows.iter().enumerate() {
            csv_writer
                .write_record(&row.cells)
                .with_context(|| format!("Failed to write invoice row {}", i + 1))?;
        }
        csv_writer.flush().context("Failed to flush invoice")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compute;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn issued_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    fn sale(regime: TaxRegime) -> Sale {
        Sale {
            customer: "Asha Rao".into(),
            phone: "9876543210".into(),
            carat: 22,
            weight_grams: 10.0,
            rate_per_gram: 600.0,
            making_charge: 500.0,
            discount: 200.0,
            gst_rate: 3.0,
            regime,
        }
    }

    fn labels(doc: &InvoiceDocument) -> Vec<String> {
        doc.rows
            .iter()
            .filter_map(|r| r.cells.iter().find(|c| !c.is_empty()).cloned())
            .collect()
    }

    #[test]
    fn test_file_name_from_timestamp() {
        assert_eq!(invoice_file_name(issued_at()), "Invoice_20240301_140509.csv");
    }

    #[test]
    fn test_render_intrastate() {
        let s = sale(TaxRegime::Intrastate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());

        assert_eq!(doc.file_name, "Invoice_20240301_140509.csv");
        assert_eq!(doc.value_of("Invoice Date"), Some("2024-03-01 14:05:09"));
        assert_eq!(doc.value_of("Customer"), Some("Asha Rao"));
        assert_eq!(doc.value_of("Phone"), Some("9876543210"));
        assert_eq!(doc.value_of("Taxable Value"), Some("5800.00"));
        assert_eq!(doc.value_of("GST Type"), Some("Intra-state (CGST+SGST)"));
        assert_eq!(doc.value_of("GST Rate (%)"), Some("3"));
        assert_eq!(doc.value_of("CGST"), Some("87.00"));
        assert_eq!(doc.value_of("SGST"), Some("87.00"));
        assert_eq!(doc.value_of("IGST"), None);
        assert_eq!(doc.value_of("GST Total"), Some("174.00"));
        assert_eq!(doc.value_of("Grand Total"), Some("5974.00"));

        let gold = doc
            .rows
            .iter()
            .find(|r| r.cells.first().map(String::as_str) == Some("Gold Value"))
            .unwrap();
        assert_eq!(gold.cells, vec!["Gold Value", "22", "10", "600", "5500.00"]);
    }

    #[test]
    fn test_render_interstate_has_single_tax_line() {
        let s = sale(TaxRegime::Interstate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());

        assert_eq!(doc.value_of("IGST"), Some("174.00"));
        assert_eq!(doc.value_of("CGST"), None);
        assert_eq!(doc.value_of("SGST"), None);
        assert_eq!(doc.value_of("Grand Total"), Some("5974.00"));
    }

    #[test]
    fn test_render_order() {
        let s = sale(TaxRegime::Intrastate);
        let shop = ShopProfile::default();
        let doc = render(&s, &compute(&s), &shop, issued_at());

        assert_eq!(
            labels(&doc),
            vec![
                shop.name.clone(),
                shop.address.clone(),
                format!("Phone: {}", shop.phone),
                "Invoice Date".to_string(),
                "Customer".to_string(),
                "Phone".to_string(),
                "Description".to_string(),
                "Gold Value".to_string(),
                "Making Charges".to_string(),
                "Discount".to_string(),
                "Taxable Value".to_string(),
                "GST Type".to_string(),
                "GST Rate (%)".to_string(),
                "CGST".to_string(),
                "SGST".to_string(),
                "GST Total".to_string(),
                "Grand Total".to_string(),
                shop.footer.clone(),
            ]
        );
    }

    #[test]
    fn test_discount_is_negative() {
        let s = sale(TaxRegime::Intrastate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());
        assert_eq!(doc.value_of("Discount"), Some("-200.00"));
        assert_eq!(doc.value_of("Making Charges"), Some("500.00"));
    }

    #[test]
    fn test_emphasis() {
        let s = sale(TaxRegime::Intrastate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());
        let emphasis_of = |label: &str| {
            doc.rows
                .iter()
                .find(|r| r.cells.iter().any(|c| c == label))
                .map(|r| r.emphasis)
        };

        assert_eq!(emphasis_of("Taxable Value"), Some(Emphasis::Strong));
        assert_eq!(emphasis_of("GST Total"), Some(Emphasis::Strong));
        assert_eq!(emphasis_of("Grand Total"), Some(Emphasis::Strongest));
        assert_eq!(emphasis_of("Gold Value"), Some(Emphasis::Normal));
    }

    #[test]
    fn test_to_text() {
        let s = sale(TaxRegime::Interstate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());
        let text = doc.to_text();

        assert!(text.starts_with(&"-".repeat(72)));
        assert!(text.contains("Grand Total"));
        assert!(text.contains("5974.00"));
        assert!(text.contains(&"=".repeat(72)));
    }

    #[test]
    fn test_write_and_refuse_overwrite() -> Result<()> {
        let temp = TempDir::new()?;
        let store = InvoiceStore::new(temp.path().join("invoices"));
        let s = sale(TaxRegime::Intrastate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());

        let path = store.write(&doc)?;
        assert_eq!(path, temp.path().join("invoices").join(&doc.file_name));

        let contents = fs::read_to_string(&path)?;
        assert!(contents.contains("Grand Total,5974.00"));
        assert!(contents.contains("\"123 Main Road, Your City - PIN 400001\""));

        // A second document for the same second must not replace the first
        assert!(store.write(&doc).is_err());
        assert_eq!(fs::read_to_string(&path)?, contents);
        Ok(())
    }

    struct BrokenDisk;

    impl Write for BrokenDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_failed_write_removes_partial_file() -> Result<()> {
        let temp = TempDir::new()?;
        let s = sale(TaxRegime::Intrastate);
        let doc = render(&s, &compute(&s), &ShopProfile::default(), issued_at());
        let path = temp.path().join(&doc.file_name);
        fs::write(&path, "Gold Shop Name\n")?;

        let err = InvoiceStore::write_or_remove(&path, BrokenDisk, &doc).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write invoice file"));
        assert!(format!("{:#}", err).contains("disk full"));
        assert!(!path.exists());

        // The name is free again for a retry
        let store = InvoiceStore::new(temp.path());
        assert_eq!(store.write(&doc)?, path);
        Ok(())
    }
}
