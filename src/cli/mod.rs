use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{AppError, SalesService};
use crate::config::{load_shop_profile, Settings, DEFAULT_DATABASE, DEFAULT_INVOICES_DIR};
use crate::domain::{format_cents, LedgerEntry, RawSale, INTRASTATE_LABEL};
use crate::io::{render, SystemViewer, Viewer};

/// Kanak - gold counter invoicing
#[derive(Parser)]
#[command(name = "kanak")]
#[command(about = "Price gold sales with GST, keep a sales ledger and print invoices")]
#[command(version)]
pub struct Cli {
    /// Ledger database file path
    #[arg(short, long, env = "KANAK_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Directory where invoice files are written
    #[arg(long, env = "KANAK_INVOICES_DIR", default_value = DEFAULT_INVOICES_DIR)]
    pub invoices_dir: PathBuf,

    /// JSON file with the shop name, address, phone and GSTIN
    #[arg(long, env = "KANAK_SHOP")]
    pub shop: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The fields of the sale form, taken as typed.
#[derive(Args, Debug, Clone)]
pub struct SaleArgs {
    /// Customer name
    #[arg(long)]
    pub customer: String,

    /// Customer phone (digits only, at least 6)
    #[arg(long)]
    pub phone: String,

    /// Gold rate per gram (₹)
    #[arg(long)]
    pub rate: String,

    /// Weight in grams
    #[arg(long)]
    pub weight: String,

    /// Purity in carats (1-24)
    #[arg(long, default_value = "22")]
    pub carat: String,

    /// Making charges (₹)
    #[arg(long, default_value = "0")]
    pub making: String,

    /// Discount (₹)
    #[arg(long, default_value = "0")]
    pub discount: String,

    /// GST rate in percent
    #[arg(long, default_value = "3.0")]
    pub gst_rate: String,

    /// "Intra-state (CGST+SGST)" or "Inter-state (IGST)" (or intrastate / interstate)
    #[arg(long, default_value = INTRASTATE_LABEL)]
    pub gst_type: String,
}

impl From<SaleArgs> for RawSale {
    fn from(args: SaleArgs) -> Self {
        RawSale {
            customer: args.customer,
            phone: args.phone,
            rate_per_gram: args.rate,
            carat: args.carat,
            weight_grams: args.weight,
            making_charge: args.making,
            discount: args.discount,
            gst_rate: args.gst_rate,
            gst_type: args.gst_type,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger and the invoices directory
    Init,

    /// Record a sale and generate its invoice
    Sell {
        #[command(flatten)]
        sale: SaleArgs,

        /// Do not open the invoice after it is written
        #[arg(long)]
        no_open: bool,
    },

    /// Price a sale without recording it
    Quote {
        #[command(flatten)]
        sale: SaleArgs,
    },

    /// List recorded sales
    Sales {
        /// Maximum number of sales to show (most recent)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one recorded sale with its invoice layout
    Show {
        /// Sale number
        id: i64,
    },

    /// Report sales without an invoice and invoices missing on disk
    Check,

    /// Export the sales ledger
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Open the sales ledger or the invoices folder
    Open {
        #[arg(value_enum)]
        target: OpenTarget,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OpenTarget {
    /// Export the ledger to sales.csv beside the database and open it
    Ledger,
    /// Open the invoices directory
    Invoices,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let settings = Settings::new(&self.database, &self.invoices_dir);
        match &self.shop {
            Some(path) => Ok(settings.with_shop(load_shop_profile(path)?)),
            None => Ok(settings),
        }
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings()?;
        let service = SalesService::open(&settings).await.map_err(report)?;

        match self.command {
            Commands::Init => {
                service.invoices().ensure_dir()?;
                println!("Ledger initialized: {}", settings.database.display());
                println!(
                    "Invoices directory: {}",
                    service.invoices().dir().display()
                );
            }

            Commands::Sell { sale, no_open } => {
                run_sell_command(&service, sale.into(), no_open, &SystemViewer).await?;
            }

            Commands::Quote { sale } => {
                let quote = service
                    .quote(&sale.into(), Local::now().naive_local())
                    .map_err(report)?;
                print!("{}", quote.preview.to_text());
                println!();
                println!("Quote only - nothing was recorded.");
            }

            Commands::Sales { limit } => {
                run_sales_command(&service, limit).await?;
            }

            Commands::Show { id } => {
                let entry = service.get_sale(id).await.map_err(report)?;
                print_sale(&service, &entry);
            }

            Commands::Check => {
                run_check_command(&service).await?;
            }

            Commands::Export { output, format } => {
                run_export_command(&service, output, format).await?;
            }

            Commands::Open { target } => {
                run_open_command(&service, &settings, target, &SystemViewer).await?;
            }
        }

        Ok(())
    }
}

/// Attach the coarse error class to an application error.
fn report(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{} error: {}", err.kind(), err)
}

async fn run_sell_command(
    service: &SalesService,
    raw: RawSale,
    no_open: bool,
    viewer: &dyn Viewer,
) -> Result<()> {
    let submission = service
        .submit(&raw, Local::now().naive_local())
        .await
        .map_err(report)?;

    println!("Sale #{} recorded", submission.sale_id);
    println!(
        "  Taxable value: {:>12}",
        format_cents(submission.breakdown.taxable_value)
    );
    println!(
        "  GST total:     {:>12}",
        format_cents(submission.breakdown.tax_total)
    );
    println!(
        "  Grand total:   {:>12}",
        format_cents(submission.breakdown.grand_total)
    );
    println!("Invoice saved: {}", submission.invoice_path.display());

    if let Some(err) = &submission.backfill_error {
        eprintln!(
            "Warning: invoice file name was not recorded on sale #{}: {}",
            submission.sale_id, err
        );
    }

    if !no_open {
        // Opening the invoice is a courtesy; the sale is already complete
        if let Err(e) = viewer.open(&submission.invoice_path) {
            eprintln!("{}", report(e.into()));
        }
    }

    Ok(())
}

async fn run_sales_command(service: &SalesService, limit: Option<usize>) -> Result<()> {
    let sales = service.list_sales(limit).await.map_err(report)?;

    if sales.is_empty() {
        println!("No sales recorded.");
        return Ok(());
    }

    println!(
        "{:>5} {:<20} {:<20} {:>5} {:>10} {:>12}  INVOICE",
        "#", "DATE", "CUSTOMER", "CT", "WEIGHT(g)", "GRAND TOTAL"
    );
    println!("{}", "-".repeat(100));

    for entry in &sales {
        println!(
            "{:>5} {:<20} {:<20} {:>5} {:>10} {:>12}  {}",
            entry.id,
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&entry.sale.customer, 20),
            entry.sale.carat,
            entry.sale.weight_grams,
            format_cents(entry.breakdown.grand_total),
            if entry.has_invoice() {
                entry.invoice_file.as_str()
            } else {
                "(none)"
            }
        );
    }

    let total = sales
        .iter()
        .fold(0i64, |acc, e| acc.saturating_add(e.breakdown.grand_total));
    println!("{}", "-".repeat(100));
    println!("{} sale(s), {} total", sales.len(), format_cents(total));
    Ok(())
}

fn print_sale(service: &SalesService, entry: &LedgerEntry) {
    println!("Sale #{}", entry.id);
    println!(
        "  Recorded:     {}",
        entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Invoice file: {}",
        if entry.has_invoice() {
            entry.invoice_file.as_str()
        } else {
            "(none)"
        }
    );
    println!("  Purity:       {:.4}", entry.breakdown.purity);
    println!();

    let document = render(
        &entry.sale,
        &entry.breakdown,
        service.shop(),
        entry.recorded_at,
    );
    print!("{}", document.to_text());
}

async fn run_check_command(service: &SalesService) -> Result<()> {
    println!("Checking sales ledger...\n");

    let summary = service.check().await.map_err(report)?;
    println!("Sales: {}", summary.total_sales);
    println!();

    if summary.is_clean() {
        println!("Every sale has its invoice.");
        return Ok(());
    }

    if !summary.missing_invoice.is_empty() {
        println!("Sales recorded without an invoice:");
        for entry in &summary.missing_invoice {
            println!(
                "  #{} {} {} ({})",
                entry.id,
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                entry.sale.customer,
                format_cents(entry.breakdown.grand_total)
            );
        }
    }
    if !summary.missing_files.is_empty() {
        println!("Invoice files missing from {}:", service.invoices().dir().display());
        for entry in &summary.missing_files {
            println!("  #{} {}", entry.id, entry.invoice_file);
        }
    }

    anyhow::bail!("Ledger check found issues")
}

async fn run_export_command(
    service: &SalesService,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_ledger_csv(writer).await?,
        ExportFormat::Json => exporter.export_ledger_json(writer).await?.sales.len(),
    };

    if output.is_some() {
        eprintln!("Exported {} sales", count);
    }
    Ok(())
}

async fn run_open_command(
    service: &SalesService,
    settings: &Settings,
    target: OpenTarget,
    viewer: &dyn Viewer,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;

    let path = match target {
        OpenTarget::Ledger => {
            let path = settings.ledger_export_path();
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Exporter::new(service).export_ledger_csv(file).await?;
            path
        }
        OpenTarget::Invoices => {
            service.invoices().ensure_dir()?;
            service.invoices().dir().to_path_buf()
        }
    };

    viewer
        .open(&path)
        .map_err(|e| report(AppError::from(e)))?;
    println!("Opened {}", path.display());
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
