use serde::{Deserialize, Serialize};

use super::{to_cents, Cents, Sale, TaxRegime, MAX_AMOUNT};

/// Every derived figure for one sale.
///
/// Each monetary field is rounded on its own from the full-precision value, so
/// `grand_total` can be one paisa away from `taxable_value + tax_total`, and
/// `cgst + sgst` can be one paisa away from `tax_total`. Callers must not
/// "repair" this; the ledger records what the invoice shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// carat / 24, kept at full precision
    pub purity: f64,
    pub gold_value: Cents,
    pub taxable_value: Cents,
    pub tax_total: Cents,
    pub cgst: Cents,
    pub sgst: Cents,
    pub igst: Cents,
    pub grand_total: Cents,
}

/// Full-precision figures, before any rounding.
struct Figures {
    purity: f64,
    gold_value: f64,
    taxable_value: f64,
    tax_total: f64,
    cgst: f64,
    sgst: f64,
    igst: f64,
    grand_total: f64,
}

impl Figures {
    fn of(sale: &Sale) -> Self {
        let purity = f64::from(sale.carat) / 24.0;
        let gold_value = sale.weight_grams * purity * sale.rate_per_gram;
        let taxable_value = gold_value + sale.making_charge - sale.discount;
        let tax_total = taxable_value * (sale.gst_rate / 100.0);

        let (cgst, sgst, igst) = match sale.regime {
            TaxRegime::Intrastate => (tax_total / 2.0, tax_total / 2.0, 0.0),
            TaxRegime::Interstate => (0.0, 0.0, tax_total),
        };

        Self {
            purity,
            gold_value,
            taxable_value,
            tax_total,
            cgst,
            sgst,
            igst,
            grand_total: taxable_value + tax_total,
        }
    }

    fn amounts(&self) -> [f64; 7] {
        [
            self.gold_value,
            self.taxable_value,
            self.tax_total,
            self.cgst,
            self.sgst,
            self.igst,
            self.grand_total,
        ]
    }
}

/// Price a validated sale. Pure and total.
pub fn compute(sale: &Sale) -> Breakdown {
    let f = Figures::of(sale);

    Breakdown {
        purity: f.purity,
        gold_value: to_cents(f.gold_value),
        taxable_value: to_cents(f.taxable_value),
        tax_total: to_cents(f.tax_total),
        cgst: to_cents(f.cgst),
        sgst: to_cents(f.sgst),
        igst: to_cents(f.igst),
        grand_total: to_cents(f.grand_total),
    }
}

/// Whether every figure of the sale stays within `MAX_AMOUNT` rupees.
pub fn within_limits(sale: &Sale) -> bool {
    Figures::of(sale)
        .amounts()
        .iter()
        .all(|amount| amount.abs() <= MAX_AMOUNT)
}
