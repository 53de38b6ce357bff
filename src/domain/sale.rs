use serde::{Deserialize, Serialize};

/// Label shown on the form and written to the ledger for intra-state sales.
pub const INTRASTATE_LABEL: &str = "Intra-state (CGST+SGST)";
/// Label shown on the form and written to the ledger for inter-state sales.
pub const INTERSTATE_LABEL: &str = "Inter-state (IGST)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    /// Buyer and seller in the same state: GST split into equal CGST and SGST
    Intrastate,
    /// Buyer in another state: the whole GST is charged as IGST
    Interstate,
}

impl TaxRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxRegime::Intrastate => "intrastate",
            TaxRegime::Interstate => "interstate",
        }
    }

    /// The literal label used on the form, the ledger and the invoice.
    pub fn label(&self) -> &'static str {
        match self {
            TaxRegime::Intrastate => INTRASTATE_LABEL,
            TaxRegime::Interstate => INTERSTATE_LABEL,
        }
    }

    /// Accepts either the exact form label or the short name (any case).
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            INTRASTATE_LABEL => return Some(TaxRegime::Intrastate),
            INTERSTATE_LABEL => return Some(TaxRegime::Interstate),
            _ => {}
        }
        match s.to_lowercase().as_str() {
            "intrastate" => Some(TaxRegime::Intrastate),
            "interstate" => Some(TaxRegime::Interstate),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raw text exactly as the operator typed it into the form.
#[derive(Debug, Clone, Default)]
pub struct RawSale {
    pub customer: String,
    pub phone: String,
    pub rate_per_gram: String,
    pub carat: String,
    pub weight_grams: String,
    pub making_charge: String,
    pub discount: String,
    pub gst_rate: String,
    pub gst_type: String,
}

/// A validated sale. Built only by `validate`, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub customer: String,
    pub phone: String,
    /// Purity in carats, 1..=24
    pub carat: u8,
    /// Always > 0
    pub weight_grams: f64,
    pub rate_per_gram: f64,
    pub making_charge: f64,
    pub discount: f64,
    /// Percent, e.g. 3.0 for 3% GST
    pub gst_rate: f64,
    pub regime: TaxRegime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_from_label() {
        assert_eq!(
            TaxRegime::from_label("Intra-state (CGST+SGST)"),
            Some(TaxRegime::Intrastate)
        );
        assert_eq!(
            TaxRegime::from_label("Inter-state (IGST)"),
            Some(TaxRegime::Interstate)
        );
        assert_eq!(
            TaxRegime::from_label("Interstate"),
            Some(TaxRegime::Interstate)
        );
        assert_eq!(TaxRegime::from_label("intra-state"), None);
        assert_eq!(TaxRegime::from_label(""), None);
    }

    #[test]
    fn test_regime_label_roundtrip() {
        for regime in [TaxRegime::Intrastate, TaxRegime::Interstate] {
            assert_eq!(TaxRegime::from_label(regime.label()), Some(regime));
            assert_eq!(TaxRegime::from_label(regime.as_str()), Some(regime));
        }
    }
}
