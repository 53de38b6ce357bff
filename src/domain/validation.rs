use thiserror::Error;

use super::{within_limits, RawSale, Sale, TaxRegime};

/// Minimum number of digits accepted as a phone number.
pub const MIN_PHONE_DIGITS: usize = 6;

/// Highest purity a carat figure can express (pure gold).
pub const MAX_CARAT: u8 = 24;

/// Why a form submission was rejected. Nothing is written when one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter customer name.")]
    EmptyCustomer,

    #[error("Enter valid phone (digits only).")]
    InvalidPhone,

    /// Shared by rate, weight, making charge, discount and GST rate, and by
    /// sales whose figures would exceed `MAX_AMOUNT`.
    #[error("Enter valid numeric values for rate/weight/making/discount/GST.")]
    InvalidNumber,

    #[error("Carat must be between 1 and 24.")]
    CaratOutOfRange,

    #[error("Weight must be positive.")]
    NonPositiveWeight,

    #[error("Select GST Type.")]
    UnknownTaxRegime,
}

/// Turn raw form text into a `Sale`. Rules run in a fixed order and the first
/// failure is returned.
pub fn validate(raw: &RawSale) -> Result<Sale, ValidationError> {
    let customer = raw.customer.trim();
    if customer.is_empty() {
        return Err(ValidationError::EmptyCustomer);
    }

    let phone = raw.phone.trim();
    if phone.len() < MIN_PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone);
    }

    let rate_per_gram = parse_amount(&raw.rate_per_gram, None)?;
    let weight_grams = parse_amount(&raw.weight_grams, None)?;
    let making_charge = parse_amount(&raw.making_charge, Some(0.0))?;
    let discount = parse_amount(&raw.discount, Some(0.0))?;
    let gst_rate = parse_amount(&raw.gst_rate, Some(0.0))?;

    let carat: u8 = raw
        .carat
        .trim()
        .parse()
        .map_err(|_| ValidationError::CaratOutOfRange)?;
    if carat == 0 || carat > MAX_CARAT {
        return Err(ValidationError::CaratOutOfRange);
    }

    if weight_grams <= 0.0 {
        return Err(ValidationError::NonPositiveWeight);
    }

    let regime =
        TaxRegime::from_label(raw.gst_type.trim()).ok_or(ValidationError::UnknownTaxRegime)?;

    let sale = Sale {
        customer: customer.to_string(),
        phone: phone.to_string(),
        carat,
        weight_grams,
        rate_per_gram,
        making_charge,
        discount,
        gst_rate,
        regime,
    };
    if !within_limits(&sale) {
        return Err(ValidationError::InvalidNumber);
    }
    Ok(sale)
}

/// Parse a real number. Blank input falls back to `default` when one is given.
fn parse_amount(input: &str, default: Option<f64>) -> Result<f64, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return default.ok_or(ValidationError::InvalidNumber);
    }
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber),
    }
}
