use rust_decimal::prelude::*;

/// Money is represented as integer paise to avoid floating-point drift once a
/// figure has been rounded. ₹50.00 = 5000 paise.
pub type Cents = i64;

/// Largest magnitude, in rupees, any single figure of a sale may reach.
/// Keeps every paise amount exact in an `f64` and far from `i64` limits.
pub const MAX_AMOUNT: f64 = 1e13;

/// Round a full-precision amount to two decimals and return it as paise.
///
/// The exact binary value of `amount` is rounded, with exact ties going to
/// the even paisa: 87.125 -> 8712, while 0.005 (stored slightly above the
/// tie) -> 1. Amounts outside the `Decimal` range saturate.
pub fn to_cents(amount: f64) -> Cents {
    Decimal::from_f64_retain(amount)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|d| d.to_i64())
        .unwrap_or_else(|| (amount * 100.0) as Cents)
}

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
        assert_eq!(format_cents(i64::MIN), "-92233720368547758.08");
        assert_eq!(format_cents(i64::MAX), "92233720368547758.07");
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(5974.0), 597400);
        assert_eq!(to_cents(87.0), 8700);
        assert_eq!(to_cents(100.004), 10000);
        assert_eq!(to_cents(0.005), 1);
        assert_eq!(to_cents(-0.005), -1);
        assert_eq!(to_cents(-200.0), -20000);
        assert_eq!(to_cents(0.0), 0);
    }

    #[test]
    fn test_to_cents_exact_ties_go_to_even() {
        assert_eq!(to_cents(87.125), 8712);
        assert_eq!(to_cents(0.125), 12);
        assert_eq!(to_cents(0.375), 38);
        assert_eq!(to_cents(140.625), 14062);
        assert_eq!(to_cents(4828.125), 482812);
        assert_eq!(to_cents(-87.125), -8712);
        // 2.675 is stored just below the tie
        assert_eq!(to_cents(2.675), 267);
    }

    #[test]
    fn test_to_cents_out_of_range_saturates() {
        assert_eq!(to_cents(1e30), i64::MAX);
        assert_eq!(to_cents(-1e30), i64::MIN);
        assert_eq!(to_cents(f64::NAN), 0);
        assert_eq!(to_cents(MAX_AMOUNT), 1_000_000_000_000_000);
    }

    #[test]
    fn test_to_cents_absorbs_float_noise() {
        // 22/24 * 10 * 600 is not exactly 5500 in binary floating point
        let gold = 10.0 * (22.0 / 24.0) * 600.0;
        assert_eq!(to_cents(gold), 550000);
    }
}
