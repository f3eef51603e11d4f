//! Currency coercion and display formatting. All money math runs on
//! [`rust_decimal::Decimal`]; strings appear only at output time.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// Round to whole cents, half-up (midpoints move away from zero, as on a
/// receipt). `Decimal::round_dp` alone would round midpoints to even.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerce a raw form amount to a non-negative 2-decimal value.
///
/// Missing or non-numeric input becomes 0, negative input clamps to 0.
/// Coercion is a data-quality anomaly, not an error: it is logged and the
/// submission proceeds.
pub fn coerce_amount(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Decimal::ZERO;
    };
    match raw.parse::<Decimal>() {
        Ok(amount) if amount.is_sign_negative() => {
            warn!(
                event = "money.amount_clamped",
                domain = "expense",
                raw = raw,
                "negative amount clamped to zero"
            );
            Decimal::ZERO
        }
        Ok(amount) => round_cents(amount),
        Err(_) => {
            warn!(
                event = "money.amount_unparseable",
                domain = "expense",
                raw = raw,
                "non-numeric amount treated as zero"
            );
            Decimal::ZERO
        }
    }
}

/// Format as US currency: `$` prefix, thousands separators, always two
/// decimals. Used by the report, the email body, and error messages.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac_part}")
}
