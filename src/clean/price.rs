//! Gross price normalization.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Result of normalizing one price cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceOutcome {
    /// Parsed and rounded to cents, e.g. `"1234.50"`.
    Normalized(String),
    /// Nothing left after stripping; the caller writes `"0.00"`.
    Empty,
    /// Non-empty but not a number; the caller keeps the original text.
    Malformed { cleaned: String },
}

pub const EMPTY_PRICE: &str = "0.00";

/// Strip `$` and thousands separators, then round half-up to two places.
pub fn normalize_price(raw: &str) -> PriceOutcome {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return PriceOutcome::Empty;
    }

    let parsed = Decimal::from_str(cleaned).or_else(|_| Decimal::from_scientific(cleaned));
    match parsed {
        Ok(value) => {
            let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            // Near the 28-digit limit there is no room left for cents.
            if rounded.scale() != 2 {
                return PriceOutcome::Malformed {
                    cleaned: cleaned.to_string(),
                };
            }
            PriceOutcome::Normalized(rounded.to_string())
        }
        Err(_) => PriceOutcome::Malformed {
            cleaned: cleaned.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(raw: &str) -> String {
        match normalize_price(raw) {
            PriceOutcome::Normalized(s) => s,
            other => panic!("expected a normalized price for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn strips_symbol_and_separators() {
        assert_eq!(normalized("$1,234.5"), "1234.50");
        assert_eq!(normalized("  $45 "), "45.00");
        assert_eq!(normalized("3.14159"), "3.14");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(normalized("2.675"), "2.68");
        assert_eq!(normalized("0.005"), "0.01");
        assert_eq!(normalized("-1.005"), "-1.01");
        assert_eq!(normalized("2.674"), "2.67");
    }

    #[test]
    fn values_without_room_for_cents_are_malformed() {
        assert_eq!(
            normalize_price("7922816251426433759354395033.5"),
            PriceOutcome::Malformed {
                cleaned: "7922816251426433759354395033.5".to_string()
            }
        );
        assert_eq!(
            normalize_price("$79,228,162,514,264,337,593,543,950,335"),
            PriceOutcome::Malformed {
                cleaned: "79228162514264337593543950335".to_string()
            }
        );
        assert_eq!(normalized("99999999999999999999999999.5"), "99999999999999999999999999.50");
    }

    #[test]
    fn already_normalized_price_is_stable() {
        assert_eq!(normalized("1234.50"), "1234.50");
    }

    #[test]
    fn empty_and_symbol_only_are_empty() {
        assert_eq!(normalize_price(""), PriceOutcome::Empty);
        assert_eq!(normalize_price(" $ "), PriceOutcome::Empty);
    }

    #[test]
    fn text_is_malformed() {
        assert_eq!(
            normalize_price("abc"),
            PriceOutcome::Malformed {
                cleaned: "abc".to_string()
            }
        );
    }
}
