// 💰 Amount Extractor
//
// First unsigned ASCII decimal in the original text, left to right. A text holding
// several numbers ("15 july coffee 50") yields the first one, dates included.

use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]+(?:\.[0-9]+)?\b").expect("valid amount pattern"));

/// Amount in `text`, or 0.0 when it holds no number.
/// Rejecting zero amounts is the caller's job (see `ExpenseRecord::validate`).
pub fn extract_amount(text: &str) -> f64 {
    AMOUNT
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_amount() {
        assert_eq!(extract_amount("coffee food 50 want today"), 50.0);
    }

    #[test]
    fn test_decimal_amount() {
        assert_eq!(extract_amount("tea 12.75 extra"), 12.75);
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount("just a note"), 0.0);
        assert_eq!(extract_amount(""), 0.0);
    }

    #[test]
    fn test_first_number_wins_even_if_it_is_a_day() {
        // Known ambiguity: the day of the month is taken as the amount
        assert_eq!(extract_amount("15 july coffee 50"), 15.0);
    }

    #[test]
    fn test_amount_next_to_currency_symbol() {
        assert_eq!(extract_amount("lunch ₹200"), 200.0);
    }

    #[test]
    fn test_non_ascii_digits_are_not_amounts() {
        assert_eq!(extract_amount("५ coffee 50"), 50.0);
        assert_eq!(extract_amount("coffee ５ 50"), 50.0);
        assert_eq!(extract_amount("coffee ५०"), 0.0);
    }

    #[test]
    fn test_sign_is_ignored() {
        assert_eq!(extract_amount("refund -30"), 30.0);
    }
}
