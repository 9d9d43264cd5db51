// 🏷️ Expense-Name Extractor

use crate::model::DEFAULT_EXPENSE_NAME;
use crate::rules::KeywordTables;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("valid numeric pattern"));

const MAX_NAME_WORDS: usize = 3;

/// First three tokens that are neither numbers nor stop words, joined by
/// spaces. Falls back to "Expense".
pub fn extract_expense_name(tokens: &[String], tables: &KeywordTables) -> String {
    let words: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| !NUMERIC.is_match(token) && !tables.is_stop_word(token))
        .take(MAX_NAME_WORDS)
        .collect();

    if words.is_empty() {
        DEFAULT_EXPENSE_NAME.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tokenize;

    fn name_of(text: &str) -> String {
        extract_expense_name(&tokenize(text), &KeywordTables::default())
    }

    #[test]
    fn test_skips_numbers_and_stop_words() {
        assert_eq!(name_of("coffee food 50 want today"), "coffee food");
        assert_eq!(name_of("uber ride transport 200 essential yesterday hdfc cc"), "uber ride transport");
    }

    #[test]
    fn test_caps_at_three_words() {
        assert_eq!(name_of("big family dinner at home 1500"), "big family dinner");
    }

    #[test]
    fn test_only_short_month_names_are_stop_words() {
        assert_eq!(name_of("haircut 300 15 jul"), "haircut");
        assert_eq!(name_of("haircut general 300 need 15 july"), "haircut general july");
    }

    #[test]
    fn test_default_name() {
        assert_eq!(name_of(""), "Expense");
        assert_eq!(name_of("500 need today hdfc cc"), "Expense");
    }

    #[test]
    fn test_only_ascii_digits_count_as_numbers() {
        assert_eq!(name_of("५ tea 40"), "५ tea");
    }

    #[test]
    fn test_decimal_tokens_are_numbers() {
        assert_eq!(name_of("12.50 tea"), "tea");
    }
}
