// 🗂️ Keyword classifiers - category, importance, bank account
// Each one is a single first-match lookup over an ordered table, with the
// field default when nothing matches.

use crate::model::{BankAccount, Category, Importance};
use crate::rules::KeywordTables;

pub fn extract_category(text_lower: &str, tables: &KeywordTables) -> Category {
    tables.match_category(text_lower).unwrap_or_default()
}

pub fn extract_importance(text_lower: &str, tables: &KeywordTables) -> Importance {
    tables.match_importance(text_lower).unwrap_or_default()
}

/// Specific keys ("hdfc cc") are declared before generic ones ("hdfc"), so
/// table order alone picks the credit-card account.
pub fn extract_bank_account(text_lower: &str, tables: &KeywordTables) -> BankAccount {
    tables.match_bank(text_lower).unwrap_or_default()
}
