// Extractors - one pure function per record field
//
// Each extractor reads the raw text, its lowercased form or the shared token
// list, and always produces a value (falling back to the field default), so
// the parser composing them never fails.

pub mod tokenizer;
pub mod amount;
pub mod date;
pub mod classify;
pub mod name;

pub use tokenizer::tokenize;
pub use amount::extract_amount;
pub use date::extract_date;
pub use classify::{extract_bank_account, extract_category, extract_importance};
pub use name::extract_expense_name;
