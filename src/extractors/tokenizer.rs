// ✂️ Tokenizer - lowercase + split on whitespace/comma runs

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").expect("valid separator pattern"));

/// Split `text` into lowercase tokens, in input order, without empty tokens.
/// Empty input gives an empty list.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    SEPARATORS
        .split(&lower)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
