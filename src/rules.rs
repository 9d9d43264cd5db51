// 🏷️ Keyword Rules - Rules as Data
// Ordered keyword tables used by the extractors. Declaration order is the
// tie-break policy: the first keyword found in the text wins.

use crate::model::{BankAccount, Category, Importance};
use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// One table row: a value and the keywords that select it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule<T> {
    pub value: T,
    pub keywords: Vec<String>,
}

impl<T> KeywordRule<T> {
    pub fn new(value: T, keywords: &[&str]) -> Self {
        KeywordRule {
            value,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// First keyword of this row contained in `text_lower`
    pub fn find_in(&self, text_lower: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|keyword| text_lower.contains(keyword))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthName {
    pub name: String,
    pub month: u32,
}

// ============================================================================
// KEYWORD TABLES
// ============================================================================

/// All tables the rule-based parser reads. Read-only once built, so one
/// instance can be shared across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    pub categories: Vec<KeywordRule<Category>>,
    pub importance: Vec<KeywordRule<Importance>>,
    /// More specific keys ("hdfc cc") must come before the keys they contain ("hdfc")
    pub bank_accounts: Vec<KeywordRule<BankAccount>>,
    pub months: Vec<MonthName>,
    /// Tokens never used in the expense name
    pub stop_words: Vec<String>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        KeywordTables {
            // "medicine"/"pharmacy" sit under both health and meds, and "phone"
            // under both bills and gadgets: the earlier row wins.
            categories: vec![
                KeywordRule::new(
                    Category::Food,
                    &["snacks", "lunch", "dinner", "breakfast", "restaurant", "coffee", "pizza", "burger", "food"],
                ),
                KeywordRule::new(
                    Category::Commute,
                    &["uber", "taxi", "bus", "train", "fuel", "petrol", "metro", "auto", "transport"],
                ),
                KeywordRule::new(Category::General, &["haircut", "shopping", "clothes", "misc", "general"]),
                KeywordRule::new(Category::Entertainment, &["movie", "cinema", "games", "book", "music"]),
                KeywordRule::new(Category::Health, &["medicine", "doctor", "hospital", "pharmacy"]),
                KeywordRule::new(
                    Category::BillsUtilities,
                    &["electricity", "water", "phone", "internet", "rent", "bill"],
                ),
                KeywordRule::new(Category::Groceries, &["vegetables", "grocery", "supermarket", "mart"]),
                KeywordRule::new(Category::Meds, &["medicine", "pills", "pharmacy", "medical"]),
                KeywordRule::new(Category::Clothing, &["shirt", "pants", "dress", "shoes", "clothing"]),
                KeywordRule::new(Category::Gadgets, &["phone", "laptop", "computer", "gadget", "electronic"]),
            ],
            importance: vec![
                KeywordRule::new(Importance::Essential, &["essential"]),
                KeywordRule::new(Importance::Need, &["need"]),
                KeywordRule::new(Importance::Want, &["want"]),
                KeywordRule::new(Importance::Extra, &["extra"]),
                KeywordRule::new(Importance::Investment, &["investment"]),
            ],
            bank_accounts: vec![
                KeywordRule::new(BankAccount::HdfcCc6409, &["hdfc cc"]),
                KeywordRule::new(BankAccount::IciciCc3009, &["icici cc"]),
                KeywordRule::new(BankAccount::IndusindCc6421, &["indusind cc"]),
                KeywordRule::new(BankAccount::Hdfc, &["hdfc"]),
                KeywordRule::new(BankAccount::Ind, &["ind"]),
            ],
            months: [
                ("jan", 1), ("feb", 2), ("mar", 3), ("apr", 4), ("may", 5), ("jun", 6),
                ("jul", 7), ("aug", 8), ("sep", 9), ("oct", 10), ("nov", 11), ("dec", 12),
                ("january", 1), ("february", 2), ("march", 3), ("april", 4), ("june", 6),
                ("july", 7), ("august", 8), ("september", 9), ("october", 10),
                ("november", 11), ("december", 12),
            ]
            .iter()
            .map(|(name, month)| MonthName {
                name: name.to_string(),
                month: *month,
            })
            .collect(),
            stop_words: [
                "essential", "need", "want", "extra", "investment",
                "today", "yesterday", "tomorrow",
                "hdfc", "icici", "indusind", "cc",
                "jan", "feb", "mar", "apr", "may", "jun",
                "jul", "aug", "sep", "oct", "nov", "dec",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
        }
    }
}

impl KeywordTables {
    /// Load tables from a JSON file. Missing sections keep the built-in table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read keyword tables: {:?}", path.as_ref()))?;

        let tables: KeywordTables =
            serde_json::from_str(&content).context("Failed to parse keyword tables JSON")?;

        let tables = tables.normalized();
        tables
            .check_ordering()
            .with_context(|| format!("Invalid keyword tables in {:?}", path.as_ref()))?;

        log::info!(
            "Loaded keyword tables: {} categories, {} bank accounts, {} months",
            tables.categories.len(),
            tables.bank_accounts.len(),
            tables.months.len()
        );
        Ok(tables)
    }

    /// Lowercase and trim every keyword, dropping empty ones
    pub fn normalized(mut self) -> Self {
        fn clean(words: &mut Vec<String>) {
            *words = words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
        }

        for rule in &mut self.categories {
            clean(&mut rule.keywords);
        }
        for rule in &mut self.importance {
            clean(&mut rule.keywords);
        }
        for rule in &mut self.bank_accounts {
            clean(&mut rule.keywords);
        }
        for month in &mut self.months {
            month.name = month.name.trim().to_lowercase();
        }
        clean(&mut self.stop_words);
        self
    }

    /// Reject bank tables where a generic key would shadow a more specific
    /// key declared after it ("hdfc" before "hdfc cc"), and month numbers
    /// outside 1..=12.
    pub fn check_ordering(&self) -> Result<()> {
        let keys: Vec<(&str, BankAccount)> = self
            .bank_accounts
            .iter()
            .flat_map(|rule| rule.keywords.iter().map(move |k| (k.as_str(), rule.value)))
            .collect();

        for (i, (earlier, earlier_account)) in keys.iter().enumerate() {
            for (later, later_account) in &keys[i + 1..] {
                if earlier_account != later_account && later.contains(earlier) {
                    bail!(
                        "bank key {:?} ({}) is declared before the more specific {:?} ({}) and would shadow it",
                        earlier,
                        earlier_account,
                        later,
                        later_account
                    );
                }
            }
        }

        if let Some(bad) = self.months.iter().find(|m| !(1..=12).contains(&m.month)) {
            bail!("month {:?} maps to {}, expected 1-12", bad.name, bad.month);
        }

        Ok(())
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn match_category(&self, text_lower: &str) -> Option<Category> {
        first_match(&self.categories, text_lower)
    }

    pub fn match_importance(&self, text_lower: &str) -> Option<Importance> {
        first_match(&self.importance, text_lower)
    }

    pub fn match_bank(&self, text_lower: &str) -> Option<BankAccount> {
        first_match(&self.bank_accounts, text_lower)
    }

    pub fn month_number(&self, word: &str) -> Option<u32> {
        self.months.iter().find(|m| m.name == word).map(|m| m.month)
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.iter().any(|w| w == token)
    }
}

/// Table order first, then keyword order within a row
fn first_match<T: Copy>(rules: &[KeywordRule<T>], text_lower: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.find_in(text_lower).is_some())
        .map(|rule| rule.value)
}

// ============================================================================
// TESTS
// ============================================================================
