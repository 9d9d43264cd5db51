// 🧾 Expense Model - closed enumerations + the parsed record
// Every enum serializes to the same display value the ledger and the
// workspace database use ("bills & utilities", "HDFC CC 6409", ...)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "bills & utilities")]
    BillsUtilities,
    #[serde(rename = "general")]
    General,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "experiences")]
    Experiences,
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "commute")]
    Commute,
    #[serde(rename = "gift")]
    Gift,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "groceries")]
    Groceries,
    #[serde(rename = "meds")]
    Meds,
    #[serde(rename = "clothing")]
    Clothing,
    #[serde(rename = "vehicle")]
    Vehicle,
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "gadgets")]
    Gadgets,
    #[serde(rename = "invest")]
    Invest,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::BillsUtilities,
        Category::General,
        Category::Education,
        Category::Experiences,
        Category::Food,
        Category::Entertainment,
        Category::Commute,
        Category::Gift,
        Category::Pending,
        Category::Groceries,
        Category::Meds,
        Category::Clothing,
        Category::Vehicle,
        Category::Travel,
        Category::Health,
        Category::Gadgets,
        Category::Invest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BillsUtilities => "bills & utilities",
            Category::General => "general",
            Category::Education => "education",
            Category::Experiences => "experiences",
            Category::Food => "food",
            Category::Entertainment => "entertainment",
            Category::Commute => "commute",
            Category::Gift => "gift",
            Category::Pending => "pending",
            Category::Groceries => "groceries",
            Category::Meds => "meds",
            Category::Clothing => "clothing",
            Category::Vehicle => "vehicle",
            Category::Travel => "travel",
            Category::Health => "health",
            Category::Gadgets => "gadgets",
            Category::Invest => "invest",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

// ============================================================================
// IMPORTANCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Extra,
    Want,
    Need,
    Essential,
    Investment,
}

impl Importance {
    pub const ALL: [Importance; 5] = [
        Importance::Extra,
        Importance::Want,
        Importance::Need,
        Importance::Essential,
        Importance::Investment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Extra => "extra",
            Importance::Want => "want",
            Importance::Need => "need",
            Importance::Essential => "essential",
            Importance::Investment => "investment",
        }
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance::Need
    }
}

// ============================================================================
// BANK ACCOUNT
// ============================================================================

/// Payment source, including the credit-card sub-accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankAccount {
    #[serde(rename = "IND")]
    Ind,
    /// Primary account (default when the text names none)
    #[serde(rename = "HDFC")]
    Hdfc,
    #[serde(rename = "ICICI CC 3009")]
    IciciCc3009,
    #[serde(rename = "INDUSIND CC 6421")]
    IndusindCc6421,
    #[serde(rename = "HDFC CC 6409")]
    HdfcCc6409,
}

impl BankAccount {
    pub const ALL: [BankAccount; 5] = [
        BankAccount::Ind,
        BankAccount::Hdfc,
        BankAccount::IciciCc3009,
        BankAccount::IndusindCc6421,
        BankAccount::HdfcCc6409,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BankAccount::Ind => "IND",
            BankAccount::Hdfc => "HDFC",
            BankAccount::IciciCc3009 => "ICICI CC 3009",
            BankAccount::IndusindCc6421 => "INDUSIND CC 6421",
            BankAccount::HdfcCc6409 => "HDFC CC 6409",
        }
    }

    pub fn is_credit_card(&self) -> bool {
        matches!(
            self,
            BankAccount::IciciCc3009 | BankAccount::IndusindCc6421 | BankAccount::HdfcCc6409
        )
    }
}

impl Default for BankAccount {
    fn default() -> Self {
        BankAccount::Hdfc
    }
}

// ============================================================================
// EXPENSE TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Income,
    Expense,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 2] = [ExpenseType::Income, ExpenseType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Income => "income",
            ExpenseType::Expense => "expense",
        }
    }
}

impl Default for ExpenseType {
    fn default() -> Self {
        ExpenseType::Expense
    }
}

// ============================================================================
// SHARED TEXT CONVERSIONS
// ============================================================================

/// Unknown display value for one of the closed enumerations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! display_and_parse {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

display_and_parse!(Category, "category");
display_and_parse!(Importance, "importance");
display_and_parse!(BankAccount, "bank account");
display_and_parse!(ExpenseType, "expense type");

// ============================================================================
// EXPENSE RECORD
// ============================================================================

/// ExpenseRecord - output of every parser variant
///
/// A plain value: built fresh per parse call, owns all of its fields and keeps
/// no reference to the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub expense_name: String,
    pub category: Category,
    pub amount: f64,
    pub importance: Importance,
    pub bank_account: BankAccount,
    /// Serialized as `YYYY-MM-DD`
    pub assigned_date: NaiveDate,
    #[serde(default)]
    pub expense_type: ExpenseType,
}

/// Label used when no descriptive token survives name extraction
pub const DEFAULT_EXPENSE_NAME: &str = "Expense";

impl ExpenseRecord {
    /// Record holding every documented default, dated `date`
    pub fn with_defaults(date: NaiveDate) -> Self {
        ExpenseRecord {
            expense_name: DEFAULT_EXPENSE_NAME.to_string(),
            category: Category::default(),
            amount: 0.0,
            importance: Importance::default(),
            bank_account: BankAccount::default(),
            assigned_date: date,
            expense_type: ExpenseType::default(),
        }
    }

    /// Caller-side check run before the record is stored or synced
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }
        if self.expense_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.assigned_date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid amount {0}: an expense amount must be greater than zero")]
    InvalidAmount(f64),

    #[error("expense name is empty")]
    EmptyName,
}

// ============================================================================
// TESTS
// ============================================================================
