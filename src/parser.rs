// 🏗️ Parser Framework
// One `parse` capability, two interchangeable implementations:
// keyword rules (local, deterministic) and an LLM completion backend.

use crate::extractors::{
    extract_amount, extract_bank_account, extract_category, extract_date, extract_expense_name,
    extract_importance, tokenize,
};
use crate::model::{BankAccount, Category, ExpenseRecord, ExpenseType, Importance};
use crate::rules::KeywordTables;
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "today" for relative dates and the date default
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always the same date (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ============================================================================
// CORE TRAIT
// ============================================================================

/// ExpenseParser - free text in, fully populated record out
///
/// `parse` is total: missing signals become field defaults, never errors.
/// Implementations hold only read-only state and may be shared across threads.
pub trait ExpenseParser: Send + Sync {
    fn parse(&self, text: &str) -> ExpenseRecord;

    /// Short identifier, for logs
    fn name(&self) -> &str;
}

impl<P: ExpenseParser + ?Sized> ExpenseParser for Box<P> {
    fn parse(&self, text: &str) -> ExpenseRecord {
        (**self).parse(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// RULE-BASED PARSER
// ============================================================================

pub struct RuleBasedParser {
    tables: Arc<KeywordTables>,
    clock: Arc<dyn Clock>,
}

impl RuleBasedParser {
    /// Built-in tables, system clock
    pub fn new() -> Self {
        RuleBasedParser::with_tables(KeywordTables::default())
    }

    pub fn with_tables(tables: KeywordTables) -> Self {
        RuleBasedParser {
            tables: Arc::new(tables),
            clock: Arc::new(SystemClock),
        }
    }

    /// Builder pattern: replace the clock
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    /// Parse against an explicit "today"
    pub fn parse_on(&self, text: &str, today: NaiveDate) -> ExpenseRecord {
        let tables = self.tables.as_ref();
        let text_lower = text.trim().to_lowercase();
        let tokens = tokenize(text);

        let record = ExpenseRecord {
            expense_name: extract_expense_name(&tokens, tables),
            category: extract_category(&text_lower, tables),
            amount: extract_amount(text),
            importance: extract_importance(&text_lower, tables),
            bank_account: extract_bank_account(&text_lower, tables),
            assigned_date: extract_date(&tokens, &text_lower, today, tables),
            expense_type: ExpenseType::Expense,
        };

        log::debug!(
            "Parsed {:?} → {} / {} / {} / {} / {}",
            text,
            record.expense_name,
            record.category,
            record.amount,
            record.bank_account,
            record.assigned_date
        );
        record
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExpenseRecord {
        self.parse_on(text, self.clock.today())
    }

    fn name(&self) -> &str {
        "rules"
    }
}

// ============================================================================
// LLM-BACKED PARSER
// ============================================================================

/// CompletionBackend - the model call, kept opaque
///
/// Receives the system prompt and the user's message, returns the model's
/// raw reply (expected to be a JSON object).
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Reply shape requested from the model. Enum fields are taken as text so an
/// unexpected label only resets that one field.
#[derive(Debug, Deserialize)]
struct LlmReply {
    expense_name: Option<String>,
    category: Option<String>,
    amount: Option<f64>,
    importance: Option<String>,
    bank_account: Option<String>,
    assigned_date: Option<String>,
    expense_type: Option<String>,
}

pub struct LlmParser<B: CompletionBackend> {
    backend: B,
    /// Replaces the generated prompt when set
    custom_prompt: Option<String>,
    fallback: RuleBasedParser,
}

impl<B: CompletionBackend> LlmParser<B> {
    /// Falls back to `fallback` whenever the backend fails or its reply
    /// cannot be read.
    pub fn new(backend: B, fallback: RuleBasedParser) -> Self {
        LlmParser {
            backend,
            custom_prompt: None,
            fallback,
        }
    }

    /// Builder pattern: custom system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// Prompt sent for a parse made on `today`
    pub fn system_prompt(&self, today: NaiveDate) -> String {
        match &self.custom_prompt {
            Some(prompt) => prompt.clone(),
            None => default_system_prompt(today),
        }
    }

    fn try_parse(&self, text: &str, today: NaiveDate) -> Result<ExpenseRecord> {
        let raw = self
            .backend
            .complete(&self.system_prompt(today), text)
            .context("Completion backend failed")?;

        let reply: LlmReply = serde_json::from_str(strip_code_fence(&raw))
            .with_context(|| format!("Model reply is not an expense object: {}", raw))?;

        let amount = reply.amount.unwrap_or(0.0);
        if !amount.is_finite() || amount < 0.0 {
            return Err(anyhow!("Model returned an invalid amount: {}", amount));
        }

        let expense_name = reply
            .expense_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut record = ExpenseRecord::with_defaults(today);
        if let Some(name) = expense_name {
            record.expense_name = name;
        }
        record.amount = amount;
        record.category = parse_or_default::<Category>(reply.category.as_deref());
        record.importance = parse_or_default::<Importance>(reply.importance.as_deref());
        record.bank_account = parse_or_default::<BankAccount>(reply.bank_account.as_deref());
        record.expense_type = parse_or_default::<ExpenseType>(reply.expense_type.as_deref());
        if let Some(date) = reply.assigned_date.as_deref() {
            match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                Ok(d) => record.assigned_date = d,
                Err(_) => log::warn!("Ignoring unreadable date from model: {:?}", date),
            }
        }

        Ok(record)
    }
}

impl<B: CompletionBackend> ExpenseParser for LlmParser<B> {
    fn parse(&self, text: &str) -> ExpenseRecord {
        let today = self.fallback.clock.today();

        match self.try_parse(text, today) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("LLM parse failed, using keyword rules: {:#}", e);
                self.fallback.parse_on(text, today)
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}

fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// Accept replies wrapped in a ```json ... ``` block
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn labels<T: Copy>(all: &[T], as_str: fn(&T) -> &'static str) -> String {
    all.iter().map(|v| format!("\"{}\"", as_str(v))).collect::<Vec<_>>().join(", ")
}

/// System prompt listing the JSON shape and every allowed label
pub fn default_system_prompt(today: NaiveDate) -> String {
    format!(
        "You turn a short expense note into JSON. Reply with one JSON object and nothing else, with keys:\n\
         - expense_name: up to three words naming the purchase\n\
         - category: one of {}\n\
         - amount: positive number\n\
         - importance: one of {}\n\
         - bank_account: one of {} (default \"{}\")\n\
         - assigned_date: YYYY-MM-DD; today is {}, resolve words like \"yesterday\" against it\n\
         - expense_type: one of {}\n",
        labels(&Category::ALL, Category::as_str),
        labels(&Importance::ALL, Importance::as_str),
        labels(&BankAccount::ALL, BankAccount::as_str),
        BankAccount::default(),
        today.format("%Y-%m-%d"),
        labels(&ExpenseType::ALL, ExpenseType::as_str),
    )
}

// ============================================================================
// FACTORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Rules,
    Llm,
}

impl FromStr for ParserKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "regex" => Ok(ParserKind::Rules),
            "llm" => Ok(ParserKind::Llm),
            other => Err(anyhow!("Unknown parser kind: {}", other)),
        }
    }
}

/// Pick the parser variant at the composition root.
/// `Llm` needs a backend; without one it is an error rather than a silent
/// switch to rules.
pub fn build_parser(
    kind: ParserKind,
    rules: RuleBasedParser,
    backend: Option<Box<dyn CompletionBackend>>,
) -> Result<Box<dyn ExpenseParser>> {
    match kind {
        ParserKind::Rules => Ok(Box::new(rules)),
        ParserKind::Llm => {
            let backend = backend.ok_or_else(|| anyhow!("LLM parser selected but no completion backend configured"))?;
            Ok(Box::new(LlmParser::new(backend, rules)))
        }
    }
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for Box<B> {
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        (**self).complete(system_prompt, user_message)
    }
}

// ============================================================================
// TESTS
// ============================================================================
