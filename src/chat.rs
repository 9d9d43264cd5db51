// 💬 Chat Assistant - the consumer side of the parser
// Classifies a message, parses expenses, rejects bad amounts, then hands the
// record to an ExpenseSink (workspace database, local file, ...).

use crate::model::{ExpenseRecord, ValidationError};
use crate::parser::ExpenseParser;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ============================================================================
// MESSAGE CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Greeting,
    Help,
    Expense,
}

const GREETING_WORDS: [&str; 4] = ["hello", "hi", "hey", "start"];
const HELP_WORDS: [&str; 3] = ["help", "how", "example"];

/// Substring checks on the lowercased message, greetings first.
/// Note "hi" also matches inside words ("chips"), so such notes read as greetings.
pub fn classify_message(text: &str) -> MessageKind {
    let lower = text.trim().to_lowercase();

    if GREETING_WORDS.iter().any(|w| lower.contains(w)) {
        MessageKind::Greeting
    } else if HELP_WORDS.iter().any(|w| lower.contains(w)) {
        MessageKind::Help
    } else {
        MessageKind::Expense
    }
}

// ============================================================================
// SINK (workspace sync collaborator)
// ============================================================================

/// Reference to the stored copy of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReceipt {
    pub page_id: String,
    pub url: String,
}

/// Remote/local store that accepts validated records
pub trait ExpenseSink: Send + Sync {
    fn create(&self, record: &ExpenseRecord) -> Result<SyncReceipt>;
}

/// Appends one JSON object per line to a local file
pub struct JsonlSink {
    path: PathBuf,
}

#[derive(Serialize)]
struct JsonlEntry<'a> {
    page_id: &'a str,
    #[serde(flatten)]
    record: &'a ExpenseRecord,
}

impl JsonlSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonlSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExpenseSink for JsonlSink {
    fn create(&self, record: &ExpenseRecord) -> Result<SyncReceipt> {
        let page_id = uuid::Uuid::new_v4().to_string();
        let line = serde_json::to_string(&JsonlEntry {
            page_id: &page_id,
            record,
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open expense file: {}", self.path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write expense file: {}", self.path.display()))?;

        Ok(SyncReceipt {
            url: format!("file://{}#{}", self.path.display(), page_id),
            page_id,
        })
    }
}

/// Keeps records in memory
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ExpenseRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ExpenseRecord> {
        self.lock().clone()
    }

    // A panic mid-push cannot leave the Vec half-written, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Vec<ExpenseRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExpenseSink for MemorySink {
    fn create(&self, record: &ExpenseRecord) -> Result<SyncReceipt> {
        let mut records = self.lock();
        records.push(record.clone());
        let index = records.len();

        Ok(SyncReceipt {
            page_id: format!("mem-{}", index),
            url: format!("memory://expenses/{}", index),
        })
    }
}

// ============================================================================
// REPLIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Help,
    ExpenseAdded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "type")]
    pub kind: ReplyKind,
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_expense: Option<ExpenseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl ChatReply {
    fn text(kind: ReplyKind, response: impl Into<String>) -> Self {
        ChatReply {
            kind,
            success: kind != ReplyKind::Error,
            response: response.into(),
            parsed_expense: None,
            page_url: None,
        }
    }
}

pub const GREETING_TEXT: &str = "Hello! I'm your expense tracker assistant. Tell me about an expense in plain words, \
for example \"snacks food 200 essential yesterday\" or \"uber ride 150 need today\", and I'll record it.";

pub const HELP_TEXT: &str = "Format: [item] [category] [amount] [importance] [date] [bank account]

Examples:
  coffee food 50 want today
  uber transport 200 essential yesterday hdfc cc
  haircut general 300 need 15 july
  groceries food 1200 essential icici cc

Importance: essential, need, want, extra, investment
Bank accounts: hdfc, hdfc cc, icici cc, indusind cc, ind
Dates: today, yesterday, tomorrow, or a day and month like \"15 july\"";

pub const MISSING_AMOUNT_TEXT: &str =
    "I couldn't find a valid amount in your message. Please include the expense amount, for example 'coffee 50' or 'lunch 200'.";

/// Multi-line confirmation shown after a record is stored
pub fn summarize(record: &ExpenseRecord) -> String {
    format!(
        "Expense added!\n\
         Amount: ₹{}\n\
         Item: {}\n\
         Category: {}\n\
         Importance: {}\n\
         Account: {}{}\n\
         Date: {}",
        record.amount,
        record.expense_name,
        record.category,
        record.importance,
        record.bank_account,
        if record.bank_account.is_credit_card() { " (credit card)" } else { "" },
        record.date_string()
    )
}

// ============================================================================
// ASSISTANT
// ============================================================================

pub struct ChatAssistant<P: ExpenseParser, S: ExpenseSink> {
    parser: P,
    sink: S,
}

impl<P: ExpenseParser, S: ExpenseSink> ChatAssistant<P, S> {
    pub fn new(parser: P, sink: S) -> Self {
        ChatAssistant { parser, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn handle(&self, text: &str) -> ChatReply {
        let message = text.trim();

        match classify_message(message) {
            MessageKind::Greeting => ChatReply::text(ReplyKind::Greeting, GREETING_TEXT),
            MessageKind::Help => ChatReply::text(ReplyKind::Help, HELP_TEXT),
            MessageKind::Expense => self.handle_expense(message),
        }
    }

    fn handle_expense(&self, message: &str) -> ChatReply {
        let record = self.parser.parse(message);

        // Nothing reaches the sink without a positive amount
        if let Err(e) = record.validate() {
            log::info!("Rejected {:?} ({}): {}", message, self.parser.name(), e);
            let response = match e {
                ValidationError::InvalidAmount(_) => MISSING_AMOUNT_TEXT.to_string(),
                other => format!("I couldn't record that expense: {}.", other),
            };
            return ChatReply::text(ReplyKind::Error, response);
        }

        match self.sink.create(&record) {
            Ok(receipt) => {
                log::info!("Stored expense {} as {}", record.expense_name, receipt.page_id);
                ChatReply {
                    kind: ReplyKind::ExpenseAdded,
                    success: true,
                    response: summarize(&record),
                    parsed_expense: Some(record),
                    page_url: Some(receipt.url),
                }
            }
            Err(e) => {
                log::error!("Failed to store expense {:?}: {:#}", message, e);
                ChatReply::text(ReplyKind::Error, format!("Failed to add expense: {}", e))
            }
        }
    }
}

// ============================================================================
// EXAMPLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleMessage {
    pub input: &'static str,
    pub description: &'static str,
}

pub fn example_messages() -> Vec<ExampleMessage> {
    vec![
        ExampleMessage {
            input: "coffee food 50 want today",
            description: "Simple coffee purchase",
        },
        ExampleMessage {
            input: "uber ride transport 200 essential yesterday hdfc cc",
            description: "Transportation expense with specific bank account",
        },
        ExampleMessage {
            input: "groceries 1200 essential 15 july icici cc",
            description: "Groceries with specific date",
        },
        ExampleMessage {
            input: "haircut general 300 need",
            description: "General expense with importance level",
        },
        ExampleMessage {
            input: "electricity bill 2500 essential indusind cc",
            description: "Utility bill payment",
        },
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BankAccount, Category};
    use crate::parser::{FixedClock, RuleBasedParser};
    use chrono::NaiveDate;
    use std::fs;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn assistant() -> ChatAssistant<RuleBasedParser, MemorySink> {
        ChatAssistant::new(RuleBasedParser::new().with_clock(FixedClock(today())), MemorySink::new())
    }

    struct FailingSink;

    impl ExpenseSink for FailingSink {
        fn create(&self, _record: &ExpenseRecord) -> Result<SyncReceipt> {
            Err(anyhow::anyhow!("401 unauthorized"))
        }
    }

    #[test]
    fn test_classify_message() {
        assert_eq!(classify_message("Hello there"), MessageKind::Greeting);
        assert_eq!(classify_message("start"), MessageKind::Greeting);
        assert_eq!(classify_message("help"), MessageKind::Help);
        assert_eq!(classify_message("give me an example"), MessageKind::Help);
        assert_eq!(classify_message("coffee food 50 want today"), MessageKind::Expense);
    }

    #[test]
    fn test_greeting_and_help_do_not_store() {
        let bot = assistant();

        let greeting = bot.handle("hey");
        assert_eq!(greeting.kind, ReplyKind::Greeting);
        assert!(greeting.success);

        let help = bot.handle("help");
        assert_eq!(help.kind, ReplyKind::Help);
        assert!(help.response.contains("15 july"));

        assert!(bot.sink().records().is_empty());
    }

    #[test]
    fn test_expense_is_stored() {
        let bot = assistant();
        let reply = bot.handle("uber ride transport 200 essential yesterday hdfc cc");

        assert_eq!(reply.kind, ReplyKind::ExpenseAdded);
        assert!(reply.success);
        assert_eq!(reply.page_url.as_deref(), Some("memory://expenses/1"));
        assert!(reply.response.contains("HDFC CC 6409"));
        assert!(reply.response.contains("2025-03-09"));

        let stored = bot.sink().records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, Category::Commute);
        assert_eq!(stored[0].bank_account, BankAccount::HdfcCc6409);
        assert_eq!(reply.parsed_expense.as_ref(), Some(&stored[0]));
    }

    #[test]
    fn test_missing_amount_never_reaches_sink() {
        let bot = assistant();
        let reply = bot.handle("just a note");

        assert_eq!(reply.kind, ReplyKind::Error);
        assert!(!reply.success);
        assert_eq!(reply.response, MISSING_AMOUNT_TEXT);
        assert!(bot.sink().records().is_empty());
    }

    /// Always returns a record with a blank name
    struct NamelessParser;

    impl ExpenseParser for NamelessParser {
        fn parse(&self, _text: &str) -> ExpenseRecord {
            let mut record = ExpenseRecord::with_defaults(today());
            record.expense_name = "  ".to_string();
            record.amount = 10.0;
            record
        }

        fn name(&self) -> &str {
            "nameless"
        }
    }

    #[test]
    fn test_empty_name_gets_its_own_reply() {
        let bot = ChatAssistant::new(NamelessParser, MemorySink::new());
        let reply = bot.handle("tea 10");

        assert_eq!(reply.kind, ReplyKind::Error);
        assert_ne!(reply.response, MISSING_AMOUNT_TEXT);
        assert!(reply.response.contains("expense name is empty"));
        assert!(bot.sink().records().is_empty());
    }

    #[test]
    fn test_memory_sink_survives_poisoned_lock() {
        let sink = std::sync::Arc::new(MemorySink::new());
        sink.create(&ExpenseRecord::with_defaults(today())).unwrap();

        let poisoner = std::sync::Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(sink.records.is_poisoned());

        assert_eq!(sink.records().len(), 1);
        let receipt = sink.create(&ExpenseRecord::with_defaults(today())).unwrap();
        assert_eq!(receipt.page_id, "mem-2");
        assert_eq!(sink.records().len(), 2);
    }

    #[test]
    fn test_sink_failure_is_an_error_reply() {
        let bot = ChatAssistant::new(RuleBasedParser::new().with_clock(FixedClock(today())), FailingSink);
        let reply = bot.handle("coffee food 50 want today");

        assert_eq!(reply.kind, ReplyKind::Error);
        assert!(reply.response.contains("401 unauthorized"));
        assert!(reply.parsed_expense.is_none());
    }

    #[test]
    fn test_reply_json_shape() {
        let reply = assistant().handle("coffee food 50 want today");
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["type"], "expense_added");
        assert_eq!(json["success"], true);
        assert_eq!(json["parsed_expense"]["category"], "food");

        let error = serde_json::to_value(assistant().handle("just a note")).unwrap();
        assert_eq!(error["type"], "error");
        assert!(error.get("parsed_expense").is_none());
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.jsonl");
        let bot = ChatAssistant::new(
            RuleBasedParser::new().with_clock(FixedClock(today())),
            JsonlSink::new(&path),
        );

        assert!(bot.handle("coffee food 50 want today").success);
        assert!(bot.handle("electricity bill 2500 essential indusind cc").success);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["expense_name"], "coffee food");
        assert_eq!(lines[1]["category"], "bills & utilities");
        assert_eq!(lines[1]["bank_account"], "INDUSIND CC 6421");
        assert_ne!(lines[0]["page_id"], lines[1]["page_id"]);
    }

    #[test]
    fn test_jsonl_sink_unwritable_path() {
        let sink = JsonlSink::new("/nonexistent-dir/expenses.jsonl");
        let record = ExpenseRecord::with_defaults(today());

        assert!(sink.create(&record).is_err());
    }

    #[test]
    fn test_examples_parse_with_positive_amounts() {
        let parser = RuleBasedParser::new().with_clock(FixedClock(today()));

        for example in example_messages() {
            assert_eq!(classify_message(example.input), MessageKind::Expense, "{}", example.input);
            assert!(parser.parse(example.input).validate().is_ok(), "{}", example.input);
        }
    }

    #[test]
    fn test_summary_lists_fields() {
        let mut record = ExpenseRecord::with_defaults(today());
        record.expense_name = "coffee".to_string();
        record.amount = 50.0;

        let summary = summarize(&record);
        assert!(summary.contains("Amount: ₹50"));
        assert!(summary.contains("Item: coffee"));
        assert!(summary.contains("Date: 2025-03-10"));
        assert!(summary.contains("Account: HDFC\n"));

        record.bank_account = BankAccount::IciciCc3009;
        assert!(summarize(&record).contains("Account: ICICI CC 3009 (credit card)"));
    }
}
