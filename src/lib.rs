// Expense Parser - Core Library
// Turns one line of free text into a structured expense record

pub mod model;
pub mod rules;
pub mod extractors;
pub mod parser;
pub mod chat;
pub mod config;

// Re-export commonly used types
pub use model::{
    BankAccount, Category, ExpenseRecord, ExpenseType, Importance,
    UnknownVariant, ValidationError, DEFAULT_EXPENSE_NAME,
};
pub use rules::{KeywordRule, KeywordTables, MonthName};
pub use parser::{
    ExpenseParser, RuleBasedParser, LlmParser, CompletionBackend,
    Clock, SystemClock, FixedClock, ParserKind,
    build_parser, default_system_prompt,
};
pub use chat::{
    ChatAssistant, ChatReply, ReplyKind, MessageKind,
    ExpenseSink, JsonlSink, MemorySink, SyncReceipt,
    classify_message, example_messages, ExampleMessage,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse with the built-in tables and today's local date
pub fn parse(text: &str) -> ExpenseRecord {
    RuleBasedParser::new().parse(text)
}
