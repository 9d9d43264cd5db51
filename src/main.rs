use anyhow::{bail, Result};
use std::env;

use expense_parser::{
    build_parser, example_messages, ChatAssistant, Config, ExpenseParser, JsonlSink, RuleBasedParser,
};

const USAGE: &str = "Usage:
  expense-parser parse <text...>   Print the parsed expense as JSON
  expense-parser chat <text...>    Parse, validate and store the expense
  expense-parser examples          List example messages";

fn main() -> Result<()> {
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let text = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();

    match command {
        Some("parse") => run_parse(&config, &text),
        Some("chat") => run_chat(&config, &text),
        Some("examples") => {
            run_examples();
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn load_parser(config: &Config) -> Result<Box<dyn ExpenseParser>> {
    let rules = RuleBasedParser::with_tables(config.keyword_tables()?);
    // No completion backend ships with the CLI; "llm" reports that instead of guessing
    build_parser(config.parser, rules, None)
}

fn run_parse(config: &Config, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Nothing to parse\n{}", USAGE);
    }

    let parser = load_parser(config)?;
    let record = parser.parse(text);
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Err(e) = record.validate() {
        eprintln!("⚠️  {}", e);
    }
    Ok(())
}

fn run_chat(config: &Config, text: &str) -> Result<()> {
    let parser = load_parser(config)?;
    let assistant = ChatAssistant::new(parser, JsonlSink::new(&config.sink_file));

    let reply = assistant.handle(text);
    println!("{}", reply.response);
    if let Some(url) = &reply.page_url {
        println!("📄 {}", url);
    }

    if !reply.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_examples() {
    println!("💬 Example messages");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for example in example_messages() {
        println!("  {:<55} {}", example.input, example.description);
    }
}
