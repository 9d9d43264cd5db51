// 📅 Date Extractor
//
// Precedence, first hit wins:
//   1. token "today"      → today
//   2. token "yesterday"  → today - 1
//   3. token "tomorrow"   → today + 1
//   4. "<day> <month>"    → that day in the current year (first such phrase)
//   5. today

use crate::rules::KeywordTables;
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]{1,2})\s+([a-z]+)\b").expect("valid day-month pattern"));

/// Relative-date keywords and their offset from today, in precedence order
const RELATIVE_DAYS: [(&str, i64); 3] = [("today", 0), ("yesterday", -1), ("tomorrow", 1)];

pub fn extract_date(tokens: &[String], text_lower: &str, today: NaiveDate, tables: &KeywordTables) -> NaiveDate {
    for (keyword, offset) in RELATIVE_DAYS {
        if tokens.iter().any(|t| t == keyword) {
            return today + Duration::days(offset);
        }
    }

    if let Some(date) = day_month(text_lower, today.year(), tables) {
        return date;
    }

    today
}

/// First "<day> <month-name>" phrase, resolved in `year`.
/// An impossible day for that month (31 february) counts as no date.
fn day_month(text_lower: &str, year: i32, tables: &KeywordTables) -> Option<NaiveDate> {
    let (day, month) = DAY_MONTH.captures_iter(text_lower).find_map(|caps| {
        let month = tables.month_number(&caps[2])?;
        let day = caps[1].parse::<u32>().ok()?;
        Some((day, month))
    })?;

    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        log::debug!("Ignoring impossible date: day {} of month {} in {}", day, month, year);
    }
    date
}
