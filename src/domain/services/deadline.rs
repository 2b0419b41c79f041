// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^in\s+(\d+|[a-z]+)\s+(day|days|week|weeks|month|months)$")
        .expect("valid relative deadline pattern")
});

/// 只有日期的格式，解析到当天零点
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// 带时间的格式，保留原样的墙上时间
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

const PREFIXES: &[&str] = &["by ", "on ", "due ", "until ", "before "];

/// 把自由文本的截止时间规范化为本地时间
///
/// 纯函数：相同的输入和 `today` 总是得到相同的结果。
/// 以天为粒度的表达式落在当天零点，无法识别时返回 `None`。
///
/// # 参数
///
/// * `input` - 用户或模型给出的日期表达
/// * `today` - 当前本地日期
pub fn normalize_deadline(input: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    let mut text = trimmed.to_lowercase();
    for prefix in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim().to_string();
            break;
        }
    }

    resolve_relative(&text, today)
        .or_else(|| parse_absolute_date(&text))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn resolve_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" | "tonight" | "end of day" | "eod" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "day after tomorrow" | "the day after tomorrow" => {
            return today.checked_add_days(Days::new(2))
        }
        "next week" | "in a week" => return today.checked_add_days(Days::new(7)),
        "next month" | "in a month" => return today.checked_add_months(Months::new(1)),
        _ => {}
    }

    if let Some(caps) = RELATIVE_RE.captures(text) {
        let amount = parse_count(&caps[1])?;
        return match &caps[2] {
            "day" | "days" => today.checked_add_days(Days::new(amount)),
            "week" | "weeks" => today.checked_add_days(Days::new(amount.checked_mul(7)?)),
            _ => today.checked_add_months(Months::new(u32::try_from(amount).ok()?)),
        };
    }

    let weekday_text = text.strip_prefix("next ").unwrap_or(text);
    parse_weekday(weekday_text).map(|target| next_weekday(today, target))
}

fn parse_absolute_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_count(token: &str) -> Option<u64> {
    if let Ok(n) = token.parse::<u64>() {
        return Some(n);
    }
    let n = match token {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

fn parse_weekday(text: &str) -> Option<Weekday> {
    match text {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// 严格晚于 `today` 的下一个指定星期几
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut delta = (wanted - current).rem_euclid(7);
    if delta == 0 {
        delta = 7;
    }
    today + chrono::Duration::days(delta)
}

#[cfg(test)]
#[path = "deadline_test.rs"]
mod tests;
