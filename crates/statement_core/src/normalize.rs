use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::cells::cell_str;

/// Spreadsheet serial for 1970-01-01.
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

/// Convert a cell into a calendar date.
///
/// Handles, in order:
/// - spreadsheet date serials (float, int, or a native datetime cell)
/// - `DD.MM.YYYY` / `DD/MM/YYYY` strings (Turkish statement convention)
/// - common unambiguous string formats
/// - a last-resort split on `.`/`/`/`-` deciding day-first vs year-first by
///   field widths
///
/// Returns `None` for anything unrecoverable; never panics.
pub fn parse_date(value: &Data) -> Option<NaiveDate> {
    match value {
        Data::Empty => None,
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::DateTime(dt) => serial_to_date(dt.as_f64()),
        other => parse_date_str(cell_str(other).trim()),
    }
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - UNIX_EPOCH_SERIAL).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1).map(|epoch| epoch + Duration::days(days))
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    // Day-first Turkish layouts take precedence over anything ambiguous.
    let day_first = Regex::new(r"^(\d{1,2})[./](\d{1,2})[./](\d{4})$").ok()?;
    if let Some(caps) = day_first.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    // Split on common separators and guess the field order by widths.
    let parts: Vec<&str> = s.split(['.', '/', '-']).collect();
    if parts.len() == 3 {
        if parts[0].len() <= 2 && parts[1].len() <= 2 && parts[2].len() == 4 {
            return NaiveDate::from_ymd_opt(
                parts[2].parse().ok()?,
                parts[1].parse().ok()?,
                parts[0].parse().ok()?,
            );
        }
        return NaiveDate::from_ymd_opt(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
        );
    }

    None
}

/// Convert a cell into a signed amount.
///
/// Understands parenthesized negatives (`(123,45)`) and both the Turkish
/// (`1.234,56`) and US (`1,234.56`) separator conventions: when both
/// separators appear, the later one is the decimal point; a lone comma is a
/// Turkish decimal comma.
///
/// Returns `0.0` for empty or unparseable input. Callers must treat zero as a
/// legal amount, not a failure sentinel.
pub fn parse_amount(value: &Data) -> f64 {
    match value {
        Data::Empty => 0.0,
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        other => parse_amount_str(&cell_str(other)),
    }
}

fn parse_amount_str(raw: &str) -> f64 {
    let negative_parens = raw.contains('(') && raw.contains(')');

    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if s.is_empty() || s == "-" {
        return 0.0;
    }

    if s.contains('.') && s.contains(',') {
        let last_comma = s.rfind(',').unwrap_or(0);
        let last_dot = s.rfind('.').unwrap_or(0);
        if last_comma > last_dot {
            // Turkish: 1.234,56
            s = s.replace('.', "").replacen(',', ".", 1);
        } else {
            // US: 1,234.56
            s = s.replace(',', "");
        }
    } else if s.contains(',') {
        // Lone comma is a Turkish decimal separator
        s = s.replacen(',', ".", 1);
    }

    let mut num: f64 = match s.parse() {
        Ok(n) => n,
        Err(_) => return 0.0,
    };

    if negative_parens && num > 0.0 {
        num = -num;
    }

    num
}
