//! Display formatting following Argentine Spanish conventions
//!
//! Thousands are grouped with `.` and decimals separated with `,`. Amounts
//! are pesos (ARS) rendered as `$ 1.234,56`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Group the integer digits of `value` and join the fraction with a comma.
///
/// `value` must already be rounded to the wanted scale. Trailing fraction
/// zeros are kept only up to `min_fraction` digits.
fn localize(value: Decimal, min_fraction: usize) -> String {
    let negative = value.is_sign_negative() && !value.is_zero();
    let text = value.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, String::new()),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction {
        frac.push('0');
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(&frac);
    }
    out
}

/// `$ 1.234,56`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let body = localize(rounded.abs(), 2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-$ {}", body)
    } else {
        format!("$ {}", body)
    }
}

/// Grouped number with at most three decimals, e.g. `1.234,5`
pub fn format_number(value: Decimal) -> String {
    localize(
        value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero),
        0,
    )
}

/// Rounded to a whole percent, e.g. `42%`
pub fn format_percentage(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{}%", rounded.normalize())
}

/// `d/m/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// `d/m/yyyy, HH:MM:SS`
pub fn format_date_time(date_time: NaiveDateTime) -> String {
    date_time.format("%-d/%-m/%Y, %H:%M:%S").to_string()
}

/// Coarse elapsed time between `then` and `now`.
///
/// Timestamps in the future read as "just now".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{} min ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// First letter upper case, the rest lower case
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn capitalize_words(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}
