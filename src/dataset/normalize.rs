//! Text-to-number normalization for table columns.

use crate::error::{Result, ScrapeError};

fn conversion(column: &'static str, value: &str) -> ScrapeError {
    ScrapeError::TypeConversion { column, value: value.to_string() }
}

/// Parses a release year ("1994").
pub fn parse_year(text: &str) -> Result<i32> {
    text.trim().parse().map_err(|_| conversion("year", text))
}

/// Parses a rating ("8.7").
pub fn parse_rating(text: &str) -> Result<f32> {
    let rating: f32 = text.trim().parse().map_err(|_| conversion("rating", text))?;
    if !rating.is_finite() {
        return Err(conversion("rating", text));
    }
    Ok(rating)
}

/// Parses a vote count with an optional `K` (thousand) or `M` (million)
/// suffix, truncating to an integer: "1.2M" -> 1200000, "10K" -> 10000,
/// "500" -> 500.
///
/// The decimal mantissa is scaled digit by digit, so "1.15M" yields exactly
/// 1150000 with no floating point drift.
pub fn parse_votes(text: &str) -> Result<u64> {
    let raw = text.trim();
    let (number, multiplier) = if let Some(n) = raw.strip_suffix('K') {
        (n.trim(), 1_000u64)
    } else if let Some(n) = raw.strip_suffix('M') {
        (n.trim(), 1_000_000u64)
    } else {
        (raw, 1u64)
    };

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(conversion("votes", text));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| conversion("votes", text))?
    };
    let mut value = whole.checked_mul(multiplier).ok_or_else(|| conversion("votes", text))?;

    let mut scale = multiplier;
    for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
        scale /= 10;
        if scale == 0 {
            break;
        }
        value = value
            .checked_add(u64::from(digit) * scale)
            .ok_or_else(|| conversion("votes", text))?;
    }

    Ok(value)
}

/// Decade bucket of a year: 1994 -> 1990.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Four-digit decade label: 1990 -> "1990".
pub fn decade_label(decade: i32) -> String {
    format!("{:04}", decade)
}

/// Joins list items with commas and no padding: ["Crime", "Drama"] -> "Crime,Drama".
pub fn join_list(items: &[String]) -> String {
    items.iter().map(|item| item.trim()).collect::<Vec<_>>().join(",")
}

/// Splits a comma-joined column back into its non-empty items.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}
