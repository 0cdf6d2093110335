//! Per-field value formatting
//!
//! Formatting is selected by a naming convention on the placeholder key:
//! a rule applies when the lowercased key contains one of its needles.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

/// Month names used in long-form dates
pub const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Maximum number of digits in a CPF
pub const CPF_DIGITS: usize = 11;

/// Value formatter
pub type FormatFn = fn(&str) -> String;

/// A formatting rule keyed on placeholder names
#[derive(Debug, Clone)]
pub struct FormatRule {
    pub name: &'static str,
    needles: Vec<String>,
    format: FormatFn,
}

impl FormatRule {
    /// Create a rule applying `format` to keys containing any of `needles`
    pub fn new(name: &'static str, needles: &[&str], format: FormatFn) -> Self {
        Self {
            name,
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
            format,
        }
    }

    /// Case-insensitive substring match on the key
    pub fn applies_to(&self, key: &str) -> bool {
        let key_lower = key.to_lowercase();
        self.needles.iter().any(|needle| key_lower.contains(needle))
    }

    pub fn apply(&self, value: &str) -> String {
        (self.format)(value)
    }
}

/// Ordered set of formatting rules; the first matching rule wins
#[derive(Debug, Clone)]
pub struct FormatterSet {
    rules: Vec<FormatRule>,
}

impl FormatterSet {
    /// A set with no rules: values pass through unchanged
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule with lower priority than the existing ones
    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_for(&self, key: &str) -> Option<&FormatRule> {
        self.rules.iter().find(|rule| rule.applies_to(key))
    }

    /// Format `value` for `key`
    pub fn format(&self, key: &str, value: &str) -> String {
        match self.rule_for(key) {
            Some(rule) => rule.apply(value),
            None => value.to_string(),
        }
    }
}

impl Default for FormatterSet {
    fn default() -> Self {
        Self::empty()
            .with_rule(FormatRule::new("cpf", &["cpf"], format_cpf))
            .with_rule(FormatRule::new("date", &["data", "date"], format_long_date))
    }
}

/// Group up to 11 digits as `XXX.XXX.XXX-XX`.
///
/// Non-digits are dropped first and punctuation appears progressively as
/// digits accumulate, so partially typed values format sensibly.
pub fn format_cpf(value: &str) -> String {
    let digits: String = value
        .chars()
        .filter(char::is_ascii_digit)
        .take(CPF_DIGITS)
        .collect();

    // ASCII digits only, byte slicing is safe
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
    }
}

/// Convert `YYYY-MM-DD` into `"5 de março de 2024"`.
///
/// Anything that is not exactly an ISO calendar date is returned unchanged.
pub fn format_long_date(value: &str) -> String {
    if !ISO_DATE.is_match(value) {
        return value.to_string();
    }

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => format!(
            "{} de {} de {}",
            date.day(),
            MONTHS_PT_BR[date.month0() as usize],
            date.year()
        ),
        Err(_) => value.to_string(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: CPF output only ever carries the (at most 11) input digits
        #[test]
        fn cpf_preserves_digits(input in ".{0,30}") {
            let formatted = format_cpf(&input);
            let expected: String = input.chars().filter(char::is_ascii_digit).take(11).collect();
            let kept: String = formatted.chars().filter(char::is_ascii_digit).collect();
            prop_assert_eq!(kept, expected);
            prop_assert!(formatted.len() <= 14);
        }

        /// Property: valid ISO dates always render with day, month name and year
        #[test]
        fn valid_dates_render_long_form(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
            let iso = format!("{:04}-{:02}-{:02}", year, month, day);
            let long = format_long_date(&iso);
            let expected = format!(
                "{} de {} de {}",
                day,
                MONTHS_PT_BR[(month - 1) as usize],
                year
            );
            prop_assert_eq!(long, expected);
        }
    }
}
