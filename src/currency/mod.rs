use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{FinhabitError, Result};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("INR")
    }
}

/// How digits left of the decimal separator are grouped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupingStyle {
    /// 1,234,567
    Thousands,
    /// 12,34,567 (lakh / crore)
    Indian,
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub currency: CurrencyCode,
    pub fraction_digits: u32,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub grouping: GroupingStyle,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("en-IN", CurrencyCode::default(), 0)
    }
}

impl LocaleConfig {
    pub fn for_tag(tag: &str, currency: CurrencyCode, fraction_digits: u32) -> Self {
        let (decimal_separator, grouping_separator) = match tag {
            "de-DE" | "es-ES" | "it-IT" | "pt-BR" => (',', '.'),
            "fr-FR" => (',', ' '),
            _ => ('.', ','),
        };
        let grouping = if tag.ends_with("-IN") {
            GroupingStyle::Indian
        } else {
            GroupingStyle::Thousands
        };
        Self {
            language_tag: tag.to_string(),
            currency,
            fraction_digits,
            decimal_separator,
            grouping_separator,
            grouping,
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "INR" => "₹".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        _ => format!("{code} "),
    }
}

/// Largest magnitude accepted for a single amount. Keeps yearly sums far
/// from `Decimal` overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Parses user-entered money the way `locale` displays it: the locale's
/// decimal separator, optional well-formed digit grouping, optional leading
/// sign. Ambiguous separators are rejected instead of guessed.
pub fn parse_amount(locale: &LocaleConfig, input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FinhabitError::InvalidAmount("amount is required".into()));
    }
    let malformed = || FinhabitError::InvalidAmount(format!("`{trimmed}` is not a number"));
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (int_part, frac_part) = match body.split_once(locale.decimal_separator) {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body, None),
    };
    let digits = ungroup(int_part, locale).ok_or_else(malformed)?;
    let whole = if digits.is_empty() { "0" } else { digits.as_str() };
    let mut normalized = format!("{sign}{whole}");
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(malformed());
        }
        normalized.push('.');
        normalized.push_str(frac);
    } else if digits.is_empty() {
        return Err(malformed());
    }
    let value = Decimal::from_str(&normalized).map_err(|_| malformed())?;
    ensure_within_limit(value)
}

/// Strips grouping separators from an integer part, checking that groups
/// have the sizes `locale` prints.
fn ungroup(int_part: &str, locale: &LocaleConfig) -> Option<String> {
    if !int_part.contains(locale.grouping_separator) {
        return int_part
            .chars()
            .all(|ch| ch.is_ascii_digit())
            .then(|| int_part.to_string());
    }
    let groups: Vec<&str> = int_part.split(locale.grouping_separator).collect();
    let inner = match locale.grouping {
        GroupingStyle::Thousands => 3,
        GroupingStyle::Indian => 2,
    };
    let last = groups.len() - 1;
    let well_formed = groups.iter().enumerate().all(|(index, group)| {
        let sized = match index {
            0 => (1..=3).contains(&group.len()),
            i if i == last => group.len() == 3,
            _ => group.len() == inner,
        };
        sized && group.chars().all(|ch| ch.is_ascii_digit())
    });
    well_formed.then(|| groups.concat())
}

/// Like [`parse_amount`] but rejects negative values (expenses, income).
pub fn parse_non_negative_amount(locale: &LocaleConfig, input: &str) -> Result<Decimal> {
    let value = parse_amount(locale, input)?;
    ensure_non_negative(value)
}

pub fn ensure_non_negative(value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(FinhabitError::InvalidAmount(format!(
            "{value} must not be negative"
        )))
    } else {
        Ok(value)
    }
}

pub fn ensure_within_limit(value: Decimal) -> Result<Decimal> {
    if value.abs() > MAX_AMOUNT {
        Err(FinhabitError::InvalidAmount(format!(
            "{value} exceeds the largest supported amount ({MAX_AMOUNT})"
        )))
    } else {
        Ok(value)
    }
}

/// Formats an amount such as `-₹1,23,456` for the configured locale.
pub fn format_currency(locale: &LocaleConfig, amount: Decimal) -> String {
    let body = format_number(locale, amount.abs(), locale.fraction_digits);
    let symbol = symbol_for(locale.currency.as_str());
    let rounded = amount.round_dp_with_strategy(
        locale.fraction_digits,
        RoundingStrategy::MidpointAwayFromZero,
    );
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

pub fn format_number(locale: &LocaleConfig, value: Decimal, precision: u32) -> String {
    let rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", precision as usize, rounded);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    let mut grouped = group_digits(int_part, locale.grouping, locale.grouping_separator);
    if let Some(frac) = frac_part {
        grouped.push(locale.decimal_separator);
        grouped.push_str(frac);
    }
    format!("{sign}{grouped}")
}

fn group_digits(int_part: &str, style: GroupingStyle, separator: char) -> String {
    let digits: Vec<char> = int_part.chars().collect();
    if digits.len() <= 3 {
        return int_part.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let group = match style {
        GroupingStyle::Thousands => 3,
        GroupingStyle::Indian => 2,
    };
    let mut chunks: Vec<String> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        chunks.push(head[start..end].iter().collect());
        end = start;
    }
    chunks.reverse();
    let mut out = chunks.join(&separator.to_string());
    out.push(separator);
    out.extend(tail.iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn indian_grouping_uses_lakh_blocks() {
        let locale = LocaleConfig::default();
        assert_eq!(format_currency(&locale, dec!(1234567)), "₹12,34,567");
        assert_eq!(format_currency(&locale, dec!(50000)), "₹50,000");
        assert_eq!(format_currency(&locale, dec!(-2000)), "-₹2,000");
        assert_eq!(format_currency(&locale, dec!(999)), "₹999");
    }

    #[test]
    fn thousands_grouping_with_fraction_digits() {
        let locale = LocaleConfig::for_tag("en-US", CurrencyCode::new("usd"), 2);
        assert_eq!(format_currency(&locale, dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(&locale, dec!(0.004)), "$0.00");
    }

    #[test]
    fn rounding_to_zero_digits_is_half_away_from_zero() {
        let locale = LocaleConfig::default();
        assert_eq!(format_currency(&locale, dec!(10.5)), "₹11");
        assert_eq!(format_currency(&locale, dec!(-0.4)), "₹0");
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        let locale = LocaleConfig::for_tag("en-US", CurrencyCode::new("USD"), 2);
        assert_eq!(parse_amount(&locale, " 1,250.75 ").unwrap(), dec!(1250.75));
        assert_eq!(parse_amount(&locale, "-300").unwrap(), dec!(-300));
        assert_eq!(parse_amount(&locale, ".5").unwrap(), dec!(0.5));
        assert!(matches!(
            parse_amount(&locale, "12abc"),
            Err(FinhabitError::InvalidAmount(_))
        ));
        assert!(parse_amount(&locale, "   ").is_err());
        assert!(parse_amount(&locale, "1,2,3").is_err());
        assert!(parse_amount(&locale, "12.").is_err());
        assert!(parse_amount(&locale, "1.2.3").is_err());
    }

    #[test]
    fn indian_grouping_is_accepted_on_input() {
        let locale = LocaleConfig::default();
        assert_eq!(parse_amount(&locale, "12,34,567").unwrap(), dec!(1234567));
        assert_eq!(parse_amount(&locale, "50,000").unwrap(), dec!(50000));
        assert!(parse_amount(&locale, "1,234,567").is_err());
    }

    #[test]
    fn comma_decimal_locale_reads_back_what_it_prints() {
        let locale = LocaleConfig::for_tag("de-DE", CurrencyCode::new("EUR"), 2);
        assert_eq!(format_number(&locale, dec!(1234.5), 2), "1.234,50");
        assert_eq!(parse_amount(&locale, "12,50").unwrap(), dec!(12.50));
        assert_eq!(parse_amount(&locale, "1.234,50").unwrap(), dec!(1234.50));
        assert!(parse_amount(&locale, "12.50").is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let locale = LocaleConfig::for_tag("en-US", CurrencyCode::new("USD"), 2);
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
        assert!(parse_amount(&locale, "1000000000000000").is_ok());
        assert!(matches!(
            parse_amount(&locale, "50000000000000000000000000000"),
            Err(FinhabitError::InvalidAmount(_))
        ));
        assert!(ensure_within_limit(-MAX_AMOUNT).is_ok());
        assert!(ensure_within_limit(MAX_AMOUNT + Decimal::ONE).is_err());
    }

    #[test]
    fn non_negative_parse_refuses_debt() {
        let locale = LocaleConfig::default();
        assert!(parse_non_negative_amount(&locale, "-1").is_err());
        assert_eq!(
            parse_non_negative_amount(&locale, "0").unwrap(),
            Decimal::ZERO
        );
    }
}
