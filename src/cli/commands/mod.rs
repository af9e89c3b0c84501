pub mod book;
pub mod finance;
pub mod habits;
pub mod reports;
pub mod system;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::currency::{parse_amount, parse_non_negative_amount, LocaleConfig};
use crate::domain::common::validate_month;

use super::errors::CommandError;
use super::registry::CommandEntry;

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    entries.extend(book::definitions());
    entries.extend(finance::definitions());
    entries.extend(habits::definitions());
    entries.extend(reports::definitions());
    entries.extend(system::definitions());
    entries
}

pub(crate) fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

/// `YYYY-MM-DD`, or `today`.
pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    if input.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_month(input: &str) -> Result<u32, CommandError> {
    let month = input
        .parse::<u32>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid month `{input}`")))?;
    Ok(validate_month(month)?)
}

/// Signed amount typed the way `locale` prints it (carryovers).
pub(crate) fn parse_money(locale: &LocaleConfig, input: &str) -> Result<Decimal, CommandError> {
    Ok(parse_amount(locale, input)?)
}

/// Amount that may not be negative (expenses, income, salaries).
pub(crate) fn parse_spend(locale: &LocaleConfig, input: &str) -> Result<Decimal, CommandError> {
    Ok(parse_non_negative_amount(locale, input)?)
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Resolves a unique id from the leading hex digits shown by list commands.
pub(crate) fn match_id(
    ids: impl IntoIterator<Item = Uuid>,
    prefix: &str,
) -> Result<Uuid, CommandError> {
    let needle = prefix.trim().to_ascii_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments("record id is required".into()));
    }
    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::InvalidArguments(format!(
            "no record matches id `{prefix}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "id `{prefix}` is ambiguous; use more characters"
        ))),
    }
}

/// Positional arguments with `--key value` options pulled out.
pub(crate) struct Options<'a> {
    pub positional: Vec<&'a str>,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Options<'a> {
    pub fn parse(args: &[&'a str]) -> Result<Self, CommandError> {
        let mut positional = Vec::new();
        let mut pairs = Vec::new();
        let mut iter = args.iter().copied();
        while let Some(token) = iter.next() {
            match token.strip_prefix("--") {
                Some(key) if !key.is_empty() => {
                    let value = iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("option --{key} needs a value"))
                    })?;
                    pairs.push((key, value));
                }
                _ => positional.push(token),
            }
        }
        Ok(Self { positional, pairs })
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rev()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }
}
