use std::str::FromStr;

use crate::book::IncomeScheme;
use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, Align, Table};
use crate::cli::registry::CommandEntry;
use crate::core::services::{rounded_percent, FinanceService, MonthFilter};
use crate::domain::common::month_abbrev;

use super::Options;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "overview",
            "Monthly income, carryover, spending, and savings for the working year",
            "overview",
            cmd_overview,
        ),
        CommandEntry::new(
            "breakdown",
            "Spending by category for the working year",
            "breakdown [all|1-12] [--top <n>]",
            cmd_breakdown,
        ),
    ]
}

fn cmd_overview(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let book = context.book()?;
    let overview = book.year_overview(context.year)?;
    output::section(format!("{} overview for {}", book.name, overview.year));
    if overview.scheme == IncomeScheme::LegacySalary {
        output::hint("Income comes from legacy salary rows; `migrate-salaries` converts them.");
    }

    let mut table = Table::new(&[
        ("Month", Align::Left),
        ("Income", Align::Right),
        ("Carryover", Align::Right),
        ("Spent", Align::Right),
        ("Saved", Align::Right),
    ]);
    for month in &overview.months {
        table.add_row(vec![
            month_abbrev(month.month).unwrap_or("?").to_string(),
            context.money(month.income),
            context.money(month.carryover),
            context.money(month.spent),
            context.money(month.saved),
        ]);
    }
    table.print();

    let totals = &overview.totals;
    output::info(format!("Total income    : {}", context.money(totals.total_income)));
    output::info(format!("Total carryover : {}", context.money(totals.total_carryover)));
    output::info(format!("Total spent     : {}", context.money(totals.total_spent)));
    output::info(format!("Remaining       : {}", context.money(totals.remaining)));
    Ok(())
}

fn cmd_breakdown(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let options = Options::parse(args)?;
    let filter = match options.positional.first() {
        Some(raw) => MonthFilter::from_str(raw)?,
        None => MonthFilter::All,
    };
    let top = options
        .get("top")
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| CommandError::InvalidArguments(format!("invalid --top `{raw}`")))
        })
        .transpose()?;

    let book = context.book()?;
    let expenses = book.expenses_for_year(context.year);
    let total = FinanceService::filtered_total(&expenses, filter);
    let rows = match top {
        Some(limit) => {
            FinanceService::top_categories(&expenses, &book.expense_categories, filter, limit)
        }
        None => book.category_breakdown(context.year, filter),
    };

    output::section(format!("Spending by category ({filter}, {})", context.year));
    if rows.is_empty() {
        output::info("No expenses for this period.");
        return Ok(());
    }
    let mut table = Table::new(&[
        ("Category", Align::Left),
        ("Total", Align::Right),
        ("Share", Align::Right),
    ]);
    for row in &rows {
        table.add_row(vec![
            row.category_name.clone(),
            context.money(row.total),
            format!("{}%", rounded_percent(row.total, total)),
        ]);
    }
    table.print();
    output::info(format!("Total spent: {}", context.money(total)));
    Ok(())
}
