use chrono::Datelike;

use crate::book::{RecordBook, UpsertOutcome};
use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, Align, Table};
use crate::cli::registry::CommandEntry;
use crate::core::services::UNKNOWN_CATEGORY;
use crate::domain::common::{month_abbrev, MonthlyAmount};
use crate::domain::{
    CarryoverRecord, ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, SubCategory,
};
use crate::errors::FinhabitError;

use super::{arg, match_id, parse_date, parse_money, parse_month, parse_spend, short_id, Options};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "category",
            "Manage expense categories",
            "category <add|rename|remove|list> [name] [new-name]",
            cmd_category,
        ),
        CommandEntry::new(
            "subcategory",
            "Manage sub-categories of an expense category",
            "subcategory <add|remove|list> <category> [name]",
            cmd_subcategory,
        ),
        CommandEntry::new(
            "income-category",
            "Manage income categories",
            "income-category <add|remove|list> [name]",
            cmd_income_category,
        ),
        CommandEntry::new(
            "expense",
            "Record, edit, remove, or list expenses",
            "expense add <category> <amount> <date> [--sub <name>] [--desc <text>] | expense edit <id> [--amount <n>] [--date <d>] [--desc <text>] | expense remove <id> | expense list [month]",
            cmd_expense,
        ),
        CommandEntry::new(
            "income",
            "Record, remove, or list categorized income for the working year",
            "income add <category> <month> <amount> | income remove <id> | income list",
            cmd_income,
        ),
        CommandEntry::new(
            "salary",
            "Set, remove, or list legacy monthly salaries",
            "salary <set|remove|list> [month] [amount]",
            cmd_salary,
        ),
        CommandEntry::new(
            "carryover",
            "Set, remove, or list monthly carryover (negative for debt)",
            "carryover <set|remove|list> [month] [amount]",
            cmd_carryover,
        ),
        CommandEntry::new(
            "migrate-salaries",
            "Move the working year's salaries into categorized income",
            "migrate-salaries [income-category]",
            cmd_migrate_salaries,
        ),
    ]
}

fn subcommand<'a>(args: &[&'a str], usage: &str) -> Result<String, CommandError> {
    Ok(arg(args, 0, usage)?.to_lowercase())
}

fn unknown_action(action: &str, command: &str) -> CommandError {
    CommandError::InvalidArguments(format!("unknown {command} action `{action}`"))
}

fn expense_category<'b>(book: &'b RecordBook, name: &str) -> Result<&'b ExpenseCategory, CommandError> {
    book.expense_category_by_name(name)
        .ok_or_else(|| FinhabitError::CategoryNotFound(name.to_string()).into())
}

fn income_category<'b>(book: &'b RecordBook, name: &str) -> Result<&'b IncomeCategory, CommandError> {
    book.income_category_by_name(name)
        .ok_or_else(|| FinhabitError::CategoryNotFound(name.to_string()).into())
}

fn sub_category<'b>(
    book: &'b RecordBook,
    category: &ExpenseCategory,
    name: &str,
) -> Result<&'b SubCategory, CommandError> {
    book.sub_categories_of(category.id)
        .into_iter()
        .find(|sub| sub.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            FinhabitError::CategoryNotFound(format!("{}/{}", category.name, name)).into()
        })
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "category <add|rename|remove|list> [name] [new-name]";
    let action = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" => {
            let name = arg(args, 1, "category add <name>")?;
            context.book_mut()?.add_expense_category(name)?;
            output::success(format!("Category `{}` added.", name.trim()));
        }
        "rename" => {
            let old = arg(args, 1, "category rename <name> <new-name>")?;
            let new = arg(args, 2, "category rename <name> <new-name>")?;
            let book = context.book_mut()?;
            let id = expense_category(book, old)?.id;
            book.rename_expense_category(id, new)?;
            output::success(format!("Category `{old}` renamed to `{}`.", new.trim()));
        }
        "remove" => {
            let name = arg(args, 1, "category remove <name>")?;
            let book = context.book_mut()?;
            let id = expense_category(book, name)?.id;
            let dropped = book.remove_expense_category(id)?;
            output::success(format!(
                "Category `{name}` removed along with {dropped} expense(s)."
            ));
        }
        "list" => {
            let book = context.book()?;
            let mut table = Table::new(&[("Category", Align::Left), ("Sub-categories", Align::Left)]);
            for category in &book.expense_categories {
                let subs: Vec<&str> = book
                    .sub_categories_of(category.id)
                    .into_iter()
                    .map(|sub| sub.name.as_str())
                    .collect();
                table.add_row(vec![category.name.clone(), subs.join(", ")]);
            }
            if table.is_empty() {
                output::info("No expense categories.");
            } else {
                table.print();
            }
        }
        other => return Err(unknown_action(other, "category")),
    }
    Ok(())
}

fn cmd_subcategory(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "subcategory <add|remove|list> <category> [name]";
    let action = subcommand(args, USAGE)?;
    let category_name = arg(args, 1, USAGE)?;
    match action.as_str() {
        "add" => {
            let name = arg(args, 2, "subcategory add <category> <name>")?;
            let book = context.book_mut()?;
            let id = expense_category(book, category_name)?.id;
            book.add_sub_category(id, name)?;
            output::success(format!("Sub-category `{}` added.", name.trim()));
        }
        "remove" => {
            let name = arg(args, 2, "subcategory remove <category> <name>")?;
            let book = context.book_mut()?;
            let category = expense_category(book, category_name)?;
            let id = sub_category(book, category, name)?.id;
            let cleared = book.remove_sub_category(id)?;
            output::success(format!(
                "Sub-category `{name}` removed; {cleared} expense(s) no longer reference it."
            ));
        }
        "list" => {
            let book = context.book()?;
            let category = expense_category(book, category_name)?;
            let subs = book.sub_categories_of(category.id);
            if subs.is_empty() {
                output::info(format!("`{}` has no sub-categories.", category.name));
            }
            for sub in subs {
                output::info(format!("  {}", sub.name));
            }
        }
        other => return Err(unknown_action(other, "subcategory")),
    }
    Ok(())
}

fn cmd_income_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "income-category <add|remove|list> [name]";
    let action = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" => {
            let name = arg(args, 1, "income-category add <name>")?;
            context.book_mut()?.add_income_category(name)?;
            output::success(format!("Income category `{}` added.", name.trim()));
        }
        "remove" => {
            let name = arg(args, 1, "income-category remove <name>")?;
            let book = context.book_mut()?;
            let id = income_category(book, name)?.id;
            let dropped = book.remove_income_category(id)?;
            output::success(format!(
                "Income category `{name}` removed along with {dropped} income row(s)."
            ));
        }
        "list" => {
            let book = context.book()?;
            if book.income_categories.is_empty() {
                output::info("No income categories.");
            }
            for category in &book.income_categories {
                output::info(format!("  {}", category.name));
            }
        }
        other => return Err(unknown_action(other, "income-category")),
    }
    Ok(())
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "expense <add|edit|remove|list> ...";
    let action = subcommand(args, USAGE)?;
    let options = Options::parse(&args[1..])?;
    let locale = context.locale.clone();
    match action.as_str() {
        "add" => {
            const ADD: &str = "expense add <category> <amount> <date> [--sub <name>] [--desc <text>]";
            let category_name = arg(&options.positional, 0, ADD)?;
            let amount = parse_spend(&locale, arg(&options.positional, 1, ADD)?)?;
            let date = parse_date(arg(&options.positional, 2, ADD)?)?;
            let book = context.book_mut()?;
            let category = expense_category(book, category_name)?;
            let mut record = ExpenseRecord::new(category.id, amount, date);
            if let Some(sub) = options.get("sub") {
                record = record.with_sub_category(sub_category(book, category, sub)?.id);
            }
            if let Some(desc) = options.get("desc") {
                record = record.with_description(desc);
            }
            let id = book.add_expense(record)?;
            let shown = context.money(amount);
            output::success(format!(
                "Expense {} recorded: {shown} on {date}.",
                short_id(id)
            ));
        }
        "edit" => {
            let prefix = arg(&options.positional, 0, "expense edit <id> [--amount <n>] [--date <d>] [--category <name>] [--desc <text>]")?;
            let book = context.book_mut()?;
            let id = match_id(book.expenses.iter().map(|e| e.id), prefix)?;
            let mut updated = book
                .expenses
                .iter()
                .find(|expense| expense.id == id)
                .cloned()
                .ok_or_else(|| FinhabitError::RecordNotFound(prefix.to_string()))?;
            if let Some(amount) = options.get("amount") {
                updated.amount = parse_spend(&locale, amount)?;
            }
            if let Some(date) = options.get("date") {
                updated.expense_date = parse_date(date)?;
            }
            if let Some(name) = options.get("category") {
                updated.category_id = expense_category(book, name)?.id;
                updated.sub_category_id = None;
            }
            if let Some(desc) = options.get("desc") {
                let desc = desc.trim();
                updated.description = (!desc.is_empty()).then(|| desc.to_string());
            }
            book.update_expense(id, updated)?;
            output::success(format!("Expense {} updated.", short_id(id)));
        }
        "remove" => {
            let prefix = arg(&options.positional, 0, "expense remove <id>")?;
            let book = context.book_mut()?;
            let id = match_id(book.expenses.iter().map(|e| e.id), prefix)?;
            book.remove_expense(id)?;
            output::success(format!("Expense {} removed.", short_id(id)));
        }
        "list" => {
            let month = options
                .positional
                .first()
                .map(|value| parse_month(value))
                .transpose()?;
            let book = context.book()?;
            let mut table = Table::new(&[
                ("Id", Align::Left),
                ("Date", Align::Left),
                ("Category", Align::Left),
                ("Amount", Align::Right),
                ("Description", Align::Left),
            ]);
            for expense in book
                .expenses_for_year(context.year)
                .iter()
                .filter(|expense| month.map_or(true, |m| expense.expense_date.month() == m))
            {
                let mut category = book
                    .expense_category(expense.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                if let Some(sub) = expense
                    .sub_category_id
                    .and_then(|id| book.sub_categories.iter().find(|s| s.id == id))
                {
                    category = format!("{category}/{}", sub.name);
                }
                table.add_row(vec![
                    short_id(expense.id),
                    expense.expense_date.to_string(),
                    category,
                    context.money(expense.amount),
                    expense.description.clone().unwrap_or_default(),
                ]);
            }
            if table.is_empty() {
                output::info(format!("No expenses in {}.", context.year));
            } else {
                table.print();
            }
        }
        other => return Err(unknown_action(other, "expense")),
    }
    Ok(())
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "income <add|remove|list> ...";
    let action = subcommand(args, USAGE)?;
    let year = context.year;
    match action.as_str() {
        "add" => {
            const ADD: &str = "income add <category> <month> <amount>";
            let name = arg(args, 1, ADD)?;
            let month = parse_month(arg(args, 2, ADD)?)?;
            let amount = parse_spend(&context.locale, arg(args, 3, ADD)?)?;
            let book = context.book_mut()?;
            let category = income_category(book, name)?.id;
            let id = book.add_income(IncomeRecord::new(year, month, category, amount))?;
            let shown = context.money(amount);
            output::success(format!(
                "Income {} recorded: {shown} for {}/{year}.",
                short_id(id),
                month
            ));
        }
        "remove" => {
            let prefix = arg(args, 1, "income remove <id>")?;
            let book = context.book_mut()?;
            let id = match_id(book.income.iter().map(|row| row.id), prefix)?;
            book.remove_income(id)?;
            output::success(format!("Income {} removed.", short_id(id)));
        }
        "list" => {
            let book = context.book()?;
            let mut table = Table::new(&[
                ("Id", Align::Left),
                ("Month", Align::Left),
                ("Category", Align::Left),
                ("Amount", Align::Right),
            ]);
            for row in book.income_for_year(year) {
                let category = book
                    .income_categories
                    .iter()
                    .find(|c| c.id == row.income_category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                table.add_row(vec![
                    short_id(row.id),
                    month_abbrev(row.month).unwrap_or("?").to_string(),
                    category,
                    context.money(row.amount),
                ]);
            }
            if table.is_empty() {
                output::info(format!("No income recorded in {year}."));
            } else {
                table.print();
            }
        }
        other => return Err(unknown_action(other, "income")),
    }
    Ok(())
}

fn report_upsert(what: &str, month: u32, year: i32, outcome: UpsertOutcome) {
    let verb = match outcome {
        UpsertOutcome::Inserted(_) => "set",
        UpsertOutcome::Updated(_) => "updated",
    };
    output::success(format!("{what} for {month}/{year} {verb}."));
}

fn list_carryovers(context: &ShellContext) -> CommandResult {
    let mut rows: Vec<&CarryoverRecord> = context
        .book()?
        .carryovers
        .iter()
        .filter(|row| row.year == context.year)
        .collect();
    rows.sort_by_key(|row| row.month);
    if rows.is_empty() {
        output::info(format!("No carryover rows in {}.", context.year));
        return Ok(());
    }
    let mut table = Table::new(&[
        ("Month", Align::Left),
        ("Amount", Align::Right),
        ("Kind", Align::Left),
    ]);
    for row in rows {
        let kind = if row.is_debt() { "debt" } else { "savings" };
        table.add_row(vec![
            month_abbrev(row.month).unwrap_or("?").to_string(),
            context.money(row.amount),
            kind.to_string(),
        ]);
    }
    table.print();
    Ok(())
}

fn list_monthly<T: MonthlyAmount>(context: &ShellContext, title: &str, rows: &[T]) {
    let mut rows: Vec<&T> = rows.iter().filter(|r| r.year() == context.year).collect();
    rows.sort_by_key(|r| r.month());
    if rows.is_empty() {
        output::info(format!("No {title} rows in {}.", context.year));
        return;
    }
    let mut table = Table::new(&[("Month", Align::Left), ("Amount", Align::Right)]);
    for row in rows {
        table.add_row(vec![
            month_abbrev(row.month()).unwrap_or("?").to_string(),
            context.money(row.amount()),
        ]);
    }
    table.print();
}

fn cmd_salary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "salary <set|remove|list> [month] [amount]";
    let action = subcommand(args, USAGE)?;
    let year = context.year;
    match action.as_str() {
        "set" => {
            let month = parse_month(arg(args, 1, "salary set <month> <amount>")?)?;
            let raw = arg(args, 2, "salary set <month> <amount>")?;
            let amount = parse_spend(&context.locale, raw)?;
            let outcome = context.book_mut()?.upsert_salary(year, month, amount)?;
            report_upsert("Salary", month, year, outcome);
        }
        "remove" => {
            let month = parse_month(arg(args, 1, "salary remove <month>")?)?;
            context.book_mut()?.remove_salary(year, month)?;
            output::success(format!("Salary for {month}/{year} removed."));
        }
        "list" => {
            let view: &ShellContext = context;
            list_monthly(view, "salary", &view.book()?.salaries);
        }
        other => return Err(unknown_action(other, "salary")),
    }
    Ok(())
}

fn cmd_carryover(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "carryover <set|remove|list> [month] [amount]";
    let action = subcommand(args, USAGE)?;
    let year = context.year;
    match action.as_str() {
        "set" => {
            let month = parse_month(arg(args, 1, "carryover set <month> <amount>")?)?;
            let raw = arg(args, 2, "carryover set <month> <amount>")?;
            let amount = parse_money(&context.locale, raw)?;
            let outcome = context.book_mut()?.upsert_carryover(year, month, amount)?;
            report_upsert("Carryover", month, year, outcome);
        }
        "remove" => {
            let month = parse_month(arg(args, 1, "carryover remove <month>")?)?;
            context.book_mut()?.remove_carryover(year, month)?;
            output::success(format!("Carryover for {month}/{year} removed."));
        }
        "list" => {
            list_carryovers(context)?;
        }
        other => return Err(unknown_action(other, "carryover")),
    }
    Ok(())
}

fn cmd_migrate_salaries(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category = args.first().copied().unwrap_or("Salary");
    let year = context.year;
    let moved = context
        .book_mut()?
        .migrate_legacy_salaries(year, category)?;
    if moved == 0 {
        output::info(format!("No legacy salaries to migrate in {year}."));
    } else {
        output::success(format!(
            "Migrated {moved} salary row(s) in {year} into `{category}` income."
        ));
    }
    Ok(())
}
