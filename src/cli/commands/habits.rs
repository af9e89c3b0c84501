use chrono::Datelike;

use crate::book::{HabitPatch, RecordBook};
use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, habit_cell, Align, Table};
use crate::cli::registry::CommandEntry;
use crate::domain::common::{month_abbrev, month_name};
use crate::domain::HabitCategory;
use crate::errors::FinhabitError;

use super::{arg, parse_date, parse_month, Options};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "habit",
            "Manage tracked habits",
            "habit add <name> [--color <hex>] [--desc <text>] | habit edit <name> [--name <new>] [--color <hex>] [--desc <text>] | habit remove <name> | habit list",
            cmd_habit,
        ),
        CommandEntry::new(
            "toggle",
            "Cycle a habit's day: unset, done, not done",
            "toggle <habit> <date>",
            cmd_toggle,
        ),
        CommandEntry::new(
            "note",
            "Write, show, remove, or list daily notes",
            "note set <date> <text> | note show <date> | note remove <date> | note list [month]",
            cmd_note,
        ),
        CommandEntry::new(
            "grid",
            "Month grid of habit states for the working year",
            "grid [month]",
            cmd_grid,
        ),
        CommandEntry::new(
            "streaks",
            "Longest completed streak per habit in the working year",
            "streaks",
            cmd_streaks,
        ),
        CommandEntry::new(
            "analytics",
            "Completion rates and monthly trend for the working year",
            "analytics",
            cmd_analytics,
        ),
    ]
}

fn habit<'b>(book: &'b RecordBook, name: &str) -> Result<&'b HabitCategory, CommandError> {
    book.habit_category_by_name(name)
        .ok_or_else(|| FinhabitError::CategoryNotFound(name.to_string()).into())
}

fn cmd_habit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = arg(args, 0, "habit <add|edit|remove|list> ...")?.to_lowercase();
    let options = Options::parse(&args[1..])?;
    match action.as_str() {
        "add" => {
            let name = arg(&options.positional, 0, "habit add <name> [--color <hex>] [--desc <text>]")?;
            let mut category = HabitCategory::new(name);
            if let Some(color) = options.get("color") {
                category = category.with_color(color);
            }
            if let Some(desc) = options.get("desc") {
                category = category.with_description(desc);
            }
            context.book_mut()?.add_habit_category(category)?;
            output::success(format!("Habit `{}` added.", name.trim()));
        }
        "edit" => {
            let name = arg(&options.positional, 0, "habit edit <name> [--name <new>] [--color <hex>] [--desc <text>]")?;
            let patch = HabitPatch {
                name: options.get("name").map(str::to_string),
                color: options.get("color").map(str::to_string),
                description: options.get("desc").map(str::to_string),
            };
            let book = context.book_mut()?;
            let id = habit(book, name)?.id;
            book.update_habit_category(id, patch)?;
            output::success(format!("Habit `{name}` updated."));
        }
        "remove" => {
            let name = arg(&options.positional, 0, "habit remove <name>")?;
            let book = context.book_mut()?;
            let id = habit(book, name)?.id;
            let dropped = book.remove_habit_category(id)?;
            output::success(format!("Habit `{name}` removed along with {dropped} entries."));
        }
        "list" => {
            let book = context.book()?;
            let mut table = Table::new(&[
                ("Habit", Align::Left),
                ("Color", Align::Left),
                ("Description", Align::Left),
            ]);
            for category in &book.habit_categories {
                table.add_row(vec![
                    category.name.clone(),
                    category.color.clone(),
                    category.description.clone().unwrap_or_default(),
                ]);
            }
            if table.is_empty() {
                output::info("No habits yet.");
            } else {
                table.print();
            }
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown habit action `{other}`"
            )))
        }
    }
    Ok(())
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = arg(args, 0, "toggle <habit> <date>")?;
    let date = parse_date(arg(args, 1, "toggle <habit> <date>")?)?;
    let book = context.book_mut()?;
    let id = habit(book, name)?.id;
    let state = book.toggle_habit(id, date)?;
    output::success(format!("{name} on {date}: {state}"));
    Ok(())
}

fn cmd_note(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = arg(args, 0, "note <set|show|remove|list> ...")?.to_lowercase();
    match action.as_str() {
        "set" => {
            let date = parse_date(arg(args, 1, "note set <date> <text>")?)?;
            let text = args.get(2..).unwrap_or_default().join(" ");
            let created = context.book_mut()?.save_note(date, &text)?;
            let verb = if created { "saved" } else { "updated" };
            output::success(format!("Note for {date} {verb}."));
        }
        "show" => {
            let date = parse_date(arg(args, 1, "note show <date>")?)?;
            match context.book()?.note(date) {
                Some(note) => output::info(&note.content),
                None => output::info(format!("No note for {date}.")),
            }
        }
        "remove" => {
            let date = parse_date(arg(args, 1, "note remove <date>")?)?;
            context.book_mut()?.remove_note(date)?;
            output::success(format!("Note for {date} removed."));
        }
        "list" => {
            let month = match args.get(1) {
                Some(raw) => parse_month(raw)?,
                None => chrono::Local::now().month(),
            };
            let notes = context.book()?.notes_in_month(context.year, month)?;
            if notes.is_empty() {
                output::info(format!(
                    "No notes in {} {}.",
                    month_name(month).unwrap_or("?"),
                    context.year
                ));
            }
            for note in notes {
                output::info(format!("  {}  {}", note.note_date, note.preview(60)));
            }
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown note action `{other}`"
            )))
        }
    }
    Ok(())
}

fn cmd_grid(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = match args.first() {
        Some(raw) => parse_month(raw)?,
        None => chrono::Local::now().month(),
    };
    let rows = context.book()?.habit_month_grid(context.year, month)?;
    output::section(format!(
        "{} {}",
        month_name(month).unwrap_or("?"),
        context.year
    ));
    if rows.is_empty() {
        output::info("No habits yet.");
        return Ok(());
    }
    let width = rows.iter().map(|row| row.name.chars().count()).max().unwrap_or(0);
    let days = rows[0].states.len();
    let ruler: String = (1..=days).map(|day| ((day % 10) as u8 + b'0') as char).collect();
    output::info(format!("{:width$}  {ruler}", ""));
    for row in &rows {
        let cells: String = row.states.iter().map(|state| habit_cell(*state)).collect();
        output::info(format!(
            "{:width$}  {cells}  ✓{} ✗{}",
            row.name, row.tally.completed, row.tally.not_done
        ));
    }
    Ok(())
}

fn cmd_streaks(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let analytics = context.book()?.habit_analytics(context.year);
    output::section(format!("Longest streaks in {}", context.year));
    if analytics.streaks.is_empty() {
        output::info("No habits yet.");
        return Ok(());
    }
    let mut table = Table::new(&[("Habit", Align::Left), ("Days", Align::Right)]);
    for streak in &analytics.streaks {
        table.add_row(vec![streak.name.clone(), streak.max_streak.to_string()]);
    }
    table.print();
    Ok(())
}

fn cmd_analytics(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let analytics = context.book()?.habit_analytics(context.year);
    let overview = analytics.overview;
    output::section(format!("Habit analytics {}", analytics.year));
    output::info(format!("Habits tracked    : {}", overview.habits_tracked));
    output::info(format!(
        "Completions       : {} of {} entries",
        overview.total_completions, overview.total_entries
    ));
    output::info(format!("Completion rate   : {}%", overview.completion_rate));

    let mut per_habit = Table::new(&[
        ("Habit", Align::Left),
        ("Done", Align::Right),
        ("Entries", Align::Right),
        ("Rate", Align::Right),
        ("Streak", Align::Right),
    ]);
    for (stats, streak) in analytics.categories.iter().zip(&analytics.streaks) {
        per_habit.add_row(vec![
            stats.name.clone(),
            stats.completed.to_string(),
            stats.total.to_string(),
            format!("{}%", stats.rate),
            streak.max_streak.to_string(),
        ]);
    }
    if !per_habit.is_empty() {
        per_habit.print();
    }

    let mut trend = Table::new(&[
        ("Month", Align::Left),
        ("Done", Align::Right),
        ("Entries", Align::Right),
        ("Rate", Align::Right),
    ]);
    for month in analytics.trend.iter().filter(|m| m.total > 0) {
        trend.add_row(vec![
            month_abbrev(month.month).unwrap_or("?").to_string(),
            month.completed.to_string(),
            month.total.to_string(),
            format!("{}%", month.rate),
        ]);
    }
    if !trend.is_empty() {
        trend.print();
    }
    Ok(())
}
