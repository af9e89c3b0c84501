use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::book::RecordBook;
use crate::cli::context::{BookTarget, ShellContext};
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::storage::{book_warnings, load_book_from_path, save_book_to_path, StorageBackend};

use super::arg;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("new", "Start an empty record book", "new <name>", cmd_new),
        CommandEntry::new(
            "load",
            "Open a saved book by name or JSON path",
            "load [name|path]",
            cmd_load,
        ),
        CommandEntry::new(
            "save",
            "Save the open book by name or to a JSON path",
            "save [name|path]",
            cmd_save,
        ),
        CommandEntry::new("books", "List saved books", "books", cmd_books),
        CommandEntry::new(
            "backup",
            "Snapshot the open book",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            "List snapshots of the open book",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Replace the open book with a snapshot",
            "restore <backup-file>",
            cmd_restore,
        ),
        CommandEntry::new(
            "year",
            "Show or change the working year",
            "year [yyyy]",
            cmd_year,
        ),
        CommandEntry::new(
            "warnings",
            "List dangling references in the open book",
            "warnings",
            cmd_warnings,
        ),
    ]
}

fn looks_like_path(value: &str) -> bool {
    value.contains('/') || value.contains('\\') || value.ends_with(".json")
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = arg(args, 0, "new <name>")?.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArguments("book name is required".into()));
    }
    context.book = Some(RecordBook::new(name, Uuid::new_v4()));
    context.target = Some(BookTarget::Named(name.to_string()));
    info!(book = name, "record book created");
    output::success(format!("New record book `{name}` created."));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = match args.first() {
        Some(value) if looks_like_path(value) => BookTarget::File(PathBuf::from(value)),
        Some(value) => BookTarget::Named(value.to_string()),
        None => match (&context.config.data_file, context.storage.last_book()?) {
            (Some(path), _) => BookTarget::File(path.clone()),
            (None, Some(name)) => BookTarget::Named(name),
            (None, None) => {
                return Err(CommandError::InvalidArguments(
                    "usage: load [name|path] (no previous book recorded)".into(),
                ))
            }
        },
    };
    let book = match &target {
        BookTarget::File(path) => load_book_from_path(path)?,
        BookTarget::Named(name) => {
            let book = context.storage.load(name)?;
            context.storage.record_last_book(Some(name))?;
            book
        }
    };
    output::success(format!(
        "Loaded `{}` ({} expenses, {} habits).",
        book.name,
        book.expenses.len(),
        book.habit_categories.len()
    ));
    for warning in book_warnings(&book) {
        output::warning(warning);
    }
    context.book = Some(book);
    context.target = Some(target);
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = match args.first() {
        Some(value) if looks_like_path(value) => BookTarget::File(PathBuf::from(value)),
        Some(value) => BookTarget::Named(value.to_string()),
        None => context.target.clone().ok_or_else(|| {
            CommandError::InvalidArguments("usage: save [name|path]".into())
        })?,
    };
    let book = context.book()?;
    match &target {
        BookTarget::File(path) => {
            save_book_to_path(book, path)?;
            output::success(format!("Saved to {}.", path.display()));
        }
        BookTarget::Named(name) => {
            context.storage.save(book, name)?;
            context.storage.record_last_book(Some(name))?;
            output::success(format!("Saved book `{name}`."));
        }
    }
    context.target = Some(target);
    Ok(())
}

fn cmd_books(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let books = context.storage.list_books()?;
    if books.is_empty() {
        output::info("No saved books.");
    }
    for name in books {
        output::info(format!("  {name}"));
    }
    Ok(())
}

fn named_target(context: &ShellContext) -> Result<String, CommandError> {
    match &context.target {
        Some(BookTarget::Named(name)) => Ok(name.clone()),
        Some(BookTarget::File(path)) => Ok(file_stem(path)),
        None => Err(CommandError::BookNotLoaded),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("book")
        .to_string()
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = named_target(context)?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let file = context
        .storage
        .backup(context.book()?, &name, note.as_deref())?;
    output::success(format!("Backup written: {file}"));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let name = named_target(context)?;
    let backups = context.storage.list_backups(&name)?;
    if backups.is_empty() {
        output::info(format!("No backups for `{name}`."));
    }
    for file in backups {
        output::info(format!("  {file}"));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let backup = arg(args, 0, "restore <backup-file>")?;
    let name = named_target(context)?;
    let book = context.storage.restore(&name, backup)?;
    context.book = Some(book);
    context.target = Some(BookTarget::Named(name.clone()));
    output::success(format!("Restored `{name}` from {backup}."));
    Ok(())
}

fn cmd_year(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(value) = args.first() {
        context.year = value
            .parse::<i32>()
            .ok()
            .filter(|year| (1900..=9999).contains(year))
            .ok_or_else(|| CommandError::InvalidArguments(format!("invalid year `{value}`")))?;
    }
    output::info(format!("Working year: {}", context.year));
    Ok(())
}

fn cmd_warnings(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let warnings = book_warnings(context.book()?);
    if warnings.is_empty() {
        output::success("No dangling references.");
    }
    for warning in warnings {
        output::warning(warning);
    }
    Ok(())
}
