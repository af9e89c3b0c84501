use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    book::{RecordBook, CURRENT_SCHEMA_VERSION},
    core::utils::{ensure_dir, PathResolver},
    errors::FinhabitError,
};

use super::StorageBackend;
use crate::errors::Result;

const BOOK_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const STATE_FILE: &str = "state.json";
const DEFAULT_RETENTION: usize = 5;

/// Books as pretty JSON under `<base>/books`, snapshots under
/// `<base>/backups/<slug>`.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = PathResolver::resolve_base(root);
        let books_dir = PathResolver::book_dir_in(&root);
        let backups_dir = PathResolver::backup_dir_in(&root);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            books_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn last_book(&self) -> Result<Option<String>> {
        Ok(self.read_state()?.last_book)
    }

    pub fn record_last_book(&self, name: Option<&str>) -> Result<()> {
        let state = StoreState {
            last_book: name.map(canonical_name),
        };
        write_atomic(&self.root.join(STATE_FILE), &serde_json::to_string_pretty(&state)?)
    }

    fn read_state(&self) -> Result<StoreState> {
        let path = self.root.join(STATE_FILE);
        if !path.exists() {
            return Ok(StoreState::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn snapshot_existing(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let (file_name, target) = self.fresh_backup_path(name, None)?;
        fs::copy(path, target)?;
        debug!(book = name, backup = %file_name, "previous book state kept");
        self.prune_backups(name)
    }

    /// Next unused snapshot path; snapshots taken within the same second get
    /// a numeric suffix.
    fn fresh_backup_path(&self, name: &str, note: Option<&str>) -> Result<(String, PathBuf)> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let stem = backup_stem(name, note);
        let mut file_name = format!("{stem}.{BOOK_EXTENSION}");
        let mut counter = 2;
        while dir.join(&file_name).exists() {
            file_name = format!("{stem}_{counter}.{BOOK_EXTENSION}");
            counter += 1;
        }
        let path = dir.join(&file_name);
        Ok((file_name, path))
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for stale in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.backup_path(name, stale)) {
                warn!(backup = %stale, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &RecordBook, name: &str) -> Result<()> {
        let path = self.book_path(name);
        self.snapshot_existing(name, &path)?;
        save_book_to_path(book, &path)?;
        info!(book = name, path = %path.display(), "book saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<RecordBook> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(FinhabitError::StorageError(format!(
                "book `{name}` not found"
            )));
        }
        load_book_from_path(&path)
    }

    fn list_books(&self) -> Result<Vec<String>> {
        let mut names = json_stems(&self.books_dir)?;
        names.sort();
        Ok(names)
    }

    /// Newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|f| f.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn backup(&self, book: &RecordBook, name: &str, note: Option<&str>) -> Result<String> {
        let (file_name, path) = self.fresh_backup_path(name, note)?;
        write_atomic(&path, &serde_json::to_string_pretty(book)?)?;
        info!(book = name, backup = %file_name, "backup written");
        self.prune_backups(name)?;
        Ok(file_name)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<RecordBook> {
        if !is_plain_file_name(backup_name) {
            return Err(FinhabitError::StorageError(format!(
                "invalid backup name `{backup_name}`"
            )));
        }
        let source = self.backup_path(name, backup_name);
        if !source.exists() {
            return Err(FinhabitError::StorageError(format!(
                "backup `{backup_name}` not found"
            )));
        }
        let book = load_book_from_path(&source)?;
        save_book_to_path(&book, &self.book_path(name))?;
        info!(book = name, backup = backup_name, "book restored");
        Ok(book)
    }
}

pub fn save_book_to_path(book: &RecordBook, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_book_from_path(path: &Path) -> Result<RecordBook> {
    let data = fs::read_to_string(path)?;
    let book: RecordBook = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(FinhabitError::StorageError(format!(
            "`{}` was written by a newer schema version ({})",
            path.display(),
            book.schema_version
        )));
    }
    book.check_amounts()
        .map_err(|err| FinhabitError::StorageError(format!("`{}`: {err}", path.display())))?;
    let warnings = book_warnings(&book);
    if !warnings.is_empty() {
        warn!(path = %path.display(), count = warnings.len(), "book has dangling references");
    }
    Ok(book)
}

/// Dangling references that aggregation tolerates but a user should know about.
pub fn book_warnings(book: &RecordBook) -> Vec<String> {
    let expense_categories: HashSet<_> = book.expense_categories.iter().map(|c| c.id).collect();
    let sub_categories: HashSet<_> = book.sub_categories.iter().map(|s| s.id).collect();
    let income_categories: HashSet<_> = book.income_categories.iter().map(|c| c.id).collect();
    let habits: HashSet<_> = book.habit_categories.iter().map(|h| h.id).collect();
    let mut warnings = Vec::new();

    for sub in &book.sub_categories {
        if !expense_categories.contains(&sub.category_id) {
            warnings.push(format!(
                "sub-category {} belongs to missing category {}",
                sub.id, sub.category_id
            ));
        }
    }
    for expense in &book.expenses {
        if !expense_categories.contains(&expense.category_id) {
            warnings.push(format!(
                "expense {} references missing category {}",
                expense.id, expense.category_id
            ));
        }
        if let Some(sub) = expense.sub_category_id {
            if !sub_categories.contains(&sub) {
                warnings.push(format!(
                    "expense {} references missing sub-category {}",
                    expense.id, sub
                ));
            }
        }
    }
    for income in &book.income {
        if !income_categories.contains(&income.income_category_id) {
            warnings.push(format!(
                "income {} references missing income category {}",
                income.id, income.income_category_id
            ));
        }
    }
    for entry in &book.habit_entries {
        if !habits.contains(&entry.category_id) {
            warnings.push(format!(
                "habit entry {} references missing habit {}",
                entry.id, entry.category_id
            ));
        }
    }
    warnings
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_book: Option<String>,
}

pub(crate) fn canonical_name(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if slug.trim_matches('_').is_empty() {
        "book".into()
    } else {
        slug
    }
}

fn backup_stem(name: &str, note: Option<&str>) -> String {
    let mut stem = format!(
        "{}_{}",
        canonical_name(name),
        Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
    );
    if let Some(label) = note_label(note) {
        stem.push('_');
        stem.push_str(&label);
    }
    stem
}

/// A bare file name: no separators, no parent or current-dir components.
fn is_plain_file_name(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(['/', '\\'])
        && Path::new(value).file_name().and_then(|name| name.to_str()) == Some(value)
}

/// Lowercase, dash-separated form of a free-text backup note.
fn note_label(note: Option<&str>) -> Option<String> {
    let mut label = String::new();
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            label.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !label.is_empty()
            && !label.ends_with('-')
        {
            label.push('-');
        }
    }
    let label = label.trim_matches('-');
    (!label.is_empty()).then(|| label.to_string())
}

/// Reads the `YYYYmmdd_HHMMSS` stamp (or the older `YYYYmmdd_HHMM`) out of
/// a backup file name, skipping any note or counter suffix.
fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{BOOK_EXTENSION}"))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        let format = match time.len() {
            6 => "%Y%m%d%H%M%S",
            4 => "%Y%m%d%H%M",
            _ => return None,
        };
        if !is_digits(date, 8) || !is_digits(time, time.len()) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{date}{time}"), format)
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn json_stems(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    Ok(stems)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
