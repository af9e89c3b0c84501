pub mod json_backend;

use std::path::Path;

use crate::{book::RecordBook, errors::Result};

/// Persistence backend for named record books and their snapshots.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &RecordBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<RecordBook>;
    fn list_books(&self) -> Result<Vec<String>>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, book: &RecordBook, name: &str, note: Option<&str>) -> Result<String>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<RecordBook>;

    fn save_to_path(&self, book: &RecordBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<RecordBook> {
        json_backend::load_book_from_path(path)
    }
}

pub use json_backend::{book_warnings, load_book_from_path, save_book_to_path, JsonStorage};
