use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".finhabit";
const BOOK_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Resolves the on-disk layout beneath an application base directory.
pub struct PathResolver;

impl PathResolver {
    /// `$FINHABIT_HOME`, falling back to `~/.finhabit`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os("FINHABIT_HOME") {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn book_dir_in(base: &Path) -> PathBuf {
        base.join(BOOK_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_base() {
        let base = PathBuf::from("/tmp/finhabit-test");
        assert_eq!(PathResolver::book_dir_in(&base), base.join("books"));
        assert_eq!(PathResolver::backup_dir_in(&base), base.join("backups"));
        assert_eq!(PathResolver::config_file_in(&base), base.join("config.json"));
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }
}
