use std::path::PathBuf;

use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use strsim::levenshtein;
use tracing::debug;

use crate::{
    book::RecordBook,
    config::{Config, ConfigManager},
    core::utils::PathResolver,
    currency::{format_currency, LocaleConfig},
    storage::JsonStorage,
};

use super::commands;
use super::errors::{CliError, CommandError};
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Where the open book came from, so `save` with no argument writes it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookTarget {
    Named(String),
    File(PathBuf),
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub locale: LocaleConfig,
    pub book: Option<RecordBook>,
    pub target: Option<BookTarget>,
    pub year: i32,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(Some(base), None)?;
        let year = config.default_year.unwrap_or_else(|| Local::now().year());
        let mut registry = CommandRegistry::new();
        for entry in commands::all_entries() {
            registry.register(entry);
        }
        Ok(Self {
            mode,
            registry,
            storage,
            config_manager,
            locale: config.to_locale(),
            config,
            book: None,
            target: None,
            year,
            last_command: None,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        match &self.book {
            Some(book) => format!("finhabit [{} · {}]> ", book.name, self.year),
            None => format!("finhabit [{}]> ", self.year),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn book(&self) -> Result<&RecordBook, CommandError> {
        self.book.as_ref().ok_or(CommandError::BookNotLoaded)
    }

    pub fn book_mut(&mut self) -> Result<&mut RecordBook, CommandError> {
        self.book.as_mut().ok_or(CommandError::BookNotLoaded)
    }

    pub fn money(&self, amount: Decimal) -> String {
        format_currency(&self.locale, amount)
    }

    pub fn apply_config(&mut self, config: Config) {
        self.locale = config.to_locale();
        self.config = config;
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        debug!(command, args = args.len(), "dispatching");
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::BookNotLoaded => {
                output::error(CommandError::BookNotLoaded);
                output::hint("Try `new Household` to get started.");
            }
            other => output::error(other),
        }
    }
}
