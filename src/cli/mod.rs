//! Line-oriented shell over a [`RecordBook`](crate::book::RecordBook):
//! interactive with history and completion, or scripted from stdin when
//! `FINHABIT_CLI_SCRIPT` is set.

pub mod commands;
pub mod context;
pub mod errors;
mod help;
pub mod output;
pub mod registry;
mod shell;

pub use context::{BookTarget, CliMode, LoopControl, ShellContext};
pub use errors::{CliError, CommandError, CommandResult};
pub use shell::{run_cli, run_script, SCRIPT_ENV};
