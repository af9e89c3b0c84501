use crate::book::CURRENT_SCHEMA_VERSION;
use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            "Show or change settings",
            "config [show] | config set <locale|currency|fraction_digits|default_year|data_file> <value>",
            cmd_config,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None | Some("show") => {
            let config = &context.config;
            output::section("Configuration");
            output::info(format!("  locale          : {}", config.locale));
            output::info(format!("  currency        : {}", config.currency));
            output::info(format!("  fraction_digits : {}", config.fraction_digits));
            output::info(format!(
                "  default_year    : {}",
                config
                    .default_year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "current".into())
            ));
            output::info(format!(
                "  data_file       : {}",
                config
                    .data_file
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "none".into())
            ));
            output::info(format!("  file            : {}", context.config_manager.path().display()));
        }
        Some("set") => {
            let key = args.get(1).copied().ok_or_else(|| {
                CommandError::InvalidArguments("usage: config set <key> <value>".into())
            })?;
            let value = args.get(2..).unwrap_or_default().join(" ");
            let mut config = context.config.clone();
            config.set(key, &value)?;
            context.config_manager.save(&config)?;
            context.apply_config(config);
            output::success(format!("Setting `{key}` updated."));
        }
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config action `{other}`"
            )))
        }
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let info = build_info::current();
    output::section(format!("finhabit {}", info.summary()));
    output::info(format!("  Book schema : v{CURRENT_SCHEMA_VERSION}"));
    output::info(format!("  Built at    : {}", info.built_at));
    output::info(format!("  Rustc       : {}", info.rustc));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
