pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use furnish_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use crate::commands::{CommandResult, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "furnish",
    about = "Furnish storefront CLI",
    long_about = "Browse the furniture catalog, keep favorites and a cart in an interactive session, and check catalog readiness.",
    after_help = "Examples:\n  furnish list\n  furnish show 64f1c2\n  furnish search \"oak chair\"\n  furnish session\n  furnish doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(
        long,
        global = true,
        help = "Config file path (default: furnish.toml or config/furnish.toml)"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Catalog API base url, e.g. http://localhost:8080/api")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Catalog request timeout in seconds")]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Search quiet period in milliseconds")]
    debounce_ms: Option<u64>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List every product in the catalog")]
    List {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show one product by identifier")]
    Show {
        id: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List products currently on sale")]
    Deals {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Search products by name (case-insensitive substring)")]
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Start an interactive session with favorites and a cart")]
    Session,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and catalog reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                catalog_base_url: self.base_url.clone(),
                catalog_timeout_secs: self.timeout_secs,
                search_debounce_ms: self.debounce_ms,
                log_level: self.log_level.clone(),
            },
        }
    }
}

fn format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    // Config errors are reported by the command itself; log with defaults.
    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    logging::init(&logging);

    let result = dispatch(cli.command, &options);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn dispatch(command: Command, options: &LoadOptions) -> CommandResult {
    match command {
        Command::List { json } => commands::catalog::list(options, format(json)),
        Command::Show { id, json } => commands::catalog::show(options, &id, format(json)),
        Command::Deals { json } => commands::catalog::deals(options, format(json)),
        Command::Search { query, json } => {
            commands::catalog::search(options, &query.join(" "), format(json))
        }
        Command::Session => commands::session::run(options),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, json),
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_become_overrides() {
        let cli = Cli::parse_from([
            "furnish",
            "search",
            "oak",
            "chair",
            "--base-url",
            "http://shop.test/api",
            "--debounce-ms",
            "0",
        ]);
        let options = cli.global.load_options();

        assert_eq!(options.overrides.catalog_base_url.as_deref(), Some("http://shop.test/api"));
        assert_eq!(options.overrides.search_debounce_ms, Some(0));
        assert!(!options.require_file);
        assert!(matches!(
            cli.command,
            Command::Search { ref query, json: false } if query.join(" ") == "oak chair"
        ));
    }
}
