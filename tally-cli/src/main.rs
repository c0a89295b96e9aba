use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{JOURNAL, TRACKER};
use tally_ledger::Source;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod auth;
mod chart;
mod config;
mod form;
mod journal_cmd;
mod llm;
mod report;
mod state;
mod tracker_cmd;

use config::Config;
use journal_cmd::JournalCommand;
use tracker_cmd::AddArgs;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Personal expense tracker with automatic categorization"
)]
struct Cli {
    /// Ledger CSV to use instead of the configured one
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Log level for tally's own crates; RUST_LOG overrides it
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an expense; runs a prompt form when no flags are given
    Add {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, requires = "amount")]
        description: Option<String>,

        #[arg(long, requires = "description")]
        amount: Option<f64>,

        /// Skip prediction and use this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Print every recorded expense
    List,

    /// Total spend per category, largest first
    Summary,

    /// Write bar and pie charts of spend by category
    Chart {
        /// Output directory (default: config ledger.chart_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Predict the category for a piece of text without recording it
    Classify {
        text: String,

        /// Use the journal label set instead of the tracker's
        #[arg(long)]
        journal: bool,
    },

    /// Batch journal (Date, Category, Note, Amount, Income/Expense)
    Journal {
        #[command(subcommand)]
        command: JournalCommand,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store credentials in ~/.tally/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an OpenAI API key (stored locally)
    PasteOpenaiApiKey,
}

impl Command {
    /// Setup commands run without reading config.toml, so they still work
    /// when it is broken
    fn needs_config(&self) -> bool {
        !matches!(self, Command::Config { .. } | Command::Auth { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let cfg = if cli.command.needs_config() {
        // ledger paths come from the config, so an unreadable one is fatal
        config::load_config()?
    } else {
        Config::default()
    };
    debug!(?cfg, "loaded config");

    match cli.command {
        Command::Add {
            date,
            description,
            amount,
            category,
        } => {
            let csv = cli.csv.unwrap_or_else(|| cfg.ledger.tracker_csv.clone());
            let args = AddArgs {
                date,
                description,
                amount,
                category,
            };
            tracker_cmd::add(&cfg, &csv, args)?;
        }

        Command::List => {
            tracker_cmd::list(&cli.csv.unwrap_or(cfg.ledger.tracker_csv))?;
        }

        Command::Summary => {
            tracker_cmd::summary(&cli.csv.unwrap_or(cfg.ledger.tracker_csv))?;
        }

        Command::Chart { out } => {
            let csv = cli.csv.unwrap_or_else(|| cfg.ledger.tracker_csv.clone());
            let dir = out.unwrap_or(cfg.ledger.chart_dir);
            tracker_cmd::chart(&csv, &dir)?;
        }

        Command::Classify { text, journal } => {
            let taxonomy = if journal { &JOURNAL } else { &TRACKER };
            let classifier = llm::build_classifier(&cfg.llm, taxonomy)?;
            let c = classifier.classify(&text);
            let via = match c.source {
                Source::Remote => "model",
                Source::Fallback => "keyword rules",
            };
            println!("{} (via {via})", c.label);
        }

        Command::Journal { command } => {
            let csv = cli.csv.unwrap_or_else(|| cfg.ledger.journal_csv.clone());
            journal_cmd::run(&cfg, &csv, command)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
        },
    }

    Ok(())
}

fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // no RUST_LOG; only our own crates at the requested level
        None => EnvFilter::new(format!(
            "{}={level},tally_core={level},tally_ledger={level}",
            env!("CARGO_CRATE_NAME"),
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_flags_must_come_together() {
        assert!(Cli::try_parse_from(["tally", "add", "--description", "Pizza"]).is_err());
        let cli = Cli::try_parse_from(["tally", "add", "--description", "Pizza", "--amount", "12.5"]).unwrap();
        assert!(matches!(cli.command, Command::Add { amount: Some(a), .. } if a == 12.5));
    }

    #[test]
    fn test_global_csv_reaches_journal() {
        let cli = Cli::try_parse_from(["tally", "journal", "view", "--csv", "j.csv"]).unwrap();
        assert_eq!(cli.csv, Some(PathBuf::from("j.csv")));
        assert!(matches!(cli.command, Command::Journal { command: JournalCommand::View { n: 10 } }));
    }

    #[test]
    fn test_log_level_parses() {
        let cli = Cli::try_parse_from(["tally", "--log-level", "debug", "list"]).unwrap();
        assert_eq!(cli.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_setup_commands_skip_config() {
        let init = Cli::try_parse_from(["tally", "config", "init"]).unwrap();
        assert!(!init.command.needs_config());
        let auth = Cli::try_parse_from(["tally", "auth", "paste-openai-api-key"]).unwrap();
        assert!(!auth.command.needs_config());
        let list = Cli::try_parse_from(["tally", "list"]).unwrap();
        assert!(list.command.needs_config());
    }
}
