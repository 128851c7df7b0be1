//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use evx_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "evx")]
#[command(version)]
#[command(about = "Explore error events, their threads and stack traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level or filter directives (overrides config, not EVX_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Inspect the threads of a saved event
    Threads {
        #[command(subcommand)]
        command: ThreadCommands,
    },
    /// Fetch events from the API
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Repositories linked to an organization
    Repos {
        #[command(subcommand)]
        command: ReposCommands,
    },
    /// Releases of an organization or project
    Releases {
        #[command(subcommand)]
        command: ReleasesCommands,
    },
    /// Format billing quantities and numbers
    Format {
        #[command(subcommand)]
        command: FormatCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ThreadCommands {
    /// Prints the threads of an event and the stack trace of one of them
    Show {
        /// Event JSON file (`-` for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Thread to show (defaults to the crashed or current thread)
        #[arg(long, value_name = "ID")]
        thread: Option<String>,

        #[command(flatten)]
        view: commands::threads::ViewArgs,

        /// Print the thread list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Opens the interactive thread viewer
    View {
        /// Event JSON file (`-` for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(clap::Subcommand)]
enum EventCommands {
    /// Downloads one event as JSON
    Fetch {
        #[arg(value_name = "ORG")]
        org: String,
        #[arg(value_name = "PROJECT")]
        project: String,
        #[arg(value_name = "EVENT_ID")]
        event_id: String,

        /// Write to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum ReposCommands {
    /// Lists repositories
    List {
        /// Organization slug (defaults to `api.organization`)
        #[arg(value_name = "ORG")]
        org: Option<String>,

        /// Follow pagination and list every repository
        #[arg(long)]
        all: bool,
    },
}

#[derive(clap::Subcommand)]
enum ReleasesCommands {
    /// Lists releases
    List {
        /// Organization slug (defaults to `api.organization`)
        #[arg(value_name = "ORG")]
        org: Option<String>,

        /// Only releases of this project
        #[arg(long, value_name = "PROJECT")]
        project: Option<String>,

        /// Follow pagination and list every release
        #[arg(long)]
        all: bool,
    },
}

#[derive(clap::Subcommand)]
enum FormatCommands {
    /// Formats a consumed quantity
    Usage {
        #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
        quantity: f64,
        #[command(flatten)]
        unit: commands::format::UnitArgs,
    },
    /// Formats a reserved quantity
    Reserved {
        #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
        quantity: f64,
        #[command(flatten)]
        unit: commands::format::UnitArgs,

        /// Reservation was gifted
        #[arg(long)]
        gifted: bool,
    },
    /// Formats a plain number
    Number {
        #[arg(value_name = "NUMBER", allow_negative_numbers = true)]
        number: f64,

        /// Fraction digits (short style) or maximum fraction digits
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=20))]
        digits: u8,

        #[arg(long, value_enum, default_value_t = commands::format::NumberStyle::Short)]
        style: commands::format::NumberStyle,
    },
    /// Classifies a value into labelled ranges
    Bucket {
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        value: f64,

        /// Upper bound and label, e.g. `100=small` (repeat, ascending)
        #[arg(
            long = "threshold",
            value_name = "N=LABEL",
            value_parser = commands::format::parse_threshold,
            required = true
        )]
        thresholds: Vec<(f64, String)>,

        /// Label for exactly zero
        #[arg(long = "none", default_value = "none")]
        none_label: String,

        /// Label for values above the last threshold
        #[arg(long = "overflow", default_value = "overflow")]
        overflow_label: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(cli.log_level.as_deref(), &config.log)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli.command, &config).await })
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    match command {
        Commands::Threads { command } => match command {
            ThreadCommands::Show {
                file,
                thread,
                view,
                json,
            } => commands::threads::show(&file, thread.as_deref(), view, json),
            ThreadCommands::View { file } => commands::threads::view(&file),
        },

        Commands::Event { command } => match command {
            EventCommands::Fetch {
                org,
                project,
                event_id,
                out,
            } => commands::event::fetch(config, &org, &project, &event_id, out.as_deref()).await,
        },

        Commands::Repos { command } => match command {
            ReposCommands::List { org, all } => {
                commands::repos::list(config, org.as_deref(), all).await
            }
        },

        Commands::Releases { command } => match command {
            ReleasesCommands::List { org, project, all } => {
                commands::releases::list(config, org.as_deref(), project.as_deref(), all).await
            }
        },

        Commands::Format { command } => match command {
            FormatCommands::Usage { quantity, unit } => commands::format::usage(quantity, &unit),
            FormatCommands::Reserved {
                quantity,
                unit,
                gifted,
            } => commands::format::reserved(quantity, &unit, gifted),
            FormatCommands::Number {
                number,
                digits,
                style,
            } => {
                commands::format::number(number, usize::from(digits), style);
                Ok(())
            }
            FormatCommands::Bucket {
                value,
                thresholds,
                none_label,
                overflow_label,
            } => commands::format::bucket(value, thresholds, &none_label, &overflow_label),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
