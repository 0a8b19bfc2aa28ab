//! ftrack CLI: frequently and recently used folders
//!
//! Commands: open, visit, list, pin, unpin, rm, clear, prune, import,
//! shell, completions

mod action;
mod format;
mod shell;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ftrack_core::SortKey;
use ftrack_shell::{AppPaths, SystemLauncher, Tracker};

use crate::action::{execute, Action, Reply};
use crate::format::{format_records, OutputFormat};

#[derive(Parser)]
#[command(name = "ftrack")]
#[command(version)]
#[command(about = "Keep track of the folders you open most, pinned ones first")]
struct Cli {
    /// Directory holding history.db and config.json
    #[arg(long, global = true, env = "FTRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Program used to show folders (default: explorer / open / xdg-open)
    #[arg(long, global = true, env = "FTRACK_BROWSER")]
    browser: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open a folder (or a file's folder) and record the visit
    #[command(alias = "o")]
    Open {
        /// Defaults to the folder opened last
        path: Option<String>,
    },
    /// Record a visit without opening anything
    Visit { path: String },
    /// Show the history, pinned folders first
    #[command(alias = "ls")]
    List {
        /// frequency, recency, or path
        #[arg(short, long, default_value = "frequency")]
        sort: SortKey,
        /// Ascending instead of descending
        #[arg(long)]
        asc: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Keep a folder at the top of the list
    Pin { path: String },
    /// Release a pinned folder
    Unpin { path: String },
    /// Delete one record
    #[command(alias = "remove")]
    Rm { path: String },
    /// Delete every record
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete records of folders that no longer exist
    Prune,
    /// Merge a history database from an older release
    Import { source: PathBuf },
    /// Interactive session
    Shell,
    /// Print shell completions
    Completions { shell: clap_complete::Shell },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "ftrack", &mut io::stdout());
        return Ok(());
    }

    let paths = AppPaths::resolve(cli.data_dir.as_deref())?;
    let mut tracker = Tracker::open_default(&paths, SystemLauncher::new(cli.browser))
        .with_context(|| format!("cannot open history in {}", paths.data_dir().display()))?;

    let result = dispatch(&mut tracker, cli.command);
    let closed = tracker.shutdown().context("failed to save history");
    result.and(closed)
}

fn dispatch(tracker: &mut Tracker, command: Option<Commands>) -> anyhow::Result<()> {
    let (action, format) = match command {
        None => (
            Action::List {
                sort: SortKey::Frequency,
                descending: true,
            },
            OutputFormat::Table,
        ),
        Some(Commands::List { sort, asc, format }) => (
            Action::List {
                sort,
                descending: !asc,
            },
            format,
        ),
        Some(Commands::Open { path }) => (
            path.map_or(Action::OpenLast, Action::Open),
            OutputFormat::Table,
        ),
        Some(Commands::Visit { path }) => (Action::Visit(path), OutputFormat::Table),
        Some(Commands::Pin { path }) => (Action::Pin(path), OutputFormat::Table),
        Some(Commands::Unpin { path }) => (Action::Unpin(path), OutputFormat::Table),
        Some(Commands::Rm { path }) => (Action::Remove(path), OutputFormat::Table),
        Some(Commands::Clear { yes }) => {
            if !yes && !confirm("delete ALL records? [y/N] ")? {
                bail!("history not cleared (pass --yes to skip the question)");
            }
            (Action::Clear, OutputFormat::Table)
        }
        Some(Commands::Prune) => (Action::Prune, OutputFormat::Table),
        Some(Commands::Import { source }) => (Action::Import(source), OutputFormat::Table),
        Some(Commands::Shell) => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            return shell::run(tracker, stdin.lock(), &mut stdout).context("shell i/o failed");
        }
        Some(Commands::Completions { .. }) => return Ok(()),
    };

    let reply = execute(tracker, action)?;
    if let Reply::Listing(records) = &reply {
        println!("{}", format_records(records, format));
        return Ok(());
    }
    let message = reply.message().unwrap_or_default();
    if matches!(reply, Reply::Stale(_)) {
        // Reported as a failure so scripts notice the folder is gone.
        bail!("{message}");
    }
    println!("{message}");
    Ok(())
}

/// Ask on stderr; only an interactive "y" counts as yes.
fn confirm(question: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    eprint!("{question}");
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
