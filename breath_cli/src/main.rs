mod platform;
mod render;
mod session;

use breath_core::config::{catalog_path, history_path};
use breath_core::*;
use clap::{Args, Parser, Subcommand};
use platform::{Cues, Inhibitor};
use session::Outcome;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "breathe")]
#[command(about = "Guided breathing practice timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session through the enabled exercises (default)
    Start(StartArgs),

    /// Show the exercise catalog
    List,

    /// Enable exercises by id or name
    Enable {
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Enable every exercise
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },

    /// Disable exercises by id or name
    Disable {
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Disable every exercise
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },

    /// Change how long an exercise runs
    SetDuration {
        name: String,

        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },

    /// Restore the built-in exercise list
    ResetCatalog,

    /// Show recent sessions and the last 7 days
    History {
        /// Number of recent sessions to list
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Permanently delete all history
    ClearHistory {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export history as CSV
    Export {
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct StartArgs {
    /// Rest between exercises in seconds (0 disables)
    #[arg(long, allow_negative_numbers = true)]
    cooldown: Option<i64>,

    /// Don't ring the terminal bell
    #[arg(long)]
    no_sound: bool,

    /// Don't inhibit idle/sleep during the session
    #[arg(long)]
    no_wake_lock: bool,

    /// Length of one timer second in milliseconds
    #[arg(long, default_value_t = 1000, hide = true)]
    tick_ms: u64,
}

impl Default for StartArgs {
    fn default() -> Self {
        Self {
            cooldown: None,
            no_sound: false,
            no_wake_lock: false,
            tick_ms: 1000,
        }
    }
}

fn main() {
    breath_core::logging::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Start(args)) => cmd_start(&data_dir, &config, args),
        Some(Commands::List) => cmd_list(&data_dir),
        Some(Commands::Enable { names, all }) => cmd_toggle(&data_dir, &names, all, true),
        Some(Commands::Disable { names, all }) => cmd_toggle(&data_dir, &names, all, false),
        Some(Commands::SetDuration { name, seconds }) => {
            cmd_set_duration(&data_dir, &name, seconds)
        }
        Some(Commands::ResetCatalog) => cmd_reset_catalog(&data_dir),
        Some(Commands::History { limit }) => cmd_history(&data_dir, limit),
        Some(Commands::ClearHistory { yes }) => cmd_clear_history(&data_dir, yes),
        Some(Commands::Export { output }) => cmd_export(&data_dir, &output),
        None => cmd_start(&data_dir, &config, StartArgs::default()),
    }
}

fn cmd_start(data_dir: &Path, config: &Config, args: StartArgs) -> Result<()> {
    let catalog = Catalog::load(&catalog_path(data_dir))?;
    let queue = catalog.session_queue()?;

    let history_file = history_path(data_dir);
    let cooldown = args.cooldown.unwrap_or(config.session.cooldown_seconds);

    let mut driver = SessionDriver::new(
        Sequencer::new(config.session.completion_grace()),
        HistoryStore::load(&history_file),
        Cues::new(config.cues.enabled && !args.no_sound),
        Inhibitor::new(config.wake_lock.enabled && !args.no_wake_lock),
        JsonlSink::new(&history_file),
    );

    println!(
        "\nStarting {} exercises: {} of practice, {}s rest between",
        queue.len(),
        format_time(queue.total_seconds()),
        cooldown.max(0)
    );
    println!("Type 'q' + Enter to stop.\n");

    let tick = Duration::from_millis(args.tick_ms.max(1));
    match session::run(&mut driver, &catalog, cooldown, tick)? {
        Outcome::Completed => {
            println!("\n✓ Session complete! Namaste.");
            if driver.log_saved() {
                println!(
                    "  Logged {} ({})",
                    format_time(queue.total_seconds()),
                    queue.item_names().join(", ")
                );
            } else {
                println!("  Could not save this session to {}", history_file.display());
            }
        }
        Outcome::Stopped => {
            println!("\nSession stopped. Nothing logged.");
        }
    }

    Ok(())
}

fn cmd_list(data_dir: &Path) -> Result<()> {
    let catalog = Catalog::load(&catalog_path(data_dir))?;
    render::print_catalog(&catalog);
    Ok(())
}

fn cmd_toggle(data_dir: &Path, names: &[String], all: bool, active: bool) -> Result<()> {
    let catalog = Catalog::update(&catalog_path(data_dir), |catalog| {
        if all {
            catalog.set_all_active(active);
        } else {
            for name in names {
                catalog.set_active(name, active)?;
            }
        }
        Ok(())
    })?;

    println!("✓ Catalog updated");
    render::print_selection(&catalog);
    Ok(())
}

fn cmd_set_duration(data_dir: &Path, name: &str, seconds: i64) -> Result<()> {
    let catalog = Catalog::update(&catalog_path(data_dir), |catalog| {
        catalog.set_duration(name, seconds)
    })?;

    if let Some(item) = catalog.find(name) {
        println!("✓ {} set to {}", item.name, format_time(item.duration_seconds));
    }
    render::print_selection(&catalog);
    Ok(())
}

fn cmd_reset_catalog(data_dir: &Path) -> Result<()> {
    Catalog::update(&catalog_path(data_dir), |catalog| {
        *catalog = build_default_catalog();
        Ok(())
    })?;
    println!("✓ Catalog reset to defaults");
    Ok(())
}

fn cmd_history(data_dir: &Path, limit: usize) -> Result<()> {
    let history = HistoryStore::load(&history_path(data_dir));
    let series = weekly_minutes(&history, &chrono::Local::now());
    render::print_history(history.recent(limit), &series);
    Ok(())
}

fn cmd_clear_history(data_dir: &Path, yes: bool) -> Result<()> {
    if !yes && !confirm("Permanently delete all history?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let path = history_path(data_dir);
    let mut history = HistoryStore::load(&path);
    let count = history.len();
    history.clear(&mut JsonlSink::new(&path))?;

    println!("✓ Deleted {} sessions", count);
    Ok(())
}

fn cmd_export(data_dir: &Path, output: &Path) -> Result<()> {
    let history = HistoryStore::load(&history_path(data_dir));
    let count = export_csv(&history, output)?;

    println!("✓ Exported {} sessions", count);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
