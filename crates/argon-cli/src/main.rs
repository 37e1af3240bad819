use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "argon-cli", version, about = "Argon CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed default records (extension installed or updated)
    Install,
    /// Send a runtime message, e.g. '{"action":"getBlockedSites"}'
    Message {
        /// Message JSON
        json: String,
    },
    /// A top-level navigation is about to start
    Navigate {
        url: String,
        #[arg(long, default_value = "1")]
        tab: i64,
    },
    /// A tab became active
    Activate {
        url: String,
        #[arg(long, default_value = "1")]
        tab: i64,
    },
    /// A tab finished loading a new URL
    Updated {
        url: String,
        #[arg(long, default_value = "1")]
        tab: i64,
    },
    /// Credit one second of attention to the active tab
    Tick {
        url: String,
        /// The window is minimized or unfocused
        #[arg(long, conflicts_with = "unknown")]
        hidden: bool,
        /// The visibility probe failed
        #[arg(long)]
        unknown: bool,
    },
    /// Keep a tab active and run the periodic alarms for a while
    Watch {
        url: String,
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
    /// Pomodoro timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Health reminders
    Reminders {
        #[command(subcommand)]
        action: commands::reminders::ReminderAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ARGON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Install => commands::browser::install(),
        Commands::Message { json } => commands::browser::message(&json),
        Commands::Navigate { url, tab } => commands::browser::navigate(tab, &url),
        Commands::Activate { url, tab } => commands::browser::activate(tab, &url),
        Commands::Updated { url, tab } => commands::browser::updated(tab, &url),
        Commands::Tick {
            url,
            hidden,
            unknown,
        } => commands::browser::tick(&url, hidden, unknown),
        Commands::Watch { url, seconds } => commands::browser::watch(&url, seconds),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Reminders { action } => commands::reminders::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
