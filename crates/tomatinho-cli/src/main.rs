use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod shell;

#[derive(Parser)]
#[command(name = "tomatinho", version, about = "Tomatinho Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer in this terminal
    Run,
    /// Summary of recorded intervals
    Stats,
    /// Recorded intervals, newest first
    Log {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Application information
    About,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run(),
        Commands::Stats => commands::stats::summary(),
        Commands::Log { limit } => commands::stats::log(limit),
        Commands::Config { action } => commands::config::run(action),
        Commands::About => {
            commands::about::print();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
