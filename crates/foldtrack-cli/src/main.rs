use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "foldtrack-cli", version, about = "FoldTrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold counters
    Counter {
        #[command(subcommand)]
        action: commands::counter::CounterAction,
    },
    /// Derived statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Daily limit configuration
    Limit {
        #[command(subcommand)]
        action: commands::limit::LimitAction,
    },
    /// Simulated hinge sessions
    Simulate {
        #[command(subcommand)]
        action: commands::simulate::SimulateAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Counter { action } => commands::counter::run(action).await,
        Commands::Stats { action } => commands::stats::run(action).await,
        Commands::Limit { action } => commands::limit::run(action).await,
        Commands::Simulate { action } => commands::simulate::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
