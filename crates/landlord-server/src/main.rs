use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use landlord_server::config::ServerConfig;
use landlord_server::logging::init_logging;
use landlord_server::sim::SimRunner;

/// Plays bot-only Dou Dizhu games through the room engine.
#[derive(Debug, Parser)]
#[command(
    name = "landlord-sim",
    author,
    version,
    about = "Deterministic bot-only landlord simulations"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config/landlord.yaml")]
    config: PathBuf,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deals and bot delays.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the JSONL output path.
    #[arg(long, value_name = "FILE")]
    output: Option<String>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(games) = cli.games {
        config.sim.games = games;
    }

    if let Some(seed) = cli.seed {
        config.sim.seed = Some(seed);
    }

    if let Some(output) = cli.output {
        config.sim.output = output;
    }

    config.validate()?;

    let games = config.sim.games;
    let hint = config
        .hint
        .as_ref()
        .map(|hint| hint.command.as_str())
        .unwrap_or("none");
    println!(
        "Loaded configuration with {games} game{} (base stake {}, hint provider {hint})",
        if games == 1 { "" } else { "s" },
        config.stakes.base
    );

    let logging_guard = init_logging(&config.logging, &config.output_dir())?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = SimRunner::new(config).run()?;
    println!(
        "Simulation complete: {} games, landlord {} / farmers {}, {} springs, {} bombs, {} rockets, {} redeals → {}",
        summary.games,
        summary.landlord_wins,
        summary.farmer_wins,
        summary.springs,
        summary.bombs,
        summary.rockets,
        summary.redeals,
        summary.jsonl_path.display()
    );
    if let Some(telemetry_path) = logging_guard.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
