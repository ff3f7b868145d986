use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dungeon_core::journal_file::load_journal_from_file;
use dungeon_core::seed::resolve_seed;
use dungeon_core::{Dungeon, DungeonConfig, InputJournal, ReplayResult, replay_to_end};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one dungeon and print its layout
    Generate {
        /// 0 uses the config seed, or a runtime seed when that is 0 too
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// TOML config file; defaults apply to missing keys
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Ascii)]
        format: Format,
    },
    /// Replay a session journal (.jsonl hash-chained, or plain .json)
    Replay {
        #[arg(short, long)]
        journal: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Ascii,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Generate { seed, config, format } => generate(seed, config.as_deref(), format),
        Command::Replay { journal } => replay(&journal),
    }
}

fn generate(seed: u64, config_path: Option<&Path>, format: Format) -> Result<()> {
    let config = match config_path {
        Some(path) => DungeonConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => DungeonConfig::default(),
    };
    let seed = if seed == 0 { resolve_seed(config.seed) } else { seed };

    let mut dungeon = Dungeon::new(config).context("Invalid dungeon config")?;
    dungeon.generate(seed).context("Generation failed")?;
    let layout = dungeon.layout();
    info!(seed, rooms = layout.rooms.len(), fingerprint = layout.fingerprint(), "generated");

    match format {
        Format::Ascii => {
            println!("seed: {seed}");
            println!("rooms: {}", layout.rooms.len());
            print!("{}", layout.render_ascii());
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(&layout).context("Failed to encode layout")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn load_journal(path: &Path) -> Result<InputJournal> {
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let loaded = load_journal_from_file(path)
            .with_context(|| format!("Failed to load journal: {}", path.display()))?;
        return Ok(loaded.journal);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read journal file: {}", path.display()))?;
    serde_json::from_str(&raw).context("Failed to deserialize journal JSON")
}

fn replay(path: &Path) -> Result<()> {
    let journal = load_journal(path)?;
    let result: ReplayResult = replay_to_end(&journal).context("Replay failed")?;

    println!("Replay complete.");
    println!("Inputs: {}", journal.inputs.len());
    println!("Final Tick: {}", result.final_tick);
    println!("Final Level: {}", result.final_level);
    println!("Game Over: {}", result.game_over);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);
    Ok(())
}
