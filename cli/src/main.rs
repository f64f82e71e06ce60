use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gridjig_core::deal::{level_seed, DEAL_SEED};
use gridjig_core::{LevelCatalog, LevelEntry, Session};
use tracing_subscriber::EnvFilter;

mod bot;
mod play;
mod text_view;

#[derive(Parser)]
#[command(name = "gridjig-cli", version, about = "Play and exercise gridjig boards in a terminal")]
struct Cli {
    /// Level catalog in TOML; the built-in catalog is used when absent.
    #[arg(long, env = "GRIDJIG_LEVELS", global = true)]
    levels: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Levels,
    Play {
        #[arg(long, default_value_t = 0)]
        level: usize,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, env = "GRIDJIG_SAVE")]
        save: Option<PathBuf>,
        #[arg(long)]
        resume: bool,
    },
    Bot {
        #[command(subcommand)]
        command: bot::BotCommand,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    let catalog = load_catalog(cli.levels.as_deref())?;

    match cli.command {
        Commands::Levels => {
            for (index, level) in catalog.levels.iter().enumerate() {
                println!(
                    "{index:>3}  {} ({}x{}, {} pieces)",
                    level.label,
                    level.rows,
                    level.cols,
                    level.rows * level.cols
                );
            }
        }
        Commands::Play {
            level,
            seed,
            save,
            resume,
        } => {
            let seed = match seed.as_deref() {
                Some(raw) => Some(parse_seed_arg(raw)?),
                None => None,
            };
            play::run(&catalog, level, seed, save, resume)?;
        }
        Commands::Bot { command } => bot::run(&catalog, command)?,
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<LevelCatalog, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LevelCatalog::builtin());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read level catalog at {}: {err}", path.display()))?;
    Ok(LevelCatalog::from_toml(&contents)?)
}

fn level_entry(catalog: &LevelCatalog, level: usize) -> Result<&LevelEntry, Box<dyn std::error::Error>> {
    catalog.level(level).ok_or_else(|| {
        format!(
            "unknown level {level}, catalog has {} (see `gridjig-cli levels`)",
            catalog.len()
        )
        .into()
    })
}

/// Seed precedence: command line, catalog entry, then one derived from the
/// level and grid.
fn new_session(
    catalog: &LevelCatalog,
    level: usize,
    seed: Option<u32>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let entry = level_entry(catalog, level)?;
    let seed = seed
        .or(entry.seed)
        .unwrap_or_else(|| level_seed(DEAL_SEED, level as u32, entry.rows, entry.cols));
    Ok(Session::new(
        catalog.rules,
        level as u32,
        entry.rows,
        entry.cols,
        seed,
    )?)
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
