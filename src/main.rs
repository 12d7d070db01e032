//! # Lockwork Command Line
//!
//! Generates a lock-and-key dungeon on a square grid and prints it as a
//! summary or as JSON.

use clap::{Parser, ValueEnum};
use lockwork::{
    CountConstraints, Dungeon, GenerationConfig, Generator, LockAndKeyGenerator, LockworkError,
    LockworkResult,
};
#[cfg(not(feature = "dev-tools"))]
use log::{error, info};
use std::fs;
use std::path::PathBuf;
#[cfg(feature = "dev-tools")]
use tracing::{error, info, Level};

/// Output formats for the generated dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per room
    Summary,
    /// Pretty-printed JSON
    Json,
}

/// Command line arguments for the dungeon generator.
#[derive(Parser, Debug)]
#[command(name = "lockwork")]
#[command(about = "Generates solvable lock-and-key dungeons")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rooms to place
    #[arg(short, long, default_value_t = 25)]
    rooms: usize,

    /// Number of distinct keys
    #[arg(short, long, default_value_t = 4)]
    keys: usize,

    /// Number of switches (0 or 1)
    #[arg(long, default_value_t = 1)]
    switches: usize,

    /// Whole-attempt retries before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Do not place a goal room behind the boss
    #[arg(long)]
    no_goal: bool,

    /// Do not lock the boss room behind the last key
    #[arg(long)]
    unlocked_boss: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("Generation failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> LockworkResult<()> {
    initialize_logging(&args.log_level)?;

    info!("Starting lockwork v{}", lockwork::VERSION);

    let config = build_config(args);
    let generator = LockAndKeyGenerator::new(CountConstraints::new(
        args.rooms,
        args.keys,
        args.switches,
    ));

    let dungeon = generator.generate_seeded(&config)?;
    generator.validate(&dungeon, &config)?;

    let rendered = match args.format {
        OutputFormat::Summary => render_summary(&dungeon, &config),
        OutputFormat::Json => dungeon.to_json_pretty()?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!("Wrote dungeon to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn build_config(args: &Args) -> GenerationConfig {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut config = GenerationConfig::new(seed);
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    config.generate_goal = !args.no_goal;
    config.boss_room_locked = !args.unlocked_boss;
    config
}

/// Initializes logging at the given level.
fn initialize_logging(log_level: &str) -> LockworkResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            other => {
                return Err(LockworkError::InvalidConfig(format!(
                    "Unknown log level: {}",
                    other
                )))
            }
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let level: log::LevelFilter = log_level.parse().map_err(|_| {
            LockworkError::InvalidConfig(format!("Unknown log level: {}", log_level))
        })?;

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .format_target(false)
            .init();
    }

    Ok(())
}

/// Renders one line per room: id, center, item, intensity, precondition and
/// doors.
fn render_summary(dungeon: &Dungeon, config: &GenerationConfig) -> String {
    let mut lines = vec![format!("seed {}: {} rooms", config.seed, dungeon.room_count())];
    if let Some(bounds) = dungeon.bounds() {
        lines.push(format!("bounds {}x{}", bounds.width(), bounds.height()));
    }

    for room in dungeon.rooms() {
        let item = room.item.map(|item| item.to_string()).unwrap_or_default();
        let doors: Vec<String> = room
            .edges()
            .iter()
            .map(|edge| match edge.symbol {
                Some(symbol) => format!("{}[{}]", edge.target, symbol),
                None => edge.target.to_string(),
            })
            .collect();
        let center = room.center();
        lines.push(format!(
            "{:>4} ({:>3},{:>3}) {:<6} {:.2} {} -> {}",
            room.id,
            center.x,
            center.y,
            item,
            room.intensity,
            room.precond,
            doors.join(" ")
        ));
    }

    let path: Vec<String> = dungeon
        .solution_path()
        .iter()
        .rev()
        .map(|id| id.to_string())
        .collect();
    lines.push(format!("solution {}", path.join(" -> ")));
    lines.join("\n")
}
