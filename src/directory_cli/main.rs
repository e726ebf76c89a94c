//! Authority directory maintenance tool.
//!
//! Validates and inspects directory files, converts CSV spreadsheets into the
//! JSON directory format, and runs one-off matches and geohash lookups.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use beacon::config::Config;
use beacon::directory::{read_csv_authorities, StaticDirectory};
use beacon::geohash;
use beacon::models::{Coordinate, IssueCategory};

#[derive(Parser, Debug)]
#[command(name = "directory")]
#[command(about = "Inspect and maintain authority directories")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a directory file for errors
    Validate {
        /// Directory file (.json, .toml or .csv)
        file: PathBuf,
    },

    /// Convert a CSV spreadsheet into a JSON directory
    Import {
        /// CSV file to import
        csv: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print summary counts for a directory (the built-in seed if no file)
    Stats { file: Option<PathBuf> },

    /// Rank the authorities for one report
    Match {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Reverse-geocoded address
        #[arg(long, default_value = "")]
        address: String,

        /// Issue category, e.g. "pothole" or "water_supply"
        #[arg(long)]
        category: String,

        /// Directory file (the built-in seed if omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Config file for matcher and address settings
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Geohash utilities
    #[command(subcommand)]
    Geohash(GeohashCommand),
}

#[derive(Subcommand, Debug)]
enum GeohashCommand {
    /// Encode a coordinate
    Encode {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(short, long, default_value = "6")]
        precision: usize,
    },

    /// Decode a geohash to its center and bounding box
    Decode { hash: String },

    /// List the eight neighbours of a geohash
    Neighbors { hash: String },
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match args.command {
        Command::Validate { file } => validate(&file),
        Command::Import { csv, out } => import(&csv, &out),
        Command::Stats { file } => stats(file.as_deref()),
        Command::Match {
            lat,
            lng,
            address,
            category,
            file,
            config,
        } => run_match(lat, lng, &address, &category, file.as_deref(), config.as_deref()),
        Command::Geohash(command) => run_geohash(command),
    }
}

fn load_directory(file: Option<&Path>) -> Result<StaticDirectory> {
    match file {
        Some(path) => StaticDirectory::load_file(path)
            .with_context(|| format!("Failed to load directory {}", path.display())),
        None => StaticDirectory::seed().context("Built-in seed directory is invalid"),
    }
}

fn validate(file: &Path) -> Result<()> {
    let directory = load_directory(Some(file))?;
    let stats = directory.stats();

    if stats.without_prefixes > 0 {
        warn!(
            "{} authorities have no geohash prefixes and only match by city, state or national tier",
            stats.without_prefixes
        );
    }
    if directory.is_empty() {
        bail!("{} contains no authorities", file.display());
    }

    println!("{}: {} authorities OK", file.display(), directory.len());
    Ok(())
}

fn import(csv: &Path, out: &Path) -> Result<()> {
    let reader = BufReader::new(
        File::open(csv).with_context(|| format!("Failed to open {}", csv.display()))?,
    );
    let authorities = read_csv_authorities(reader)
        .with_context(|| format!("Failed to read authorities from {}", csv.display()))?;

    // Validate before writing anything
    let directory = StaticDirectory::new(authorities, &csv.display().to_string())?;
    let authorities = directory.into_authorities();

    let mut writer = BufWriter::new(
        File::create(out).with_context(|| format!("Failed to create {}", out.display()))?,
    );
    serde_json::to_writer_pretty(&mut writer, &authorities)?;
    writeln!(writer)?;
    writer.flush()?;

    info!(
        "Imported {} authorities from {} into {}",
        authorities.len(),
        csv.display(),
        out.display()
    );
    Ok(())
}

fn stats(file: Option<&Path>) -> Result<()> {
    let directory = load_directory(file)?;
    println!("{}", serde_json::to_string_pretty(&directory.stats())?);
    Ok(())
}

fn run_match(
    lat: f64,
    lng: f64,
    address: &str,
    category: &str,
    file: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let config = Config::load_or_default(config)?;
    let matcher = config.build_matcher()?;
    let directory = load_directory(file)?;

    let coord = Coordinate::new(lat, lng)?;
    let category: IssueCategory = category.parse()?;

    let parsed = matcher.parse_address(address);
    info!(
        "Parsed address: city={:?} state={:?} postal_code={:?}",
        parsed.city, parsed.state, parsed.postal_code
    );

    let results = matcher.find_authorities(&directory, coord, address, category)?;
    if results.is_empty() {
        match &config.matcher.fallback_handle {
            Some(fallback) => println!("No authority matched; fallback {}", fallback),
            None => println!("No authority matched"),
        }
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. {:<20} {:<24} {:.2} ({:?}, {:?})",
            rank + 1,
            result.handle,
            result.authority_id,
            result.confidence,
            result.confidence_label(),
            result.match_reason
        );
    }
    Ok(())
}

fn run_geohash(command: GeohashCommand) -> Result<()> {
    match command {
        GeohashCommand::Encode {
            lat,
            lng,
            precision,
        } => {
            let coord = Coordinate::new(lat, lng)?;
            println!("{}", geohash::encode(coord, precision)?);
        }
        GeohashCommand::Decode { hash } => {
            let decoded = geohash::decode(&hash)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        GeohashCommand::Neighbors { hash } => {
            let neighbors = geohash::neighbors(&hash)?;
            println!("{}", serde_json::to_string_pretty(&neighbors)?);
        }
    }
    Ok(())
}
