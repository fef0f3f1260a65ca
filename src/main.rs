//! # latin-roman CLI
//!
//! Command-line front end for converting text between the Latin-1
//! interchange codepage and the MacRoman native codepage, and for inspecting
//! the mapping tables.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use log::{debug, info};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use latin_roman::scratch::{HEADROOM, QUANTUM};
#[cfg(feature = "cli")]
use latin_roman::tables::{is_lossless, map_byte};
#[cfg(feature = "cli")]
use latin_roman::{Config, Direction, Encoding, Length, StrategyChoice};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// latin-roman: Latin-1 / MacRoman text transcoder
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "latin-roman")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert bytes between the interchange and native codepages
    Convert(ConvertArgs),

    /// Print the high-half mapping table for one direction
    Table(TableArgs),

    /// Report which bytes survive a round trip
    Roundtrip,

    /// Show the resolved strategy, fallback glyphs and buffer sizing
    Info,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Direction (defaults to the configured one)
    #[arg(short = 't', long = "to")]
    to: Option<DirectionArg>,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert in-place (overwrite input file)
    #[arg(long, conflicts_with = "output")]
    in_place: bool,

    /// Treat input as zero-terminated and stop at the first zero byte
    #[arg(long)]
    terminated: bool,

    /// Override the configured strategy
    #[arg(long)]
    strategy: Option<StrategyArg>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct TableArgs {
    /// Direction of the table to print
    #[arg(short, long, default_value = "local")]
    direction: DirectionArg,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    /// Latin-1 to MacRoman
    Local,
    /// MacRoman to Latin-1
    Interchange,
}

#[cfg(feature = "cli")]
impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Local => Direction::ToLocal,
            DirectionArg::Interchange => Direction::ToInterchange,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Auto,
    Table,
    Identity,
}

#[cfg(feature = "cli")]
impl From<StrategyArg> for StrategyChoice {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => StrategyChoice::Auto,
            StrategyArg::Table => StrategyChoice::TableDriven,
            StrategyArg::Identity => StrategyChoice::Identity,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult {
    success: bool,
    direction: Direction,
    strategy: &'static str,
    bytes_read: usize,
    bytes_written: usize,
    fallback_bytes: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct TableEntry {
    source: u8,
    target: u8,
    lossless: bool,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct RoundtripReport {
    direction: Direction,
    lossless: usize,
    lossy: Vec<u8>,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    config.install();

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli, config)?,
        Commands::Table(ref args) => table_command(args, &cli)?,
        Commands::Roundtrip => roundtrip_command(&cli)?,
        Commands::Info => info_command(&cli, &config)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli, mut config: Config) -> Result<()> {
    let start_time = std::time::Instant::now();

    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    let direction = args.to.map_or(config.direction, Direction::from);
    let mut transcoder = config.build_transcoder();

    info!(
        "converting {} -> {} ({})",
        direction.source().name(),
        direction.target().name(),
        transcoder.strategy().name()
    );

    // Read input
    let input_data = if let Some(ref input_path) = args.input {
        debug!("reading from {}", input_path.display());
        fs::read(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))?
    } else {
        debug!("reading from stdin");
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    };

    let length = if args.terminated {
        Length::Terminated
    } else {
        Length::Explicit(input_data.len())
    };
    let output_data = transcoder
        .transcode(direction, &input_data, length)
        .context("Conversion failed")?
        .to_vec();

    let fallback = direction.fallback();
    let fallback_bytes = output_data.iter().filter(|&&b| b == fallback).count();

    // Write output
    if args.in_place {
        if let Some(ref input_path) = args.input {
            fs::write(input_path, &output_data).with_context(|| {
                format!("Failed to write to input file: {}", input_path.display())
            })?;
            debug!("updated file in place: {}", input_path.display());
        } else {
            anyhow::bail!("Cannot use --in-place without input file");
        }
    } else if let Some(ref output_path) = args.output {
        fs::write(output_path, &output_data)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
        debug!("wrote to {}", output_path.display());
    } else {
        io::stdout()
            .write_all(&output_data)
            .context("Failed to write to stdout")?;
    }

    let processing_time = start_time.elapsed();

    if cli.verbose {
        eprintln!(
            "Processed {} bytes -> {} bytes in {:?} ({} fallback)",
            input_data.len(),
            output_data.len(),
            processing_time,
            fallback_bytes
        );
    }

    if let OutputFormat::Json = cli.format {
        let result = ConversionResult {
            success: true,
            direction,
            strategy: transcoder.strategy().name(),
            bytes_read: input_data.len(),
            bytes_written: output_data.len(),
            fallback_bytes,
            processing_time_ms: processing_time.as_millis() as u64,
        };
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn table_command(args: &TableArgs, cli: &Cli) -> Result<()> {
    let direction = Direction::from(args.direction);
    let table = direction.table();
    let entries: Vec<TableEntry> = (128..=255u8)
        .map(|source| TableEntry {
            source,
            target: map_byte(table, source),
            lossless: is_lossless(direction, source),
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            println!(
                "{} -> {} (fallback 0x{:02X})",
                direction.source().name(),
                direction.target().name(),
                direction.fallback()
            );
            for row in entries.chunks(8) {
                let line: Vec<String> = row
                    .iter()
                    .map(|e| {
                        let mark = if e.lossless { ' ' } else { '*' };
                        format!("{:02X}>{:02X}{}", e.source, e.target, mark)
                    })
                    .collect();
                println!("  {}", line.join(" "));
            }
            if cli.verbose {
                println!("\n  * = does not survive a round trip");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn roundtrip_command(cli: &Cli) -> Result<()> {
    let reports: Vec<RoundtripReport> = [Direction::ToLocal, Direction::ToInterchange]
        .into_iter()
        .map(|direction| {
            let lossy: Vec<u8> = (128..=255u8)
                .filter(|&b| !is_lossless(direction, b))
                .collect();
            RoundtripReport {
                direction,
                lossless: 128 - lossy.len(),
                lossy,
            }
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                println!(
                    "{} -> {}: {} lossless, {} degrade to 0x{:02X}",
                    report.direction.source().name(),
                    report.direction.target().name(),
                    report.lossless,
                    report.lossy.len(),
                    report.direction.fallback()
                );
                if cli.verbose {
                    println!("  lossy: {:02X?}", report.lossy);
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn info_command(cli: &Cli, config: &Config) -> Result<()> {
    let strategy = config.strategy.resolve();

    match cli.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "strategy": strategy.name(),
                "configured_strategy": config.strategy,
                "default_direction": config.direction,
                "interchange": {
                    "name": Encoding::WINDOWS_1252.name(),
                    "description": Encoding::WINDOWS_1252.description(),
                    "fallback": Direction::ToInterchange.fallback(),
                },
                "local": {
                    "name": Encoding::MAC_ROMAN.name(),
                    "description": Encoding::MAC_ROMAN.description(),
                    "fallback": Direction::ToLocal.fallback(),
                },
                "scratch": {
                    "initial_capacity": config.initial_capacity,
                    "headroom": HEADROOM,
                    "quantum": QUANTUM,
                }
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            let name = strategy.name();
            let configured = config.strategy;
            println!("Strategy: {name} (configured: {configured:?})");
            println!("Default direction: {:?}", config.direction);
            for encoding in [
                Encoding::WINDOWS_1252,
                Encoding::MAC_ROMAN,
            ] {
                println!("{}: {}", encoding.name(), encoding.description());
            }
            println!(
                "Fallback glyphs: 0x{:02X} (MacRoman), 0x{:02X} (Latin-1)",
                Direction::ToLocal.fallback(),
                Direction::ToInterchange.fallback()
            );
            println!(
                "Scratch buffer: initial {} bytes, headroom {}, quantum {}",
                config.initial_capacity, HEADROOM, QUANTUM
            );
        }
    }

    Ok(())
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("latin-roman").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_table_direction_flag() {
        let cli = parse(&["table", "--direction", "interchange"]);
        let Commands::Table(args) = cli.command else {
            panic!("expected the table subcommand");
        };
        assert!(matches!(args.direction, DirectionArg::Interchange));

        let cli = parse(&["table", "-d", "local"]);
        let Commands::Table(args) = cli.command else {
            panic!("expected the table subcommand");
        };
        assert!(matches!(args.direction, DirectionArg::Local));

        let old_flag = ["latin-roman", "table", "--to", "local"];
        assert!(Cli::try_parse_from(old_flag).is_err());
    }

    #[test]
    fn test_convert_keeps_to_flag() {
        let cli = parse(&["convert", "--to", "interchange", "--terminated"]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert subcommand");
        };
        assert!(matches!(args.to, Some(DirectionArg::Interchange)));
        assert!(args.terminated);
    }
}
