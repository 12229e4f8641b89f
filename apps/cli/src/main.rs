use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pira_core::{ConnectionConfig, MemoryWindow, Pira, SerialTransport};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "P.I.R.A. FM monitor tool", long_about = None)]
struct Args {
    /// Connection settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serial device path
    #[arg(long, global = true)]
    port: Option<String>,

    /// Baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Read timeout in milliseconds; also ends the basic-data stream
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Request the basic-data report
    Basic,
    /// Read both memory records and print the normalized snapshot
    Info,
    /// Dump the raw memory records
    Memory,
    /// Read the tuned frequency in kHz
    Frequency,
    /// Read an arbitrary memory window
    Read {
        /// Start address, hex (e.g. 01A or 0x1A)
        #[arg(long, value_parser = parse_hex)]
        address: u16,
        /// Length in bytes, hex
        #[arg(long, value_parser = parse_hex)]
        length: u16,
    },
    /// Write the effective connection settings to a TOML file
    SaveConfig {
        /// Destination file
        path: PathBuf,
    },
}

fn parse_hex(value: &str) -> Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{value}': {e}"))
}

fn connection_config(args: &Args) -> Result<ConnectionConfig> {
    let mut config = match &args.config {
        Some(path) => ConnectionConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConnectionConfig::default(),
    };
    if let Some(port) = &args.port {
        config.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.read_timeout_ms = timeout_ms;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = connection_config(args)?;

    if let Cmd::SaveConfig { path } = &args.command {
        config.save_to_file(path)?;
        info!(path = %path.display(), "Configuration saved");
        return Ok(());
    }

    let transport = SerialTransport::open_config(&config)?;
    let mut pira = Pira::new(transport);

    match &args.command {
        Cmd::Basic => print_json(&pira.basic_data()?),
        Cmd::Info => print_json(&pira.device_info()?),
        Cmd::Memory => {
            let primary = pira.primary_memory()?;
            let secondary = pira.secondary_memory()?;
            print_json(&json!({ "primary": primary, "secondary": secondary }))
        }
        Cmd::Frequency => print_json(&json!({ "frequency_khz": pira.frequency()? })),
        Cmd::Read { address, length } => {
            let window = MemoryWindow::new(*address, *length)?;
            let data = pira.read_window(window)?;
            print_json(&json!({
                "address": format!("{:03X}", window.address()),
                "length": data.len(),
                "data": hex::encode_upper(&data),
            }))
        }
        Cmd::SaveConfig { .. } => Ok(()),
    }
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    if let Err(e) = run(&args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
