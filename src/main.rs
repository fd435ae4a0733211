//! # sppcore CLI
//!
//! Command-line interface for printing a receipt on a Bluetooth SPP
//! thermal printer.
//!
//! ## Usage
//!
//! ```bash
//! # Bind the printer to an RFCOMM node (once per boot)
//! sppcore bind 74:F0:7D:E5:91:F7
//!
//! # Print the stock test receipt
//! sppcore print
//!
//! # Print an image with the receipt text from a config file
//! sppcore print --config receipt.json --image logo.png
//!
//! # Preview the rasterized image instead of printing
//! sppcore print --image logo.png --png preview.png
//!
//! # Write the ESC/POS bytes to a file instead of the printer
//! sppcore print --dry-run job.bin
//!
//! # Validate configuration and show the bound node
//! sppcore check --config receipt.json
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sppcore::{
    DeviceHandle, PrintError,
    config::AppConfig,
    printer::{Printer, PrinterConfig, spawn_print},
    render::{
        Binarization, rasterize_with,
        source::{FileImage, ImageSource, fit_to_width},
    },
    transport::{
        MemoryTransport, RfcommAccessGate, RfcommTransport,
        bluetooth::{find_rfcomm_for_mac, setup_rfcomm},
    },
};

/// sppcore - Bluetooth receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "sppcore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the receipt
    Print {
        /// JSON config file (defaults apply when omitted)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Printer Bluetooth address, overrides the config
        #[arg(long, value_name = "MAC")]
        device: Option<DeviceHandle>,

        /// Image to print above the text, overrides the config
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,

        /// Save the rasterized image as PNG instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Write the encoded job to a file instead of the printer
        #[arg(long, value_name = "FILE")]
        dry_run: Option<PathBuf>,

        /// Use ordered dithering instead of a hard threshold
        #[arg(long)]
        dither: bool,
    },

    /// Bind a paired printer to an RFCOMM node
    Bind {
        /// Printer Bluetooth address
        mac: DeviceHandle,

        /// Node number N of /dev/rfcommN
        #[arg(long, default_value = "0")]
        node: u8,

        /// RFCOMM channel of the serial port service
        #[arg(long, default_value = "1")]
        channel: u8,
    },

    /// Validate the configuration and report the bound RFCOMM node
    Check {
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PrintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            config,
            device,
            image,
            png,
            dry_run,
            dither,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(device) = device {
                config.device = device;
            }
            if image.is_some() {
                config.image = image;
            }
            if dither {
                config.binarization = Binarization::Bayer;
            }

            if let Some(png_path) = png {
                return save_png(&config, &png_path);
            }

            match dry_run {
                Some(out) => {
                    let transport = MemoryTransport::new();
                    let printer = Arc::new(Printer::from_config(&config, transport.clone()));
                    let summary = join(spawn_print(printer).await)?;
                    std::fs::write(&out, transport.sent())?;
                    println!("Wrote {} bytes to {}", summary.bytes_sent, out.display());
                }
                None => {
                    let printer = Printer::from_config(&config, RfcommTransport::new())
                        .with_gate(RfcommAccessGate::new());
                    println!("Printing to {}...", config.device);
                    let summary = join(spawn_print(Arc::new(printer)).await)?;
                    println!("Printed successfully! ({} bytes)", summary.bytes_sent);
                }
            }
        }

        Commands::Bind { mac, node, channel } => {
            let node = setup_rfcomm(&mac, node, channel)?;
            println!("{} bound to {}", mac, node);
        }

        Commands::Check { config } => {
            let config = load_config(config.as_deref())?;
            let hardware = PrinterConfig::default();
            println!("Device: {}", config.device);
            println!(
                "Printer: {}, {} dots ({:.0} mm at {} DPI)",
                hardware.name,
                hardware.width_dots,
                hardware.width_mm(),
                hardware.dpi
            );
            if let Some(path) = &config.image {
                let image = FileImage::new(path).load()?;
                println!("Image: {} ({}x{})", path.display(), image.width(), image.height());
            }
            match find_rfcomm_for_mac(config.device.address())? {
                Some(node) => println!("RFCOMM node: {}", node),
                None => println!("RFCOMM node: none (run `sppcore bind {}`)", config.device),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, PrintError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn join<T>(result: Result<Result<T, PrintError>, tokio::task::JoinError>) -> Result<T, PrintError> {
    result.map_err(|e| PrintError::Io(std::io::Error::other(e)))?
}

/// Save the image as it would be printed
fn save_png(config: &AppConfig, path: &Path) -> Result<(), PrintError> {
    let source = config
        .image
        .as_ref()
        .ok_or_else(|| PrintError::Config("--png needs an image (--image FILE)".into()))?;

    let width = u32::from(PrinterConfig::default().width_dots);
    let image = fit_to_width(FileImage::new(source).load()?, width);
    let bitmap = rasterize_with(&image, config.binarization);

    bitmap
        .to_gray_image()
        .save(path)
        .map_err(|e| PrintError::Asset(format!("Failed to save PNG: {}", e)))?;

    println!(
        "Saved {}x{} preview to {}",
        bitmap.width(),
        bitmap.height(),
        path.display()
    );
    Ok(())
}
