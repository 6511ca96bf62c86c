// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klartext: command-line OCR text extraction from scanned PDFs.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{doctor, extract, languages, zone};

/// Klartext - extract text from scanned PDFs via Poppler and Tesseract
#[derive(Parser)]
#[command(name = "klartext")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the text of every page of a scanned PDF
    Extract(extract::ExtractArgs),

    /// Extract the text of one rectangular zone on a single page
    Zone(zone::ZoneArgs),

    /// List the OCR language packs installed on this system
    Languages(languages::LanguagesArgs),

    /// Check that the OCR toolchain is ready to use
    Doctor(doctor::DoctorArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the -v count picks the level.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Command::Extract(args) => extract::run(args),
        Command::Zone(args) => zone::run(args),
        Command::Languages(args) => languages::run(args),
        Command::Doctor(args) => doctor::run(args),
    }
}
