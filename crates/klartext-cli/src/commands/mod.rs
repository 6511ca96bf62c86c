// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations for the `klartext` binary, plus the toolchain
// flags and output plumbing they share.

pub mod doctor;
pub mod extract;
pub mod languages;
pub mod zone;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use klartext_ocr::{ExtractorConfig, PopplerConfig, ReadinessProbe, TesseractConfig};

/// Toolchain location flags shared by the extraction commands.
#[derive(Args)]
pub struct ToolchainArgs {
    /// Tesseract binary to use instead of probing the install locations
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// Poppler binary directory (default: the bundled ../poppler/bin)
    #[arg(long, value_name = "DIR")]
    pub poppler: Option<PathBuf>,

    /// Use pdftoppm from the search path instead of a Poppler directory
    #[arg(long, conflicts_with = "poppler")]
    pub system_poppler: bool,
}

impl ToolchainArgs {
    /// Resolve the flags into an extractor configuration.
    pub fn to_config(&self) -> ExtractorConfig {
        let tesseract = match &self.tesseract {
            Some(path) => TesseractConfig::from_path(path),
            None => TesseractConfig::locate(),
        };
        let poppler = if self.system_poppler {
            PopplerConfig::system()
        } else {
            match &self.poppler {
                Some(dir) => PopplerConfig::from_dir(dir),
                None => PopplerConfig::default(),
            }
        };
        ExtractorConfig {
            tesseract,
            poppler,
            readiness: ReadinessProbe::default(),
        }
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
