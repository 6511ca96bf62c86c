// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Languages command: list the OCR language packs installed on this system.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use klartext_ocr::{TesseractConfig, TesseractEngine};

/// Arguments for the languages command.
#[derive(Args)]
pub struct LanguagesArgs {
    /// Emit the list as JSON
    #[arg(long)]
    json: bool,

    /// Tesseract binary to use instead of probing the install locations
    #[arg(long, value_name = "PATH")]
    tesseract: Option<PathBuf>,
}

pub fn run(args: LanguagesArgs) -> anyhow::Result<()> {
    let config = match &args.tesseract {
        Some(path) => TesseractConfig::from_path(path),
        None => TesseractConfig::locate(),
    };
    let engine = TesseractEngine::new(config);
    let languages = engine
        .list_languages()
        .context("could not query language packs; is Tesseract installed?")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&languages)?);
    } else {
        for language in &languages {
            println!("{language}");
        }
    }
    Ok(())
}
