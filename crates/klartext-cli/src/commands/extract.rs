// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extract command: full-document OCR of a scanned PDF.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use klartext_core::types::DEFAULT_LANGUAGE;
use klartext_ocr::DocumentTextExtractor;
use tracing::info;

use super::{ToolchainArgs, write_output};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// OCR language pack
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit one JSON record per page instead of the assembled text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    toolchain: ToolchainArgs,
}

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    info!("Extracting text from {}", args.input.display());
    let extractor = DocumentTextExtractor::new(args.toolchain.to_config());

    let output = if args.json {
        let pages = extractor
            .extract_pages(&args.input, &args.lang)
            .with_context(|| format!("extraction failed for {}", args.input.display()))?;
        serde_json::to_string_pretty(&pages)?
    } else {
        extractor
            .extract_document(&args.input, &args.lang)
            .with_context(|| format!("extraction failed for {}", args.input.display()))?
    };

    write_output(args.output.as_deref(), &output)
}
