// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zone command: OCR of one rectangular region on a single page.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use klartext_core::types::{DEFAULT_LANGUAGE, Zone};
use klartext_ocr::DocumentTextExtractor;
use serde::Serialize;
use tracing::info;

use super::{ToolchainArgs, write_output};

/// Arguments for the zone command.
#[derive(Args)]
pub struct ZoneArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// 1-based page number
    #[arg(short, long)]
    page: u32,

    /// Region as x,y,width,height in pixels on the page rendered at 300 DPI
    #[arg(short, long)]
    zone: Zone,

    /// OCR language pack
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a JSON record instead of plain text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    toolchain: ToolchainArgs,
}

/// JSON shape for a zone result.
#[derive(Serialize)]
struct ZoneRecord<'a> {
    page: u32,
    zone: Zone,
    text: &'a str,
}

pub fn run(args: ZoneArgs) -> anyhow::Result<()> {
    info!(
        "Extracting zone {} on page {} of {}",
        args.zone,
        args.page,
        args.input.display()
    );
    let extractor = DocumentTextExtractor::new(args.toolchain.to_config());
    let text = extractor
        .extract_zone(&args.input, args.page, args.zone, &args.lang)
        .with_context(|| {
            format!(
                "zone extraction failed for {} page {}",
                args.input.display(),
                args.page
            )
        })?;

    let output = if args.json {
        serde_json::to_string_pretty(&ZoneRecord {
            page: args.page,
            zone: args.zone,
            text: &text,
        })?
    } else {
        text
    };
    write_output(args.output.as_deref(), &output)
}
