// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doctor command: stepwise readiness report for the OCR toolchain.
//
// Runs a sequence of checks: engine lookup, engine version, language packs,
// Poppler directory, rasterizer version. Stops at the first failure and
// prints what to fix.

use clap::Args;
use klartext_ocr::{PageRasterizer, TesseractEngine};

use super::ToolchainArgs;

/// Result of a single doctor step.
struct StepResult {
    /// Step name shown to the user.
    name: &'static str,
    /// Whether the step passed.
    passed: bool,
    /// What was found.
    detail: String,
    /// What to do if the step failed.
    fix: Option<&'static str>,
}

impl StepResult {
    fn pass(name: &'static str, detail: String) -> Self {
        Self {
            name,
            passed: true,
            detail,
            fix: None,
        }
    }

    fn fail(name: &'static str, detail: String, fix: &'static str) -> Self {
        Self {
            name,
            passed: false,
            detail,
            fix: Some(fix),
        }
    }
}

/// Arguments for the doctor command.
#[derive(Args)]
pub struct DoctorArgs {
    #[command(flatten)]
    toolchain: ToolchainArgs,
}

pub fn run(args: DoctorArgs) -> anyhow::Result<()> {
    let config = args.toolchain.to_config();
    let engine = TesseractEngine::new(config.tesseract);
    let rasterizer = PageRasterizer::new(config.poppler);

    let steps = run_checks(&engine, &rasterizer);
    let all_passed = print_report(&steps);
    if !all_passed {
        anyhow::bail!("environment is not ready");
    }
    Ok(())
}

/// Run the checks in dependency order, stopping at the first failure.
fn run_checks(engine: &TesseractEngine, rasterizer: &PageRasterizer) -> Vec<StepResult> {
    let mut steps = Vec::new();

    // The lookup itself cannot fail; it either pins a path or falls back to
    // the search path. Shown first so a failing version check has context.
    let location = match &engine.config().binary {
        Some(path) => format!("using {}", path.display()),
        None => "no known install location found; relying on the search path".to_owned(),
    };
    steps.push(StepResult::pass("Tesseract binary", location));

    match engine.version() {
        Ok(version) => steps.push(StepResult::pass("Tesseract version", version)),
        Err(err) => {
            steps.push(StepResult::fail(
                "Tesseract version",
                err.to_string(),
                "install Tesseract or pass --tesseract with the binary path",
            ));
            return steps;
        }
    }

    match engine.list_languages() {
        Ok(languages) if languages.is_empty() => {
            steps.push(StepResult::fail(
                "Language packs",
                "none installed".to_owned(),
                "install at least one tessdata language pack (e.g. deu, eng)",
            ));
            return steps;
        }
        Ok(languages) => steps.push(StepResult::pass(
            "Language packs",
            format!("{} installed ({})", languages.len(), languages.join(", ")),
        )),
        Err(err) => {
            steps.push(StepResult::fail(
                "Language packs",
                err.to_string(),
                "check the tessdata directory of your Tesseract install",
            ));
            return steps;
        }
    }

    match rasterizer.support_dir() {
        Some(dir) if dir.is_dir() => {
            steps.push(StepResult::pass(
                "Poppler directory",
                format!("using {}", dir.display()),
            ));
        }
        Some(dir) => {
            steps.push(StepResult::fail(
                "Poppler directory",
                format!("{} does not exist", dir.display()),
                "install the bundled Poppler tools, or pass --poppler / --system-poppler",
            ));
            return steps;
        }
        None => {
            steps.push(StepResult::pass(
                "Poppler directory",
                "relying on the search path".to_owned(),
            ));
        }
    }

    match rasterizer.version() {
        Ok(version) => steps.push(StepResult::pass("pdftoppm version", version)),
        Err(err) => steps.push(StepResult::fail(
            "pdftoppm version",
            err.to_string(),
            "install Poppler or check the directory passed with --poppler",
        )),
    }

    steps
}

/// Print the report; returns whether every step passed.
fn print_report(steps: &[StepResult]) -> bool {
    let mut all_passed = true;
    for step in steps {
        let mark = if step.passed { "ok" } else { "FAIL" };
        println!("[{mark:>4}] {}: {}", step.name, step.detail);
        if let Some(fix) = step.fix {
            println!("       fix: {fix}");
        }
        all_passed &= step.passed;
    }
    if all_passed {
        println!("\nEverything looks good. The OCR toolchain is ready.");
    } else {
        println!("\nNot ready. Fix the failed step above and run doctor again.");
    }
    all_passed
}
