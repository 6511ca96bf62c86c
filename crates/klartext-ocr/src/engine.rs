// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract engine wrapper for Klartext.
//
// Recognition shells out to the installed `tesseract` binary: the page image
// is written as PNG into a scoped temporary directory and recognised with
// `tesseract <image> stdout -l <language>`, plus the segmentation arguments
// for zone extraction.
//
// # Engine Lookup
//
// The binary is located once, when a [`TesseractConfig`] is built via
// [`TesseractConfig::locate`]: a short list of well-known install locations
// is probed in order, and the first existing path wins. When none match, the
// engine is invoked by bare name and resolved through the process search
// path; that case is reported as a warning, not an error, because the lookup
// result only matters once recognition actually runs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use klartext_core::error::KlartextError;
use klartext_core::types::SegmentationMode;
use tracing::{debug, instrument, warn};

/// Well-known Tesseract install locations, probed in order.
///
/// `%VAR%` segments are expanded from the environment before the path is
/// tested.
const KNOWN_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    r"C:\Users\%USERNAME%\AppData\Local\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Name used when the engine is resolved through the process search path.
const ENGINE_PROGRAM: &str = "tesseract";

/// Where to find the Tesseract binary.
///
/// The config is resolved once and then only read; construction never fails.
#[derive(Debug, Clone, Default)]
pub struct TesseractConfig {
    /// Explicit path to the binary, or `None` to rely on the search path.
    pub binary: Option<PathBuf>,
}

impl TesseractConfig {
    /// Probe the well-known install locations and keep the first hit.
    ///
    /// Falls back to search-path resolution with a warning when no location
    /// matches.
    pub fn locate() -> Self {
        for candidate in KNOWN_INSTALL_PATHS {
            let expanded = PathBuf::from(expand_env_vars(candidate));
            if expanded.is_file() {
                debug!(path = %expanded.display(), "Tesseract binary found");
                return Self {
                    binary: Some(expanded),
                };
            }
        }
        warn!("Tesseract not found in any known install location; relying on the search path");
        Self { binary: None }
    }

    /// Use an explicit binary path, skipping the probe.
    pub fn from_path(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    /// Program name or path handed to `Command::new`.
    pub fn program(&self) -> &OsStr {
        match &self.binary {
            Some(path) => path.as_os_str(),
            None => OsStr::new(ENGINE_PROGRAM),
        }
    }
}

/// Expand `%VAR%` environment references in a path string.
///
/// References to unset variables are left in place, so the resulting path
/// simply fails the existence test.
fn expand_env_vars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unpaired % is literal.
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Shell-out wrapper around the Tesseract binary.
///
/// Cheap to construct; every call spawns one engine process. The wrapper is
/// immutable and can be shared across threads.
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    /// Build an engine from an already-resolved config.
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Probe the install locations and build an engine from the result.
    pub fn locate() -> Self {
        Self::new(TesseractConfig::locate())
    }

    /// The resolved configuration.
    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    /// Recognise the text on `image`.
    ///
    /// The image is written as PNG into a scoped temporary directory, which
    /// is removed again on every exit path. Output is the engine's stdout,
    /// decoded lossily as UTF-8 and otherwise untouched.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), language, ?mode))]
    pub fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
        mode: SegmentationMode,
    ) -> Result<String, KlartextError> {
        let workdir = tempfile::tempdir()?;
        let image_path = workdir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|err| {
                KlartextError::Image(format!(
                    "failed to write page image to {}: {}",
                    image_path.display(),
                    err
                ))
            })?;

        let mut command = Command::new(self.config.program());
        command
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(language);
        for arg in mode.engine_args() {
            command.arg(arg);
        }

        let output = command
            .output()
            .map_err(|err| launch_error(self.config.program(), err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KlartextError::OcrEngine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(char_count = text.chars().count(), "Recognition complete");
        Ok(text)
    }

    /// First line of the engine's version banner.
    ///
    /// Older Tesseract builds print the banner to stderr, newer ones to
    /// stdout; both are accepted.
    pub fn version(&self) -> Result<String, KlartextError> {
        let output = Command::new(self.config.program())
            .arg("--version")
            .output()
            .map_err(|err| launch_error(self.config.program(), err))?;
        if !output.status.success() {
            return Err(KlartextError::OcrEngine(format!(
                "tesseract --version exited with {}",
                output.status
            )));
        }
        let raw = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let first = String::from_utf8_lossy(&raw)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
        Ok(first)
    }

    /// Installed language packs, sorted.
    ///
    /// Runs `tesseract --list-langs` and drops the `List of available
    /// languages` header line.
    pub fn list_languages(&self) -> Result<Vec<String>, KlartextError> {
        let output = Command::new(self.config.program())
            .arg("--list-langs")
            .output()
            .map_err(|err| launch_error(self.config.program(), err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KlartextError::OcrEngine(format!(
                "tesseract --list-langs exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        let raw = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let mut languages: Vec<String> = String::from_utf8_lossy(&raw)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("List of"))
            .map(ToOwned::to_owned)
            .collect();
        languages.sort();
        Ok(languages)
    }

    /// Whether the engine responds to a version probe.
    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }
}

/// Map a spawn failure into an `OcrEngine` error, naming the binary when the
/// OS reports it missing.
fn launch_error(program: &OsStr, err: std::io::Error) -> KlartextError {
    let program = Path::new(program);
    if err.kind() == std::io::ErrorKind::NotFound {
        KlartextError::OcrEngine(format!(
            "tesseract binary not found ({}); install Tesseract or configure an explicit path",
            program.display()
        ))
    } else {
        KlartextError::OcrEngine(format!(
            "failed to launch {}: {}",
            program.display(),
            err
        ))
    }
}
