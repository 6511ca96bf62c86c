// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Poppler rasterizer wrapper. Renders PDF pages to PNG by shelling out to
// `pdftoppm`, collecting the numbered page files it writes into a scoped
// temporary directory and decoding them in page order.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use klartext_core::error::KlartextError;
use klartext_core::types::RASTER_DPI;
use tracing::{debug, instrument};

/// Prefix for the page files pdftoppm writes (`page-1.png`, `page-2.png`, ...).
const PAGE_PREFIX: &str = "page";

/// Where to find the Poppler command-line tools.
#[derive(Debug, Clone)]
pub struct PopplerConfig {
    /// Directory holding `pdftoppm`, or `None` to rely on the search path.
    pub bin_dir: Option<PathBuf>,
}

impl Default for PopplerConfig {
    /// The bundled directory next to the installed executable.
    fn default() -> Self {
        Self::bundled()
    }
}

impl PopplerConfig {
    /// The `../poppler/bin` sibling of the running executable's directory.
    ///
    /// This is where deployments place the Poppler tools; the directory is
    /// not required to exist until a document is actually rasterized.
    pub fn bundled() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let dir = exe_dir.join("..").join("poppler").join("bin");
        Self {
            bin_dir: Some(crate::readiness::normalize_path(&dir)),
        }
    }

    /// Explicit Poppler binary directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: Some(dir.into()),
        }
    }

    /// Rely on `pdftoppm` from the process search path.
    ///
    /// Opt-in for hosts with a system Poppler install; the bundled directory
    /// stays the default.
    pub fn system() -> Self {
        Self { bin_dir: None }
    }

    /// Whether the configured directory exists. Always true in search-path
    /// mode.
    pub fn support_dir_exists(&self) -> bool {
        match &self.bin_dir {
            Some(dir) => dir.is_dir(),
            None => true,
        }
    }

    /// Program path handed to `Command::new`.
    fn pdftoppm(&self) -> PathBuf {
        let name = format!("pdftoppm{}", std::env::consts::EXE_SUFFIX);
        match &self.bin_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Shell-out wrapper around `pdftoppm`.
///
/// Immutable after construction; every call renders into its own scoped
/// temporary directory, which is removed on every exit path.
pub struct PageRasterizer {
    config: PopplerConfig,
}

impl PageRasterizer {
    /// Build a rasterizer from an already-resolved config.
    pub fn new(config: PopplerConfig) -> Self {
        Self { config }
    }

    /// The configured Poppler directory, if any.
    pub fn support_dir(&self) -> Option<&Path> {
        self.config.bin_dir.as_deref()
    }

    /// Render every page of `pdf` at [`RASTER_DPI`].
    #[instrument(skip_all, fields(pdf = %pdf.display()))]
    pub fn rasterize_document(&self, pdf: &Path) -> Result<Vec<DynamicImage>, KlartextError> {
        self.run(pdf, None)
    }

    /// Render pages `first..=last` (1-based, inclusive) at [`RASTER_DPI`].
    ///
    /// Pages past the end of the document yield no files; the result is then
    /// simply shorter than the requested range, or empty.
    #[instrument(skip_all, fields(pdf = %pdf.display(), first, last))]
    pub fn rasterize_range(
        &self,
        pdf: &Path,
        first: u32,
        last: u32,
    ) -> Result<Vec<DynamicImage>, KlartextError> {
        self.run(pdf, Some((first, last)))
    }

    /// First line of the banner printed by `pdftoppm -v`.
    pub fn version(&self) -> Result<String, KlartextError> {
        let program = self.config.pdftoppm();
        let output = Command::new(&program)
            .arg("-v")
            .output()
            .map_err(|err| launch_error(&program, err))?;
        // pdftoppm prints its banner to stderr.
        let raw = if output.stderr.is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        let first = String::from_utf8_lossy(&raw)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
        if first.is_empty() {
            return Err(KlartextError::Rasterize(
                "pdftoppm printed no version banner".to_owned(),
            ));
        }
        Ok(first)
    }

    fn run(
        &self,
        pdf: &Path,
        range: Option<(u32, u32)>,
    ) -> Result<Vec<DynamicImage>, KlartextError> {
        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join(PAGE_PREFIX);

        let program = self.config.pdftoppm();
        let mut command = Command::new(&program);
        command.arg("-png").arg("-r").arg(RASTER_DPI.to_string());
        if let Some((first, last)) = range {
            command
                .arg("-f")
                .arg(first.to_string())
                .arg("-l")
                .arg(last.to_string());
        }
        command.arg(pdf).arg(&prefix);

        let output = command
            .output()
            .map_err(|err| launch_error(&program, err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KlartextError::Rasterize(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut pages = page_files(workdir.path())?;
        sort_by_page_number(&mut pages);
        debug!(page_count = pages.len(), "Rasterization complete");

        let mut images = Vec::with_capacity(pages.len());
        for path in &pages {
            let img = image::open(path).map_err(|err| {
                KlartextError::Image(format!("failed to decode {}: {}", path.display(), err))
            })?;
            images.push(img);
        }
        Ok(images)
    }
}

/// Collect the PNG page files pdftoppm wrote into `dir`.
fn page_files(dir: &Path) -> Result<Vec<PathBuf>, KlartextError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "png") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Order page files by the numeric suffix pdftoppm appends. A lexical sort
/// would put `page-10.png` before `page-9.png`.
fn sort_by_page_number(files: &mut [PathBuf]) {
    files.sort_by_key(|path| page_number_of(path));
}

/// Numeric suffix of a pdftoppm output file name. Files without one sort
/// first.
fn page_number_of(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Map a spawn failure into a `Rasterize` error, naming the binary when the
/// OS reports it missing.
fn launch_error(program: &Path, err: std::io::Error) -> KlartextError {
    if err.kind() == std::io::ErrorKind::NotFound {
        KlartextError::Rasterize(format!(
            "pdftoppm not found at {}; the Poppler tools are not installed there",
            program.display()
        ))
    } else {
        KlartextError::Rasterize(format!("failed to launch {}: {}", program.display(), err))
    }
}
