// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document text extraction pipeline. Ties the pieces together: path
// normalization and readiness checks, page rasterization through Poppler,
// grayscale preprocessing, and Tesseract recognition. Produces one text
// block per page in reading order, or the trimmed text of a single zone.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use klartext_core::error::KlartextError;
use klartext_core::types::{PageText, SegmentationMode, Zone};
use tracing::{debug, error, info, instrument, warn};

use crate::engine::{TesseractConfig, TesseractEngine};
use crate::page::PageImage;
use crate::raster::{PageRasterizer, PopplerConfig};
use crate::readiness::{ReadinessProbe, normalize_path};

/// Configuration for constructing a [`DocumentTextExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Where to find the Tesseract binary.
    pub tesseract: TesseractConfig,
    /// Where to find the Poppler tools.
    pub poppler: PopplerConfig,
    /// Open-retry behaviour for documents still being written.
    pub readiness: ReadinessProbe,
}

impl Default for ExtractorConfig {
    /// Probes the well-known Tesseract install locations and points Poppler
    /// at the bundled directory.
    fn default() -> Self {
        Self {
            tesseract: TesseractConfig::locate(),
            poppler: PopplerConfig::default(),
            readiness: ReadinessProbe::default(),
        }
    }
}

/// Extracts text from scanned PDFs by rasterizing pages and running OCR.
///
/// Tool locations are resolved once at construction; afterwards the
/// extractor is immutable, takes `&self` everywhere, and can be shared
/// across threads. Each call works in its own scoped temporary storage.
///
/// The string-returning methods ([`extract_document_text`] and
/// [`extract_zone_text`]) never fail: errors are reported once through the
/// diagnostic channel and collapsed to an empty string. Callers that need
/// the cause use the `Result` methods instead.
///
/// ```rust,no_run
/// use klartext_ocr::{DocumentTextExtractor, ExtractorConfig};
///
/// let extractor = DocumentTextExtractor::new(ExtractorConfig::default());
/// let text = extractor.extract_document_text("inbox/scan-0017.pdf", "deu");
/// println!("{text}");
/// ```
///
/// [`extract_document_text`]: Self::extract_document_text
/// [`extract_zone_text`]: Self::extract_zone_text
pub struct DocumentTextExtractor {
    engine: TesseractEngine,
    rasterizer: PageRasterizer,
    readiness: ReadinessProbe,
}

impl Default for DocumentTextExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl DocumentTextExtractor {
    /// Build an extractor from `config`.
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            engine: TesseractEngine::new(config.tesseract),
            rasterizer: PageRasterizer::new(config.poppler),
            readiness: config.readiness,
        }
    }

    // -- Full-document extraction ----------------------------------------------

    /// Extract every page of the document as a separate [`PageText`] record.
    ///
    /// The path is normalized and must point at a regular file; the document
    /// must pass the readiness probe (open retry plus `%PDF` signature); the
    /// configured Poppler directory must exist. Pages are rasterized at 300
    /// DPI, converted to grayscale, and recognised one by one in automatic
    /// segmentation mode. Page text is kept exactly as the engine produced
    /// it.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), language))]
    pub fn extract_pages(
        &self,
        path: impl AsRef<Path>,
        language: &str,
    ) -> Result<Vec<PageText>, KlartextError> {
        let pdf = self.validated_document(path.as_ref())?;

        let images = self.rasterizer.rasterize_document(&pdf)?;
        let total = images.len();
        info!(page_count = total, "Document rasterized");

        let mut pages = Vec::with_capacity(total);
        for (index, image) in images.into_iter().enumerate() {
            let number = index as u32 + 1;
            debug!(page = number, total, "Recognizing page");
            let prepared = PageImage::from_dynamic(image).grayscale();
            let text =
                self.engine
                    .recognize(prepared.as_dynamic(), language, SegmentationMode::Automatic)?;
            pages.push(PageText { number, text });
        }
        Ok(pages)
    }

    /// Extract the whole document as one string.
    ///
    /// Each page becomes a `--- Seite N ---` block; blocks are joined with a
    /// blank line.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), language))]
    pub fn extract_document(
        &self,
        path: impl AsRef<Path>,
        language: &str,
    ) -> Result<String, KlartextError> {
        let path = path.as_ref();
        let pages = self.extract_pages(path, language)?;
        let text = assemble_pages(&pages);
        info!(
            char_count = text.chars().count(),
            document = %file_name_of(path),
            "Text extraction complete"
        );
        Ok(text)
    }

    /// Total-function variant of [`extract_document`](Self::extract_document).
    ///
    /// Any failure is reported once through the diagnostic channel and
    /// yields an empty string.
    pub fn extract_document_text(&self, path: impl AsRef<Path>, language: &str) -> String {
        let path = path.as_ref();
        match self.extract_document(path, language) {
            Ok(text) => text,
            Err(err) => {
                report_failure(&err, path, None);
                String::new()
            }
        }
    }

    // -- Zone extraction -------------------------------------------------------

    /// Extract the text of one rectangular `zone` on `page` (1-based).
    ///
    /// Lighter validation than the full-document path: the file must exist,
    /// but no readiness probe or signature check runs, and the Poppler
    /// directory is not pre-checked. Zone extraction follows a full pass
    /// that has already vetted the document; a missing toolchain surfaces
    /// as the rasterizer's own error.
    ///
    /// The zone is clamped to the page bounds, converted to grayscale, and
    /// recognised as a single uniform text block. The result is trimmed.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), page, language))]
    pub fn extract_zone(
        &self,
        path: impl AsRef<Path>,
        page: u32,
        zone: Zone,
        language: &str,
    ) -> Result<String, KlartextError> {
        let pdf = normalize_path(path.as_ref());
        if !pdf.is_file() {
            return Err(KlartextError::DocumentNotFound { path: pdf });
        }

        let images = self.rasterizer.rasterize_range(&pdf, page, page)?;
        let Some(image) = images.into_iter().next() else {
            return Err(KlartextError::PageNotRendered { page });
        };

        let prepared = PageImage::from_dynamic(image).crop(zone).grayscale();
        debug!(
            width = prepared.width(),
            height = prepared.height(),
            "Zone prepared for recognition"
        );

        let text = self.engine.recognize(
            prepared.as_dynamic(),
            language,
            SegmentationMode::SingleBlock,
        )?;
        let trimmed = text.trim().to_owned();

        debug!(
            preview = %text_preview(&trimmed),
            char_count = trimmed.chars().count(),
            "Zone text extracted"
        );
        Ok(trimmed)
    }

    /// Total-function variant of [`extract_zone`](Self::extract_zone).
    ///
    /// Any failure is reported once through the diagnostic channel and
    /// yields an empty string. A page the rasterizer never produced logs as
    /// a warning; every other failure logs as an error.
    pub fn extract_zone_text(
        &self,
        path: impl AsRef<Path>,
        page: u32,
        zone: Zone,
        language: &str,
    ) -> String {
        let path = path.as_ref();
        match self.extract_zone(path, page, zone, language) {
            Ok(text) => text,
            Err(err) => {
                report_failure(&err, path, Some(page));
                String::new()
            }
        }
    }

    // -- Shared validation -----------------------------------------------------

    /// Full-document validation: normalize, require a regular file, probe
    /// readiness, require the Poppler directory.
    fn validated_document(&self, path: &Path) -> Result<PathBuf, KlartextError> {
        let pdf = normalize_path(path);
        if !pdf.is_file() {
            return Err(KlartextError::DocumentNotFound { path: pdf });
        }
        self.readiness.check_pdf(&pdf)?;
        if let Some(dir) = self.rasterizer.support_dir() {
            if !dir.is_dir() {
                return Err(KlartextError::RasterizerMissing {
                    dir: dir.to_path_buf(),
                });
            }
        }
        Ok(pdf)
    }
}

/// Marker line placed above each page in the assembled document text.
///
/// Downstream consumers match on the German `Seite` literal; it is a fixed
/// output token, not a localised display string.
fn page_header(number: u32) -> String {
    format!("--- Seite {number} ---")
}

/// Join page texts into the final document string: one header per page,
/// blocks separated by a blank line.
fn assemble_pages(pages: &[PageText]) -> String {
    let blocks: Vec<String> = pages
        .iter()
        .map(|page| format!("{}\n{}", page_header(page.number), page.text))
        .collect();
    blocks.join("\n\n")
}

/// First 50 characters for debug logging, with a trailing ellipsis when the
/// text goes on.
fn text_preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}

/// File name component for log context.
fn file_name_of(path: &Path) -> Cow<'_, str> {
    match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => path.to_string_lossy(),
    }
}

/// Report an extraction failure exactly once at the appropriate level.
fn report_failure(err: &KlartextError, path: &Path, page: Option<u32>) {
    let document = file_name_of(path);
    match err {
        KlartextError::PageNotRendered { .. } => {
            warn!(%document, page, error = %err, "Zone extraction produced no page");
        }
        _ => {
            error!(%document, page, error = %err, "Text extraction failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Extractor whose Poppler directory is `poppler_dir` and whose probe
    /// never sleeps. The Tesseract config stays unresolved; tests never get
    /// far enough to invoke the engine.
    fn test_extractor(poppler_dir: &Path) -> DocumentTextExtractor {
        DocumentTextExtractor::new(ExtractorConfig {
            tesseract: TesseractConfig::default(),
            poppler: PopplerConfig::from_dir(poppler_dir),
            readiness: ReadinessProbe {
                max_attempts: 3,
                delay: Duration::ZERO,
            },
        })
    }

    /// Counts warning- and error-level events so tests can pin the boundary
    /// contract: one diagnostic per failure, at the right level.
    #[derive(Clone, Default)]
    struct EventCounter {
        errors: Arc<AtomicUsize>,
        warnings: Arc<AtomicUsize>,
    }

    impl tracing::Subscriber for EventCounter {
        fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            let level = *event.metadata().level();
            if level == tracing::Level::ERROR {
                self.errors.fetch_add(1, Ordering::SeqCst);
            } else if level == tracing::Level::WARN {
                self.warnings.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _span: &tracing::span::Id) {}

        fn exit(&self, _span: &tracing::span::Id) {}
    }

    #[test]
    fn assemble_pages_formats_blocks() {
        let pages = vec![
            PageText {
                number: 1,
                text: "Erste Seite".to_owned(),
            },
            PageText {
                number: 2,
                text: "Zweite Seite".to_owned(),
            },
        ];
        assert_eq!(
            assemble_pages(&pages),
            "--- Seite 1 ---\nErste Seite\n\n--- Seite 2 ---\nZweite Seite"
        );
    }

    /// Page text goes into the assembled output untouched, trailing
    /// newlines included.
    #[test]
    fn assemble_pages_keeps_page_text_verbatim() {
        let pages = vec![PageText {
            number: 1,
            text: "Text mit Zeilenumbruch\n".to_owned(),
        }];
        assert_eq!(
            assemble_pages(&pages),
            "--- Seite 1 ---\nText mit Zeilenumbruch\n"
        );
    }

    #[test]
    fn assemble_pages_of_empty_document_is_empty() {
        assert_eq!(assemble_pages(&[]), "");
    }

    #[test]
    fn page_header_literal() {
        assert_eq!(page_header(7), "--- Seite 7 ---");
    }

    #[test]
    fn preview_passes_short_text_through() {
        assert_eq!(text_preview("Rechnung Nr. 17"), "Rechnung Nr. 17");
    }

    #[test]
    fn preview_truncates_on_character_boundaries() {
        let text = "ä".repeat(60);
        let preview = text_preview(&text);
        assert_eq!(preview, format!("{}...", "ä".repeat(50)));
    }

    #[test]
    fn missing_document_is_rejected_before_rasterization() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let err = extractor
            .extract_pages(dir.path().join("missing.pdf"), "deu")
            .unwrap_err();
        assert!(matches!(err, KlartextError::DocumentNotFound { .. }));
    }

    #[test]
    fn directory_path_is_rejected_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let err = extractor.extract_pages(dir.path(), "deu").unwrap_err();
        assert!(matches!(err, KlartextError::DocumentNotFound { .. }));
    }

    #[test]
    fn non_pdf_content_is_rejected_by_the_probe() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("letter.pdf");
        std::fs::write(&doc, b"plain text, not a PDF").unwrap();

        let extractor = test_extractor(dir.path());
        let err = extractor.extract_pages(&doc, "deu").unwrap_err();
        assert!(matches!(err, KlartextError::InvalidSignature { .. }));
    }

    #[test]
    fn missing_poppler_directory_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("scan.pdf");
        std::fs::write(&doc, b"%PDF-1.4\n").unwrap();

        let extractor = test_extractor(&dir.path().join("no-poppler-here"));
        let err = extractor.extract_pages(&doc, "deu").unwrap_err();
        assert!(matches!(err, KlartextError::RasterizerMissing { .. }));
    }

    #[test]
    fn document_boundary_collapses_failures_to_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let text = extractor.extract_document_text(dir.path().join("missing.pdf"), "deu");
        assert_eq!(text, "");
    }

    #[test]
    fn zone_on_missing_document_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let err = extractor
            .extract_zone(dir.path().join("missing.pdf"), 1, Zone::new(0, 0, 10, 10), "deu")
            .unwrap_err();
        assert!(matches!(err, KlartextError::DocumentNotFound { .. }));
    }

    /// The zone path goes straight to the rasterizer: a file that would fail
    /// the full-document signature check fails here with a rasterizer error
    /// instead.
    #[test]
    fn zone_extraction_skips_the_signature_check() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("letter.pdf");
        std::fs::write(&doc, b"plain text, not a PDF").unwrap();

        let extractor = test_extractor(&dir.path().join("no-poppler-here"));
        let err = extractor
            .extract_zone(&doc, 1, Zone::new(0, 0, 10, 10), "deu")
            .unwrap_err();
        assert!(matches!(err, KlartextError::Rasterize(_)));
    }

    #[test]
    fn zone_boundary_collapses_failures_to_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let text = extractor.extract_zone_text(
            dir.path().join("missing.pdf"),
            3,
            Zone::new(0, 0, 10, 10),
            "deu",
        );
        assert_eq!(text, "");
    }

    #[test]
    fn document_boundary_reports_exactly_one_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let counter = EventCounter::default();

        let text = tracing::subscriber::with_default(counter.clone(), || {
            extractor.extract_document_text(dir.path().join("missing.pdf"), "deu")
        });

        assert_eq!(text, "");
        assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zone_boundary_reports_exactly_one_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let counter = EventCounter::default();

        let text = tracing::subscriber::with_default(counter.clone(), || {
            extractor.extract_zone_text(
                dir.path().join("missing.pdf"),
                3,
                Zone::new(0, 0, 10, 10),
                "deu",
            )
        });

        assert_eq!(text, "");
        assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 0);
    }

    /// A page the rasterizer never produced is reported as a warning, not an
    /// error, and still exactly once.
    #[cfg(unix)]
    #[test]
    fn missing_page_reports_exactly_one_warning_event() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("scan.pdf");
        std::fs::write(&doc, b"%PDF-1.4\n").unwrap();

        // A pdftoppm that exits cleanly without writing any page files, as
        // the real tool does for a page past the end of the document.
        let pdftoppm = dir.path().join("pdftoppm");
        std::fs::write(&pdftoppm, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&pdftoppm, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = test_extractor(dir.path());
        let counter = EventCounter::default();

        let text = tracing::subscriber::with_default(counter.clone(), || {
            extractor.extract_zone_text(&doc, 99, Zone::new(0, 0, 10, 10), "deu")
        });

        assert_eq!(text, "");
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(counter.errors.load(Ordering::SeqCst), 0);
    }
}
