// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klartext-ocr: text extraction from scanned PDFs.
//
// Rasterizes pages through Poppler's `pdftoppm`, preprocesses them in memory
// (grayscale, zone cropping), and recognises the text by shelling out to the
// Tesseract engine. The `DocumentTextExtractor` in `extractor` ties the
// pieces together.

pub mod engine;
pub mod extractor;
pub mod page;
pub mod raster;
pub mod readiness;

// Re-export the primary structs so callers can use `klartext_ocr::DocumentTextExtractor` etc.
pub use engine::{TesseractConfig, TesseractEngine};
pub use extractor::{DocumentTextExtractor, ExtractorConfig};
pub use page::PageImage;
pub use raster::{PageRasterizer, PopplerConfig};
pub use readiness::ReadinessProbe;
