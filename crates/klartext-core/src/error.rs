// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Klartext.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Klartext operations.
#[derive(Debug, Error)]
pub enum KlartextError {
    // -- Input validation --
    #[error("document not found: {}", .path.display())]
    DocumentNotFound { path: PathBuf },

    #[error("not a PDF (missing %PDF signature): {}", .path.display())]
    InvalidSignature { path: PathBuf },

    #[error("document not readable after {attempts} attempts ({source}): {}", .path.display())]
    DocumentLocked {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    // -- External toolchain --
    #[error("poppler directory not found: {}", .dir.display())]
    RasterizerMissing { dir: PathBuf },

    #[error("page rasterization failed: {0}")]
    Rasterize(String),

    #[error("page {page} was not rendered by the rasterizer")]
    PageNotRendered { page: u32 },

    #[error("OCR engine failed: {0}")]
    OcrEngine(String),

    // -- Processing --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KlartextError>;
