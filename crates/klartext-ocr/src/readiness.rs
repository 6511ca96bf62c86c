// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document readiness checks for incoming PDFs.
//
// A document dropped into a watched folder may still be mid-write when
// extraction starts. The probe opens the file and verifies the `%PDF`
// signature, retrying a few times with a pause when the open or read itself
// fails. A readable file with the wrong signature is rejected immediately.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use klartext_core::error::KlartextError;
use klartext_core::types::PDF_MAGIC;
use tracing::{debug, warn};

/// Open-retry behaviour for documents that may still be being written.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    /// Maximum open attempts before declaring the document locked.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl ReadinessProbe {
    /// Check that `path` is openable and carries the `%PDF` signature.
    ///
    /// An open or read failure counts as one attempt and is retried after
    /// [`delay`](Self::delay); once the attempts are exhausted the document
    /// is reported as [`KlartextError::DocumentLocked`]. A file that opens
    /// but does not start with `%PDF` fails as
    /// [`KlartextError::InvalidSignature`] without consuming the remaining
    /// attempts.
    pub fn check_pdf(&self, path: &Path) -> Result<(), KlartextError> {
        let mut last_err: Option<std::io::Error> = None;
        for attempt in 1..=self.max_attempts {
            match read_signature(path) {
                Ok(signature) => {
                    if signature == *PDF_MAGIC {
                        debug!(attempt, "PDF signature verified");
                        return Ok(());
                    }
                    return Err(KlartextError::InvalidSignature {
                        path: path.to_path_buf(),
                    });
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "document not readable yet, may still be being written"
                    );
                    last_err = Some(err);
                    if attempt < self.max_attempts {
                        std::thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(KlartextError::DocumentLocked {
            path: path.to_path_buf(),
            attempts: self.max_attempts,
            source: last_err.unwrap_or_else(|| std::io::Error::other("no attempts made")),
        })
    }
}

/// First four bytes of the file. Shorter files yield what they have, which
/// then fails the signature comparison.
fn read_signature(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut signature = Vec::with_capacity(PDF_MAGIC.len());
    file.take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut signature)?;
    Ok(signature)
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding component. Purely textual, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // A `..` directly under the root stays at the root.
                Some(Component::RootDir) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(Component::CurDir);
    }
    normalized
}
