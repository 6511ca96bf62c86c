// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klartext-core: error and domain type definitions shared across all crates.

pub mod error;
pub mod types;

pub use error::{KlartextError, Result};
pub use types::*;
