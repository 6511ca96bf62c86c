// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Klartext text extractor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolution used for all page rasterization, in dots per inch.
///
/// Zone coordinates are pixel offsets into pages rendered at this resolution;
/// changing it shifts every stored zone.
pub const RASTER_DPI: u32 = 300;

/// Language pack handed to the OCR engine when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "deu";

/// Magic bytes every well-formed PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A rectangular pixel region on a rasterized page.
///
/// Coordinates are relative to the top-left corner of a page rendered at
/// [`RASTER_DPI`]. Parses from and prints as `x,y,width,height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Zone {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Error returned when parsing a [`Zone`] from its `x,y,width,height` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid zone {input:?}: expected four comma-separated integers (x,y,width,height)")]
pub struct ZoneParseError {
    input: String,
}

impl FromStr for Zone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ZoneParseError {
                input: s.to_owned(),
            });
        }
        let parse = |part: &str| {
            part.parse::<u32>().map_err(|_| ZoneParseError {
                input: s.to_owned(),
            })
        };
        Ok(Self {
            x: parse(parts[0])?,
            y: parse(parts[1])?,
            width: parse(parts[2])?,
            height: parse(parts[3])?,
        })
    }
}

/// OCR output for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number, matching the header in the assembled output.
    pub number: u32,
    /// Raw engine output for the page, untrimmed.
    pub text: String,
}

/// Page segmentation strategy passed to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentationMode {
    /// Let the engine segment the page on its own (full-page extraction).
    Automatic,
    /// Treat the input as one uniform block of text (zone extraction).
    SingleBlock,
}

impl SegmentationMode {
    /// Extra command-line arguments selecting this mode.
    pub fn engine_args(&self) -> &'static [&'static str] {
        match self {
            Self::Automatic => &[],
            Self::SingleBlock => &["--oem", "3", "--psm", "6"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_parses_plain_form() {
        let zone: Zone = "10,20,300,40".parse().unwrap();
        assert_eq!(zone, Zone::new(10, 20, 300, 40));
    }

    #[test]
    fn zone_parses_with_spaces() {
        let zone: Zone = " 1, 2, 3, 4 ".parse().unwrap();
        assert_eq!(zone, Zone::new(1, 2, 3, 4));
    }

    /// Display and FromStr agree, so zones survive a round trip through
    /// their command-line form.
    #[test]
    fn zone_round_trips_through_display() {
        let zone = Zone::new(120, 340, 560, 78);
        let parsed: Zone = zone.to_string().parse().unwrap();
        assert_eq!(parsed, zone);
    }

    #[test]
    fn zone_rejects_wrong_arity() {
        assert!("1,2,3".parse::<Zone>().is_err());
        assert!("1,2,3,4,5".parse::<Zone>().is_err());
        assert!("".parse::<Zone>().is_err());
    }

    #[test]
    fn zone_rejects_non_numeric_parts() {
        let err = "1,2,wide,4".parse::<Zone>().unwrap_err();
        assert!(err.to_string().contains("1,2,wide,4"));
    }

    #[test]
    fn zone_rejects_negative_parts() {
        assert!("1,-2,3,4".parse::<Zone>().is_err());
    }

    #[test]
    fn zone_serializes_as_named_fields() {
        let zone = Zone::new(5, 6, 7, 8);
        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, r#"{"x":5,"y":6,"width":7,"height":8}"#);
    }

    #[test]
    fn page_text_round_trips_through_json() {
        let page = PageText {
            number: 3,
            text: "Rechnung Nr. 17\n".to_owned(),
        };
        let json = serde_json::to_string(&page).unwrap();
        let back: PageText = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }

    /// Automatic mode adds nothing; single-block mode pins the engine to one
    /// uniform text block.
    #[test]
    fn segmentation_mode_engine_args() {
        assert!(SegmentationMode::Automatic.engine_args().is_empty());
        assert_eq!(
            SegmentationMode::SingleBlock.engine_args(),
            &["--oem", "3", "--psm", "6"]
        );
    }
}
