// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image preprocessing. Holds a single rasterized page in memory and
// applies the operations the OCR engine needs: zone cropping and grayscale
// conversion.

use image::{DynamicImage, ImageFormat};
use klartext_core::error::KlartextError;
use klartext_core::types::Zone;
use tracing::{debug, instrument};

/// A single rasterized page.
///
/// All operations are non-destructive: each method consumes `self` and
/// returns a new `PageImage` wrapping the transformed image, enabling method
/// chaining.
///
/// ```ignore
/// let prepared = PageImage::from_dynamic(page)
///     .crop(zone)
///     .grayscale();
/// ```
pub struct PageImage {
    /// The current working image.
    image: DynamicImage,
}

impl PageImage {
    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current page width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current page height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Crop the page to `zone`.
    ///
    /// The zone's origin and size are clamped to the page bounds; a zone
    /// reaching past the edge shrinks to what the page contains.
    #[instrument(skip(self), fields(x = zone.x, y = zone.y, width = zone.width, height = zone.height))]
    pub fn crop(self, zone: Zone) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = zone.x.min(img_w.saturating_sub(1));
        let safe_y = zone.y.min(img_h.saturating_sub(1));
        let safe_w = zone.width.min(img_w - safe_x);
        let safe_h = zone.height.min(img_h - safe_y);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping page");

        let cropped = self.image.crop_imm(safe_x, safe_y, safe_w, safe_h);
        Self { image: cropped }
    }

    /// Convert the page to grayscale (luma).
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        debug!("Converting to grayscale");
        Self {
            image: self.image.grayscale(),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current page as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, KlartextError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| KlartextError::Image(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}
