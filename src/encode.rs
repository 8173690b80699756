use alloc::vec::Vec;

use crate::decode::{BgraView, CanonicalImage};
use crate::error::BitmapError;
use crate::format::ImageFormat;

/// Writer settings shared by the BMP and TGA encoders.
///
/// `bit_depth` takes the legacy depth codes: BMP accepts 8, 9 (8-bit RLE8),
/// 24 and 32; TGA accepts 24 and 32. Anything else falls back to 24.
///
/// The host option strings in [`FORMATS`](crate::FORMATS) still list
/// "16 bit" for both writers and "Greyscale" (64) for TGA. Those codes are
/// accepted and written as 24-bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    pub bit_depth: u32,
    pub rle: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            bit_depth: 24,
            rle: false,
        }
    }
}

impl SaveOptions {
    pub fn new(bit_depth: u32) -> Self {
        Self {
            bit_depth,
            rle: false,
        }
    }

    pub fn with_rle(mut self, rle: bool) -> Self {
        self.rle = rle;
        self
    }

    /// 32-bit when the image carries alpha, otherwise 24-bit.
    pub fn for_image(image: &CanonicalImage) -> Self {
        Self::new(if image.has_alpha { 32 } else { 24 })
    }

    /// Whether writing `format` with these options keeps the alpha channel.
    pub fn is_alpha_saved(&self, format: ImageFormat) -> bool {
        format.can_save() && self.bit_depth == 32
    }
}

/// Encode with the writer for `format`.
pub(crate) fn encode_to_vec(
    format: ImageFormat,
    image: &BgraView<'_>,
    options: &SaveOptions,
) -> Result<Vec<u8>, BitmapError> {
    match format {
        ImageFormat::Bmp => crate::bmp::encode(image, options),
        ImageFormat::Tga => crate::tga::encode(image, options),
        ImageFormat::Pcx => Err(BitmapError::UnsupportedVariant(
            "PCX is read-only".into(),
        )),
    }
}

/// Encode, reporting failure as `None` with the reason logged.
pub(crate) fn save_memory(
    format: ImageFormat,
    image: &BgraView<'_>,
    options: &SaveOptions,
) -> Option<Vec<u8>> {
    match encode_to_vec(format, image, options) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("{format:?} save failed: {e}");
            None
        }
    }
}

/// Encode and write to `path`, returning the byte count or 0 on failure.
#[cfg(feature = "std")]
pub(crate) fn save_file(
    format: ImageFormat,
    path: &std::path::Path,
    image: &BgraView<'_>,
    options: &SaveOptions,
) -> usize {
    let Some(bytes) = save_memory(format, image, options) else {
        return 0;
    };
    match std::fs::write(path, &bytes) {
        Ok(()) => bytes.len(),
        Err(e) => {
            log::warn!("{format:?} save to {} failed: {e}", path.display());
            0
        }
    }
}
