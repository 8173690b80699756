use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::source::{ByteSource, MemorySource};

/// Header-level facts about an image, read without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Stored bits per pixel (all planes, for PCX).
    pub bit_depth: u32,
    pub has_alpha: bool,
    /// Pixel data is run-length encoded.
    pub compressed: bool,
}

impl ImageInfo {
    /// Probe an in-memory image, detecting its format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BitmapError> {
        let format = ImageFormat::detect(data).ok_or(BitmapError::UnrecognizedFormat)?;
        probe(format, &mut MemorySource::new(data))
    }
}

/// Read just the header of `format` from `src`.
pub(crate) fn probe(format: ImageFormat, src: &mut dyn ByteSource) -> Result<ImageInfo, BitmapError> {
    match format {
        ImageFormat::Bmp => crate::bmp::probe(src),
        ImageFormat::Tga => crate::tga::probe(src),
        ImageFormat::Pcx => crate::pcx::probe(src),
    }
}
