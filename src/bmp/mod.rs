//! Windows bitmap reader and writer (internal).
//!
//! Use top-level [`crate::decode_bmp`], [`crate::encode_bmp`], etc.

mod decode;
mod encode;
mod header;
mod rle;

pub(crate) use decode::decode;
pub(crate) use encode::encode;

use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::info::ImageInfo;
use crate::source::ByteSource;

/// Header-only probe.
pub(crate) fn probe(src: &mut dyn ByteSource) -> Result<ImageInfo, BitmapError> {
    let header = header::BmpHeader::parse(src)?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: ImageFormat::Bmp,
        bit_depth: u32::from(header.bit_depth),
        has_alpha: header.has_alpha(),
        compressed: header.compression.is_rle(),
    })
}
