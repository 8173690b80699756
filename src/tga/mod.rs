//! Truevision TGA reader and writer (internal).
//!
//! Use top-level [`crate::decode_tga`], [`crate::encode_tga`], etc.

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
    let header = header::TgaHeader::parse(src)?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: ImageFormat::Tga,
        bit_depth: u32::from(header.depth),
        has_alpha: header.has_alpha(),
        compressed: header.rle,
    })
}
