//! ZSoft PCX reader (internal). Read-only.
//!
//! Use top-level [`crate::decode_pcx`].

mod decode;
mod header;
mod rle;

pub(crate) use decode::decode;

use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::info::ImageInfo;
use crate::source::ByteSource;

/// Header-only probe.
pub(crate) fn probe(src: &mut dyn ByteSource) -> Result<ImageInfo, BitmapError> {
    let header = header::PcxHeader::parse(src)?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: ImageFormat::Pcx,
        bit_depth: header.bit_depth(),
        has_alpha: header.has_alpha(),
        compressed: header.rle,
    })
}
