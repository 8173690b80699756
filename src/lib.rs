//! # zenlegacy
//!
//! BMP, TGA and PCX decoding into one canonical pixel buffer, plus BMP and
//! TGA encoding.
//!
//! ## Canonical Output
//!
//! Every decode produces a [`CanonicalImage`]: 32 bits per pixel in
//! B, G, R, A byte order, rows top to bottom, `bytes_per_line == width * 4`.
//! Orientation flags, palettes, bitfield masks and run-length streams are all
//! resolved during decode. Sources without alpha come out opaque.
//!
//! ## Supported Formats
//!
//! ### BMP
//! - Core (12-byte) and info (40/52/56/108/124-byte) headers
//! - 1/4/8-bit indexed, RLE4 and RLE8, 16/32-bit bitfields, 16-bit 5-5-5,
//!   24-bit BGR, 32-bit BGRX
//! - Writes 8-bit gray (optionally RLE8), 24-bit and 32-bit
//!
//! ### TGA
//! - Color-mapped, true-color and grayscale, raw or packet-compressed
//! - All origins and the two-way/four-way interleave modes
//! - Writes 24-bit and 32-bit, raw or packet-compressed
//!
//! ### PCX (read-only)
//! - 1-bit planar (1 to 4 planes), 2/4-bit packed, 8-bit with VGA palette,
//!   24/32-bit planar RGB(A)
//!
//! ## Non-Goals
//!
//! - JPEG/PNG payloads embedded in BMP
//! - Color management and ICC profiles
//! - Preserving palettes across a decode/encode cycle
//!
//! ## Errors
//!
//! Decoding returns [`BitmapError`]; [`BitmapError::kind`] folds it into the
//! four-way [`ErrorKind`] used by legacy hosts. Saving never returns an
//! error: failures come back as `None` (or `0` bytes written) and the reason
//! is logged through the `log` facade.
//!
//! ## Usage
//!
//! ```no_run
//! use zenlegacy::{DecodeRequest, ImageInfo, SaveOptions};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your BMP/TGA/PCX bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.format);
//!
//! let image = DecodeRequest::new(data).decode(Unstoppable)?;
//!
//! // Re-encode as TGA, keeping alpha when the source had it
//! let options = SaveOptions::for_image(&image).with_rle(true);
//! let tga = zenlegacy::encode_tga(&image.view(), &options);
//! # Ok::<(), zenlegacy::BitmapError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod color;
mod decode;
mod encode;
mod error;
mod format;
mod info;
mod limits;
mod source;

pub mod codec;

mod bmp;
mod pcx;
mod tga;

use alloc::vec::Vec;

// Re-exports
pub use codec::{BmpCodec, Codec, FORMATS, FormatDescriptor, PcxCodec, TgaCodec};
pub use color::{Bitfield, BitfieldLayout, ChannelMasks, EGA_PALETTE, Palette};
pub use decode::{BgraView, CanonicalImage, DecodeRequest};
pub use encode::SaveOptions;
pub use enough::{Stop, Unstoppable};
pub use error::{BitmapError, ErrorKind};
pub use format::ImageFormat;
pub use info::ImageInfo;
pub use limits::Limits;
#[cfg(feature = "std")]
pub use source::FileSource;
pub use source::{ByteSource, MemorySource};

// ── Decode ───────────────────────────────────────────────────────────

/// Decode any supported format, detected from the leading bytes.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::new(data).decode(stop)
}

/// Decode BMP data.
pub fn decode_bmp(data: &[u8], stop: impl Stop) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::new(data)
        .with_format(ImageFormat::Bmp)
        .decode(stop)
}

/// Decode TGA data.
pub fn decode_tga(data: &[u8], stop: impl Stop) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::new(data)
        .with_format(ImageFormat::Tga)
        .decode(stop)
}

/// Decode PCX data.
pub fn decode_pcx(data: &[u8], stop: impl Stop) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::new(data)
        .with_format(ImageFormat::Pcx)
        .decode(stop)
}

/// Decode a file of any supported format.
///
/// Use [`DecodeRequest::from_path`] to apply [`Limits`].
#[cfg(feature = "std")]
pub fn decode_file(
    path: impl AsRef<std::path::Path>,
    stop: impl Stop,
) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::from_path(path.as_ref()).decode(stop)
}

/// Decode a BMP file through positioned reads.
#[cfg(feature = "std")]
pub fn decode_bmp_file(
    path: impl AsRef<std::path::Path>,
    stop: impl Stop,
) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::from_path(path.as_ref())
        .with_format(ImageFormat::Bmp)
        .decode(stop)
}

/// Decode a TGA file.
#[cfg(feature = "std")]
pub fn decode_tga_file(
    path: impl AsRef<std::path::Path>,
    stop: impl Stop,
) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::from_path(path.as_ref())
        .with_format(ImageFormat::Tga)
        .decode(stop)
}

/// Decode a PCX file.
#[cfg(feature = "std")]
pub fn decode_pcx_file(
    path: impl AsRef<std::path::Path>,
    stop: impl Stop,
) -> Result<CanonicalImage, BitmapError> {
    DecodeRequest::from_path(path.as_ref())
        .with_format(ImageFormat::Pcx)
        .decode(stop)
}

// ── Encode ───────────────────────────────────────────────────────────

/// Encode to BMP. `None` on failure.
pub fn encode_bmp(image: &BgraView<'_>, options: &SaveOptions) -> Option<Vec<u8>> {
    encode::save_memory(ImageFormat::Bmp, image, options)
}

/// Encode to TGA. `None` on failure.
pub fn encode_tga(image: &BgraView<'_>, options: &SaveOptions) -> Option<Vec<u8>> {
    encode::save_memory(ImageFormat::Tga, image, options)
}

/// Write a BMP file, returning the bytes written (0 on failure).
#[cfg(feature = "std")]
pub fn save_bmp_file(
    path: impl AsRef<std::path::Path>,
    image: &BgraView<'_>,
    options: &SaveOptions,
) -> usize {
    encode::save_file(ImageFormat::Bmp, path.as_ref(), image, options)
}

/// Write a TGA file, returning the bytes written (0 on failure).
#[cfg(feature = "std")]
pub fn save_tga_file(
    path: impl AsRef<std::path::Path>,
    image: &BgraView<'_>,
    options: &SaveOptions,
) -> usize {
    encode::save_file(ImageFormat::Tga, path.as_ref(), image, options)
}
