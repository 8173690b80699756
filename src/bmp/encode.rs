//! BMP writer: 8-bit gray (optionally RLE8), 24-bit BGR and 32-bit BGRA.
//!
//! 32-bit output carries a V4 header with explicit channel masks so the
//! alpha byte is read back as alpha.

use alloc::vec::Vec;

use super::header::{Compression, FILE_HEADER_LEN, INFO_HEADER_LEN};
use super::rle;
use crate::color::luma;
use crate::decode::BgraView;
use crate::encode::SaveOptions;
use crate::error::BitmapError;

/// Output layouts the writer produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BmpDepth {
    Gray8,
    Gray8Rle,
    Bgr24,
    Bgra32,
}

impl BmpDepth {
    /// Depth codes 8, 9 (8-bit RLE8), 24 and 32; anything else writes 24-bit.
    pub(crate) fn from_options(options: &SaveOptions) -> Self {
        match options.bit_depth {
            8 if options.rle => Self::Gray8Rle,
            8 => Self::Gray8,
            9 => Self::Gray8Rle,
            32 => Self::Bgra32,
            _ => Self::Bgr24,
        }
    }

    fn bits(self) -> u16 {
        match self {
            Self::Gray8 | Self::Gray8Rle => 8,
            Self::Bgr24 => 24,
            Self::Bgra32 => 32,
        }
    }
}

pub(crate) fn encode(image: &BgraView<'_>, options: &SaveOptions) -> Result<Vec<u8>, BitmapError> {
    let depth = BmpDepth::from_options(options);
    let (width, height) = (image.width, image.height);
    let too_large = || BitmapError::DimensionsTooLarge { width, height };
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(too_large());
    }

    let stride = (u64::from(width) * u64::from(depth.bits())).div_ceil(32) * 4;
    let palette_len: u32 = if depth.bits() == 8 { 256 * 4 } else { 0 };
    let info_size = if depth == BmpDepth::Bgra32 {
        V4_HEADER_LEN
    } else {
        INFO_HEADER_LEN
    };
    let data_offset = FILE_HEADER_LEN + info_size + palette_len;

    let pixel_data = if depth == BmpDepth::Gray8Rle {
        encode_rle8(image)
    } else {
        let size = usize::try_from(stride * u64::from(height)).map_err(|_| too_large())?;
        let mut data = Vec::with_capacity(size);
        // bottom-up
        for y in (0..height).rev() {
            let row = image.row(y);
            match depth {
                BmpDepth::Gray8 | BmpDepth::Gray8Rle => {
                    data.extend(row.chunks_exact(4).map(|p| luma(p[2], p[1], p[0])));
                }
                BmpDepth::Bgr24 => {
                    for p in row.chunks_exact(4) {
                        data.extend_from_slice(&p[..3]);
                    }
                }
                BmpDepth::Bgra32 => data.extend_from_slice(row),
            }
            let row_end = data.len().next_multiple_of(4);
            data.resize(row_end, 0);
        }
        data
    };

    let file_size = u64::from(data_offset) + pixel_data.len() as u64;
    let file_size = u32::try_from(file_size).map_err(|_| too_large())?;
    let header = BmpFileHeader {
        file_size,
        data_offset,
        width,
        height,
        info_size,
        bits: depth.bits(),
        compression: match depth {
            BmpDepth::Gray8Rle => Compression::Rle8,
            BmpDepth::Bgra32 => Compression::Bitfields,
            _ => Compression::Rgb,
        },
        image_size: pixel_data.len() as u32,
        colors_used: if depth.bits() == 8 { 256 } else { 0 },
    };

    let mut out = Vec::with_capacity(file_size as usize);
    header.write(&mut out);
    if palette_len > 0 {
        for i in 0..=255u8 {
            out.extend_from_slice(&[i, i, i, 0]);
        }
    }
    out.extend_from_slice(&pixel_data);
    log::debug!("BMP encoded {width}x{height} as {depth:?}, {file_size} bytes");
    Ok(out)
}

fn encode_rle8(image: &BgraView<'_>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut gray = Vec::with_capacity(image.width as usize);
    for y in (0..image.height).rev() {
        gray.clear();
        gray.extend(image.row(y).chunks_exact(4).map(|p| luma(p[2], p[1], p[0])));
        rle::encode_rle8_row(&gray, &mut out);
        rle::push_end_of_line(&mut out);
    }
    rle::push_end_of_bitmap(&mut out);
    out
}

/// BITMAPV4HEADER size.
const V4_HEADER_LEN: u32 = 108;

/// `'sRGB'` color space tag.
const LCS_SRGB: u32 = 0x7352_4742;

struct BmpFileHeader {
    file_size: u32,
    data_offset: u32,
    info_size: u32,
    width: u32,
    height: u32,
    bits: u16,
    compression: Compression,
    image_size: u32,
    colors_used: u32,
}

impl BmpFileHeader {
    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]); // reserved
        out.extend_from_slice(&self.data_offset.to_le_bytes());

        out.extend_from_slice(&self.info_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes()); // positive = bottom-up
        out.extend_from_slice(&1u16.to_le_bytes()); // planes
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.compression.tag().to_le_bytes());
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&2835u32.to_le_bytes()); // 72 DPI
        out.extend_from_slice(&2835u32.to_le_bytes());
        out.extend_from_slice(&self.colors_used.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // important colors

        if self.info_size == V4_HEADER_LEN {
            for mask in [0x00FF_0000u32, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000] {
                out.extend_from_slice(&mask.to_le_bytes());
            }
            out.extend_from_slice(&LCS_SRGB.to_le_bytes());
            // endpoints and gamma, unused for sRGB
            out.extend_from_slice(&[0u8; 48]);
        }
    }
}
