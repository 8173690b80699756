//! TGA writer: 24-bit BGR or 32-bit BGRA true-color, raw or packed,
//! stored bottom-up.

use alloc::vec::Vec;

use super::header::HEADER_LEN;
use super::rle::encode_packets;
use crate::decode::BgraView;
use crate::encode::SaveOptions;
use crate::error::BitmapError;

/// Bytes written per pixel: 4 for depth 32, otherwise 3.
fn bytes_per_pixel(options: &SaveOptions) -> usize {
    if options.bit_depth == 32 { 4 } else { 3 }
}

pub(crate) fn encode(image: &BgraView<'_>, options: &SaveOptions) -> Result<Vec<u8>, BitmapError> {
    let (width, height) = (image.width, image.height);
    let (Ok(w16), Ok(h16)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(BitmapError::DimensionsTooLarge { width, height });
    };
    let bpp = bytes_per_pixel(options);

    let mut header = [0u8; HEADER_LEN];
    header[2] = if options.rle { 10 } else { 2 };
    header[12..14].copy_from_slice(&w16.to_le_bytes());
    header[14..16].copy_from_slice(&h16.to_le_bytes());
    header[16] = (bpp * 8) as u8;
    header[17] = if bpp == 4 { 8 } else { 0 };

    let mut body = Vec::with_capacity(width as usize * height as usize * bpp);
    for y in (0..height).rev() {
        for p in image.row(y).chunks_exact(4) {
            body.extend_from_slice(&p[..bpp]);
        }
    }

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&header);
    if options.rle {
        encode_packets(&body, bpp, &mut out);
    } else {
        out.extend_from_slice(&body);
    }
    log::debug!(
        "TGA encoded {width}x{height}, {}-bit{}, {} bytes",
        bpp * 8,
        if options.rle { " packed" } else { "" },
        out.len()
    );
    Ok(out)
}
