//! TGA reader: raw or packet-compressed pixels placed through the
//! descriptor's origin and interleave mapping.

use alloc::vec;

use enough::Stop;

use super::header::TgaHeader;
use super::rle::{MAX_PACKET, decode_packets};
use crate::decode::CanonicalImage;
use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::limits::{Limits, check_limits};
use crate::source::ByteSource;

pub(crate) fn decode(
    src: &mut dyn ByteSource,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, BitmapError> {
    let header = TgaHeader::parse(src)?;
    check_limits(limits, header.width, header.height)?;
    stop.check()?;

    let palette = header.read_colormap(src)?;
    let data = src.read_to_end()?;

    let (width, height) = (header.width, header.height);
    let out_len = u64::from(width) * 4 * u64::from(height);
    let out_len =
        u32::try_from(out_len).map_err(|_| BitmapError::DimensionsTooLarge { width, height })?;
    let bpp = header.bytes_per_pixel();
    let total = u64::from(width) * u64::from(height);

    // reject bodies too small for the declared geometry before allocating
    if header.rle {
        let smallest = total.div_ceil(MAX_PACKET as u64) * (1 + bpp as u64);
        if (data.len() as u64) < smallest {
            return Err(BitmapError::InvalidData(alloc::format!(
                "TGA packet stream of {} bytes cannot hold {total} pixels",
                data.len()
            )));
        }
    } else {
        let needed = total * bpp as u64;
        if (data.len() as u64) < needed {
            log::warn!("TGA pixel data short: {} of {needed} bytes", data.len());
            return Err(BitmapError::UnexpectedEof);
        }
    }

    let mut pixels = vec![0xFFu8; out_len as usize];

    let kind = header.pixel_kind();
    let mut put = |x: u32, y: u32, stored: &[u8]| {
        let dx = header.map_x(x) as usize;
        let dy = header.map_y(y) as usize;
        let at = (dy * width as usize + dx) * 4;
        pixels[at..at + 4].copy_from_slice(&kind.resolve(stored, &palette));
    };

    if header.rle {
        let stats = decode_packets(&data, bpp, total, |n, stored| {
            let x = (n % u64::from(width)) as u32;
            let y = (n / u64::from(width)) as u32;
            put(x, y, stored);
        });
        log::debug!(
            "TGA packets: {} pixels from {} of {} bytes",
            stats.pixels,
            stats.consumed,
            data.len()
        );
        if stats.pixels != total {
            return Err(BitmapError::InvalidData(alloc::format!(
                "TGA packet stream holds {} of {total} pixels",
                stats.pixels
            )));
        }
    } else {
        let stride = width as usize * bpp;
        for (y, row) in data.chunks_exact(stride).take(height as usize).enumerate() {
            for (x, stored) in row.chunks_exact(bpp).enumerate() {
                put(x as u32, y as u32, stored);
            }
        }
    }

    Ok(CanonicalImage::new(
        pixels,
        width,
        height,
        ImageFormat::Tga,
        header.has_alpha(),
    ))
}
