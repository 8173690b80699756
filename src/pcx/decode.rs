//! PCX reader: scanlines are expanded one at a time and split into planes;
//! 8-bit images resolve through the trailing VGA palette once every row is
//! in.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use super::header::{PcxHeader, PcxLayout};
use super::rle::Scanlines;
use crate::color::{Palette, unpack_indices};
use crate::decode::CanonicalImage;
use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::limits::{Limits, check_limits};
use crate::source::ByteSource;

/// Marker byte plus 256 RGB triples.
const VGA_PALETTE_LEN: usize = 769;

/// Canonical buffers must stay within a signed 32-bit byte count.
const MAX_BUFFER: u64 = 0x7FFF_FFFF;

pub(crate) fn decode(
    src: &mut dyn ByteSource,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, BitmapError> {
    let header = PcxHeader::parse(src)?;
    check_limits(limits, header.width, header.height)?;
    stop.check()?;

    let data = src.read_to_end()?;

    let (width, height) = (header.width, header.height);
    let out_len = u64::from(width) * 4 * u64::from(height);
    if out_len > MAX_BUFFER {
        return Err(BitmapError::DimensionsTooLarge { width, height });
    }
    let mut pixels = [0u8, 0, 0, 255].repeat(width as usize * height as usize);

    let w = width as usize;
    let bpl = usize::from(header.bytes_per_line);
    let palette = header.palette16();
    let mut lines = Scanlines::new(&data, header.rle);
    let mut line = vec![0u8; header.scanline_len()];
    let mut indices = vec![0u8; w];
    let mut indexed8 = if header.layout == PcxLayout::Indexed8 {
        Vec::with_capacity(w * height as usize)
    } else {
        Vec::new()
    };
    log::debug!(
        "PCX {:?}, {} bytes per scanline, {} data bytes",
        header.layout,
        line.len(),
        data.len()
    );

    for dst in pixels.chunks_exact_mut(w * 4) {
        lines.read_line(&mut line);
        match header.layout {
            PcxLayout::Indexed8 => {
                let n = w.min(bpl);
                indexed8.extend_from_slice(&line[..n]);
                indexed8.resize(indexed8.len() + (w - n), 0);
            }
            PcxLayout::Planar1 { planes } => {
                decode_planar1(&header, planes, &line, &palette, dst);
            }
            PcxLayout::Packed2 | PcxLayout::Packed4 => {
                let depth = u32::from(header.bits_per_plane);
                let n = w.min(bpl * (8 / depth as usize));
                unpack_indices(depth, &line[..bpl], &mut indices);
                for (px, &i) in dst.chunks_exact_mut(4).zip(&indices[..n]) {
                    px.copy_from_slice(&palette.get(usize::from(i)));
                }
            }
            PcxLayout::Rgb24 | PcxLayout::Rgba32 => {
                let alpha = header.layout == PcxLayout::Rgba32;
                for (x, px) in dst.chunks_exact_mut(4).take(bpl).enumerate() {
                    px[2] = line[x];
                    px[1] = line[bpl + x];
                    px[0] = line[bpl * 2 + x];
                    if alpha {
                        px[3] = line[bpl * 3 + x];
                    }
                }
            }
        }
    }

    if header.layout == PcxLayout::Indexed8 {
        let vga = find_vga_palette(&data, lines.position());
        let gray = header.is_gray();
        if vga.is_none() && !gray {
            log::warn!("PCX 8-bit image without a VGA palette, rendering as gray");
        }
        for (px, &i) in pixels.chunks_exact_mut(4).zip(&indexed8) {
            match &vga {
                Some(vga) if !gray => px.copy_from_slice(&vga.get(usize::from(i))),
                _ => px.copy_from_slice(&[i, i, i, 255]),
            }
        }
    }

    Ok(CanonicalImage::new(
        pixels,
        width,
        height,
        ImageFormat::Pcx,
        header.has_alpha(),
    ))
}

/// 1-bit planes combine into a 4-bit index, plane 0 least significant.
fn decode_planar1(header: &PcxHeader, planes: u8, line: &[u8], palette: &Palette, dst: &mut [u8]) {
    let bpl = usize::from(header.bytes_per_line);
    let mono = header.is_gray() && planes == 1;
    for (x, px) in dst.chunks_exact_mut(4).take(bpl * 8).enumerate() {
        let bit = 7 - (x & 7);
        let mut index = 0usize;
        for p in 0..usize::from(planes) {
            index |= usize::from((line[p * bpl + x / 8] >> bit) & 1) << p;
        }
        if mono {
            let v = if index & 1 != 0 { 255 } else { 0 };
            px.copy_from_slice(&[v, v, v, 255]);
        } else {
            px.copy_from_slice(&palette.get(index & 15));
        }
    }
}

/// The `0x0C` marker right after the image data wins; otherwise the last
/// 769 bytes are tried.
fn find_vga_palette(data: &[u8], image_end: usize) -> Option<Palette> {
    if data.len() < VGA_PALETTE_LEN {
        return None;
    }
    let start = if image_end + VGA_PALETTE_LEN <= data.len() && data[image_end] == 0x0C {
        image_end
    } else if data[data.len() - VGA_PALETTE_LEN] == 0x0C {
        data.len() - VGA_PALETTE_LEN
    } else {
        return None;
    };
    Some(Palette::from_rgb(&data[start + 1..start + VGA_PALETTE_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcx::header::tests::header;
    use crate::source::MemorySource;
    use enough::Unstoppable;

    fn run(data: &[u8]) -> CanonicalImage {
        decode(&mut MemorySource::new(data), None, &Unstoppable).unwrap()
    }

    fn vga(first: [u8; 3]) -> Vec<u8> {
        let mut pal = vec![0x0C];
        pal.extend_from_slice(&first);
        pal.resize(VGA_PALETTE_LEN, 0x11);
        pal
    }

    #[test]
    fn rgb_planes_per_scanline() {
        let mut data = header(2, 1, 8, 3, 2);
        // R plane, G plane, B plane
        data.extend_from_slice(&[10, 11, 20, 21, 30, 31]);
        let img = run(&data);
        assert_eq!(img.pixels(), &[30, 20, 10, 255, 31, 21, 11, 255]);
        assert!(!img.has_alpha);
    }

    #[test]
    fn rgba_planes_carry_alpha() {
        let mut data = header(1, 1, 8, 4, 1);
        data.extend_from_slice(&[0xC1, 1, 2, 3, 0xC1, 4]);
        let img = run(&data);
        assert_eq!(img.pixels(), &[3, 2, 1, 4]);
        assert!(img.has_alpha);
    }

    #[test]
    fn indexed_uses_palette_after_image() {
        let mut data = header(2, 1, 8, 1, 2);
        data.extend_from_slice(&[0xC2, 0]);
        data.extend_from_slice(&vga([1, 2, 3]));
        let img = run(&data);
        assert_eq!(img.pixels(), &[3, 2, 1, 255, 3, 2, 1, 255]);
    }

    #[test]
    fn indexed_falls_back_to_trailing_palette() {
        let mut data = header(1, 1, 8, 1, 1);
        data.extend_from_slice(&[1, 0xEE, 0xEE]);
        data.extend_from_slice(&vga([0, 0, 0]));
        let img = run(&data);
        assert_eq!(img.pixels(), &[0x11, 0x11, 0x11, 255]);
    }

    #[test]
    fn indexed_without_palette_is_gray() {
        let mut data = header(2, 1, 8, 1, 2);
        data.extend_from_slice(&[7, 9]);
        let img = run(&data);
        assert_eq!(img.pixels(), &[7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn gray_palette_info_ignores_vga() {
        let mut data = header(1, 1, 8, 1, 1);
        data[68] = 2;
        data.extend_from_slice(&[0x40]);
        data.extend_from_slice(&vga([1, 2, 3]));
        assert_eq!(run(&data).pixels(), &[0x40, 0x40, 0x40, 255]);
    }

    #[test]
    fn planar_ega_index() {
        // 4 planes, one byte each: x=0 sets planes 0 and 2 -> index 5
        let mut data = header(2, 1, 1, 4, 1);
        data[2] = 0;
        data.extend_from_slice(&[0x80, 0x00, 0x80, 0x40]);
        let img = run(&data);
        let ega = Palette::ega();
        assert_eq!(img.pixel(0, 0), Some(ega.get(5)));
        assert_eq!(img.pixel(1, 0), Some(ega.get(8)));
    }

    #[test]
    fn mono_gray_is_black_and_white() {
        let mut data = header(2, 1, 1, 1, 1);
        data[68] = 2;
        data.extend_from_slice(&[0x80]);
        let img = run(&data);
        assert_eq!(img.pixels(), &[255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn packed_4_bit_with_header_colormap() {
        let mut data = header(3, 1, 4, 1, 1);
        data[16 + 3..16 + 6].copy_from_slice(&[100, 110, 120]);
        data.extend_from_slice(&[0x10]);
        let img = run(&data);
        assert_eq!(img.pixel(0, 0), Some([120, 110, 100, 255]));
        assert_eq!(img.pixel(1, 0), Some([0, 0, 0, 255]));
        // beyond bytes-per-line: untouched
        assert_eq!(img.pixel(2, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn truncated_stream_leaves_black_rows() {
        let mut data = header(1, 2, 8, 3, 1);
        data.extend_from_slice(&[5, 6, 7]);
        let img = run(&data);
        assert_eq!(img.pixel(0, 0), Some([7, 6, 5, 255]));
        assert_eq!(img.pixel(0, 1), Some([0, 0, 0, 255]));
    }
}
