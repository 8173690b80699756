//! BMP reader: headers, palette, then uncompressed rows or an RLE stream,
//! all resolved into the canonical BGRA buffer.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use super::header::{BmpHeader, Compression};
use super::rle::{self, RleEnd};
use crate::color::{BitfieldLayout, Palette, unpack_indices};
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
    let header = BmpHeader::parse(src)?;
    check_limits(limits, header.width, header.height)?;
    stop.check()?;

    let palette = read_palette(src, &header)?;

    if u64::from(header.data_offset) < src.tell() {
        return Err(BitmapError::InvalidHeader(alloc::format!(
            "pixel data offset {} inside the headers",
            header.data_offset
        )));
    }
    src.seek(u64::from(header.data_offset))?;

    let stride = header.stride()?;
    let (width, height) = (header.width, header.height);
    let out_len = u64::from(width) * 4 * u64::from(height);
    let out_len =
        u32::try_from(out_len).map_err(|_| BitmapError::DimensionsTooLarge { width, height })?;

    let data = if header.compression.is_rle() {
        src.read_to_end()?
    } else {
        let total = u64::from(stride) * u64::from(height);
        let total =
            u32::try_from(total).map_err(|_| BitmapError::DimensionsTooLarge { width, height })?;
        if src.remaining() < u64::from(total) {
            log::warn!("BMP pixel data short: {} of {total} bytes", src.remaining());
            return Err(BitmapError::UnexpectedEof);
        }
        let mut data = vec![0u8; total as usize];
        src.read_exact(&mut data)?;
        data
    };

    let mut pixels = vec![0xFFu8; out_len as usize];

    match header.compression {
        Compression::Rle8 | Compression::Rle4 => {
            log::debug!("BMP {:?} stream of {} bytes", header.compression, data.len());
            let end = if header.compression == Compression::Rle8 {
                rle::decode_rle8(&data, &mut pixels, &palette, width, height, header.top_down)
            } else {
                rle::decode_rle4(&data, &mut pixels, &palette, width, height, header.top_down)
            };
            if end == RleEnd::Exhausted {
                log::warn!("BMP RLE stream ended without an end-of-bitmap marker");
            }
        }
        _ => decode_rows(&header, &palette, &data, stride as usize, &mut pixels),
    }

    Ok(CanonicalImage::new(
        pixels,
        width,
        height,
        ImageFormat::Bmp,
        header.has_alpha(),
    ))
}

fn read_palette(src: &mut dyn ByteSource, header: &BmpHeader) -> Result<Palette, BitmapError> {
    let Some(entries) = header.palette_entries()? else {
        return Ok(Palette::default());
    };
    let entry_size = header.palette_entry_size();
    let mut raw = vec![0u8; entries as usize * entry_size];
    src.read_exact(&mut raw)?;
    Ok(Palette::from_bgr(&raw, entry_size))
}

/// How one stored row maps to canonical pixels.
enum RowKind {
    Indexed(u32),
    Packed16(BitfieldLayout),
    Packed32(BitfieldLayout),
    Bgr24,
    Bgrx32,
}

impl RowKind {
    fn for_header(header: &BmpHeader) -> Self {
        let [r, g, b, a] = header.masks;
        let bitfields = BitfieldLayout::from_masks(r, g, b, a);
        match (header.bit_depth, header.compression.is_bitfields()) {
            (16, true) => Self::Packed16(bitfields),
            (16, false) => Self::Packed16(BitfieldLayout::RGB555),
            (24, _) => Self::Bgr24,
            (32, true) => Self::Packed32(bitfields),
            (32, false) => Self::Bgrx32,
            (depth, _) => Self::Indexed(u32::from(depth)),
        }
    }
}

fn decode_rows(
    header: &BmpHeader,
    palette: &Palette,
    data: &[u8],
    stride: usize,
    out: &mut [u8],
) {
    let width = header.width as usize;
    let height = header.height as usize;
    let kind = RowKind::for_header(header);
    log::debug!("BMP {}-bit rows, stride {stride}", header.bit_depth);

    let mut indices = vec![0u8; width];
    for (y, dst) in out.chunks_exact_mut(width * 4).enumerate() {
        let src_y = if header.top_down { y } else { height - 1 - y };
        let row = &data[src_y * stride..(src_y + 1) * stride];
        match kind {
            RowKind::Indexed(depth) => {
                unpack_indices(depth, row, &mut indices);
                for (px, &i) in dst.chunks_exact_mut(4).zip(&indices) {
                    px.copy_from_slice(&palette.get(usize::from(i)));
                }
            }
            RowKind::Packed16(layout) => {
                for (px, s) in dst.chunks_exact_mut(4).zip(row.chunks_exact(2)) {
                    let v = u16::from_le_bytes([s[0], s[1]]);
                    px.copy_from_slice(&layout.resolve(u32::from(v)));
                }
            }
            RowKind::Packed32(layout) => {
                for (px, s) in dst.chunks_exact_mut(4).zip(row.chunks_exact(4)) {
                    let v = u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
                    px.copy_from_slice(&layout.resolve(v));
                }
            }
            RowKind::Bgr24 => {
                for (px, s) in dst.chunks_exact_mut(4).zip(row.chunks_exact(3)) {
                    px.copy_from_slice(&[s[0], s[1], s[2], 255]);
                }
            }
            RowKind::Bgrx32 => {
                for (px, s) in dst.chunks_exact_mut(4).zip(row.chunks_exact(4)) {
                    px.copy_from_slice(&[s[0], s[1], s[2], 255]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::MemorySource;
    use enough::Unstoppable;

    struct Bmp {
        info_size: u32,
        width: i32,
        height: i32,
        bpp: u16,
        compression: u32,
        colors_used: u32,
        extra: Vec<u8>,
        pixels: Vec<u8>,
    }

    impl Bmp {
        fn new(width: i32, height: i32, bpp: u16) -> Self {
            Self {
                info_size: 40,
                width,
                height,
                bpp,
                compression: 0,
                colors_used: 0,
                extra: Vec::new(),
                pixels: Vec::new(),
            }
        }

        fn build(&self) -> Vec<u8> {
            let offset = 14 + self.info_size + self.extra.len() as u32;
            let mut out = Vec::new();
            out.extend_from_slice(b"BM");
            out.extend_from_slice(&(offset + self.pixels.len() as u32).to_le_bytes());
            out.extend_from_slice(&[0u8; 4]);
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&self.info_size.to_le_bytes());
            out.extend_from_slice(&self.width.to_le_bytes());
            out.extend_from_slice(&self.height.to_le_bytes());
            out.extend_from_slice(&1u16.to_le_bytes());
            out.extend_from_slice(&self.bpp.to_le_bytes());
            out.extend_from_slice(&self.compression.to_le_bytes());
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(&self.colors_used.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.resize(14 + self.info_size as usize, 0);
            out.extend_from_slice(&self.extra);
            out.extend_from_slice(&self.pixels);
            out
        }

        fn decode(&self) -> Result<CanonicalImage, BitmapError> {
            let data = self.build();
            decode(&mut MemorySource::new(&data), None, &Unstoppable)
        }
    }

    #[test]
    fn bottom_up_24_bit() {
        let mut bmp = Bmp::new(1, 2, 24);
        // bottom row first, each padded to 4 bytes
        bmp.pixels = vec![1, 2, 3, 0, 4, 5, 6, 0];
        let img = bmp.decode().unwrap();
        assert_eq!(img.pixels(), &[4, 5, 6, 255, 1, 2, 3, 255]);
        assert!(!img.has_alpha);
    }

    #[test]
    fn top_down_32_bit_forces_opaque() {
        let mut bmp = Bmp::new(2, -1, 32);
        bmp.pixels = vec![1, 2, 3, 0, 4, 5, 6, 7];
        let img = bmp.decode().unwrap();
        assert_eq!(img.pixels(), &[1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn indexed_1_bit_with_two_colors() {
        let mut bmp = Bmp::new(3, 1, 1);
        bmp.colors_used = 2;
        bmp.extra = vec![0, 0, 0, 0, 255, 255, 255, 0];
        bmp.pixels = vec![0b1010_0000, 0, 0, 0];
        let img = bmp.decode().unwrap();
        assert_eq!(
            img.pixels(),
            &[255, 255, 255, 255, 0, 0, 0, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn indexed_4_bit_clamps_bad_index() {
        let mut bmp = Bmp::new(2, 1, 4);
        bmp.colors_used = 2;
        bmp.extra = vec![9, 8, 7, 0, 1, 2, 3, 0];
        bmp.pixels = vec![0x1F, 0, 0, 0];
        let img = bmp.decode().unwrap();
        assert_eq!(img.pixels(), &[1, 2, 3, 255, 9, 8, 7, 255]);
    }

    #[test]
    fn core_header_uses_three_byte_palette() {
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&(14u32 + 12 + 6).to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());
        for v in [2u16, 1, 1, 1] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[10, 20, 30, 40, 50, 60]);
        data.extend_from_slice(&[0b0100_0000, 0, 0, 0]);
        let img = decode(&mut MemorySource::new(&data), None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn rgb555_without_masks() {
        let mut bmp = Bmp::new(1, 1, 16);
        bmp.pixels = vec![0x00, 0x7C, 0, 0];
        let img = bmp.decode().unwrap();
        assert_eq!(img.pixels(), &[0, 0, 255, 255]);
    }

    #[test]
    fn alpha_bitfields_in_v4_header() {
        let mut bmp = Bmp::new(1, 1, 32);
        bmp.info_size = 108;
        bmp.compression = 3;
        let mut data = bmp.build();
        // masks live at 54..70 inside the V4 header
        for (i, m) in [0x00FF_0000u32, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000]
            .iter()
            .enumerate()
        {
            data[54 + i * 4..58 + i * 4].copy_from_slice(&m.to_le_bytes());
        }
        data.extend_from_slice(&[10, 20, 30, 40]);
        let img = decode(&mut MemorySource::new(&data), None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[10, 20, 30, 40]);
        assert!(img.has_alpha);
    }

    #[test]
    fn rle8_skipped_pixels_stay_white() {
        let mut bmp = Bmp::new(2, 1, 8);
        bmp.compression = 1;
        bmp.colors_used = 1;
        bmp.extra = vec![0, 0, 0, 0];
        bmp.pixels = vec![1, 0, 0, 1];
        let img = bmp.decode().unwrap();
        assert_eq!(img.pixels(), &[0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn header_only_large_image_fails_before_allocating() {
        let bmp = Bmp::new(30000, 30000, 24);
        assert!(matches!(bmp.decode(), Err(BitmapError::UnexpectedEof)));
    }

    #[test]
    fn oversized_rle_is_rejected_before_reading_the_stream() {
        let mut bmp = Bmp::new(40000, 40000, 8);
        bmp.compression = 1;
        bmp.colors_used = 1;
        bmp.extra = vec![0, 0, 0, 0];
        bmp.pixels = vec![0, 1];
        let err = bmp.decode().unwrap_err();
        assert!(matches!(err, BitmapError::DimensionsTooLarge { .. }));
        assert_eq!(err.kind(), ErrorKind::FileCorrupted);
    }

    #[test]
    fn truncated_pixels_are_a_read_error() {
        let mut bmp = Bmp::new(2, 2, 24);
        bmp.pixels = vec![0; 10];
        assert_eq!(bmp.decode().unwrap_err().kind(), ErrorKind::ReadError);
    }

    #[test]
    fn truncated_palette_is_a_read_error() {
        let mut bmp = Bmp::new(2, 2, 8);
        bmp.colors_used = 4;
        bmp.extra = vec![0; 6];
        let mut data = bmp.build();
        data.truncate(14 + 40 + 6);
        let err = decode(&mut MemorySource::new(&data), None, &Unstoppable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadError);
    }

    #[test]
    fn data_offset_inside_headers_is_corrupt() {
        let mut bmp = Bmp::new(1, 1, 24);
        bmp.pixels = vec![0; 4];
        let mut data = bmp.build();
        data[10..14].copy_from_slice(&20u32.to_le_bytes());
        let err = decode(&mut MemorySource::new(&data), None, &Unstoppable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileCorrupted);
    }

    #[test]
    fn oversized_image_fails_before_allocation() {
        let bmp = Bmp::new(70_000, 70_000, 24);
        assert_eq!(bmp.decode().unwrap_err().kind(), ErrorKind::FileCorrupted);
    }

    #[test]
    fn limits_are_enforced() {
        let mut bmp = Bmp::new(4, 4, 24);
        bmp.pixels = vec![0; 48];
        let data = bmp.build();
        let limits = Limits {
            max_pixels: Some(8),
            ..Default::default()
        };
        let err = decode(&mut MemorySource::new(&data), Some(&limits), &Unstoppable).unwrap_err();
        assert!(matches!(err, BitmapError::LimitExceeded(_)));
    }
}
