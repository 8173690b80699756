//! TGA header, image ID and colormap parsing.

use alloc::vec;

use crate::color::{BitfieldLayout, Palette};
use crate::error::BitmapError;
use crate::source::ByteSource;

pub(crate) const HEADER_LEN: usize = 18;

/// Image data class from the image-type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImageClass {
    ColorMapped,
    TrueColor,
    Grayscale,
}

/// How one stored pixel (or colormap entry) is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PixelKind {
    /// 8- or 16-bit colormap index, offset by the first-entry field.
    Indexed { wide: bool, origin: u16 },
    /// Gray byte, followed by an alpha byte when `alpha` is set.
    Gray { alpha: bool },
    /// X1R5G5B5 or A1R5G5B5.
    Rgb555 { alpha: bool },
    Bgr24,
    Bgra32,
}

impl PixelKind {
    fn direct(depth: u8, alpha_bits: u8) -> Self {
        match depth {
            15 => Self::Rgb555 { alpha: false },
            16 => Self::Rgb555 {
                alpha: alpha_bits > 0,
            },
            24 => Self::Bgr24,
            _ => Self::Bgra32,
        }
    }

    /// Resolve one stored pixel to BGRA. `src` holds at least
    /// [`TgaHeader::bytes_per_pixel`] bytes.
    pub(crate) fn resolve(self, src: &[u8], palette: &Palette) -> [u8; 4] {
        match self {
            Self::Indexed { wide, origin } => {
                let index = if wide {
                    u16::from_le_bytes([src[0], src[1]])
                } else {
                    u16::from(src[0])
                };
                // indices below the origin clamp like any other out-of-range index
                let slot = index.checked_sub(origin).map_or(usize::MAX, usize::from);
                palette.get(slot)
            }
            Self::Gray { alpha } => {
                let g = src[0];
                [g, g, g, if alpha { src[1] } else { 255 }]
            }
            Self::Rgb555 { alpha } => {
                let layout = if alpha {
                    BitfieldLayout::from_masks(0x7C00, 0x03E0, 0x001F, 0x8000)
                } else {
                    BitfieldLayout::RGB555
                };
                layout.resolve(u32::from(u16::from_le_bytes([src[0], src[1]])))
            }
            Self::Bgr24 => [src[0], src[1], src[2], 255],
            Self::Bgra32 => [src[0], src[1], src[2], src[3]],
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TgaHeader {
    pub width: u32,
    pub height: u32,
    pub class: ImageClass,
    pub rle: bool,
    pub depth: u8,
    pub colormap_type: u8,
    pub colormap_origin: u16,
    pub colormap_len: u16,
    pub colormap_depth: u8,
    pub alpha_bits: u8,
    pub right_to_left: bool,
    pub top_down: bool,
    /// 0 sequential, 1 two-way, 2 four-way.
    pub interleave: u8,
    pub id_len: u8,
}

impl TgaHeader {
    /// Parse and validate the fixed header. The cursor is left at the image
    /// ID field.
    pub(crate) fn parse(src: &mut dyn ByteSource) -> Result<Self, BitmapError> {
        let mut h = [0u8; HEADER_LEN];
        src.read_exact(&mut h)?;
        let le16 = |at: usize| u16::from_le_bytes([h[at], h[at + 1]]);

        let image_type = h[2];
        let (class, rle) = match image_type {
            1 => (ImageClass::ColorMapped, false),
            2 => (ImageClass::TrueColor, false),
            3 => (ImageClass::Grayscale, false),
            9 => (ImageClass::ColorMapped, true),
            10 => (ImageClass::TrueColor, true),
            11 => (ImageClass::Grayscale, true),
            other => {
                return Err(BitmapError::UnsupportedVariant(alloc::format!(
                    "TGA image type {other}"
                )));
            }
        };
        let descriptor = h[17];
        let header = Self {
            width: u32::from(le16(12)),
            height: u32::from(le16(14)),
            class,
            rle,
            depth: h[16],
            colormap_type: h[1],
            colormap_origin: le16(3),
            colormap_len: le16(5),
            colormap_depth: h[7],
            alpha_bits: descriptor & 0x0F,
            right_to_left: descriptor & 0x10 != 0,
            top_down: descriptor & 0x20 != 0,
            interleave: (descriptor >> 6) & 0x03,
            id_len: h[0],
        };
        log::trace!("TGA header: {header:?}");

        if header.width == 0 || header.height == 0 {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "TGA dimensions {}x{}",
                header.width,
                header.height
            )));
        }
        if header.interleave == 3 {
            return Err(BitmapError::UnsupportedVariant(
                "reserved TGA interleave mode".into(),
            ));
        }
        Ok(header)
    }

    fn has_colormap(&self) -> bool {
        self.colormap_type == 1 && self.colormap_len > 0
    }

    /// Skip the image ID and read the colormap (if any), then validate the
    /// pixel depth against the image class. The cursor is left at the pixel
    /// data.
    pub(crate) fn read_colormap(&self, src: &mut dyn ByteSource) -> Result<Palette, BitmapError> {
        src.seek_relative(i64::from(self.id_len))?;

        let mut palette = Palette::default();
        if self.has_colormap() {
            let entry_size = u32::from(self.colormap_depth).div_ceil(8);
            if entry_size == 0 {
                return Err(BitmapError::InvalidHeader("TGA colormap depth 0".into()));
            }
            if self.class == ImageClass::ColorMapped
                && !matches!(self.colormap_depth, 15 | 16 | 24 | 32)
            {
                return Err(BitmapError::UnsupportedVariant(alloc::format!(
                    "TGA colormap depth {}",
                    self.colormap_depth
                )));
            }
            let size = u32::from(self.colormap_len) * entry_size;
            let mut raw = vec![0u8; size as usize];
            src.read_exact(&mut raw)?;
            if self.class == ImageClass::ColorMapped {
                let kind = PixelKind::direct(self.colormap_depth, self.alpha_bits);
                let empty = Palette::default();
                palette = Palette::from_entries(
                    raw.chunks_exact(entry_size as usize)
                        .map(|e| kind.resolve(e, &empty))
                        .collect(),
                );
            }
        }
        self.validate_depth()?;
        Ok(palette)
    }

    fn validate_depth(&self) -> Result<(), BitmapError> {
        let ok = match self.class {
            ImageClass::ColorMapped => {
                if !self.has_colormap() {
                    return Err(BitmapError::InvalidHeader(
                        "color-mapped TGA without a colormap".into(),
                    ));
                }
                matches!(self.depth, 8 | 16)
            }
            ImageClass::Grayscale => matches!(self.depth, 8 | 16),
            ImageClass::TrueColor => matches!(self.depth, 15 | 16 | 24 | 32),
        };
        if !ok {
            return Err(BitmapError::UnsupportedVariant(alloc::format!(
                "{}-bit {:?} TGA",
                self.depth,
                self.class
            )));
        }
        Ok(())
    }

    pub(crate) fn bytes_per_pixel(&self) -> usize {
        usize::from(self.depth).div_ceil(8)
    }

    pub(crate) fn pixel_kind(&self) -> PixelKind {
        match self.class {
            ImageClass::ColorMapped => PixelKind::Indexed {
                wide: self.depth == 16,
                origin: self.colormap_origin,
            },
            ImageClass::Grayscale => PixelKind::Gray {
                alpha: self.depth == 16,
            },
            ImageClass::TrueColor => PixelKind::direct(self.depth, self.alpha_bits),
        }
    }

    pub(crate) fn has_alpha(&self) -> bool {
        match self.class {
            ImageClass::ColorMapped => {
                self.colormap_depth == 32 || (self.colormap_depth == 16 && self.alpha_bits > 0)
            }
            ImageClass::Grayscale => self.depth == 16,
            ImageClass::TrueColor => self.depth == 32 || (self.depth == 16 && self.alpha_bits > 0),
        }
    }

    /// Canonical row of stored row `file_y`, after interleave and flip.
    pub(crate) fn map_y(&self, file_y: u32) -> u32 {
        let h = self.height;
        let logical = match self.interleave {
            0 => file_y,
            1 => {
                let even = h.div_ceil(2);
                if file_y < even {
                    file_y * 2
                } else {
                    (file_y - even) * 2 + 1
                }
            }
            _ => {
                let counts = [(h + 3) / 4, (h + 2) / 4, (h + 1) / 4];
                let mut y = file_y;
                let mut lane = 0;
                while lane < 3 && y >= counts[lane] {
                    y -= counts[lane];
                    lane += 1;
                }
                y * 4 + lane as u32
            }
        };
        if self.top_down {
            logical
        } else {
            h - 1 - logical
        }
    }

    pub(crate) fn map_x(&self, file_x: u32) -> u32 {
        if self.right_to_left {
            self.width - 1 - file_x
        } else {
            file_x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::MemorySource;

    fn header(image_type: u8, depth: u8, descriptor: u8) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];
        h[2] = image_type;
        h[12] = 4;
        h[14] = 4;
        h[16] = depth;
        h[17] = descriptor;
        h
    }

    fn parse(h: &[u8]) -> Result<TgaHeader, BitmapError> {
        TgaHeader::parse(&mut MemorySource::new(h))
    }

    #[test]
    fn descriptor_bits() {
        let h = parse(&header(2, 32, 0x08 | 0x10 | 0x20 | 0x40)).unwrap();
        assert_eq!(h.alpha_bits, 8);
        assert!(h.right_to_left && h.top_down);
        assert_eq!(h.interleave, 1);
        assert!(h.has_alpha());
    }

    #[test]
    fn rejections() {
        let kind = |h: &[u8]| parse(h).unwrap_err().kind();
        assert_eq!(kind(&header(0, 24, 0)), ErrorKind::UnsupportedFile);
        assert_eq!(kind(&header(4, 24, 0)), ErrorKind::UnsupportedFile);
        assert_eq!(kind(&header(2, 24, 0xC0)), ErrorKind::UnsupportedFile);
        let mut zero = header(2, 24, 0);
        zero[12] = 0;
        assert_eq!(kind(&zero), ErrorKind::FileCorrupted);
        assert_eq!(kind(&header(2, 24, 0)[..10]), ErrorKind::ReadError);
    }

    #[test]
    fn depth_validation() {
        let check = |h: [u8; HEADER_LEN]| {
            let mut src = MemorySource::new(&h);
            let parsed = TgaHeader::parse(&mut src).unwrap();
            parsed.read_colormap(&mut src).map(|_| ())
        };
        assert_eq!(check(header(2, 8, 0)).unwrap_err().kind(), ErrorKind::UnsupportedFile);
        assert_eq!(check(header(3, 24, 0)).unwrap_err().kind(), ErrorKind::UnsupportedFile);
        assert_eq!(check(header(1, 8, 0)).unwrap_err().kind(), ErrorKind::FileCorrupted);
        assert!(check(header(3, 16, 0)).is_ok());
        assert!(check(header(2, 15, 0)).is_ok());
    }

    #[test]
    fn colormap_entries_resolve_to_bgra() {
        let mut data = header(1, 8, 0).to_vec();
        data[1] = 1;
        data[3] = 2; // origin
        data[5] = 2; // two entries
        data[7] = 24;
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let mut src = MemorySource::new(&data);
        let h = TgaHeader::parse(&mut src).unwrap();
        let pal = h.read_colormap(&mut src).unwrap();
        assert_eq!(pal.get(1), [4, 5, 6, 255]);
        let kind = h.pixel_kind();
        assert_eq!(kind.resolve(&[3], &pal), [4, 5, 6, 255]);
        // below the origin and past the end both clamp to entry 0
        assert_eq!(kind.resolve(&[0], &pal), [1, 2, 3, 255]);
        assert_eq!(kind.resolve(&[9], &pal), [1, 2, 3, 255]);
    }

    #[test]
    fn truncated_colormap_is_a_read_error() {
        let mut data = header(1, 8, 0).to_vec();
        data[1] = 1;
        data[5] = 4;
        data[7] = 32;
        data.extend_from_slice(&[0; 10]);
        let mut src = MemorySource::new(&data);
        let h = TgaHeader::parse(&mut src).unwrap();
        assert_eq!(h.read_colormap(&mut src).unwrap_err().kind(), ErrorKind::ReadError);
    }

    #[test]
    fn a1r5g5b5_alpha_bit() {
        let kind = PixelKind::Rgb555 { alpha: true };
        let pal = Palette::default();
        assert_eq!(kind.resolve(&[0x1F, 0x80], &pal), [255, 0, 0, 255]);
        assert_eq!(kind.resolve(&[0x1F, 0x00], &pal), [255, 0, 0, 0]);
        let opaque = PixelKind::Rgb555 { alpha: false };
        assert_eq!(opaque.resolve(&[0x00, 0x00], &pal), [0, 0, 0, 255]);
    }

    #[test]
    fn interleave_maps_rows() {
        let mut h = parse(&header(2, 24, 0x20 | 0x40)).unwrap();
        h.height = 5;
        let rows: alloc::vec::Vec<u32> = (0..5).map(|y| h.map_y(y)).collect();
        assert_eq!(rows, [0, 2, 4, 1, 3]);

        h.interleave = 2;
        h.height = 6;
        let rows: alloc::vec::Vec<u32> = (0..6).map(|y| h.map_y(y)).collect();
        assert_eq!(rows, [0, 4, 1, 5, 2, 3]);

        h.interleave = 0;
        h.top_down = false;
        assert_eq!(h.map_y(0), 5);
    }
}
