//! PCX 128-byte header.

use crate::color::Palette;
use crate::error::BitmapError;
use crate::source::ByteSource;

pub(crate) const HEADER_LEN: usize = 128;

/// Largest width or height accepted.
const MAX_DIMENSION: i32 = 32_768;

/// `palette_info` value marking a grayscale image.
const PALETTE_GRAY: u16 = 2;

/// Supported bits-per-plane / plane-count combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PcxLayout {
    /// 1 bit per plane, 1 to 4 planes combined into a 16-color index.
    Planar1 { planes: u8 },
    Packed2,
    Packed4,
    /// 8-bit indices into the trailing VGA palette.
    Indexed8,
    /// Separate R, G, B planes.
    Rgb24,
    /// Separate R, G, B, A planes.
    Rgba32,
}

impl PcxLayout {
    fn from_bits(bits: u8, planes: u8) -> Option<Self> {
        Some(match (bits, planes) {
            (1, 1..=4) => Self::Planar1 { planes },
            (2, 1) => Self::Packed2,
            (4, 1) => Self::Packed4,
            (8, 1) => Self::Indexed8,
            (8, 3) => Self::Rgb24,
            (8, 4) => Self::Rgba32,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PcxHeader {
    pub version: u8,
    pub rle: bool,
    pub bits_per_plane: u8,
    pub planes: u8,
    pub width: u32,
    pub height: u32,
    /// Bytes per scanline of one plane.
    pub bytes_per_line: u16,
    pub palette_info: u16,
    pub layout: PcxLayout,
    pub colormap: [u8; 48],
}

impl PcxHeader {
    pub(crate) fn parse(src: &mut dyn ByteSource) -> Result<Self, BitmapError> {
        let mut h = [0u8; HEADER_LEN];
        src.read_exact(&mut h)?;
        let le16 = |at: usize| u16::from_le_bytes([h[at], h[at + 1]]);

        if h[0] != 0x0A {
            return Err(BitmapError::UnrecognizedFormat);
        }
        let encoding = h[2];
        if encoding > 1 {
            return Err(BitmapError::UnsupportedVariant(alloc::format!(
                "PCX encoding {encoding}"
            )));
        }

        let extent = |min: usize, max: usize| i32::from(le16(max)) - i32::from(le16(min)) + 1;
        let (w, hgt) = (extent(4, 8), extent(6, 10));
        if !(1..=MAX_DIMENSION).contains(&w) || !(1..=MAX_DIMENSION).contains(&hgt) {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "PCX dimensions {w}x{hgt}"
            )));
        }

        let bits_per_plane = h[3];
        let planes = h[65];
        let bytes_per_line = le16(66);
        if bits_per_plane == 0 || planes == 0 || bytes_per_line == 0 {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "PCX {bits_per_plane} bits x {planes} planes, {bytes_per_line} bytes per line"
            )));
        }
        let layout = PcxLayout::from_bits(bits_per_plane, planes).ok_or_else(|| {
            BitmapError::UnsupportedVariant(alloc::format!(
                "PCX {bits_per_plane} bits x {planes} planes"
            ))
        })?;

        let mut colormap = [0u8; 48];
        colormap.copy_from_slice(&h[16..64]);
        let header = Self {
            version: h[1],
            rle: encoding == 1,
            bits_per_plane,
            planes,
            width: w as u32,
            height: hgt as u32,
            bytes_per_line,
            palette_info: le16(68),
            layout,
            colormap,
        };
        log::trace!(
            "PCX header: v{} {}x{} {:?} bpl={} rle={}",
            header.version,
            header.width,
            header.height,
            header.layout,
            header.bytes_per_line,
            header.rle
        );
        Ok(header)
    }

    /// Decoded bytes per scanline across all planes.
    pub(crate) fn scanline_len(&self) -> usize {
        usize::from(self.bytes_per_line) * usize::from(self.planes)
    }

    pub(crate) fn is_gray(&self) -> bool {
        self.palette_info == PALETTE_GRAY
    }

    /// 16-color table: the built-in EGA palette for versions 0 and 3 or an
    /// all-zero header colormap, otherwise the header colormap.
    pub(crate) fn palette16(&self) -> Palette {
        if matches!(self.version, 0 | 3) || self.colormap.iter().all(|&b| b == 0) {
            Palette::ega()
        } else {
            Palette::from_rgb(&self.colormap)
        }
    }

    pub(crate) fn has_alpha(&self) -> bool {
        self.layout == PcxLayout::Rgba32
    }

    /// Bits per pixel across all planes.
    pub(crate) fn bit_depth(&self) -> u32 {
        u32::from(self.bits_per_plane) * u32::from(self.planes)
    }
}
