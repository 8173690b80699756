//! BMP file header and info header parsing.

use crate::error::BitmapError;
use crate::source::ByteSource;

pub(crate) const FILE_HEADER_LEN: u32 = 14;
pub(crate) const INFO_HEADER_LEN: u32 = 40;
const CORE_HEADER_LEN: u32 = 12;

/// `biCompression` values this reader understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Compression {
    Rgb,
    Rle8,
    Rle4,
    Bitfields,
    AlphaBitfields,
}

impl Compression {
    fn from_tag(tag: u32) -> Result<Self, BitmapError> {
        match tag {
            0 => Ok(Self::Rgb),
            1 => Ok(Self::Rle8),
            2 => Ok(Self::Rle4),
            3 => Ok(Self::Bitfields),
            6 => Ok(Self::AlphaBitfields),
            4 | 5 => Err(BitmapError::UnsupportedVariant(alloc::format!(
                "embedded {} payload",
                if tag == 4 { "JPEG" } else { "PNG" }
            ))),
            other => Err(BitmapError::UnsupportedVariant(alloc::format!(
                "BMP compression {other}"
            ))),
        }
    }

    pub(crate) fn tag(self) -> u32 {
        match self {
            Self::Rgb => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
            Self::Bitfields => 3,
            Self::AlphaBitfields => 6,
        }
    }

    pub(crate) fn is_rle(self) -> bool {
        matches!(self, Self::Rle8 | Self::Rle4)
    }

    pub(crate) fn is_bitfields(self) -> bool {
        matches!(self, Self::Bitfields | Self::AlphaBitfields)
    }
}

/// Validated BMP headers. After [`BmpHeader::parse`] the source cursor sits
/// at the start of the palette (if any).
#[derive(Clone, Debug)]
pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
    pub bit_depth: u16,
    pub compression: Compression,
    pub info_size: u32,
    pub colors_used: u32,
    /// Red, green, blue, alpha. Only meaningful for bitfield images.
    pub masks: [u32; 4],
    pub data_offset: u32,
}

impl BmpHeader {
    pub(crate) fn parse(src: &mut dyn ByteSource) -> Result<Self, BitmapError> {
        let mut file_header = [0u8; FILE_HEADER_LEN as usize];
        src.read_exact(&mut file_header)?;
        if &file_header[0..2] != b"BM" {
            return Err(BitmapError::UnrecognizedFormat);
        }
        let data_offset = le_u32(&file_header, 10);
        let info_size = src.read_u32_le()?;

        let (width, height, top_down, planes, bit_depth, compression, colors_used);
        if info_size == CORE_HEADER_LEN {
            let mut core = [0u8; 8];
            src.read_exact(&mut core)?;
            width = u32::from(le_u16(&core, 0));
            height = u32::from(le_u16(&core, 2));
            top_down = false;
            planes = le_u16(&core, 4);
            bit_depth = le_u16(&core, 6);
            compression = Compression::Rgb;
            colors_used = 0;
        } else if info_size >= INFO_HEADER_LEN {
            let mut info = [0u8; (INFO_HEADER_LEN - 4) as usize];
            src.read_exact(&mut info)?;
            if info_size > INFO_HEADER_LEN {
                src.seek_relative(i64::from(info_size - INFO_HEADER_LEN))?;
            }
            let raw_width = le_u32(&info, 0) as i32;
            let raw_height = le_u32(&info, 4) as i32;
            if raw_width <= 0 {
                return Err(BitmapError::InvalidHeader(alloc::format!(
                    "BMP width {raw_width}"
                )));
            }
            width = raw_width as u32;
            height = raw_height.unsigned_abs();
            top_down = raw_height < 0;
            planes = le_u16(&info, 8);
            bit_depth = le_u16(&info, 10);
            compression = Compression::from_tag(le_u32(&info, 12))?;
            colors_used = le_u32(&info, 28);
        } else {
            return Err(BitmapError::UnsupportedVariant(alloc::format!(
                "BMP info header of {info_size} bytes"
            )));
        }

        log::trace!(
            "BMP header: {width}x{height} top_down={top_down} planes={planes} bpp={bit_depth} \
             compression={compression:?} info_size={info_size} offset={data_offset}"
        );

        if width == 0 || height == 0 {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "BMP dimensions {width}x{height}"
            )));
        }
        if planes != 1 {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "BMP planes field is {planes}, expected 1"
            )));
        }
        if !matches!(bit_depth, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(BitmapError::UnsupportedVariant(alloc::format!(
                "BMP bit depth {bit_depth}"
            )));
        }
        let depth_ok = match compression {
            Compression::Rle8 => bit_depth == 8,
            Compression::Rle4 => bit_depth == 4,
            Compression::Bitfields | Compression::AlphaBitfields => {
                bit_depth == 16 || bit_depth == 32
            }
            Compression::Rgb => true,
        };
        if !depth_ok {
            return Err(BitmapError::UnsupportedVariant(alloc::format!(
                "{compression:?} over {bit_depth}-bit pixels"
            )));
        }

        let mut header = Self {
            width,
            height,
            top_down,
            bit_depth,
            compression,
            info_size,
            colors_used,
            masks: [0; 4],
            data_offset,
        };
        if compression.is_bitfields() {
            header.read_masks(src)?;
        }
        Ok(header)
    }

    /// Masks live inside V2+ info headers; older files append them right
    /// after the 40-byte header.
    fn read_masks(&mut self, src: &mut dyn ByteSource) -> Result<(), BitmapError> {
        if self.info_size >= 52 {
            let base = u64::from(FILE_HEADER_LEN + INFO_HEADER_LEN);
            for (i, mask) in self.masks.iter_mut().take(3).enumerate() {
                *mask = src.read_u32_le_at(base + 4 * i as u64)?;
            }
            if self.info_size >= 56 {
                self.masks[3] = src.read_u32_le_at(base + 12)?;
            }
        } else {
            let count = if self.compression == Compression::AlphaBitfields {
                4
            } else {
                3
            };
            for mask in self.masks.iter_mut().take(count) {
                *mask = src.read_u32_le()?;
            }
        }
        log::trace!("BMP masks: {:08X?}", self.masks);
        if self.masks[..3].iter().all(|&m| m == 0) {
            return Err(BitmapError::InvalidHeader(
                "bitfield BMP without color masks".into(),
            ));
        }
        Ok(())
    }

    /// Bytes per on-disk palette entry.
    pub(crate) fn palette_entry_size(&self) -> usize {
        if self.info_size == CORE_HEADER_LEN { 3 } else { 4 }
    }

    /// Palette length for indexed images, `None` above 8 bits.
    pub(crate) fn palette_entries(&self) -> Result<Option<u32>, BitmapError> {
        if self.bit_depth > 8 {
            return Ok(None);
        }
        let max = 1u32 << self.bit_depth;
        let entries = if self.colors_used == 0 {
            max
        } else {
            self.colors_used
        };
        if entries > max {
            return Err(BitmapError::InvalidHeader(alloc::format!(
                "{entries} palette entries for {}-bit pixels",
                self.bit_depth
            )));
        }
        Ok(Some(entries))
    }

    /// Padded bytes per stored row, rejected past the 32-bit range.
    pub(crate) fn stride(&self) -> Result<u32, BitmapError> {
        let bits = u64::from(self.width) * u64::from(self.bit_depth);
        let stride = bits.div_ceil(32) * 4;
        u32::try_from(stride).map_err(|_| BitmapError::DimensionsTooLarge {
            width: self.width,
            height: self.height,
        })
    }

    pub(crate) fn has_alpha(&self) -> bool {
        self.compression.is_bitfields() && self.masks[3] != 0
    }
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
