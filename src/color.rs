//! Color resolution shared by the three readers: channel masks, bitfield
//! extraction, palette lookup and sub-byte index unpacking.

use alloc::vec::Vec;

/// Channel masks of a packed 32-bit pixel, read as a little-endian `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
}

impl ChannelMasks {
    /// Masks of the canonical BGRA buffer: byte 0 blue, 1 green, 2 red, 3 alpha.
    pub const BGRA: Self = Self {
        red: 0x00FF_0000,
        green: 0x0000_FF00,
        blue: 0x0000_00FF,
        alpha: 0xFF00_0000,
    };
}

/// A single contiguous (or at least low-aligned) channel mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitfield {
    shift: u32,
    max: u32,
}

impl Bitfield {
    pub const fn new(mask: u32) -> Self {
        if mask == 0 {
            return Self { shift: 0, max: 0 };
        }
        let shift = mask.trailing_zeros();
        Self {
            shift,
            max: mask >> shift,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.max == 0
    }

    /// Scale the masked bits of `sample` to 0..=255. An empty mask yields
    /// `empty`.
    pub fn extract(self, sample: u32, empty: u8) -> u8 {
        if self.max == 0 {
            return empty;
        }
        let v = u64::from((sample >> self.shift) & self.max);
        (v * 255 / u64::from(self.max)) as u8
    }
}

/// Four bitfields resolving a packed 16- or 32-bit sample into BGRA.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitfieldLayout {
    pub red: Bitfield,
    pub green: Bitfield,
    pub blue: Bitfield,
    pub alpha: Bitfield,
}

impl BitfieldLayout {
    /// X1R5G5B5 with no alpha.
    pub const RGB555: Self = Self::from_masks(0x7C00, 0x03E0, 0x001F, 0);

    pub const fn from_masks(red: u32, green: u32, blue: u32, alpha: u32) -> Self {
        Self {
            red: Bitfield::new(red),
            green: Bitfield::new(green),
            blue: Bitfield::new(blue),
            alpha: Bitfield::new(alpha),
        }
    }

    /// Resolve one sample. Missing color channels read as 0, a missing alpha
    /// channel as opaque.
    pub fn resolve(&self, sample: u32) -> [u8; 4] {
        [
            self.blue.extract(sample, 0),
            self.green.extract(sample, 0),
            self.red.extract(sample, 0),
            self.alpha.extract(sample, 255),
        ]
    }
}

/// The 16-color EGA palette as RGB triples.
pub const EGA_PALETTE: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA],
    [0x00, 0xAA, 0x00],
    [0x00, 0xAA, 0xAA],
    [0xAA, 0x00, 0x00],
    [0xAA, 0x00, 0xAA],
    [0xAA, 0x55, 0x00],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x55, 0x55, 0xFF],
    [0x55, 0xFF, 0x55],
    [0x55, 0xFF, 0xFF],
    [0xFF, 0x55, 0x55],
    [0xFF, 0x55, 0xFF],
    [0xFF, 0xFF, 0x55],
    [0xFF, 0xFF, 0xFF],
];

/// Indexed color table holding BGRA entries.
///
/// Lookups past the end clamp to entry 0; an empty table resolves to opaque
/// black.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

impl Palette {
    pub fn from_entries(entries: Vec<[u8; 4]>) -> Self {
        Self { entries }
    }

    /// Parse on-disk BMP entries: `B G R` or `B G R reserved`, alpha opaque.
    pub fn from_bgr(data: &[u8], entry_size: usize) -> Self {
        let entries = data
            .chunks_exact(entry_size)
            .map(|e| [e[0], e[1], e[2], 255])
            .collect();
        Self { entries }
    }

    /// Parse packed `R G B` triples (PCX header colormap and VGA palette).
    pub fn from_rgb(data: &[u8]) -> Self {
        let entries = data
            .chunks_exact(3)
            .map(|e| [e[2], e[1], e[0], 255])
            .collect();
        Self { entries }
    }

    pub fn ega() -> Self {
        let entries = EGA_PALETTE
            .iter()
            .map(|&[r, g, b]| [b, g, r, 255])
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> [u8; 4] {
        match self.entries.get(index) {
            Some(&e) => e,
            None => self.entries.first().copied().unwrap_or([0, 0, 0, 255]),
        }
    }
}

/// Split packed indices of `depth` bits (1, 2, 4 or 8), most significant
/// first, into one byte each. Stops at whichever of `input`/`out` runs out.
pub(crate) fn unpack_indices(depth: u32, input: &[u8], out: &mut [u8]) {
    if depth == 8 {
        let n = input.len().min(out.len());
        out[..n].copy_from_slice(&input[..n]);
        return;
    }
    let per_byte = (8 / depth) as usize;
    let mask = (1u8 << depth) - 1;
    for (chunk, &byte) in out.chunks_mut(per_byte).zip(input) {
        for (i, slot) in chunk.iter_mut().enumerate() {
            let shift = 8 - depth * (i as u32 + 1);
            *slot = (byte >> shift) & mask;
        }
    }
}

/// Integer luma used by the 8-bit BMP writer.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}
