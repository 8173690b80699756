//! Per-format codec objects and the static format table.
//!
//! Each codec pairs a reader with an optional writer. [`FORMATS`] lists them
//! in registration order (BMP, TGA, PCX) with the metadata a host needs to
//! present them: description, extension and the save option strings.

use alloc::vec::Vec;

use crate::decode::{BgraView, CanonicalImage, decode_source};
use crate::encode::{SaveOptions, save_memory};
use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::info::{ImageInfo, probe};
use crate::limits::Limits;
use crate::source::{ByteSource, MemorySource};

/// What a codec can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub decode: bool,
    pub encode: bool,
    /// Writer can keep the alpha channel.
    pub encode_alpha: bool,
    /// Writer can run-length encode.
    pub encode_rle: bool,
}

impl Capabilities {
    pub const fn new() -> Self {
        Self {
            decode: true,
            encode: false,
            encode_alpha: false,
            encode_rle: false,
        }
    }

    pub const fn with_encode(mut self, alpha: bool, rle: bool) -> Self {
        self.encode = true;
        self.encode_alpha = alpha;
        self.encode_rle = rle;
        self
    }
}

/// Reader/writer for one container format.
///
/// Decode failures carry a [`BitmapError`]; save failures collapse to
/// `None` (memory) or `0` (file) with the reason logged at warn level.
pub trait Codec: Send + Sync {
    fn format(&self) -> ImageFormat;

    /// Decode from any byte source.
    fn read(
        &self,
        src: &mut dyn ByteSource,
        limits: Option<&Limits>,
        stop: &dyn enough::Stop,
    ) -> Result<CanonicalImage, BitmapError> {
        decode_source(self.format(), src, limits, stop)
    }

    fn read_memory(&self, data: &[u8]) -> Result<CanonicalImage, BitmapError> {
        self.read(&mut MemorySource::new(data), None, &enough::Unstoppable)
    }

    #[cfg(feature = "std")]
    fn read_file(&self, path: &std::path::Path) -> Result<CanonicalImage, BitmapError> {
        let mut src = crate::source::FileSource::open(path)?;
        self.read(&mut src, None, &enough::Unstoppable)
    }

    fn probe(&self, src: &mut dyn ByteSource) -> Result<ImageInfo, BitmapError> {
        probe(self.format(), src)
    }

    fn save_memory(&self, image: &BgraView<'_>, options: &SaveOptions) -> Option<Vec<u8>> {
        save_memory(self.format(), image, options)
    }

    #[cfg(feature = "std")]
    fn save_file(
        &self,
        path: &std::path::Path,
        image: &BgraView<'_>,
        options: &SaveOptions,
    ) -> usize {
        crate::encode::save_file(self.format(), path, image, options)
    }

    fn is_alpha_saved(&self, options: &SaveOptions) -> bool {
        options.is_alpha_saved(self.format())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BmpCodec;

#[derive(Clone, Copy, Debug, Default)]
pub struct TgaCodec;

#[derive(Clone, Copy, Debug, Default)]
pub struct PcxCodec;

impl Codec for BmpCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }
}

impl Codec for TgaCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Tga
    }
}

impl Codec for PcxCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Pcx
    }
}

/// Registration record for one format.
#[derive(Clone, Copy)]
pub struct FormatDescriptor {
    pub format: ImageFormat,
    pub description: &'static str,
    pub summary: &'static str,
    /// Extension as the host registers it.
    pub extension: &'static str,
    pub version: u32,
    pub capabilities: Capabilities,
    /// Save option strings, `Kind:Label:values`.
    pub options: &'static [&'static str],
    pub codec: &'static dyn Codec,
}

impl core::fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("format", &self.format)
            .field("description", &self.description)
            .field("extension", &self.extension)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

const VERSION: u32 = 1;

/// All registered formats.
pub static FORMATS: [FormatDescriptor; 3] = [
    FormatDescriptor {
        format: ImageFormat::Bmp,
        description: "Windows Bitmap",
        summary: "Windows Bitmap",
        extension: "Bmp",
        version: VERSION,
        capabilities: Capabilities::new().with_encode(true, true),
        options: &["Enum:Bit Depth:8 bit=8,8 bit RLE8 compression=9,16 bit=16,24 bit=24,32 bit=32"],
        codec: &BmpCodec,
    },
    FormatDescriptor {
        format: ImageFormat::Tga,
        description: "Truevision Targa",
        summary: "Targa",
        extension: "Tga",
        version: VERSION,
        capabilities: Capabilities::new().with_encode(true, true),
        options: &[
            "Enum:Bit Depth:16 bit=16,24 bit=24,32 bit=32,Greyscale=64",
            "Boolean:Run Length Encoding",
        ],
        codec: &TgaCodec,
    },
    FormatDescriptor {
        format: ImageFormat::Pcx,
        description: "ZSoft PCX",
        summary: "PCX",
        extension: "Pcx",
        version: VERSION,
        capabilities: Capabilities::new(),
        options: &[],
        codec: &PcxCodec,
    },
];

impl ImageFormat {
    /// Table entry for this format.
    pub fn descriptor(self) -> &'static FormatDescriptor {
        match self {
            Self::Bmp => &FORMATS[0],
            Self::Tga => &FORMATS[1],
            Self::Pcx => &FORMATS[2],
        }
    }

    pub fn codec(self) -> &'static dyn Codec {
        self.descriptor().codec
    }
}
