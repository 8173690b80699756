/// Container format, detected from leading bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Windows bitmap.
    Bmp,
    /// Truevision Targa.
    Tga,
    /// ZSoft Paintbrush.
    Pcx,
}

impl ImageFormat {
    /// Guess the format from the first bytes of a file.
    ///
    /// BMP and PCX carry a signature. TGA has none, so it is accepted last,
    /// when the colormap-type and image-type bytes hold legal values.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        if let &[0x0A, version, encoding, ..] = data {
            if matches!(version, 0 | 2 | 3 | 4 | 5) && encoding <= 1 {
                return Some(Self::Pcx);
            }
        }
        if data.len() >= 18 && data[1] <= 1 && matches!(data[2], 1 | 2 | 3 | 9 | 10 | 11) {
            return Some(Self::Tga);
        }
        None
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Tga => "tga",
            Self::Pcx => "pcx",
        }
    }

    /// Whether a writer exists for this format.
    pub fn can_save(self) -> bool {
        !matches!(self, Self::Pcx)
    }
}
