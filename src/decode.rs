use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::FromSlice as _;

use crate::color::ChannelMasks;
use crate::error::BitmapError;
use crate::format::ImageFormat;
use crate::limits::Limits;
use crate::source::{ByteSource, MemorySource};

/// Decoded image in the canonical layout: 4 bytes per pixel in B, G, R, A
/// order, rows top to bottom with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalImage {
    pub width: u32,
    pub height: u32,
    /// Always `width * 4`.
    pub bytes_per_line: u32,
    pub masks: ChannelMasks,
    /// Whether the source carried meaningful alpha.
    pub has_alpha: bool,
    /// Container the pixels were read from.
    pub format: ImageFormat,
    pixels: Vec<u8>,
}

impl CanonicalImage {
    pub(crate) fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: ImageFormat,
        has_alpha: bool,
    ) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            bytes_per_line: width * 4,
            masks: ChannelMasks::BGRA,
            has_alpha,
            format,
            pixels,
        }
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// One row, top to bottom. Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let bpl = self.bytes_per_line as usize;
        let start = y as usize * bpl;
        &self.pixels[start..start + bpl]
    }

    /// The `[b, g, r, a]` bytes at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = y as usize * self.bytes_per_line as usize + x as usize * 4;
        let p = &self.pixels[off..off + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Borrow as save input.
    pub fn view(&self) -> BgraView<'_> {
        BgraView {
            width: self.width,
            height: self.height,
            bytes_per_line: self.bytes_per_line,
            pixels: &self.pixels,
        }
    }

    /// Reinterpret the buffer as typed BGRA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_pixels(&self) -> &[rgb::alt::BGRA8] {
        self.pixels.as_bgra()
    }

    /// Zero-copy [`imgref::ImgRef`] over the buffer.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::alt::BGRA8> {
        imgref::ImgRef::new(
            self.as_pixels(),
            self.width as usize,
            self.height as usize,
        )
    }

    /// Copy into an owned [`imgref::ImgVec`].
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::alt::BGRA8> {
        imgref::ImgVec::new(
            self.as_pixels().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// Borrowed BGRA pixels handed to a writer.
///
/// Rows run top to bottom; `bytes_per_line` may exceed `width * 4`.
#[derive(Clone, Copy, Debug)]
pub struct BgraView<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_line: u32,
    pub pixels: &'a [u8],
}

impl<'a> BgraView<'a> {
    /// Tightly packed rows.
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Result<Self, BitmapError> {
        let bpl = width
            .checked_mul(4)
            .ok_or(BitmapError::DimensionsTooLarge { width, height })?;
        Self::with_stride(pixels, width, height, bpl)
    }

    pub fn with_stride(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        bytes_per_line: u32,
    ) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "empty image {width}x{height}"
            )));
        }
        if u64::from(bytes_per_line) < u64::from(width) * 4 {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "stride {bytes_per_line} shorter than {width} pixels"
            )));
        }
        let needed = u64::from(bytes_per_line) * u64::from(height - 1) + u64::from(width) * 4;
        if (pixels.len() as u64) < needed {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "buffer holds {} bytes, {needed} needed",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bytes_per_line,
            pixels,
        })
    }

    /// The `width * 4` meaningful bytes of row `y`.
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.bytes_per_line as usize;
        &self.pixels[start..start + self.width as usize * 4]
    }
}

/// Decode builder over an in-memory buffer or (with `std`) a file path.
///
/// The format is detected from the leading bytes unless forced with
/// [`DecodeRequest::with_format`].
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    input: Input<'a>,
    limits: Option<&'a Limits>,
    format: Option<ImageFormat>,
}

#[derive(Clone, Copy, Debug)]
enum Input<'a> {
    Bytes(&'a [u8]),
    #[cfg(feature = "std")]
    Path(&'a std::path::Path),
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            input: Input::Bytes(data),
            limits: None,
            format: None,
        }
    }

    /// Read from a file through positioned reads instead of a buffer.
    #[cfg(feature = "std")]
    pub fn from_path(path: &'a std::path::Path) -> Self {
        Self {
            input: Input::Path(path),
            limits: None,
            format: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<CanonicalImage, BitmapError> {
        match self.input {
            Input::Bytes(data) => {
                let format = match self.format {
                    Some(f) => f,
                    None => ImageFormat::detect(data).ok_or(BitmapError::UnrecognizedFormat)?,
                };
                decode_source(format, &mut MemorySource::new(data), self.limits, &stop)
            }
            #[cfg(feature = "std")]
            Input::Path(path) => decode_path(path, self.format, self.limits, &stop),
        }
    }
}

/// Decode a file, detecting the format from its first bytes.
#[cfg(feature = "std")]
fn decode_path(
    path: &std::path::Path,
    format: Option<ImageFormat>,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, BitmapError> {
    let mut src = crate::source::FileSource::open(path)?;
    let format = match format {
        Some(f) => f,
        None => {
            let mut head = [0u8; 18];
            let n = head.len().min(src.size() as usize);
            src.read_at(0, &mut head[..n])?;
            ImageFormat::detect(&head[..n]).ok_or(BitmapError::UnrecognizedFormat)?
        }
    };
    decode_source(format, &mut src, limits, stop)
}

pub(crate) fn decode_source(
    format: ImageFormat,
    src: &mut dyn ByteSource,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, BitmapError> {
    log::debug!("decoding {format:?} from {} bytes", src.size());
    match format {
        ImageFormat::Bmp => crate::bmp::decode(src, limits, stop),
        ImageFormat::Tga => crate::tga::decode(src, limits, stop),
        ImageFormat::Pcx => crate::pcx::decode(src, limits, stop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn canonical_accessors() {
        let px: Vec<u8> = (0u8..16).collect();
        let img = CanonicalImage::new(px, 2, 2, ImageFormat::Bmp, false);
        assert_eq!(img.bytes_per_line, 8);
        assert_eq!(img.masks, ChannelMasks::BGRA);
        assert_eq!(img.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(img.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(img.pixel(2, 0), None);
    }

    #[test]
    fn view_validates_length() {
        let px = vec![0u8; 15];
        assert!(BgraView::new(&px, 2, 2).is_err());
        assert!(BgraView::new(&px, 0, 2).is_err());
        let px = vec![0u8; 16];
        let v = BgraView::new(&px, 2, 2).unwrap();
        assert_eq!(v.row(1).len(), 8);
        // last row may be unpadded
        let px = vec![0u8; 20];
        assert!(BgraView::with_stride(&px, 2, 2, 12).is_ok());
        assert!(BgraView::with_stride(&px, 2, 2, 7).is_err());
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        let err = DecodeRequest::new(b"hello").decode(enough::Unstoppable).unwrap_err();
        assert!(matches!(err, BitmapError::UnrecognizedFormat));
    }
}
