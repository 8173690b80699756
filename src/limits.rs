use crate::error::BitmapError;

/// Caps applied to a parsed header before the canonical buffer is allocated.
///
/// Every field is optional; `Limits::default()` accepts anything the format
/// itself allows.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Cap on `width * height`.
    pub max_pixels: Option<u64>,
    /// Cap on the BGRA32 output size in bytes.
    pub max_memory_bytes: Option<u64>,
}

fn exceeded(what: &str, value: u64, cap: Option<u64>) -> Result<(), BitmapError> {
    match cap {
        Some(cap) if value > cap => Err(BitmapError::LimitExceeded(alloc::format!(
            "{what} {value} exceeds limit {cap}"
        ))),
        _ => Ok(()),
    }
}

impl Limits {
    /// Reject a `width` x `height` canonical image that breaks any cap.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), BitmapError> {
        let (w, h) = (u64::from(width), u64::from(height));
        exceeded("width", w, self.max_width)?;
        exceeded("height", h, self.max_height)?;
        exceeded("pixel count", w * h, self.max_pixels)?;
        exceeded("output bytes", (w * h).saturating_mul(4), self.max_memory_bytes)
    }
}

pub(crate) fn check_limits(
    limits: Option<&Limits>,
    width: u32,
    height: u32,
) -> Result<(), BitmapError> {
    limits.map_or(Ok(()), |l| l.check(width, height))
}
