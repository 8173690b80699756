use alloc::string::String;
use enough::StopReason;

/// Errors from BMP/TGA/PCX decoding.
///
/// Every variant maps onto one of the four host-facing status codes via
/// [`BitmapError::kind`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitmapError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for BitmapError {
    fn from(r: StopReason) -> Self {
        BitmapError::Cancelled(r)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for BitmapError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            BitmapError::UnexpectedEof
        } else {
            BitmapError::Io(alloc::format!("{e}"))
        }
    }
}

/// Format-agnostic error taxonomy shared by every reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid call arguments or an aborted call.
    GenericFailure,
    /// Recognized container, but an unsupported variant.
    UnsupportedFile,
    /// Structurally invalid content.
    FileCorrupted,
    /// I/O failure or short read.
    ReadError,
}

impl ErrorKind {
    /// Legacy host status code (`0` is reserved for success).
    pub fn code(self) -> i32 {
        match self {
            Self::GenericFailure => 1,
            Self::ReadError => 2,
            Self::UnsupportedFile => 3,
            Self::FileCorrupted => 4,
        }
    }
}

impl BitmapError {
    /// Classify this error into the host taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Cancelled(_) => ErrorKind::GenericFailure,
            Self::UnrecognizedFormat | Self::UnsupportedVariant(_) | Self::LimitExceeded(_) => {
                ErrorKind::UnsupportedFile
            }
            Self::InvalidHeader(_) | Self::InvalidData(_) | Self::DimensionsTooLarge { .. } => {
                ErrorKind::FileCorrupted
            }
            Self::UnexpectedEof | Self::Io(_) => ErrorKind::ReadError,
        }
    }
}
