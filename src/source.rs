//! Random-access byte sources.
//!
//! Every reader consumes its input through [`ByteSource`], so a file on disk
//! and the same bytes in memory decode identically. Positions are `u64`
//! offsets clamped to `[0, size]`.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::BitmapError;

/// Positioned reader over a file or a memory buffer.
pub trait ByteSource {
    /// Fill `buf` completely, or fail without a partial result.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BitmapError>;

    /// Move to absolute offset `pos`. Fails if `pos > size()`.
    fn seek(&mut self, pos: u64) -> Result<(), BitmapError>;

    /// Current offset.
    fn tell(&self) -> u64;

    /// Total length in bytes.
    fn size(&self) -> u64;

    /// Read at `offset` without moving the cursor.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), BitmapError>;

    /// Move by `delta` bytes. A negative overshoot clamps to 0; moving past
    /// the end fails.
    fn seek_relative(&mut self, delta: i64) -> Result<(), BitmapError> {
        let target = if delta < 0 {
            self.tell().saturating_sub(delta.unsigned_abs())
        } else {
            self.tell()
                .checked_add(delta as u64)
                .ok_or(BitmapError::UnexpectedEof)?
        };
        self.seek(target)
    }

    /// Bytes between the cursor and the end.
    fn remaining(&self) -> u64 {
        self.size().saturating_sub(self.tell())
    }

    /// Read everything from the cursor to the end.
    fn read_to_end(&mut self) -> Result<Vec<u8>, BitmapError> {
        let len = usize::try_from(self.remaining()).map_err(|_| BitmapError::DimensionsTooLarge {
            width: 0,
            height: 0,
        })?;
        let mut out = vec![0u8; len];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, BitmapError> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_u16_le(&mut self) -> Result<u16, BitmapError> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn read_u32_le(&mut self) -> Result<u32, BitmapError> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_le_bytes(b))
    }

    fn read_u32_le_at(&mut self, offset: u64) -> Result<u32, BitmapError> {
        let mut b = [0u8; 4];
        self.read_at(offset, &mut b)?;
        Ok(u32::from_le_bytes(b))
    }
}

/// Byte source over a caller-owned slice.
#[derive(Clone, Debug)]
pub struct MemorySource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemorySource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn range(&self, offset: u64, len: usize) -> Result<core::ops::Range<usize>, BitmapError> {
        let start = usize::try_from(offset).map_err(|_| BitmapError::UnexpectedEof)?;
        let end = start.checked_add(len).ok_or(BitmapError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(BitmapError::UnexpectedEof);
        }
        Ok(start..end)
    }
}

impl ByteSource for MemorySource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BitmapError> {
        let range = self.range(self.pos as u64, buf.len())?;
        self.pos = range.end;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<(), BitmapError> {
        if pos > self.data.len() as u64 {
            return Err(BitmapError::UnexpectedEof);
        }
        self.pos = pos as usize;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.pos as u64
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), BitmapError> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>, BitmapError> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        Ok(rest)
    }
}

/// Byte source over an open file, with its size cached at open time.
///
/// The file handle is closed when the source is dropped.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct FileSource {
    file: std::fs::File,
    size: u64,
    pos: u64,
}

#[cfg(feature = "std")]
impl FileSource {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, BitmapError> {
        let file = std::fs::File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            size,
            pos: 0,
        })
    }

    fn fill_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), BitmapError> {
        use std::io::{Read, Seek, SeekFrom};

        let end = offset
            .checked_add(buf.len() as u64)
            .ok_or(BitmapError::UnexpectedEof)?;
        if end > self.size {
            return Err(BitmapError::UnexpectedEof);
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl ByteSource for FileSource {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BitmapError> {
        self.fill_at(self.pos, buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<(), BitmapError> {
        if pos > self.size {
            return Err(BitmapError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), BitmapError> {
        // The logical cursor lives in `pos`; the OS cursor is repositioned on
        // every read, so nothing needs restoring here.
        self.fill_at(offset, buf)
    }
}
