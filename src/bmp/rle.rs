//! BMP run-length coding (RLE8 and RLE4).
//!
//! Escape codes: `00 00` end of line, `00 01` end of bitmap, `00 02 dx dy`
//! cursor delta, `00 n` (n >= 3) absolute run of `n` samples padded to a
//! 16-bit boundary, `count value` encoded run.

use alloc::vec::Vec;

use crate::color::Palette;

/// Destination cursor for an RLE stream.
///
/// `y` is a canonical (top-down) row; any value `>= height` means the cursor
/// has left the image and decoding stops.
struct RleCursor<'a> {
    src: &'a [u8],
    pos: usize,
    out: &'a mut [u8],
    palette: &'a Palette,
    width: u32,
    height: u32,
    top_down: bool,
    x: u32,
    y: u32,
}

impl<'a> RleCursor<'a> {
    fn new(
        src: &'a [u8],
        out: &'a mut [u8],
        palette: &'a Palette,
        width: u32,
        height: u32,
        top_down: bool,
    ) -> Self {
        Self {
            src,
            pos: 0,
            out,
            palette,
            width,
            height,
            top_down,
            x: 0,
            y: if top_down { 0 } else { height - 1 },
        }
    }

    fn has_more(&self) -> bool {
        self.pos < self.src.len() && self.y < self.height
    }

    /// Next source byte; reads past the end yield 0.
    fn next_byte(&mut self) -> u8 {
        let b = self.peek();
        if self.pos < self.src.len() {
            self.pos += 1;
        }
        b
    }

    fn peek(&self) -> u8 {
        self.src.get(self.pos).copied().unwrap_or(0)
    }

    fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    fn next_line(&mut self) {
        self.x = 0;
        self.y = match (self.top_down, self.y) {
            (true, y) => y.saturating_add(1),
            (false, 0) => self.height,
            (false, y) => y - 1,
        };
    }

    fn delta(&mut self, dx: u8, dy: u8) {
        self.x = self.x.saturating_add(u32::from(dx));
        self.y = if self.top_down {
            self.y.saturating_add(u32::from(dy))
        } else {
            self.y.checked_sub(u32::from(dy)).unwrap_or(self.height)
        };
    }

    fn set_pixel(&mut self, index: u8) {
        if self.y >= self.height || self.x >= self.width {
            return;
        }
        let off = (self.y as usize * self.width as usize + self.x as usize) * 4;
        self.out[off..off + 4].copy_from_slice(&self.palette.get(usize::from(index)));
        self.x += 1;
    }

    /// Handle a `00 xx` escape. Returns `false` at end of bitmap.
    fn escape(&mut self, code: u8, literal: impl FnOnce(&mut Self, u8)) -> bool {
        match code {
            0 => self.next_line(),
            1 => return false,
            2 => {
                let dx = self.next_byte();
                let dy = self.next_byte();
                self.delta(dx, dy);
            }
            n => literal(self, n),
        }
        true
    }
}

/// Outcome of an RLE decode, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RleEnd {
    /// An end-of-bitmap marker was reached.
    Marker,
    /// The stream ran out or the cursor left the image first.
    Exhausted,
}

/// Expand an RLE8 stream into canonical BGRA `out` (`width * height * 4`).
pub(crate) fn decode_rle8(
    src: &[u8],
    out: &mut [u8],
    palette: &Palette,
    width: u32,
    height: u32,
    top_down: bool,
) -> RleEnd {
    let mut cur = RleCursor::new(src, out, palette, width, height, top_down);
    while cur.has_more() {
        let first = cur.next_byte();
        let second = cur.next_byte();
        if first != 0 {
            for _ in 0..first {
                cur.set_pixel(second);
            }
            continue;
        }
        let more = cur.escape(second, |cur, n| {
            for _ in 0..n {
                let index = cur.next_byte();
                cur.set_pixel(index);
            }
            if n & 1 == 1 {
                cur.skip(1);
            }
        });
        if !more {
            return RleEnd::Marker;
        }
    }
    RleEnd::Exhausted
}

/// Expand an RLE4 stream; runs alternate the two nibbles of their value.
pub(crate) fn decode_rle4(
    src: &[u8],
    out: &mut [u8],
    palette: &Palette,
    width: u32,
    height: u32,
    top_down: bool,
) -> RleEnd {
    let mut cur = RleCursor::new(src, out, palette, width, height, top_down);
    while cur.has_more() {
        let first = cur.next_byte();
        let second = cur.next_byte();
        if first != 0 {
            let (hi, lo) = (second >> 4, second & 0x0F);
            for i in 0..first {
                cur.set_pixel(if i & 1 == 0 { hi } else { lo });
            }
            continue;
        }
        let more = cur.escape(second, |cur, n| {
            for i in 0..n {
                let index = if i & 1 == 0 {
                    cur.peek() >> 4
                } else {
                    cur.next_byte() & 0x0F
                };
                cur.set_pixel(index);
            }
            if n & 1 == 1 {
                cur.skip(1);
            }
            // absolute runs end on a 16-bit boundary
            if n.div_ceil(2) & 1 == 1 {
                cur.skip(1);
            }
        });
        if !more {
            return RleEnd::Marker;
        }
    }
    RleEnd::Exhausted
}

/// Append one RLE8-encoded row, without the end-of-line marker.
///
/// Runs of two or more equal samples become encoded runs. Other stretches
/// grow until the next two samples match; three or more become an absolute
/// run, shorter ones are written as single-sample runs.
pub(crate) fn encode_rle8_row(row: &[u8], out: &mut Vec<u8>) {
    let width = row.len();
    let mut x = 0;
    while x < width {
        let v = row[x];
        let mut run = 1;
        while x + run < width && run < 255 && row[x + run] == v {
            run += 1;
        }
        if run >= 2 {
            out.extend_from_slice(&[run as u8, v]);
            x += run;
            continue;
        }

        let mut lit = 1;
        while x + lit < width && lit < 255 {
            if x + lit + 1 < width && row[x + lit] == row[x + lit + 1] {
                break;
            }
            lit += 1;
        }
        let samples = &row[x..x + lit];
        if lit >= 3 {
            out.extend_from_slice(&[0, lit as u8]);
            out.extend_from_slice(samples);
            if lit & 1 == 1 {
                out.push(0);
            }
        } else {
            for &s in samples {
                out.extend_from_slice(&[1, s]);
            }
        }
        x += lit;
    }
}

pub(crate) fn push_end_of_line(out: &mut Vec<u8>) {
    out.extend_from_slice(&[0, 0]);
}

pub(crate) fn push_end_of_bitmap(out: &mut Vec<u8>) {
    out.extend_from_slice(&[0, 1]);
}
