//! PCX scanline reader.
//!
//! A byte with both high bits set repeats the following byte
//! `(byte & 0x3F)` times; any other byte is a literal. Runs are cut at the
//! scanline end.

/// Sequential scanline reader over the bytes following the header.
pub(crate) struct Scanlines<'a> {
    data: &'a [u8],
    pos: usize,
    rle: bool,
}

impl<'a> Scanlines<'a> {
    pub(crate) fn new(data: &'a [u8], rle: bool) -> Self {
        Self { data, pos: 0, rle }
    }

    /// Offset just past the last consumed byte.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Fill `line` with the next scanline. Whatever the data does not cover
    /// is left zeroed.
    pub(crate) fn read_line(&mut self, line: &mut [u8]) {
        line.fill(0);
        if !self.rle {
            let n = line.len().min(self.data.len().saturating_sub(self.pos));
            line[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            return;
        }

        let mut x = 0;
        while x < line.len() && self.pos < self.data.len() {
            let byte = self.data[self.pos];
            self.pos += 1;
            if byte & 0xC0 != 0xC0 {
                line[x] = byte;
                x += 1;
                continue;
            }
            let count = usize::from(byte & 0x3F).max(1);
            let Some(&value) = self.data.get(self.pos) else {
                break;
            };
            self.pos += 1;
            let end = (x + count).min(line.len());
            line[x..end].fill(value);
            x = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_and_literals() {
        let data = [0xC3, 7, 0x05, 0xC1, 0xC1];
        let mut lines = Scanlines::new(&data, true);
        let mut line = [0u8; 5];
        lines.read_line(&mut line);
        assert_eq!(line, [7, 7, 7, 5, 0xC1]);
        assert_eq!(lines.position(), 5);
    }

    #[test]
    fn zero_count_is_one() {
        let mut lines = Scanlines::new(&[0xC0, 9, 1], true);
        let mut line = [0u8; 2];
        lines.read_line(&mut line);
        assert_eq!(line, [9, 1]);
    }

    #[test]
    fn run_is_cut_at_line_end() {
        let data = [0xC4, 3, 0x02];
        let mut lines = Scanlines::new(&data, true);
        let mut line = [0u8; 2];
        lines.read_line(&mut line);
        assert_eq!(line, [3, 3]);
        lines.read_line(&mut line);
        assert_eq!(line, [2, 0]);
    }

    #[test]
    fn dangling_run_byte_stops() {
        let mut lines = Scanlines::new(&[1, 0xC5], true);
        let mut line = [0xAAu8; 4];
        lines.read_line(&mut line);
        assert_eq!(line, [1, 0, 0, 0]);
        assert_eq!(lines.position(), 2);
    }

    #[test]
    fn uncompressed_short_line_zero_filled() {
        let mut lines = Scanlines::new(&[1, 2, 3], false);
        let mut line = [0xFFu8; 2];
        lines.read_line(&mut line);
        assert_eq!(line, [1, 2]);
        lines.read_line(&mut line);
        assert_eq!(line, [3, 0]);
        lines.read_line(&mut line);
        assert_eq!(line, [0, 0]);
    }
}
