//! TGA packet coding.
//!
//! Each packet starts with a header byte: high bit set means one pixel
//! repeated `(low7 + 1)` times, clear means `(low7 + 1)` literal pixels.
//! Packets may span rows.

use alloc::vec::Vec;

/// Longest packet the format can express.
pub(super) const MAX_PACKET: usize = 128;

/// Result of walking a packet stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PacketStats {
    /// Pixels delivered to the sink.
    pub pixels: u64,
    /// Source bytes consumed.
    pub consumed: usize,
}

/// Expand packets from `src`, calling `emit(n, pixel)` for pixel number `n`
/// in stream order until `total` pixels are out or the data ends. A packet
/// missing its pixel bytes ends the walk.
pub(crate) fn decode_packets(
    src: &[u8],
    bytes_per_pixel: usize,
    total: u64,
    mut emit: impl FnMut(u64, &[u8]),
) -> PacketStats {
    let mut pos = 0;
    let mut n = 0u64;
    'packets: while n < total && pos < src.len() {
        let packet = src[pos];
        pos += 1;
        let count = u64::from(packet & 0x7F) + 1;
        if packet & 0x80 != 0 {
            let Some(pixel) = src.get(pos..pos + bytes_per_pixel) else {
                break;
            };
            pos += bytes_per_pixel;
            let end = (n + count).min(total);
            while n < end {
                emit(n, pixel);
                n += 1;
            }
        } else {
            for _ in 0..count {
                if n >= total {
                    break;
                }
                let Some(pixel) = src.get(pos..pos + bytes_per_pixel) else {
                    break 'packets;
                };
                pos += bytes_per_pixel;
                emit(n, pixel);
                n += 1;
            }
        }
    }
    PacketStats {
        pixels: n,
        consumed: pos,
    }
}

/// Pack `pixels` (`bytes_per_pixel` each, already in file order) into
/// packets appended to `out`.
///
/// Three or more identical pixels become a run packet; anything else goes
/// into a raw packet that stops where the next run of three begins.
pub(crate) fn encode_packets(pixels: &[u8], bytes_per_pixel: usize, out: &mut Vec<u8>) {
    let px: Vec<&[u8]> = pixels.chunks_exact(bytes_per_pixel).collect();
    let total = px.len();
    let run_at = |start: usize, limit: usize| {
        let mut len = 1;
        while len < limit && start + len < total && px[start + len] == px[start] {
            len += 1;
        }
        len
    };

    let mut i = 0;
    while i < total {
        let run = run_at(i, MAX_PACKET);
        if run >= 3 {
            out.push(0x80 | (run - 1) as u8);
            out.extend_from_slice(px[i]);
            i += run;
            continue;
        }
        let mut raw = 1;
        while raw < MAX_PACKET && i + raw < total && run_at(i + raw, 3) < 3 {
            raw += 1;
        }
        out.push((raw - 1) as u8);
        for p in &px[i..i + raw] {
            out.extend_from_slice(p);
        }
        i += raw;
    }
}
