#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // BMP 4x2 RLE8 with a 2-entry palette
    let mut rle8 = vec![0u8; 62];
    rle8[0] = b'B'; rle8[1] = b'M';
    rle8[10..14].copy_from_slice(&62u32.to_le_bytes());
    rle8[14..18].copy_from_slice(&40u32.to_le_bytes());
    rle8[18..22].copy_from_slice(&4i32.to_le_bytes());
    rle8[22..26].copy_from_slice(&2i32.to_le_bytes());
    rle8[26..28].copy_from_slice(&1u16.to_le_bytes());
    rle8[28..30].copy_from_slice(&8u16.to_le_bytes());
    rle8[30..34].copy_from_slice(&1u32.to_le_bytes()); // BI_RLE8
    rle8[46..50].copy_from_slice(&2u32.to_le_bytes()); // colors used
    rle8[58..62].copy_from_slice(&[0xff, 0xff, 0xff, 0]);
    rle8.extend_from_slice(&[4, 1, 0, 0, 0, 4, 0, 1, 1, 0, 0, 1]);
    fs::write(format!("{dir}/bmp_rle8_4x2.bmp"), &rle8).unwrap();

    // TGA 2x2 32-bit, packet-compressed, top-left origin
    let mut tga = vec![0u8; 18];
    tga[2] = 10;
    tga[12] = 2; tga[14] = 2;
    tga[16] = 32; tga[17] = 0x28;
    tga.extend_from_slice(&[0x83, 0x10, 0x20, 0x30, 0x80]);
    fs::write(format!("{dir}/tga_rle_2x2.tga"), &tga).unwrap();

    // TGA 2x1 color-mapped, 24-bit colormap of 2 entries
    let mut cm = vec![0u8; 18];
    cm[1] = 1; cm[2] = 1;
    cm[5] = 2; cm[7] = 24;
    cm[12] = 2; cm[14] = 1;
    cm[16] = 8;
    cm.extend_from_slice(&[0, 0, 0, 0xff, 0xff, 0xff, 1, 0]);
    fs::write(format!("{dir}/tga_cmap_2x1.tga"), &cm).unwrap();

    // PCX 2x2 8-bit with VGA palette
    let mut pcx = vec![0u8; 128];
    pcx[0] = 0x0A; pcx[1] = 5; pcx[2] = 1; pcx[3] = 8;
    pcx[8..10].copy_from_slice(&1u16.to_le_bytes()); // xmax
    pcx[10..12].copy_from_slice(&1u16.to_le_bytes()); // ymax
    pcx[65] = 1;
    pcx[66..68].copy_from_slice(&2u16.to_le_bytes()); // bytes per line
    pcx[68..70].copy_from_slice(&1u16.to_le_bytes());
    pcx.extend_from_slice(&[0xC2, 1, 0x01, 0x02]);
    pcx.push(0x0C);
    pcx.extend((0..768).map(|i| i as u8));
    fs::write(format!("{dir}/pcx_vga_2x2.pcx"), &pcx).unwrap();

    // PCX 8x1 24-bit planar
    let mut rgb = pcx[..128].to_vec();
    rgb[8..10].copy_from_slice(&7u16.to_le_bytes());
    rgb[10..12].copy_from_slice(&0u16.to_le_bytes());
    rgb[65] = 3;
    rgb[66..68].copy_from_slice(&8u16.to_le_bytes());
    rgb.extend_from_slice(&[0xC8, 0xff, 0xC8, 0x80, 0xC8, 0x00]);
    fs::write(format!("{dir}/pcx_rgb_8x1.pcx"), &rgb).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/bmp_no_pixels.bin"), &bmp[..54]).unwrap();
    fs::write(format!("{dir}/tga_header_only.bin"), &tga[..18]).unwrap();
    fs::write(format!("{dir}/pcx_no_palette.bin"), &pcx[..132]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
