//! File-backed reads and writes must agree with the in-memory paths.

use enough::Unstoppable;
use zenlegacy::*;

fn checker(w: u32, h: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let on = (x + y) % 2 == 0;
            let v = if on { 200 } else { 30 };
            pixels.extend_from_slice(&[v, (x * 40) as u8, (y * 40) as u8, 255]);
        }
    }
    pixels
}

/// 4x2 PCX, 8 bits, one plane, raw scanlines, VGA palette after the image.
fn small_pcx() -> Vec<u8> {
    let mut out = vec![0u8; 128];
    out[0] = 0x0A;
    out[1] = 5;
    out[3] = 8;
    out[8..10].copy_from_slice(&3u16.to_le_bytes());
    out[10..12].copy_from_slice(&1u16.to_le_bytes());
    out[65] = 1;
    out[66..68].copy_from_slice(&4u16.to_le_bytes());
    out[68..70].copy_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&[0, 1, 2, 3, 3, 2, 1, 0]);
    out.push(0x0C);
    for i in 0..256u32 {
        out.extend_from_slice(&[(i * 60) as u8, (i * 20) as u8, (i * 10) as u8]);
    }
    out
}

#[test]
fn file_and_memory_decode_agree() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(6, 5);
    let view = BgraView::new(&pixels, 6, 5).unwrap();

    let files = [
        ("a.bmp", encode_bmp(&view, &SaveOptions::new(24)).unwrap()),
        ("b.bmp", encode_bmp(&view, &SaveOptions::new(9)).unwrap()),
        (
            "c.tga",
            encode_tga(&view, &SaveOptions::new(32).with_rle(true)).unwrap(),
        ),
        ("d.pcx", small_pcx()),
    ];

    for (name, bytes) in &files {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();

        let from_memory = decode(bytes, Unstoppable).unwrap();
        let from_file = decode_file(&path, Unstoppable).unwrap();
        assert_eq!(from_memory, from_file, "{name}");

        let explicit = match from_memory.format {
            ImageFormat::Bmp => decode_bmp_file(&path, Unstoppable),
            ImageFormat::Tga => decode_tga_file(&path, Unstoppable),
            ImageFormat::Pcx => decode_pcx_file(&path, Unstoppable),
            other => panic!("unexpected {other:?}"),
        }
        .unwrap();
        assert_eq!(explicit.pixels(), from_memory.pixels(), "{name}");
    }
}

#[test]
fn pcx_file_uses_trailing_palette() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pal.pcx");
    std::fs::write(&path, small_pcx()).unwrap();

    let image = decode_pcx_file(&path, Unstoppable).unwrap();
    assert_eq!((image.width, image.height), (4, 2));
    // index 3 -> rgb (180, 60, 30)
    assert_eq!(image.pixel(3, 0), Some([30, 60, 180, 255]));
    assert_eq!(image.pixel(0, 1), Some([30, 60, 180, 255]));
}

#[test]
fn save_reports_bytes_written() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(3, 3);
    let view = BgraView::new(&pixels, 3, 3).unwrap();
    let options = SaveOptions::new(24);

    let bmp_path = dir.path().join("out.bmp");
    let written = save_bmp_file(&bmp_path, &view, &options);
    assert_eq!(written, encode_bmp(&view, &options).unwrap().len());
    assert_eq!(std::fs::metadata(&bmp_path).unwrap().len() as usize, written);
    assert_eq!(decode_file(&bmp_path, Unstoppable).unwrap().pixels(), &pixels[..]);

    let tga_path = dir.path().join("out.tga");
    let written = save_tga_file(&tga_path, &view, &options);
    assert_eq!(written, 18 + 3 * 3 * 3);
    assert_eq!(decode_file(&tga_path, Unstoppable).unwrap().pixels(), &pixels[..]);
}

#[test]
fn failed_saves_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(2, 2);
    let view = BgraView::new(&pixels, 2, 2).unwrap();

    let missing_dir = dir.path().join("no/such/dir/out.bmp");
    assert_eq!(save_bmp_file(&missing_dir, &view, &SaveOptions::default()), 0);

    let pcx = dir.path().join("out.pcx");
    assert_eq!(
        PcxCodec.save_file(&pcx, &view, &SaveOptions::default()),
        0
    );
    assert!(!pcx.exists());
}

#[test]
fn codec_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(5, 4);
    let view = BgraView::new(&pixels, 5, 4).unwrap();

    for descriptor in &FORMATS {
        let codec = descriptor.codec;
        if !descriptor.capabilities.encode {
            continue;
        }
        let path = dir
            .path()
            .join(format!("img.{}", descriptor.format.extension()));
        let options = SaveOptions::new(32);
        assert!(codec.save_file(&path, &view, &options) > 0);
        assert!(codec.is_alpha_saved(&options));

        let image = codec.read_file(&path).unwrap();
        assert_eq!(image.format, descriptor.format);
        assert_eq!(image.pixels(), &pixels[..]);

        let mut src = FileSource::open(&path).unwrap();
        let info = codec.probe(&mut src).unwrap();
        assert_eq!((info.width, info.height), (5, 4));
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = decode_file(dir.path().join("absent.bmp"), Unstoppable).unwrap_err();
    assert!(matches!(err, BitmapError::Io(_)));
    assert_eq!(err.kind(), ErrorKind::ReadError);
}

#[test]
fn truncated_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(4, 4);
    let view = BgraView::new(&pixels, 4, 4).unwrap();
    let bytes = encode_bmp(&view, &SaveOptions::new(24)).unwrap();
    let path = dir.path().join("short.bmp");
    std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

    let err = decode_bmp_file(&path, Unstoppable).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadError);
}

#[test]
fn file_requests_honor_limits() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = checker(8, 8);
    let view = BgraView::new(&pixels, 8, 8).unwrap();
    let path = dir.path().join("limited.tga");
    assert!(save_tga_file(&path, &view, &SaveOptions::default()) > 0);

    let limits = Limits {
        max_pixels: Some(63),
        ..Default::default()
    };
    let err = DecodeRequest::from_path(&path)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, BitmapError::LimitExceeded(_)));

    let roomy = Limits {
        max_pixels: Some(64),
        ..Default::default()
    };
    let image = DecodeRequest::from_path(&path)
        .with_limits(&roomy)
        .with_format(ImageFormat::Tga)
        .decode(Unstoppable)
        .unwrap();
    assert_eq!(image.pixels(), &pixels[..]);
}
