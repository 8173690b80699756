#![no_main]
use libfuzzer_sys::fuzz_target;
use zenlegacy::*;

fuzz_target!(|data: &[u8]| {
    // Anything we can decode must survive a BMP and a TGA round trip
    let Ok(decoded) = decode(data, enough::Unstoppable) else {
        return;
    };

    let options = SaveOptions::for_image(&decoded);
    let view = decoded.view();
    let expected: Vec<u8> = if options.bit_depth == 32 {
        decoded.pixels().to_vec()
    } else {
        decoded
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    };

    for (format, encoded) in [
        (ImageFormat::Bmp, encode_bmp(&view, &options)),
        (ImageFormat::Tga, encode_tga(&view, &options.with_rle(true))),
    ] {
        // TGA caps dimensions at 65535
        let Some(encoded) = encoded else { continue };
        let Ok(again) = decode(&encoded, enough::Unstoppable) else {
            panic!("re-encoded {format:?} failed to decode");
        };
        assert_eq!(again.format, format);
        assert_eq!((again.width, again.height), (decoded.width, decoded.height));
        assert_eq!(again.pixels(), &expected[..], "{format:?} roundtrip pixel mismatch");
    }
});
