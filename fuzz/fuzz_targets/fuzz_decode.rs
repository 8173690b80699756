#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Auto-detected decode and header probe must never panic
    let _ = zenlegacy::decode(data, enough::Unstoppable);
    let _ = zenlegacy::ImageInfo::from_bytes(data);

    // TGA has no signature, so force each reader explicitly too
    let _ = zenlegacy::decode_bmp(data, enough::Unstoppable);
    let _ = zenlegacy::decode_tga(data, enough::Unstoppable);
    let _ = zenlegacy::decode_pcx(data, enough::Unstoppable);
});
