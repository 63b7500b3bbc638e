#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let _ = vtoggle::expr::parse_program(&src);
});
