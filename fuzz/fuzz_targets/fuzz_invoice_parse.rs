#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Arbitrary XML must parse or fail cleanly — never panic.
        let _ = apoteka::parse::parse_str(s);
    }
});
