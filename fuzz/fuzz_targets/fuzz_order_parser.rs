#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = consolecache::build_orderer(Some(s));
    }
});
