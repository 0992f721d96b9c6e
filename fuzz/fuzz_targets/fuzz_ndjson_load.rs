#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16384 { return; }
    let s = match std::str::from_utf8(data) { Ok(x) => x, Err(_) => return };
    let Ok(cache) = consolecache::create_object_cache(&consolecache::IndexConfig::default()) else { return };
    for line in s.lines() {
        if let Ok(obj) = consolecache::Resource::from_json(line) {
            let _ = cache.add(obj.clone());
            let _ = cache.delete(&obj);
        }
    }
    assert!(cache.is_empty());
});
