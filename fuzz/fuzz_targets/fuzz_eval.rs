#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(expr) = consolecache::parse_filter_expression(s) {
            let objects = [
                serde_json::json!({"a": 1, "b": 2, "name": "x"}),
                serde_json::json!({"a": 10.5, "b": -5, "name": "y", "nested": {"z": [3, "4", null]}}),
                serde_json::json!({"active": true, "metadata": {"name": "space.q", "namespace": "ns"}}),
            ];
            for o in &objects {
                let _ = expr.evaluate(o);
            }
        }
    }
});
