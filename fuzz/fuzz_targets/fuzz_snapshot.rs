#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must fail cleanly, and anything that loads must answer queries
    if let Ok(index) = closest::ClosestMatch::<serde_json::Value>::read_from(data) {
        let _ = index.closest_n("fuzz", 3);
    }
});
