#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(sc) = drill_config::scenario_from_reader(data) {
        // Lookups must stay in bounds for any time, before or after the rows
        let _ = sc.at(0);
        let _ = sc.at(sc.end_ms());
        let _ = sc.at(u64::MAX);
    }
});
