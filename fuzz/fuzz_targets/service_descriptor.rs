#![no_main]

use depcap_analyzer::scanner::service_loader::parse_descriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        for class in parse_descriptor(content) {
            assert!(!class.is_empty());
            assert!(!class.starts_with('#'));
        }
    }
});
