#![no_main]

use depcap_analyzer::scanner::android_linter::manifest_attribute;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = manifest_attribute(content, "Lint-Registry-v2");
    }
});
