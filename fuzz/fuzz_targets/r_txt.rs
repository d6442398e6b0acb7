#![no_main]

use depcap_analyzer::scanner::android_res::parse_r_txt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let lines = parse_r_txt(content);
        let mut seen = std::collections::BTreeSet::new();
        for line in &lines {
            assert!(seen.insert(line), "R.txt lines must be deduplicated");
        }
    }
});
