#![no_main]

use depcap_analyzer::scanner::android_manifest::AndroidManifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        if let Ok(manifest) = AndroidManifest::parse(xml) {
            let _ = manifest.capability();
        }
    }
});
