#![no_main]

use depcap_analyzer::scanner::classfile::ClassFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = ClassFile::parse(data);
});
