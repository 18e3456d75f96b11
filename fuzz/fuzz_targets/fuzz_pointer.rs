#![no_main]

use libfuzzer_sys::fuzz_target;
use oaslint::Pointer;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(pointer) = Pointer::parse(&s) {
        let reparsed = Pointer::parse(&pointer.to_string()).expect("display output parses");
        assert_eq!(pointer, reparsed);
    }
});
