#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let registry = oaslint::Registry::with_builtin_rules();
    if let Ok(report) = oaslint::lint(&s, &registry, &oaslint::LintConfig::default()) {
        assert!(report.failures.is_empty(), "{:?}", report.failures);
    }
});
