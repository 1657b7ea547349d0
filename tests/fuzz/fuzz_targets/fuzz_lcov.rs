#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parser must not panic on any input; malformed reports are errors.
    let _ = uncov::lcov::LcovParser::parse(data, std::path::Path::new("/repo"));
});
