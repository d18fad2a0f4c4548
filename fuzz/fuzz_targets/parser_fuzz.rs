//! Parser fuzz target: feed arbitrary text to the draft pipeline.
//! Assembly must not panic; malformed blocks are skipped or dropped.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let config = draftgen::Config::default();
    let backend = draftgen::CppBackend::new(config.cpp.clone());
    let _ = draftgen::generate(s, &config, &backend, "fuzz");
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
