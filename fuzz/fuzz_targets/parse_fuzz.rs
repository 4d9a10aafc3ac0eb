//! Parser fuzz target: feed arbitrary bytes to the notation parser.
//! The parser must not panic; it returns Ok(Packet) or a ParseError.
//! Build with: cargo fuzz run parse_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(packet) = pktmark::parse(s) {
        let _ = pktmark::render(&packet);
    }
    let _ = pktmark::highlight(s);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parse_fuzz");
}
