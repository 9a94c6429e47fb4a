#![no_main]

use carta_syntax::parse_objects;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = parse_objects(data);
});
