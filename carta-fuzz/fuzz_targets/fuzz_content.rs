#![no_main]

use carta_syntax::{parse_content, write_operations};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever parses must still parse after writing it back out.
    if let Ok(ops) = parse_content(data, None) {
        let written = write_operations(&ops);
        let reparsed = parse_content(&written, None);

        assert!(reparsed.is_ok(), "{reparsed:?}");
        assert_eq!(reparsed.map(|ops| ops.len()), Ok(ops.len()));
    }
});
