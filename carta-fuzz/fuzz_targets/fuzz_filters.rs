#![no_main]

use carta_syntax::filter::{Filter, FilterKind};
use libfuzzer_sys::fuzz_target;

const KINDS: [FilterKind; 7] = [
    FilterKind::AsciiHex,
    FilterKind::Ascii85,
    FilterKind::Lzw,
    FilterKind::Flate,
    FilterKind::RunLength,
    FilterKind::CcittFax,
    FilterKind::Dct,
];

// The first byte selects the filter, the rest is the encoded data.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, data)) = data.split_first() else {
        return;
    };

    let filter = Filter::new(KINDS[usize::from(selector) % KINDS.len()]);

    if let Ok(len) = filter.skip(data) {
        assert!(len <= data.len());
    }

    let _ = filter.decode(data);
});
