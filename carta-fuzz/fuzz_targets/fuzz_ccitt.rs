#![no_main]

use carta_ccitt::{DecodeSettings, EncodingMode, Sink};
use libfuzzer_sys::fuzz_target;

struct Discard;

impl Sink for Discard {
    fn push_byte(&mut self, _: u8) {}
    fn push_bytes(&mut self, _: u8, _: usize) {}
    fn next_line(&mut self) {}
}

// Header layout (9 bytes):
// [0..2]  columns (u16 LE)
// [2..4]  rows (u16 LE)
// [4]     end_of_block (bool)
// [5]     end_of_line (bool)
// [6]     byte_align (bool)
// [7]     encoding (0 = Group 4, 1 = Group 3 1D, 2+ = Group 3 2D)
// [8]     black_is_1 (bool)
// [9..]   encoded data
const HEADER_SIZE: usize = 9;

fuzz_target!(|data: &[u8]| {
    let Some((header, data)) = data.split_first_chunk::<HEADER_SIZE>() else {
        return;
    };

    let encoding = match header[7] % 3 {
        0 => EncodingMode::Group4,
        1 => EncodingMode::Group3_1D,
        _ => EncodingMode::Group3_2D { k: 2 },
    };

    let settings = DecodeSettings {
        columns: u32::from(u16::from_le_bytes([header[0], header[1]]).max(1)),
        rows: u32::from(u16::from_le_bytes([header[2], header[3]])),
        end_of_block: header[4] != 0,
        end_of_line: header[5] != 0,
        byte_align: header[6] != 0,
        encoding,
        black_is_1: header[8] != 0,
    };

    if let Ok(len) = carta_ccitt::decode(data, &mut Discard, &settings) {
        assert!(len <= data.len());
    }
});
