//! A small CCITT encoder used to produce test images.

use crate::EncodingMode;
use crate::tables::{
    BLACK_MAKEUP, BLACK_TERMINATING, COMMON_MAKEUP, MODE_CODES, WHITE_MAKEUP, WHITE_TERMINATING,
};

pub(crate) struct EncodeSettings {
    pub(crate) encoding: EncodingMode,
    pub(crate) byte_align: bool,
    pub(crate) end_of_line: bool,
    pub(crate) end_of_block: bool,
}

/// Pack a string of `0` and `1` characters into bytes, padding the last byte with zeros.
pub(crate) fn pack(bits: &str) -> Vec<u8> {
    let mut writer = BitWriter::default();

    for c in bits.bytes() {
        writer.push(u32::from(c == b'1'), 1);
    }

    writer.finish()
}

#[derive(Default)]
struct BitWriter {
    out: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    fn push(&mut self, value: u32, len: u8) {
        for i in (0..len).rev() {
            if self.bits.is_multiple_of(8) {
                self.out.push(0);
            }

            if (value >> i) & 1 == 1 {
                let last = self.out.len() - 1;
                self.out[last] |= 0x80 >> (self.bits % 8);
            }

            self.bits += 1;
        }
    }

    fn code(&mut self, (len, code): (u8, u16)) {
        self.push(u32::from(code), len);
    }

    fn align(&mut self) {
        self.bits = self.bits.next_multiple_of(8);
    }

    /// Write an EOL, preceded by enough fill bits to end it on a byte boundary if requested.
    fn eol(&mut self, byte_align: bool) {
        if byte_align {
            while (self.bits + 12) % 8 != 0 {
                self.push(0, 1);
            }
        }

        self.push(1, 12);
    }

    fn finish(self) -> Vec<u8> {
        self.out
    }
}

fn run(writer: &mut BitWriter, mut len: usize, black: bool) {
    let (terminating, makeup) = if black {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    } else {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    };

    while len >= 2560 {
        writer.code(COMMON_MAKEUP[12]);
        len -= 2560;
    }

    if len >= 64 {
        let chunk = len / 64 * 64;

        if chunk <= 1728 {
            writer.code(makeup[chunk / 64 - 1]);
        } else {
            writer.code(COMMON_MAKEUP[(chunk - 1792) / 64]);
        }

        len -= chunk;
    }

    writer.code(terminating[len]);
}

/// Position of the first pixel at or after `from` whose color differs from `color`.
fn next_change(line: &[bool], from: usize, color: bool) -> usize {
    (from..line.len())
        .find(|i| line[*i] != color)
        .unwrap_or(line.len())
}

/// The first changing element on `reference` right of `a0` whose color is `!color`.
fn find_b1(reference: &[bool], a0: Option<usize>, color: bool) -> usize {
    let start = a0.map_or(0, |a0| a0 + 1);

    (start..reference.len())
        .find(|i| {
            let previous = if *i == 0 { false } else { reference[*i - 1] };
            reference[*i] != previous && reference[*i] != color
        })
        .unwrap_or(reference.len())
}

fn encode_1d(writer: &mut BitWriter, line: &[bool]) {
    let mut pos = 0;
    let mut color = false;

    // The first run is always white, possibly with length zero.
    loop {
        let end = next_change(line, pos, color);
        run(writer, end - pos, color);

        if end == line.len() {
            break;
        }

        pos = end;
        color = !color;
    }
}

fn encode_2d(writer: &mut BitWriter, line: &[bool], reference: &[bool]) {
    let width = line.len();
    let mut a0: Option<usize> = None;
    let mut color = false;

    loop {
        let start = a0.unwrap_or(0);
        let a1 = next_change(line, start, color);
        let b1 = find_b1(reference, a0, color);
        let b2 = if b1 < width {
            next_change(reference, b1, reference[b1])
        } else {
            width
        };

        if b2 < a1 {
            writer.code(MODE_CODES[0]);
            a0 = Some(b2);
        } else if a1.abs_diff(b1) <= 3 {
            let idx = match a1 as isize - b1 as isize {
                0 => 2,
                1 => 3,
                2 => 4,
                3 => 5,
                -1 => 6,
                -2 => 7,
                _ => 8,
            };
            writer.code(MODE_CODES[idx]);
            a0 = Some(a1);
            color = !color;
        } else {
            let a2 = if a1 < width {
                next_change(line, a1, !color)
            } else {
                width
            };
            writer.code(MODE_CODES[1]);
            run(writer, a1 - start, color);
            run(writer, a2 - a1, !color);
            a0 = Some(a2);
        }

        if a0.is_some_and(|a0| a0 >= width) {
            break;
        }
    }
}

/// Encode `image` (`true` is black) row by row.
pub(crate) fn encode(image: &[Vec<bool>], settings: &EncodeSettings) -> Vec<u8> {
    let width = image.first().map_or(0, Vec::len);
    let mut writer = BitWriter::default();
    let mut reference = vec![false; width];

    for (y, line) in image.iter().enumerate() {
        match settings.encoding {
            EncodingMode::Group4 => {
                if settings.byte_align {
                    writer.align();
                }

                encode_2d(&mut writer, line, &reference);
            }
            EncodingMode::Group3_1D => {
                if settings.end_of_line {
                    writer.eol(settings.byte_align);
                } else if settings.byte_align {
                    writer.align();
                }

                encode_1d(&mut writer, line);
            }
            EncodingMode::Group3_2D { k } => {
                let one_d = y % k as usize == 0;

                if settings.end_of_line {
                    writer.eol(settings.byte_align);
                } else if settings.byte_align {
                    writer.align();
                }

                writer.push(u32::from(one_d), 1);

                if one_d {
                    encode_1d(&mut writer, line);
                } else {
                    encode_2d(&mut writer, line, &reference);
                }
            }
        }

        reference.clone_from(line);
    }

    if settings.end_of_block {
        match settings.encoding {
            EncodingMode::Group4 => {
                if settings.byte_align {
                    writer.align();
                }

                writer.push(1, 12);
                writer.push(1, 12);
            }
            EncodingMode::Group3_1D => {
                for _ in 0..6 {
                    writer.eol(settings.byte_align && settings.end_of_line);
                }
            }
            EncodingMode::Group3_2D { .. } => {
                for _ in 0..6 {
                    writer.eol(settings.byte_align && settings.end_of_line);
                    writer.push(1, 1);
                }
            }
        }
    }

    writer.finish()
}
