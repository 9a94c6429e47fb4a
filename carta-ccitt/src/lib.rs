/*!
A decoder for CCITT Group 3 and Group 4 fax images.

The decoder supports pure one-dimensional Group 3 coding (modified Huffman), mixed
one- and two-dimensional Group 3 coding and Group 4 coding, with or without EOL codes,
byte-aligned rows, an explicit end-of-block marker and inverted output.

Decoded rows are handed to a [`Sink`] as packed bytes (most significant bit first, padded
to a byte boundary at the end of each row). A set bit means white, unless
[`DecodeSettings::black_is_1`] is set.

[`decode`] returns the number of bytes of input that make up the image, which allows
locating the end of CCITT data that has no explicit length.
*/

#![forbid(unsafe_code)]

mod bit_reader;
mod decode;
#[cfg(test)]
mod encode;
mod tables;

use crate::bit_reader::BitReader;
use crate::tables::{EOFB, EOL_ZEROS, Mode};
use core::fmt;
use log::{trace, warn};

/// Upper bound for the number of columns, to reject absurd allocations.
const MAX_COLUMNS: u32 = 1 << 20;

/// The encoding mode for CCITT fax decoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncodingMode {
    /// Group 4 (pure two-dimensional coding). PDF `K < 0`.
    Group4,
    /// Group 3 one-dimensional coding. PDF `K = 0`.
    Group3_1D,
    /// Group 3 mixed one- and two-dimensional coding. PDF `K > 0`.
    ///
    /// Every line is preceded by a tag bit that tells which coding was used, so `k` is only
    /// informational.
    Group3_2D {
        /// The maximum number of consecutive two-dimensionally coded lines plus one.
        k: u32,
    },
}

impl EncodingMode {
    /// Map the `K` parameter of the `CCITTFaxDecode` filter to an encoding mode.
    pub fn from_k(k: i64) -> Self {
        match k {
            k if k < 0 => Self::Group4,
            0 => Self::Group3_1D,
            _ => Self::Group3_2D {
                k: u32::try_from(k).unwrap_or(u32::MAX),
            },
        }
    }
}

/// Settings for decoding a CCITT image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeSettings {
    /// The width of the image in pixels.
    pub columns: u32,
    /// The height of the image in pixels. Zero means the height is unknown and is derived
    /// from the data.
    pub rows: u32,
    /// Whether the data is terminated by an end-of-block marker (EOFB for Group 4, RTC for
    /// Group 3).
    pub end_of_block: bool,
    /// Whether each line is expected to be preceded by an EOL code.
    pub end_of_line: bool,
    /// Whether each encoded line starts at a byte boundary.
    pub byte_align: bool,
    /// The encoding that was used.
    pub encoding: EncodingMode,
    /// Whether black pixels should be written as 1 bits.
    pub black_is_1: bool,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            columns: 1728,
            rows: 0,
            end_of_block: true,
            end_of_line: false,
            byte_align: false,
            encoding: EncodingMode::Group3_1D,
            black_is_1: false,
        }
    }
}

/// Receives decoded rows.
pub trait Sink {
    /// Push a single packed byte of pixels.
    fn push_byte(&mut self, byte: u8);
    /// Push `count` copies of the same packed byte.
    fn push_bytes(&mut self, byte: u8, count: usize);
    /// Called after the last byte of each row.
    fn next_line(&mut self);
}

impl Sink for Vec<u8> {
    fn push_byte(&mut self, byte: u8) {
        self.push(byte);
    }

    fn push_bytes(&mut self, byte: u8, count: usize) {
        self.resize(self.len() + count, byte);
    }

    fn next_line(&mut self) {}
}

/// An error that occurred while decoding CCITT data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ended before the image was complete.
    UnexpectedEof,
    /// A bit sequence that is not a valid code was encountered.
    InvalidCode,
    /// A run length overflowed.
    Overflow,
    /// A line did not add up to the number of columns.
    LineLength,
    /// The number of columns is zero or unreasonably large.
    InvalidColumns,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of data"),
            Self::InvalidCode => write!(f, "invalid code"),
            Self::Overflow => write!(f, "run length overflow"),
            Self::LineLength => write!(f, "line length does not match the number of columns"),
            Self::InvalidColumns => write!(f, "invalid number of columns"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// A result type for CCITT decoding.
pub type Result<T> = core::result::Result<T, DecodeError>;

/// Decode a CCITT image into `sink`.
///
/// Returns the number of bytes the image occupied in `data`, including a trailing
/// end-of-block marker and the padding bits of the last byte.
pub fn decode(data: &[u8], sink: &mut impl Sink, settings: &DecodeSettings) -> Result<usize> {
    if settings.columns == 0 || settings.columns > MAX_COLUMNS {
        return Err(DecodeError::InvalidColumns);
    }

    let mut reader = BitReader::new(data);
    let mut lines = Lines::new(sink, settings);

    loop {
        if settings.rows != 0 && lines.decoded_rows == settings.rows {
            skip_end_of_block(&mut reader, settings);
            break;
        }

        let kind = match settings.encoding {
            EncodingMode::Group4 => g4_line_start(&mut reader, settings),
            EncodingMode::Group3_1D | EncodingMode::Group3_2D { .. } => {
                g3_line_start(&mut reader, settings)?
            }
        };

        match kind {
            LineKind::OneDimensional => lines.decode_1d(&mut reader)?,
            LineKind::TwoDimensional => lines.decode_2d(&mut reader)?,
            LineKind::EndOfBlock => {
                trace!("end of block after {} rows", lines.decoded_rows);
                break;
            }
            LineKind::EndOfData => break,
        }
    }

    reader.align();

    Ok(reader.byte_pos())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    OneDimensional,
    TwoDimensional,
    EndOfBlock,
    EndOfData,
}

fn take_eofb(reader: &mut BitReader<'_>) -> bool {
    if reader.peek_bits(24) == Ok(EOFB) {
        reader.skip_bits(24);
        true
    } else {
        false
    }
}

fn out_of_data(reader: &BitReader<'_>, settings: &DecodeSettings) -> bool {
    settings.rows == 0 && !settings.end_of_block && reader.only_padding_left()
}

fn g4_line_start(reader: &mut BitReader<'_>, settings: &DecodeSettings) -> LineKind {
    if take_eofb(reader) {
        return LineKind::EndOfBlock;
    }

    if settings.byte_align {
        reader.align();

        if take_eofb(reader) {
            return LineKind::EndOfBlock;
        }
    }

    if out_of_data(reader, settings) {
        return LineKind::EndOfData;
    }

    LineKind::TwoDimensional
}

fn g3_line_start(reader: &mut BitReader<'_>, settings: &DecodeSettings) -> Result<LineKind> {
    let two_d = matches!(settings.encoding, EncodingMode::Group3_2D { .. });

    // With byte alignment but without EOLs, the fill bits could otherwise be mistaken for
    // the leading zeros of an EOL.
    if settings.byte_align && !settings.end_of_line {
        reader.align();
    }

    let mut eols = 0;
    let mut tag = None;

    while let Some(len) = reader.eol_len(EOL_ZEROS) {
        reader.skip_bits(len);
        eols += 1;

        if two_d {
            tag = Some(reader.read_bit()?);
        }
    }

    // Two or more EOLs in a row are the start of the RTC sequence.
    if eols >= 2 {
        return Ok(LineKind::EndOfBlock);
    }

    if eols == 0 {
        if settings.end_of_line {
            warn!("missing EOL code before line");
        }

        if settings.byte_align {
            reader.align();
        }

        if out_of_data(reader, settings) {
            return Ok(LineKind::EndOfData);
        }
    }

    if !two_d {
        return Ok(LineKind::OneDimensional);
    }

    let tag = match tag {
        Some(tag) => tag,
        None => reader.read_bit()?,
    };

    Ok(if tag == 1 {
        LineKind::OneDimensional
    } else {
        LineKind::TwoDimensional
    })
}

/// Consume an end-of-block marker that follows the last row, if there is one.
fn skip_end_of_block(reader: &mut BitReader<'_>, settings: &DecodeSettings) {
    match settings.encoding {
        EncodingMode::Group4 => {
            let mut ahead = reader.clone();

            if take_eofb(&mut ahead) || {
                ahead.align();
                take_eofb(&mut ahead)
            } {
                *reader = ahead;
            }
        }
        EncodingMode::Group3_1D | EncodingMode::Group3_2D { .. } => {
            let two_d = matches!(settings.encoding, EncodingMode::Group3_2D { .. });
            let mut ahead = reader.clone();
            let mut eols = 0;

            while let Some(len) = ahead.eol_len(EOL_ZEROS) {
                ahead.skip_bits(len);
                eols += 1;

                if two_d && ahead.read_bit().is_err() {
                    break;
                }
            }

            if eols >= 2 {
                *reader = ahead;
            }
        }
    }
}

/// Accumulates pixels into bytes, most significant bit first.
#[derive(Default)]
struct BitPacker {
    buffer: u8,
    count: u8,
}

impl BitPacker {
    fn push_bit(&mut self, bit: u8) -> Option<u8> {
        self.buffer = (self.buffer << 1) | bit;
        self.count += 1;

        (self.count == 8).then(|| self.take())
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the pending bits padded with zeros, if there are any.
    fn flush(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }

        self.buffer <<= 8 - self.count;
        Some(self.take())
    }

    fn take(&mut self) -> u8 {
        let byte = self.buffer;
        self.buffer = 0;
        self.count = 0;
        byte
    }
}

/// Line decoding state.
///
/// Colors are stored per pixel, 0 for white and 1 for black. Both lines have one extra
/// white pixel at the end so that searching for changing elements never runs out of bounds.
struct Lines<'a, S: Sink> {
    reference: Vec<u8>,
    coding: Vec<u8>,
    sink: &'a mut S,
    packer: BitPacker,
    columns: usize,
    /// Whether the next run is white.
    white: bool,
    /// First changing element on the reference line right of a0 with the opposite color of a0.
    b1: usize,
    /// Next changing element right of b1 on the reference line.
    b2: usize,
    decoded_rows: u32,
    black_is_1: bool,
}

impl<'a, S: Sink> Lines<'a, S> {
    fn new(sink: &'a mut S, settings: &DecodeSettings) -> Self {
        let columns = settings.columns as usize;

        Self {
            // The reference line of the first row is an imaginary white line.
            reference: vec![0; columns + 1],
            coding: Vec::with_capacity(columns + 1),
            sink,
            packer: BitPacker::default(),
            columns,
            white: true,
            b1: columns,
            b2: columns,
            decoded_rows: 0,
            black_is_1: settings.black_is_1,
        }
    }

    /// The position of the next pixel to decode, `None` before the first pixel of a line.
    fn a0(&self) -> Option<usize> {
        (!self.coding.is_empty()).then_some(self.coding.len())
    }

    fn color(&self) -> u8 {
        u8::from(!self.white)
    }

    fn decode_1d(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        while self.coding.len() < self.columns {
            let run = reader.decode_run(self.white)?;
            self.push_pixels(run)?;
            self.white = !self.white;
        }

        self.finish_line()
    }

    fn decode_2d(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        self.find_b1_b2();

        while self.coding.len() < self.columns {
            let a0 = self.a0().unwrap_or(0);

            match reader.decode_mode()? {
                Mode::Pass => {
                    self.push_pixels(self.b2 - a0)?;
                }
                Mode::Horizontal => {
                    let a0a1 = reader.decode_run(self.white)?;
                    let a1a2 = reader.decode_run(!self.white)?;
                    self.push_pixels(a0a1)?;
                    self.white = !self.white;
                    self.push_pixels(a1a2)?;
                    self.white = !self.white;
                }
                Mode::Vertical(delta) => {
                    let a1 = self
                        .b1
                        .checked_add_signed(isize::from(delta))
                        .filter(|a1| *a1 >= a0)
                        .ok_or(DecodeError::LineLength)?;
                    self.push_pixels(a1 - a0)?;
                    self.white = !self.white;
                }
            }

            self.find_b1_b2();
        }

        self.finish_line()
    }

    fn find_b1_b2(&mut self) {
        let opposite = self.color() ^ 1;

        let (start, mut last) = match self.a0() {
            Some(a0) => (a0 + 1, self.reference[a0]),
            None => (0, 0),
        };

        self.b1 = start.min(self.columns);

        while self.b1 < self.columns {
            let color = self.reference[self.b1];

            if color != last && color == opposite {
                break;
            }

            last = color;
            self.b1 += 1;
        }

        self.b2 = self.b1;

        while self.b2 < self.columns && self.reference[self.b2] == self.reference[self.b1] {
            self.b2 += 1;
        }
    }

    fn push_pixels(&mut self, count: usize) -> Result<()> {
        if self.coding.len() + count > self.columns {
            return Err(DecodeError::LineLength);
        }

        let color = self.color();
        let bit = color ^ u8::from(!self.black_is_1);
        let mut remaining = count;

        while !self.packer.is_empty() && remaining > 0 {
            if let Some(byte) = self.packer.push_bit(bit) {
                self.sink.push_byte(byte);
            }

            remaining -= 1;
        }

        if remaining >= 8 {
            let byte = if bit == 1 { 0xFF } else { 0x00 };
            self.sink.push_bytes(byte, remaining / 8);
            remaining %= 8;
        }

        for _ in 0..remaining {
            if let Some(byte) = self.packer.push_bit(bit) {
                self.sink.push_byte(byte);
            }
        }

        self.coding.resize(self.coding.len() + count, color);

        Ok(())
    }

    fn finish_line(&mut self) -> Result<()> {
        if self.coding.len() != self.columns {
            return Err(DecodeError::LineLength);
        }

        if let Some(byte) = self.packer.flush() {
            self.sink.push_byte(byte);
        }

        core::mem::swap(&mut self.reference, &mut self.coding);
        self.reference.push(0);
        self.coding.clear();
        self.white = true;
        self.decoded_rows += 1;
        self.sink.next_line();

        Ok(())
    }
}
