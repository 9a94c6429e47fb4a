//! A decoder for LZW-encoded data.

use crate::error::{FilterError, Result};
use crate::filter::predictor::{self, PredictorParams};
use crate::filter::{DecodeParms, Discard, FilterKind, Output, invalid};

const CLEAR_TABLE: usize = 256;
const EOD: usize = 257;
const MAX_ENTRIES: usize = 4096;
const INITIAL_SIZE: usize = 258;

/// Parameters of the LZW filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwParams {
    /// Whether code lengths grow one code early, which is what most encoders do.
    pub early_change: bool,
}

impl Default for LzwParams {
    fn default() -> Self {
        Self { early_change: true }
    }
}

impl LzwParams {
    /// Read the LZW parameters, falling back to the defaults.
    pub fn from_params(params: &DecodeParms) -> Self {
        Self {
            early_change: params.get_bool("EarlyChange").unwrap_or(true),
        }
    }
}

pub(crate) fn skip(data: &[u8], params: &LzwParams) -> Result<usize> {
    decode_inner(data, params.early_change, &mut Discard)
}

pub(crate) fn decode(data: &[u8], params: &DecodeParms) -> Result<Vec<u8>> {
    let lzw = LzwParams::from_params(params);
    let mut decoded = vec![];
    decode_inner(data, lzw.early_change, &mut decoded)?;

    predictor::apply(decoded, &PredictorParams::from_params(params))
}

/// Decode into `out`, returning the length of the encoded data.
fn decode_inner(data: &[u8], early_change: bool, out: &mut impl Output) -> Result<usize> {
    let mut table = Table::new(early_change);
    let mut reader = CodeReader::new(data);
    let mut prev: Option<usize> = None;

    loop {
        let code = reader
            .read(table.code_length())
            .ok_or(FilterError::MissingEod(FilterKind::Lzw))?;

        match code {
            CLEAR_TABLE => {
                table.clear();
                prev = None;
            }
            EOD => return Ok(reader.consumed_bytes()),
            code => {
                if let Some(entry) = table.get(code) {
                    let first = entry[0];
                    out.write(entry);

                    if let Some(prev) = prev {
                        table.register(prev, first);
                    }
                } else if code == table.len() {
                    // The code that is about to be defined: the previous entry followed by
                    // its own first byte.
                    let prev = prev.ok_or_else(|| invalid(FilterKind::Lzw, "invalid code"))?;
                    let first = table
                        .get(prev)
                        .map(|e| e[0])
                        .ok_or_else(|| invalid(FilterKind::Lzw, "invalid code"))?;
                    table.register(prev, first);

                    let entry = table
                        .get(code)
                        .ok_or_else(|| invalid(FilterKind::Lzw, "table overflow"))?;
                    out.write(entry);
                } else {
                    return Err(invalid(FilterKind::Lzw, "invalid code").into());
                }

                prev = Some(code);
            }
        }
    }
}

struct CodeReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> CodeReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read(&mut self, bits: u8) -> Option<usize> {
        let mut value = 0;

        for _ in 0..bits {
            let byte = self.data.get(self.bit_pos / 8)?;
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            value = (value << 1) | usize::from(bit);
            self.bit_pos += 1;
        }

        Some(value)
    }

    fn consumed_bytes(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }
}

struct Table {
    early_change: bool,
    entries: Vec<Vec<u8>>,
}

impl Table {
    fn new(early_change: bool) -> Self {
        let mut entries: Vec<_> = (0..=255).map(|b| vec![b]).collect();

        // Clear table and EOD don't have any data.
        entries.push(vec![]);
        entries.push(vec![]);

        Self {
            early_change,
            entries,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, code: usize) -> Option<&[u8]> {
        self.entries
            .get(code)
            .filter(|e| !e.is_empty())
            .map(|e| e.as_slice())
    }

    fn register(&mut self, prev: usize, byte: u8) {
        // A full table stays as it is until the encoder clears it.
        if self.entries.len() >= MAX_ENTRIES {
            return;
        }

        if let Some(prev_entry) = self.entries.get(prev) {
            let mut entry = Vec::with_capacity(prev_entry.len() + 1);
            entry.extend_from_slice(prev_entry);
            entry.push(byte);
            self.entries.push(entry);
        }
    }

    fn clear(&mut self) {
        self.entries.truncate(INITIAL_SIZE);
    }

    fn code_length(&self) -> u8 {
        let adjusted = self.entries.len() + usize::from(self.early_change);

        match adjusted {
            0..512 => 9,
            512..1024 => 10,
            1024..2048 => 11,
            _ => 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn code_width(next: usize) -> u8 {
        match next {
            0..512 => 9,
            512..1024 => 10,
            1024..2048 => 11,
            _ => 12,
        }
    }

    #[derive(Default)]
    struct CodeWriter {
        data: Vec<u8>,
        bit_pos: usize,
    }

    impl CodeWriter {
        fn write(&mut self, code: usize, bits: u8) {
            for i in (0..bits).rev() {
                if self.bit_pos % 8 == 0 {
                    self.data.push(0);
                }

                let bit = ((code >> i) & 1) as u8;
                *self.data.last_mut().unwrap() |= bit << (7 - self.bit_pos % 8);
                self.bit_pos += 1;
            }
        }
    }

    /// An LZW encoder with early change that clears its table before it fills up.
    fn encode(data: &[u8]) -> Vec<u8> {
        let mut writer = CodeWriter::default();
        let mut table = FxHashMap::default();
        let mut next = INITIAL_SIZE;
        let mut current: Option<usize> = None;

        writer.write(CLEAR_TABLE, 9);

        for &byte in data {
            let Some(prefix) = current else {
                current = Some(usize::from(byte));
                continue;
            };

            if let Some(&code) = table.get(&(prefix, byte)) {
                current = Some(code);
                continue;
            }

            writer.write(prefix, code_width(next));
            table.insert((prefix, byte), next);
            next += 1;
            current = Some(usize::from(byte));

            if next == 4000 {
                writer.write(CLEAR_TABLE, code_width(next));
                table.clear();
                next = INITIAL_SIZE;
            }
        }

        if let Some(prefix) = current {
            writer.write(prefix, code_width(next));
            next += 1;
        }

        writer.write(EOD, code_width(next));
        writer.data
    }

    #[test]
    fn encoder_round_trip() {
        let data = b"BT /F1 12 Tf (hello hello hello world) Tj ET ".repeat(200);
        let encoded = encode(&data);

        assert_eq!(decode(&encoded, &DecodeParms::new()).unwrap(), data);
        assert_eq!(skip(&encoded, &LzwParams::default()), Ok(encoded.len()));
    }

    #[test]
    fn skip_highly_compressible() {
        // Enough zeros to clear the table several times.
        let data = vec![0; 32 * 1024 * 1024];
        let mut encoded = encode(&data);
        let len = encoded.len();
        assert!(len < 64 * 1024);

        encoded.extend_from_slice(b"\nEI");

        assert_eq!(skip(&encoded, &LzwParams::default()), Ok(len));
    }

    #[test]
    fn simple_lzw() {
        let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        let decoded = decode(&input, &DecodeParms::new()).unwrap();

        assert_eq!(decoded, vec![45, 45, 45, 45, 45, 65, 45, 45, 45, 66]);
        assert_eq!(skip(&input, &LzwParams::default()), Ok(9));
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let mut input = vec![0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        input.extend_from_slice(b" EI Q");

        assert_eq!(skip(&input, &LzwParams::default()), Ok(9));
    }

    #[test]
    fn missing_eod() {
        let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C];
        assert_eq!(
            skip(&input, &LzwParams::default()),
            Err(FilterError::MissingEod(FilterKind::Lzw).into())
        );
    }

    #[test]
    fn invalid_code() {
        // A clear code followed by code 300, which is not defined yet.
        let input = [0x80, 0x4B, 0x00];
        assert!(skip(&input, &LzwParams::default()).is_err());
    }
}
