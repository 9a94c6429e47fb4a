//! The CCITT fax filter, backed by `carta-ccitt`.

use crate::error::Result;
use crate::filter::{DecodeParms, Discard};
use carta_ccitt::{DecodeSettings, EncodingMode, Sink};

/// Parameters of the CCITT fax filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcittParams {
    /// The encoding scheme: negative for Group 4, 0 for Group 3 one-dimensional and
    /// positive for mixed Group 3 coding.
    pub k: i64,
    /// The width of the image in pixels.
    pub columns: i64,
    /// The height of the image in pixels, or 0 if unknown.
    pub rows: i64,
    /// Whether EOL codes are required.
    pub end_of_line: bool,
    /// Whether each row starts at a byte boundary.
    pub encoded_byte_align: bool,
    /// Whether the data ends with an end-of-block marker.
    pub end_of_block: bool,
    /// Whether 1 bits stand for black pixels.
    pub black_is_1: bool,
}

impl Default for CcittParams {
    fn default() -> Self {
        Self {
            k: 0,
            columns: 1728,
            rows: 0,
            end_of_line: false,
            encoded_byte_align: false,
            end_of_block: true,
            black_is_1: false,
        }
    }
}

impl CcittParams {
    /// Read the CCITT parameters, falling back to the defaults.
    pub fn from_params(params: &DecodeParms) -> Self {
        let default = Self::default();

        Self {
            k: params.get("K").unwrap_or(default.k),
            columns: params.get("Columns").unwrap_or(default.columns),
            rows: params.get("Rows").unwrap_or(default.rows),
            end_of_line: params.get_bool("EndOfLine").unwrap_or(default.end_of_line),
            encoded_byte_align: params
                .get_bool("EncodedByteAlign")
                .unwrap_or(default.encoded_byte_align),
            end_of_block: params
                .get_bool("EndOfBlock")
                .unwrap_or(default.end_of_block),
            black_is_1: params.get_bool("BlackIs1").unwrap_or(default.black_is_1),
        }
    }

    fn settings(&self) -> DecodeSettings {
        DecodeSettings {
            // Out of range values become 0, which the decoder rejects.
            columns: u32::try_from(self.columns).unwrap_or(0),
            rows: u32::try_from(self.rows).unwrap_or(0),
            end_of_block: self.end_of_block,
            end_of_line: self.end_of_line,
            byte_align: self.encoded_byte_align,
            encoding: EncodingMode::from_k(self.k),
            black_is_1: self.black_is_1,
        }
    }
}

impl Sink for Discard {
    fn push_byte(&mut self, _: u8) {}

    fn push_bytes(&mut self, _: u8, _: usize) {}

    fn next_line(&mut self) {}
}

pub(crate) fn skip(data: &[u8], params: &CcittParams) -> Result<usize> {
    Ok(carta_ccitt::decode(data, &mut Discard, &params.settings())?)
}

pub(crate) fn decode(data: &[u8], params: &CcittParams) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    carta_ccitt::decode(data, &mut decoded, &params.settings())?;

    Ok(decoded)
}
