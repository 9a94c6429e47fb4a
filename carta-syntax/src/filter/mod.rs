//! Stream filters.
//!
//! Every filter can do two things: find the end of a unit of encoded data
//! ([`Filter::skip`]) and decode it ([`Filter::decode`]). Skipping is what inline images
//! need, since their data has no explicit length. It never reads past the end-of-data
//! marker of the filter, so that whatever follows the encoded data stays untouched.

mod ascii_85;
mod ascii_hex;
mod ccitt;
mod dct;
mod flate;
mod lzw;
mod predictor;
mod run_length;

pub use ccitt::CcittParams;
pub use lzw::LzwParams;
pub use predictor::PredictorParams;

use crate::error::{FilterError, Result};
use crate::object::{Dict, Name, Object};
use core::fmt;
use log::{debug, warn};
use std::collections::BTreeMap;

/// The kind of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// `ASCIIHexDecode`, abbreviated `AHx`.
    AsciiHex,
    /// `ASCII85Decode`, abbreviated `A85`.
    Ascii85,
    /// `LZWDecode`, abbreviated `LZW`.
    Lzw,
    /// `FlateDecode`, abbreviated `Fl`.
    Flate,
    /// `RunLengthDecode`, abbreviated `RL`.
    RunLength,
    /// `CCITTFaxDecode`, abbreviated `CCF`.
    CcittFax,
    /// `DCTDecode`, abbreviated `DCT`.
    Dct,
}

impl FilterKind {
    /// Look up a filter by its full or abbreviated name.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"ASCIIHexDecode" | b"AHx" => Self::AsciiHex,
            b"ASCII85Decode" | b"A85" => Self::Ascii85,
            b"LZWDecode" | b"LZW" => Self::Lzw,
            b"FlateDecode" | b"Fl" => Self::Flate,
            b"RunLengthDecode" | b"RL" => Self::RunLength,
            b"CCITTFaxDecode" | b"CCF" => Self::CcittFax,
            b"DCTDecode" | b"DCT" => Self::Dct,
            _ => return None,
        })
    }

    /// The full name of the filter.
    pub fn name(self) -> &'static str {
        match self {
            Self::AsciiHex => "ASCIIHexDecode",
            Self::Ascii85 => "ASCII85Decode",
            Self::Lzw => "LZWDecode",
            Self::Flate => "FlateDecode",
            Self::RunLength => "RunLengthDecode",
            Self::CcittFax => "CCITTFaxDecode",
            Self::Dct => "DCTDecode",
        }
    }

    /// The abbreviated name of the filter, as used in inline images.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::AsciiHex => "AHx",
            Self::Ascii85 => "A85",
            Self::Lzw => "LZW",
            Self::Flate => "Fl",
            Self::RunLength => "RL",
            Self::CcittFax => "CCF",
            Self::Dct => "DCT",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&Name> for FilterKind {
    type Error = FilterError;

    fn try_from(name: &Name) -> core::result::Result<Self, Self::Error> {
        Self::from_name(name).ok_or_else(|| FilterError::Unknown(name.clone()))
    }
}

/// The decode parameters of a filter.
///
/// Only integer and boolean entries are kept, booleans as 0 or 1. No filter supported
/// here takes parameters of other types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeParms(BTreeMap<String, i64>);

impl DecodeParms {
    /// Create empty decode parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build decode parameters from a dictionary.
    pub fn from_dict(dict: &Dict) -> Self {
        let mut params = Self::new();

        for (key, value) in dict.iter() {
            match value {
                Object::Integer(i) => params.insert(key.as_str(), *i),
                Object::Boolean(b) => params.insert(key.as_str(), i64::from(*b)),
                other => warn!(
                    "ignoring decode parameter {key} of type {}",
                    other.type_name()
                ),
            }
        }

        params
    }

    /// Convert the parameters back into a dictionary.
    pub fn to_dict(&self) -> Dict {
        self.0
            .iter()
            .map(|(k, v)| (Name::from(k.as_str()), Object::Integer(*v)))
            .collect()
    }

    /// Set a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: i64) {
        self.0.insert(key.into(), value);
    }

    /// Look up an integer parameter.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    /// Look up a boolean parameter.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).map(|v| v != 0)
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the parameters, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A filter together with its decode parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The kind of filter.
    pub kind: FilterKind,
    /// The decode parameters.
    pub params: DecodeParms,
}

impl Filter {
    /// Create a filter with default parameters.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            params: DecodeParms::new(),
        }
    }

    /// Create a filter with the given parameters.
    pub fn with_params(kind: FilterKind, params: DecodeParms) -> Self {
        Self { kind, params }
    }

    /// Find the end of the encoded data at the start of `data`.
    ///
    /// Returns the number of bytes up to and including the end-of-data marker. Data that
    /// ends before the marker is an error.
    pub fn skip(&self, data: &[u8]) -> Result<usize> {
        let len = match self.kind {
            FilterKind::AsciiHex => ascii_hex::skip(data),
            FilterKind::Ascii85 => ascii_85::skip(data),
            FilterKind::RunLength => run_length::skip(data),
            FilterKind::Lzw => lzw::skip(data, &LzwParams::from_params(&self.params)),
            FilterKind::Flate => flate::skip(data),
            FilterKind::Dct => dct::skip(data),
            FilterKind::CcittFax => ccitt::skip(data, &CcittParams::from_params(&self.params)),
        }?;

        debug!("{}: {len} of {} bytes are encoded data", self.kind, data.len());

        Ok(len)
    }

    /// Decode `data`.
    ///
    /// Anything after the end-of-data marker is ignored.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.kind {
            FilterKind::AsciiHex => ascii_hex::decode(data),
            FilterKind::Ascii85 => ascii_85::decode(data),
            FilterKind::RunLength => run_length::decode(data),
            FilterKind::Lzw => lzw::decode(data, &self.params),
            FilterKind::Flate => flate::decode(data, &self.params),
            FilterKind::Dct => dct::decode(data, &self.params),
            FilterKind::CcittFax => ccitt::decode(data, &CcittParams::from_params(&self.params)),
        }
    }
}

/// Apply a list of filters in order, each to the output of the previous one.
pub fn decode_chain(filters: &[Filter], data: &[u8]) -> Result<Vec<u8>> {
    let Some((first, rest)) = filters.split_first() else {
        return Ok(data.to_vec());
    };

    let mut decoded = first.decode(data)?;

    for filter in rest {
        decoded = filter.decode(&decoded)?;
    }

    Ok(decoded)
}

fn invalid(filter: FilterKind, reason: &'static str) -> FilterError {
    FilterError::Invalid { filter, reason }
}

/// Where a decoder writes its output.
pub(crate) trait Output {
    fn write(&mut self, bytes: &[u8]);
}

impl Output for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// An output that drops everything, for finding the end of the data without keeping it.
pub(crate) struct Discard;

impl Output for Discard {
    fn write(&mut self, _: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(FilterKind::from_name(b"Fl"), Some(FilterKind::Flate));
        assert_eq!(FilterKind::from_name(b"FlateDecode"), Some(FilterKind::Flate));
        assert_eq!(FilterKind::from_name(b"CCF"), Some(FilterKind::CcittFax));
        assert_eq!(FilterKind::from_name(b"JBIG2Decode"), None);
        assert_eq!(FilterKind::Ascii85.to_string(), "ASCII85Decode");
    }

    #[test]
    fn params_from_dict() {
        let dict: Dict = [
            (Name::from("K"), Object::Integer(-1)),
            (Name::from("BlackIs1"), Object::Boolean(true)),
            (Name::from("JBIG2Globals"), Object::Name(Name::from("X"))),
        ]
        .into_iter()
        .collect();

        let params = DecodeParms::from_dict(&dict);
        assert_eq!(params.get("K"), Some(-1));
        assert_eq!(params.get_bool("BlackIs1"), Some(true));
        assert_eq!(params.get("JBIG2Globals"), None);
        assert_eq!(params.to_dict().len(), 2);
    }

    #[test]
    fn chain() {
        let filters = [
            Filter::new(FilterKind::AsciiHex),
            Filter::new(FilterKind::RunLength),
        ];

        // Run-length data `02 41 42 43 80`, hex encoded.
        assert_eq!(decode_chain(&filters, b"0241424380>").unwrap(), b"ABC");
        assert_eq!(decode_chain(&[], b"raw").unwrap(), b"raw");
    }
}
