//! Error types for tokenizing and parsing.

use crate::filter::FilterKind;
use crate::object::Name;
use core::fmt;

/// The main error type of this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The bytes could not be split into tokens.
    Syntax {
        /// What went wrong.
        kind: SyntaxError,
        /// The offset of the start of the offending token.
        offset: usize,
    },
    /// The tokens do not form a valid object.
    Structure(StructureError),
    /// A content stream operator has invalid operands.
    Operator(OperatorError),
    /// An inline image is malformed.
    InlineImage(InlineImageError),
    /// Filtered data is malformed.
    Filter(FilterError),
}

/// Errors produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// A literal string is missing its closing parenthesis.
    UnterminatedString,
    /// A hex string is missing its closing `>`.
    UnterminatedHexString,
    /// A hex string contains a byte that is neither a hex digit nor white space.
    InvalidHexDigit(u8),
    /// A hex string contains an odd number of digits.
    OddHexDigits,
    /// A `#` in a name is not followed by two hex digits.
    InvalidNameEscape,
    /// A number could not be parsed.
    InvalidNumber,
    /// A delimiter appeared where no token can start with it.
    UnexpectedDelimiter(u8),
}

/// Errors produced while assembling tokens into objects.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureError {
    /// The input ended before the closing `]` of an array.
    UnterminatedArray,
    /// The input ended before the closing `>>` of a dictionary.
    UnterminatedDict,
    /// A dictionary contains the same key twice.
    DuplicateKey(Name),
    /// A dictionary key is not a name.
    CorruptDict {
        /// The kind of token found in place of the key.
        found: &'static str,
    },
    /// A token of the wrong kind was found.
    UnexpectedToken {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: &'static str,
    },
    /// A keyword other than `true`, `false` and `null` outside of a content stream.
    UnexpectedKeyword(String),
    /// An operator appeared inside an array or dictionary.
    NestedOperator(String),
    /// The input ended where an object was expected.
    UnexpectedEof,
    /// More raw bytes were requested than are left.
    TruncatedData {
        /// The number of requested bytes.
        requested: usize,
        /// The number of bytes left.
        available: usize,
    },
}

/// The number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many.
    Exactly(usize),
    /// Between the two values, inclusive.
    Between(usize, usize),
}

/// Errors produced while validating content stream operators.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// The operator is not a known PDF operator.
    Unknown(String),
    /// The operator was given the wrong number of operands.
    Arity {
        /// The operator.
        operator: &'static str,
        /// The number of operands it accepts.
        expected: Arity,
        /// The number of operands it was given.
        found: usize,
    },
    /// An operand has the wrong type.
    OperandType {
        /// The operator.
        operator: &'static str,
        /// The position of the operand.
        index: usize,
        /// The expected type.
        expected: &'static str,
        /// The type that was found.
        found: &'static str,
    },
    /// An integer operand is outside of the range the operator accepts.
    OutOfRange {
        /// The operator.
        operator: &'static str,
        /// The value that was given.
        value: f64,
    },
    /// Operands were left over at the end of the content stream.
    StrayOperands(usize),
    /// A property list contains an object that is not allowed in a content stream.
    ForbiddenInPropertyList(&'static str),
    /// A `TJ` array contains something other than strings and numbers.
    InvalidTextElement(&'static str),
}

/// Errors produced while parsing inline images.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineImageError {
    /// Operands were on the stack when `BI` was read.
    StrayOperands(usize),
    /// A key of the image dictionary is not a name.
    InvalidKey(&'static str),
    /// An entry has a value of the wrong type.
    InvalidValue {
        /// The key of the entry.
        key: &'static str,
        /// The expected type.
        expected: &'static str,
        /// The type that was found.
        found: &'static str,
    },
    /// A required entry is missing.
    MissingEntry(&'static str),
    /// The decode array has an odd number of elements.
    OddDecodeArray(usize),
    /// The number of color components could not be determined.
    MissingColorSpace,
    /// The named color space is not defined in the resources.
    UnresolvedColorSpace(Name),
    /// An inline indexed color space is malformed.
    InvalidIndexed,
    /// The filter list and the decode parameters do not line up.
    FilterParamsMismatch {
        /// The number of filters.
        filters: usize,
        /// The number of decode parameter dictionaries.
        params: usize,
    },
    /// `ID` is not followed by a white-space byte.
    MissingSeparator,
    /// The image data is shorter than the dimensions require.
    TruncatedData {
        /// The number of bytes the image needs.
        expected: usize,
        /// The number of bytes left.
        available: usize,
    },
    /// The dimensions are zero or too large.
    InvalidDimensions,
    /// The image data is not followed by `EI`.
    MissingEndImage,
}

/// Errors produced by filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The filter name is not known.
    Unknown(Name),
    /// The data ended before the end-of-data marker.
    MissingEod(FilterKind),
    /// The data is malformed.
    Invalid {
        /// The filter.
        filter: FilterKind,
        /// What went wrong.
        reason: &'static str,
    },
    /// CCITT data could not be decoded.
    Ccitt(carta_ccitt::DecodeError),
    /// Predictor parameters are invalid.
    Predictor(&'static str),
    /// Decoding is not available for this filter.
    Unsupported(FilterKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { kind, offset } => write!(f, "{kind} at offset {offset}"),
            Self::Structure(e) => write!(f, "{e}"),
            Self::Operator(e) => write!(f, "{e}"),
            Self::InlineImage(e) => write!(f, "inline image: {e}"),
            Self::Filter(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::UnterminatedHexString => write!(f, "unterminated hex string"),
            Self::InvalidHexDigit(b) => write!(f, "invalid hex digit 0x{b:02x}"),
            Self::OddHexDigits => write!(f, "odd number of digits in hex string"),
            Self::InvalidNameEscape => write!(f, "invalid escape sequence in name"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::UnexpectedDelimiter(b) => write!(f, "unexpected delimiter '{}'", *b as char),
        }
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedArray => write!(f, "unterminated array"),
            Self::UnterminatedDict => write!(f, "unterminated dictionary"),
            Self::DuplicateKey(key) => write!(f, "duplicate dictionary key {key}"),
            Self::CorruptDict { found } => {
                write!(f, "corrupt dictionary: expected a name as key, found {found}")
            }
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::UnexpectedKeyword(k) => write!(f, "unexpected keyword '{k}'"),
            Self::NestedOperator(op) => write!(f, "operator '{op}' inside an array or dictionary"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::TruncatedData {
                requested,
                available,
            } => write!(f, "requested {requested} bytes, but only {available} are left"),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(op) => write!(f, "unknown operator '{op}'"),
            Self::Arity {
                operator,
                expected,
                found,
            } => write!(
                f,
                "operator '{operator}' expects {expected} operands, found {found}"
            ),
            Self::OperandType {
                operator,
                index,
                expected,
                found,
            } => write!(
                f,
                "operand {index} of operator '{operator}' must be {expected}, found {found}"
            ),
            Self::OutOfRange { operator, value } => {
                write!(f, "operand {value} of operator '{operator}' is out of range")
            }
            Self::StrayOperands(n) => write!(f, "{n} operands without an operator"),
            Self::ForbiddenInPropertyList(kind) => {
                write!(f, "{kind} is not allowed in a property list")
            }
            Self::InvalidTextElement(kind) => write!(f, "{kind} is not allowed in a TJ array"),
        }
    }
}

impl fmt::Display for InlineImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrayOperands(n) => write!(f, "{n} operands before BI"),
            Self::InvalidKey(found) => write!(f, "expected a name as key, found {found}"),
            Self::InvalidValue {
                key,
                expected,
                found,
            } => write!(f, "entry {key} must be {expected}, found {found}"),
            Self::MissingEntry(key) => write!(f, "missing entry {key}"),
            Self::OddDecodeArray(n) => write!(f, "decode array has odd length {n}"),
            Self::MissingColorSpace => write!(f, "cannot determine the number of components"),
            Self::UnresolvedColorSpace(name) => write!(f, "color space {name} is not defined"),
            Self::InvalidIndexed => write!(f, "invalid indexed color space"),
            Self::FilterParamsMismatch { filters, params } => write!(
                f,
                "{filters} filters, but {params} decode parameter dictionaries"
            ),
            Self::MissingSeparator => write!(f, "missing white space after ID"),
            Self::TruncatedData {
                expected,
                available,
            } => write!(f, "expected {expected} bytes of data, but only {available} are left"),
            Self::InvalidDimensions => write!(f, "invalid dimensions"),
            Self::MissingEndImage => write!(f, "expected end of inline image"),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown filter {name}"),
            Self::MissingEod(filter) => write!(f, "{filter}: missing EOD marker"),
            Self::Invalid { filter, reason } => write!(f, "{filter}: {reason}"),
            Self::Ccitt(e) => write!(f, "{}: {e}", FilterKind::CcittFax),
            Self::Predictor(reason) => write!(f, "predictor: {reason}"),
            Self::Unsupported(filter) => write!(f, "{filter}: decoding is not supported"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Syntax { kind, .. } => Some(kind),
            Self::Structure(e) => Some(e),
            Self::Operator(e) => Some(e),
            Self::InlineImage(e) => Some(e),
            Self::Filter(e) => Some(e),
        }
    }
}

impl core::error::Error for SyntaxError {}
impl core::error::Error for StructureError {}
impl core::error::Error for OperatorError {}
impl core::error::Error for InlineImageError {}

impl core::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Ccitt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StructureError> for Error {
    fn from(e: StructureError) -> Self {
        Self::Structure(e)
    }
}

impl From<OperatorError> for Error {
    fn from(e: OperatorError) -> Self {
        Self::Operator(e)
    }
}

impl From<InlineImageError> for Error {
    fn from(e: InlineImageError) -> Self {
        Self::InlineImage(e)
    }
}

impl From<FilterError> for Error {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

impl From<carta_ccitt::DecodeError> for Error {
    fn from(e: carta_ccitt::DecodeError) -> Self {
        Self::Filter(FilterError::Ccitt(e))
    }
}

/// Result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

macro_rules! err {
    ($err:expr) => {
        Err($err.into())
    };
}

pub(crate) use bail;
pub(crate) use err;
