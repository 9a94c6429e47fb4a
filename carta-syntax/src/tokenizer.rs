//! Splitting PDF bytes into tokens.

use crate::error::{Error, Result, StructureError, SyntaxError};
use crate::object::Name;
use crate::reader::Reader;
use crate::trivia::{hex_value, is_regular_character, is_white_space_character};
use core::num::IntErrorKind;
use smallvec::SmallVec;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The end of the input.
    Eof,
    /// An integer.
    Integer(i64),
    /// A real number.
    Float(f64),
    /// A literal string, with escapes resolved.
    String(Vec<u8>),
    /// A hex string, decoded to its bytes.
    HexString(Vec<u8>),
    /// A name, with `#XX` escapes resolved.
    Name(Name),
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// `<<`
    StartDict,
    /// `>>`
    EndDict,
    /// Any other run of regular characters, like `true`, `null` or an operator.
    Other(Vec<u8>),
}

impl Token {
    /// A short description of the kind of token, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Eof => "end of input",
            Self::Integer(_) => "integer",
            Self::Float(_) => "real",
            Self::String(_) => "string",
            Self::HexString(_) => "hex string",
            Self::Name(_) => "name",
            Self::StartArray => "'['",
            Self::EndArray => "']'",
            Self::StartDict => "'<<'",
            Self::EndDict => "'>>'",
            Self::Other(_) => "keyword",
        }
    }
}

/// A token that was read ahead, together with the offset right after it.
#[derive(Debug)]
struct Scanned {
    token: Result<Token>,
    end: usize,
}

/// A tokenizer with two tokens of lookahead.
///
/// Tokens are produced lazily. Peeking scans ahead without moving the position, which
/// always sits right after the last token returned by [`Tokenizer::next_token`].
#[derive(Debug)]
pub struct Tokenizer<'a> {
    data: &'a [u8],
    reader: Reader<'a>,
    position: usize,
    lookahead: SmallVec<[Scanned; 2]>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            reader: Reader::new(data),
            position: 0,
            lookahead: SmallVec::new(),
        }
    }

    /// The offset right after the last consumed token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        let scanned = if self.lookahead.is_empty() {
            self.scan()
        } else {
            self.lookahead.remove(0)
        };

        self.position = scanned.end;
        scanned.token
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token> {
        self.peek_at(0)
    }

    /// Look at the token after the next one without consuming anything.
    pub fn peek_peek_token(&mut self) -> Result<&Token> {
        self.peek_at(1)
    }

    fn peek_at(&mut self, idx: usize) -> Result<&Token> {
        while self.lookahead.len() <= idx {
            let scanned = self.scan();
            self.lookahead.push(scanned);
        }

        self.lookahead[idx].token.as_ref().map_err(Clone::clone)
    }

    /// Consume `n` raw bytes, bypassing tokenization.
    ///
    /// Any lookahead is discarded and tokenization resumes right after the skipped bytes.
    pub fn skip_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.data.len() - self.position;

        if n > available {
            return Err(StructureError::TruncatedData {
                requested: n,
                available,
            }
            .into());
        }

        let bytes = &self.data[self.position..self.position + n];
        self.position += n;
        self.reader.jump(self.position);
        self.lookahead.clear();

        Ok(bytes)
    }

    /// The unconsumed bytes, starting right after the last consumed token.
    pub fn bytes_from_current_position(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    fn scan(&mut self) -> Scanned {
        self.reader.skip_white_spaces_and_comments();
        let offset = self.reader.offset();
        let token = self
            .read_token()
            .map_err(|kind| Error::Syntax { kind, offset });

        Scanned {
            token,
            end: self.reader.offset(),
        }
    }

    fn read_token(&mut self) -> core::result::Result<Token, SyntaxError> {
        let r = &mut self.reader;

        let Some(first) = r.peek_byte() else {
            return Ok(Token::Eof);
        };

        match first {
            b'[' => {
                r.forward();
                Ok(Token::StartArray)
            }
            b']' => {
                r.forward();
                Ok(Token::EndArray)
            }
            b'<' if r.peek_second_byte() == Some(b'<') => {
                r.forward();
                r.forward();
                Ok(Token::StartDict)
            }
            b'<' => read_hex_string(r).map(Token::HexString),
            b'>' => {
                r.forward();

                if r.eat(|b| b == b'>').is_some() {
                    Ok(Token::EndDict)
                } else {
                    Err(SyntaxError::UnexpectedDelimiter(b'>'))
                }
            }
            b'(' => read_literal_string(r).map(Token::String),
            b')' => {
                r.forward();
                Err(SyntaxError::UnexpectedDelimiter(b')'))
            }
            b'/' => read_name(r).map(Token::Name),
            b'{' | b'}' => {
                r.forward();
                Ok(Token::Other(vec![first]))
            }
            _ => {
                let start = r.offset();
                r.forward_while(is_regular_character);
                let run = r.range(start..r.offset()).unwrap_or_default();

                if matches!(first, b'0'..=b'9' | b'+' | b'-' | b'.') {
                    if let Some(number) = parse_number(run)? {
                        return Ok(number);
                    }
                }

                Ok(Token::Other(run.to_vec()))
            }
        }
    }
}

fn read_name(r: &mut Reader<'_>) -> core::result::Result<Name, SyntaxError> {
    r.forward();
    let mut bytes = Vec::new();

    while let Some(b) = r.eat(is_regular_character) {
        if b == b'#' {
            let hi = r.eat(is_regular_character).and_then(hex_value);
            let lo = r.eat(is_regular_character).and_then(hex_value);

            match (hi, lo) {
                (Some(hi), Some(lo)) => bytes.push((hi << 4) | lo),
                _ => return Err(SyntaxError::InvalidNameEscape),
            }
        } else {
            bytes.push(b);
        }
    }

    Ok(Name::new(bytes))
}

fn read_hex_string(r: &mut Reader<'_>) -> core::result::Result<Vec<u8>, SyntaxError> {
    r.forward();
    let mut out = Vec::new();
    let mut pending = None;

    loop {
        let b = r.read_byte().ok_or(SyntaxError::UnterminatedHexString)?;

        if b == b'>' {
            break;
        } else if is_white_space_character(b) {
            continue;
        }

        let nibble = hex_value(b).ok_or(SyntaxError::InvalidHexDigit(b))?;

        match pending.take() {
            Some(hi) => out.push((hi << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    if pending.is_some() {
        return Err(SyntaxError::OddHexDigits);
    }

    Ok(out)
}

fn read_literal_string(r: &mut Reader<'_>) -> core::result::Result<Vec<u8>, SyntaxError> {
    r.forward();
    let mut out = Vec::new();
    let mut nesting = 0_i32;

    loop {
        let b = r.read_byte().ok_or(SyntaxError::UnterminatedString)?;

        match b {
            b'(' => {
                nesting += 1;
                out.push(b);
            }
            b')' => {
                nesting -= 1;

                if nesting == -1 {
                    break;
                }

                out.push(b);
            }
            b'\\' => {
                let escaped = r.read_byte().ok_or(SyntaxError::UnterminatedString)?;

                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    // A backslash at the end of a line continues the string on the next one.
                    b'\r' => {
                        r.eat(|b| b == b'\n');
                    }
                    b'\n' => {}
                    b'0'..=b'7' => {
                        let mut value = u32::from(escaped - b'0');

                        for _ in 0..2 {
                            match r.eat(|b| matches!(b, b'0'..=b'7')) {
                                Some(digit) => value = value * 8 + u32::from(digit - b'0'),
                                None => break,
                            }
                        }

                        out.push((value % 256) as u8);
                    }
                    // Covers `(`, `)` and `\`. Unknown escapes keep just the character.
                    other => out.push(other),
                }
            }
            b'\r' => {
                r.eat(|b| b == b'\n');
                out.push(b'\n');
            }
            _ => out.push(b),
        }
    }

    Ok(out)
}

/// Parse a run of regular characters as a number.
///
/// Returns `Ok(None)` if the run is not a number at all, in which case it is treated as a
/// keyword.
fn parse_number(run: &[u8]) -> core::result::Result<Option<Token>, SyntaxError> {
    let mut r = Reader::new(run);
    let signed = r.eat(|b| b == b'+' || b == b'-').is_some();

    let int_start = r.offset();
    r.forward_while(|b| b.is_ascii_digit());
    let int_digits = r.offset() - int_start;

    // PostScript radix notation, like `16#FF`.
    if !signed && int_digits > 0 && r.peek_byte() == Some(b'#') {
        return Ok(parse_radix(run, int_digits)?);
    }

    let mut real = false;
    let mut frac_digits = 0;

    if r.eat(|b| b == b'.').is_some() {
        real = true;
        let frac_start = r.offset();
        r.forward_while(|b| b.is_ascii_digit());
        frac_digits = r.offset() - frac_start;
    }

    if int_digits + frac_digits == 0 {
        return Ok(None);
    }

    // Exponents are not part of the PDF syntax, but some producers write them anyway.
    if r.eat(|b| b == b'e' || b == b'E').is_some() {
        real = true;
        r.eat(|b| b == b'+' || b == b'-');
        let exp_start = r.offset();
        r.forward_while(|b| b.is_ascii_digit());

        if r.offset() == exp_start {
            return Ok(None);
        }
    }

    if !r.at_end() {
        return Ok(None);
    }

    let Ok(text) = core::str::from_utf8(run) else {
        return Ok(None);
    };

    if !real {
        match text.parse::<i64>() {
            Ok(value) => return Ok(Some(Token::Integer(value))),
            // Too large for an integer, fall back to a real number.
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {}
            Err(_) => return Err(SyntaxError::InvalidNumber),
        }
    }

    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| Some(Token::Float(value)))
        .ok_or(SyntaxError::InvalidNumber)
}

fn parse_radix(run: &[u8], base_len: usize) -> core::result::Result<Option<Token>, SyntaxError> {
    let (base, digits) = (&run[..base_len], &run[base_len + 1..]);

    let Some(base) = core::str::from_utf8(base)
        .ok()
        .and_then(|b| b.parse::<u32>().ok())
        .filter(|b| (2..=36).contains(b))
    else {
        return Ok(None);
    };

    if digits.is_empty() || !digits.iter().all(|d| char::from(*d).is_digit(base)) {
        return Ok(None);
    }

    let digits = core::str::from_utf8(digits).map_err(|_| SyntaxError::InvalidNumber)?;

    i64::from_str_radix(digits, base)
        .map(|value| Some(Token::Integer(value)))
        .map_err(|_| SyntaxError::InvalidNumber)
}
