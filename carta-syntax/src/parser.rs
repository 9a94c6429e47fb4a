//! Assembling tokens into objects.

use crate::error::{Result, StructureError, bail};
use crate::object::{Dict, Name, ObjRef, Object};
use crate::tokenizer::{Token, Tokenizer};
use rustc_hash::FxHashSet;

/// What kind of data is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Object definitions. Indirect references are recognized and the only keywords
    /// allowed are `true`, `false` and `null`.
    Document,
    /// Content streams. There are no indirect references and any other keyword is an
    /// operator.
    Content,
}

/// A recursive-descent parser for PDF objects.
#[derive(Debug)]
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    mode: Mode,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(data: &'a [u8], mode: Mode) -> Self {
        Self {
            tokenizer: Tokenizer::new(data),
            mode,
        }
    }

    /// The mode of the parser.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Parse the next object. The end of the input is an error.
    pub fn parse_object(&mut self) -> Result<Object> {
        self.next_object()?
            .ok_or_else(|| StructureError::UnexpectedEof.into())
    }

    /// Parse the next object, or return `None` at the end of the input.
    pub fn next_object(&mut self) -> Result<Option<Object>> {
        match self.tokenizer.next_token()? {
            Token::Eof => Ok(None),
            token => self.parse_token(token, false).map(Some),
        }
    }

    pub(crate) fn tokenizer(&mut self) -> &mut Tokenizer<'a> {
        &mut self.tokenizer
    }

    fn parse_token(&mut self, token: Token, nested: bool) -> Result<Object> {
        Ok(match token {
            Token::Integer(i) => self.parse_integer(i)?,
            Token::Float(f) => Object::Float(f),
            Token::String(s) => Object::String(s),
            Token::HexString(s) => Object::HexString(s),
            Token::Name(n) => Object::Name(n),
            Token::StartArray => self.parse_array()?,
            Token::StartDict => self.parse_dict()?,
            Token::Other(keyword) => match keyword.as_slice() {
                b"true" => Object::Boolean(true),
                b"false" => Object::Boolean(false),
                b"null" => Object::Null,
                _ => {
                    let keyword = String::from_utf8_lossy(&keyword).into_owned();

                    match self.mode {
                        Mode::Content if nested => bail!(StructureError::NestedOperator(keyword)),
                        Mode::Content => Object::Command(keyword.into_bytes()),
                        Mode::Document => bail!(StructureError::UnexpectedKeyword(keyword)),
                    }
                }
            },
            Token::Eof => bail!(StructureError::UnexpectedEof),
            token @ (Token::EndArray | Token::EndDict) => {
                bail!(StructureError::UnexpectedToken {
                    expected: "object",
                    found: token.kind_name(),
                })
            }
        })
    }

    fn parse_integer(&mut self, num: i64) -> Result<Object> {
        if self.mode == Mode::Content {
            return Ok(Object::Integer(num));
        }

        // `N G R` is a reference. Anything else leaves the two lookahead tokens in place
        // for whatever is parsed next.
        let generation = match self.tokenizer.peek_token() {
            Ok(Token::Integer(generation)) => *generation,
            _ => return Ok(Object::Integer(num)),
        };

        if !matches!(self.tokenizer.peek_peek_token(), Ok(Token::Other(o)) if o == b"R") {
            return Ok(Object::Integer(num));
        }

        self.tokenizer.next_token()?;
        self.tokenizer.next_token()?;

        Ok(Object::Ref(ObjRef::new(num, generation)))
    }

    fn parse_array(&mut self) -> Result<Object> {
        let mut array = Vec::new();

        loop {
            match self.tokenizer.next_token()? {
                Token::EndArray => return Ok(Object::Array(array)),
                Token::Eof => bail!(StructureError::UnterminatedArray),
                token => array.push(self.parse_token(token, true)?),
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Object> {
        let mut dict = Dict::new();
        // Keys with a null value are dropped but still count for duplicates.
        let mut seen = FxHashSet::<Name>::default();

        loop {
            let key = match self.tokenizer.next_token()? {
                Token::EndDict => return Ok(Object::Dict(dict)),
                Token::Eof => bail!(StructureError::UnterminatedDict),
                Token::Name(key) => key,
                other => bail!(StructureError::CorruptDict {
                    found: other.kind_name()
                }),
            };

            let value = match self.tokenizer.next_token()? {
                Token::Eof => bail!(StructureError::UnterminatedDict),
                token => self.parse_token(token, true)?,
            };

            if !seen.insert(key.clone()) {
                bail!(StructureError::DuplicateKey(key));
            }

            dict.insert(key, value);
        }
    }
}

/// Parse all objects in `data` in document mode.
pub fn parse_objects(data: &[u8]) -> Result<Vec<Object>> {
    let mut parser = Parser::new(data, Mode::Document);
    let mut objects = Vec::new();

    while let Some(object) = parser.next_object()? {
        objects.push(object);
    }

    Ok(objects)
}
