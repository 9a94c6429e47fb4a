/*!
A low-level parser for the syntax of PDF files.

This crate turns raw PDF bytes into typed values:

- [`tokenizer`] splits bytes into tokens, with two tokens of lookahead.
- [`parser`] assembles tokens into [`Object`]s, in document mode (with indirect references)
  or content-stream mode (with operators).
- [`content`] reads content streams into typed [`Operation`]s, including inline images,
  and writes them back.
- [`filter`] finds the end of filtered data and decodes it.

Higher-level concerns such as the cross-reference table, encryption, fonts or the page tree
are out of scope.

# Example

```
use carta_syntax::content::ops::{LineTo, MoveTo, StrokePath};
use carta_syntax::{Operation, parse_content, write_operations};

let ops = parse_content(b"10 10 m 20 20 l S", None).unwrap();

assert_eq!(
    ops,
    vec![
        Operation::from(MoveTo(10.0, 10.0)),
        Operation::from(LineTo(20.0, 20.0)),
        Operation::from(StrokePath),
    ]
);
assert_eq!(write_operations(&ops), b"10 10 m 20 20 l S");
```
*/

#![forbid(unsafe_code)]

pub mod colorspace;
pub mod content;
pub mod error;
pub mod filter;
pub mod object;
pub mod parser;
mod reader;
pub mod tokenizer;
pub mod trivia;

pub use content::{ContentParser, Operation, parse_content, write_operations};
pub use error::{Error, Result};
pub use object::{Dict, Name, ObjRef, Object};
pub use parser::{Mode, Parser, parse_objects};
