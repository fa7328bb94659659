//! Expression scanner
//!
//! Splits document expressions into literal text and function calls, and
//! locates `<Name>` variable references. Scanning is total: malformed input
//! degrades to literal text instead of producing errors.

#![warn(missing_docs)]

pub mod span;
pub mod tokenizer;

pub use span::Spanned;
pub use tokenizer::{
    FunctionCall, Segment, Tokenizer, contains_call, split_arguments, strip_quotes, tokenize,
    variable_references,
};
