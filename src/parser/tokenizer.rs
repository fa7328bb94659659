// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte-cursor scanner for document expressions
//!
//! An expression is literal text interleaved with function calls
//! (`NAME(arg, ...)`) and variable references (`<Name>`). The scanner splits
//! the input into [`Segment`]s without allocating for the text itself:
//! - zero-copy slices for literal text, names and raw arguments
//! - a single balanced-parenthesis pass per call that honours `'...'` and
//!   `"..."` quoting
//! - unterminated calls stay literal text, the scanner never fails

use super::span::Spanned;

/// A function call found in an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'input> {
    /// Call name as written, e.g. `LEFT` or `REGEXP.MATCH`
    pub name: &'input str,
    /// Raw arguments, split on top-level commas, trimmed and unquoted
    pub args: Vec<&'input str>,
}

/// One piece of a scanned expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'input> {
    /// Literal text (may still contain `<Name>` references)
    Text(&'input str),
    /// A syntactically complete function call
    Call(FunctionCall<'input>),
}

/// Scanner over an expression string
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
    end: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a scanner positioned at the start of `input`
    #[inline]
    pub fn new(input: &'input str) -> Self {
        let bytes = input.as_bytes();
        Self {
            input,
            bytes,
            pos: 0,
            end: bytes.len(),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    fn is_name_char(ch: u8) -> bool {
        ch.is_ascii_uppercase()
    }

    /// Scan a call name starting at `start`.
    ///
    /// Returns the offset of the opening parenthesis when the uppercase run
    /// (optionally `RUN.RUN`) is immediately followed by `(`.
    fn scan_call_name(&self, start: usize) -> Option<usize> {
        let mut pos = start;
        while pos < self.end && Self::is_name_char(self.bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            return None;
        }

        if pos + 1 < self.end
            && self.bytes[pos] == b'.'
            && Self::is_name_char(self.bytes[pos + 1])
        {
            let mut dotted = pos + 1;
            while dotted < self.end && Self::is_name_char(self.bytes[dotted]) {
                dotted += 1;
            }
            if dotted < self.end && self.bytes[dotted] == b'(' {
                return Some(dotted);
            }
            return None;
        }

        (pos < self.end && self.bytes[pos] == b'(').then_some(pos)
    }

    /// Find the parenthesis closing the one at `open`, skipping quoted text
    fn find_closing_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        for pos in open..self.end {
            let byte = self.bytes[pos];
            if let Some(q) = quote {
                if byte == q {
                    quote = None;
                }
                continue;
            }
            match byte {
                b'\'' | b'"' => quote = Some(byte),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Locate the next complete call at or after the cursor.
    ///
    /// Returns `(name_start, open_paren, close_paren)`.
    fn find_next_call(&self) -> Option<(usize, usize, usize)> {
        let mut pos = self.pos;
        while pos < self.end {
            let byte = self.bytes[pos];
            let run_start = Self::is_name_char(byte)
                && (pos == 0 || !Self::is_name_char(self.bytes[pos - 1]));

            if run_start {
                if let Some(open) = self.scan_call_name(pos) {
                    if let Some(close) = self.find_closing_paren(open) {
                        return Some((pos, open, close));
                    }
                    // Unterminated call: keep it as text, look for calls inside
                    pos = open + 1;
                    continue;
                }
            }
            pos += 1;
        }
        None
    }

    /// Produce the next segment, or `None` at end of input
    pub fn next_segment(&mut self) -> Option<Spanned<Segment<'input>>> {
        if self.pos >= self.end {
            return None;
        }

        let start = self.pos;
        match self.find_next_call() {
            Some((name_start, _, _)) if name_start > start => {
                self.pos = name_start;
                Some(Spanned::new(
                    Segment::Text(&self.input[start..name_start]),
                    start,
                    name_start,
                ))
            }
            Some((name_start, open, close)) => {
                self.pos = close + 1;
                let call = FunctionCall {
                    name: &self.input[name_start..open],
                    args: split_arguments(&self.input[open + 1..close]),
                };
                Some(Spanned::new(Segment::Call(call), name_start, close + 1))
            }
            None => {
                self.pos = self.end;
                Some(Spanned::new(
                    Segment::Text(&self.input[start..self.end]),
                    start,
                    self.end,
                ))
            }
        }
    }

    /// Scan the whole input
    pub fn segments(&mut self) -> Vec<Spanned<Segment<'input>>> {
        let mut segments = Vec::new();
        while let Some(segment) = self.next_segment() {
            segments.push(segment);
        }
        segments
    }
}

impl<'input> Iterator for Tokenizer<'input> {
    type Item = Spanned<Segment<'input>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_segment()
    }
}

/// Scan an expression into segments
pub fn tokenize(input: &str) -> Vec<Spanned<Segment<'_>>> {
    Tokenizer::new(input).segments()
}

/// Whether the expression contains at least one complete call
pub fn contains_call(input: &str) -> bool {
    Tokenizer::new(input).find_next_call().is_some()
}

/// Split raw argument text on top-level commas.
///
/// Commas nested in parentheses or quotes do not split. Each argument is
/// trimmed and a pair of surrounding quotes is removed. A blank trailing
/// argument is dropped, blank arguments in between are kept.
pub fn split_arguments(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return Vec::new();
    }

    let bytes = args.as_bytes();
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;

    for (pos, &byte) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if byte == q {
                quote = None;
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => {
                result.push(strip_quotes(args[start..pos].trim()));
                start = pos + 1;
            }
            _ => {}
        }
    }

    let last = args[start..].trim();
    if !last.is_empty() {
        result.push(strip_quotes(last));
    }
    result
}

/// Remove one pair of matching surrounding quotes
pub fn strip_quotes(arg: &str) -> &str {
    let bytes = arg.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &arg[1..arg.len() - 1];
        }
    }
    arg
}

/// Find every `<Name>` reference in the input.
///
/// The spanned value is the name without angle brackets. Names are non-empty
/// and contain neither `<` nor `>`.
pub fn variable_references(input: &str) -> Vec<Spanned<&str>> {
    let bytes = input.as_bytes();
    let mut refs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let name_start = pos + 1;
        let mut cursor = name_start;
        while cursor < bytes.len() && bytes[cursor] != b'>' && bytes[cursor] != b'<' {
            cursor += 1;
        }
        if cursor < bytes.len() && bytes[cursor] == b'>' && cursor > name_start {
            refs.push(Spanned::new(&input[name_start..cursor], pos, cursor + 1));
            pos = cursor + 1;
        } else {
            // Either unterminated or a nested '<': restart from there
            pos = cursor.max(name_start);
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn calls(input: &str) -> Vec<FunctionCall<'_>> {
        tokenize(input)
            .into_iter()
            .filter_map(|s| match s.value {
                Segment::Call(call) => Some(call),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        let segments = tokenize("Invoice <Number> (copy)");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].value, Segment::Text("Invoice <Number> (copy)"));
        assert!(!contains_call("Invoice <Number> (copy)"));
    }

    #[test]
    fn test_call_between_text() {
        let segments = tokenize("A_LEFT(<Name>, 3)_B");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].value, Segment::Text("A_"));
        assert_eq!(
            segments[1].value,
            Segment::Call(FunctionCall {
                name: "LEFT",
                args: vec!["<Name>", "3"],
            })
        );
        assert_eq!((segments[1].start, segments[1].end), (2, 17));
        assert_eq!(segments[2].value, Segment::Text("_B"));
    }

    #[test]
    fn test_nested_call_stays_in_outer_arguments() {
        let found = calls(r#"FORMAT(AUTOINCREMENT("Invoice",1000,1),"0000")"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "FORMAT");
        assert_eq!(
            found[0].args,
            vec![r#"AUTOINCREMENT("Invoice",1000,1)"#, "0000"]
        );
    }

    #[test]
    fn test_dotted_name() {
        let found = calls(r#"REGEXP.MATCH(<Text>,"(\d+)",1)"#);
        assert_eq!(found[0].name, "REGEXP.MATCH");
        assert_eq!(found[0].args, vec!["<Text>", r"(\d+)", "1"]);
    }

    #[test]
    fn test_name_requires_immediate_paren() {
        assert!(!contains_call("TRIM (x)"));
        assert!(!contains_call("trim(x)"));
        assert!(contains_call("xTRIM(x)"));
    }

    #[test]
    fn test_quotes_protect_commas_and_parens() {
        assert_eq!(
            split_arguments(r#""a,b", 'c)d', (e,f), g"#),
            vec!["a,b", "c)d", "(e,f)", "g"]
        );
        let found = calls(r#"IF("x",")","y","yes","no")"#);
        assert_eq!(found[0].args, vec!["x", ")", "y", "yes", "no"]);
    }

    #[test]
    fn test_blank_arguments() {
        assert!(split_arguments("   ").is_empty());
        assert_eq!(split_arguments("a,,b,"), vec!["a", "", "b"]);
        assert_eq!(split_arguments(r#""""#), vec![""]);
    }

    #[test]
    fn test_unterminated_call_is_text() {
        let segments = tokenize("LEFT(TRIM( x ),2");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].value, Segment::Text("LEFT("));
        assert!(matches!(segments[1].value, Segment::Call(ref c) if c.name == "TRIM"));
        assert_eq!(segments[2].value, Segment::Text(",2"));
    }

    #[test]
    fn test_extra_closing_paren_is_text() {
        let segments = tokenize("TRIM(a))");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].value, Segment::Text(")"));
    }

    #[test]
    fn test_variable_references() {
        let refs = variable_references("<A>-<<B>>-<>-<C D>-<E");
        let names: Vec<&str> = refs.iter().map(|r| r.value).collect();
        assert_eq!(names, vec!["A", "B", "C D"]);
        assert_eq!((refs[0].start, refs[0].end), (0, 3));
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let segments = tokenize("Größe_TOUPPER(ä)_€");
        assert_eq!(segments[0].value, Segment::Text("Größe_"));
        assert_eq!(segments[2].value, Segment::Text("_€"));
    }
}
