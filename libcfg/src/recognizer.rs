//! Shared plumbing for the single-value state machines.
//!
//! A recognizer is created on the byte that starts a value (a digit or sign,
//! `t`/`f`, a quote, `$`, or `[`) and is then fed every following byte, with
//! its offset, until it produces a value. The creating byte is consumed by
//! construction.

use std::borrow::Cow;
use std::rc::Rc;

use crate::array::Array;
use crate::boolean::Boolean;
use crate::environ::Environ;
use crate::error::Fault;
use crate::number::Number;
use crate::string::Quoted;
use crate::value::Value;

/// Byte range of the literal being recognized; `end` is exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

/// A single-value state machine.
pub(crate) trait Recognizer {
    /// Feed the byte found at `offset`.
    ///
    /// Returns `Ok(Some(value))` exactly once, on the byte that completes the
    /// value. After that the recognizer is done and must be dropped.
    fn advance(&mut self, offset: usize, byte: u8) -> Result<Option<Value>, Fault>;

    /// Whether the terminal state has been reached.
    fn is_done(&self) -> bool;

    /// Extent of the text accepted so far.
    fn span(&self) -> Span;
}

/// Position record owned by each recognizer.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    pub text: &'a [u8],
    pub offset: usize,
    pub span: Span,
    pub key: Rc<str>,
    pub in_array: bool,
}

impl<'a> Cursor<'a> {
    /// A cursor positioned on the first byte of a value.
    pub fn new(text: &'a [u8], offset: usize, key: Rc<str>, in_array: bool) -> Self {
        Self {
            text,
            offset,
            span: Span {
                start: offset,
                end: offset + 1,
            },
            key,
            in_array,
        }
    }

    /// A cursor for an array element starting at the current offset.
    pub fn element(&self) -> Cursor<'a> {
        Cursor::new(self.text, self.offset, Rc::clone(&self.key), true)
    }

    /// The byte the cursor was created on.
    pub fn first(&self) -> u8 {
        self.text[self.span.start]
    }

    /// Extend the span over the current byte.
    pub fn accept(&mut self) {
        self.span.end = self.offset + 1;
    }

    /// The byte `n` positions before the current one, or 0 before the start.
    pub fn prev(&self, n: usize) -> u8 {
        if n == 0 || self.offset < n {
            return 0;
        }
        self.text[self.offset - n]
    }

    /// Whether `byte` ends a scalar: a newline, or `,`/`]` inside an array.
    pub fn ends_value(&self, byte: u8) -> bool {
        byte == b'\n' || (self.in_array && (byte == b',' || byte == b']'))
    }

    /// The accepted text with surrounding spaces removed.
    pub fn literal(&self) -> String {
        self.raw().trim_matches(' ').to_string()
    }

    /// The accepted text as-is.
    pub fn raw(&self) -> Cow<'a, str> {
        let text: &'a [u8] = self.text;
        let end = self.span.end.min(text.len());
        let start = self.span.start.min(end);
        String::from_utf8_lossy(&text[start..end])
    }
}

/// Pick the recognizer for the byte under `cursor`, if that byte can start a value.
pub(crate) fn start<'a>(cursor: Cursor<'a>) -> Option<Box<dyn Recognizer + 'a>> {
    let recognizer: Box<dyn Recognizer + 'a> = match cursor.first() {
        b'+' | b'-' | b'0'..=b'9' => Box::new(Number::new(cursor)),
        b't' | b'f' => Box::new(Boolean::new(cursor)),
        b'"' | b'\'' => Box::new(Quoted::new(cursor)),
        b'$' => Box::new(Environ::new(cursor)),
        b'[' => Box::new(Array::new(cursor)),
        _ => return None,
    };
    Some(recognizer)
}

/// Drive a recognizer over `src`, which must start with the dispatch byte.
#[cfg(test)]
pub(crate) fn recognize(src: &str, in_array: bool) -> Result<Value, Fault> {
    let text = src.as_bytes();
    let mut recognizer =
        start(Cursor::new(text, 0, Rc::from("key"), in_array)).expect("value start byte");
    for (offset, &byte) in text.iter().enumerate().skip(1) {
        if let Some(value) = recognizer.advance(offset, byte)? {
            assert!(recognizer.is_done());
            return Ok(value);
        }
    }
    panic!("recognizer did not complete on {:?}", src);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prev_before_start() {
        let cursor = Cursor::new(b"abc", 0, Rc::from("k"), false);
        assert_eq!(cursor.prev(1), 0);
        assert_eq!(cursor.prev(0), 0);
    }

    #[test]
    fn test_array_terminators() {
        let scalar = Cursor::new(b"1", 0, Rc::from("k"), false);
        let element = scalar.element();
        assert!(scalar.ends_value(b'\n'));
        assert!(!scalar.ends_value(b','));
        assert!(element.ends_value(b','));
        assert!(element.ends_value(b']'));
    }

    #[test]
    fn test_literal_is_trimmed() {
        let mut cursor = Cursor::new(b"tr ue  ", 0, Rc::from("k"), false);
        cursor.offset = 6;
        cursor.accept();
        assert_eq!(cursor.literal(), "tr ue");
    }

    #[test]
    fn test_start_rejects_other_bytes() {
        assert!(start(Cursor::new(b"abc", 0, Rc::from("k"), false)).is_none());
        assert!(start(Cursor::new(b"\n", 0, Rc::from("k"), false)).is_none());
    }
}
