//! Homogeneous arrays.
//!
//! Elements are recognized by child recognizers created in array mode, so a
//! `,` or `]` ends a scalar the way `\n` does at top level. A child array
//! consumes its own `]`; a top-level array completes at the end of its line,
//! and only blanks or a comment may follow the closing `]`.

use crate::error::Fault;
use crate::recognizer::{self, Cursor, Recognizer, Span};
use crate::value::{Value, ValueKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Open,
    /// Past the closing `]` of a top-level array.
    Closed,
    Comment,
    Done,
}

pub(crate) struct Array<'a> {
    cursor: Cursor<'a>,
    state: State,
    resume: State,
    child: Option<Box<dyn Recognizer + 'a>>,
    items: Vec<Value>,
    kind: Option<ValueKind>,
    /// A separator has been read and the next element is pending.
    expect_element: bool,
    /// An element has completed and only a separator may follow.
    settled: bool,
}

impl<'a> Array<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            state: State::Open,
            resume: State::Open,
            child: None,
            items: Vec::new(),
            kind: None,
            expect_element: true,
            settled: false,
        }
    }

    fn separator_invalid(&self) -> Fault {
        Fault::syntax(format!("\"{}\" separator is invalid", self.cursor.key))
    }

    fn push(&mut self, value: Value) -> Result<(), Fault> {
        let kind = value.kind();
        match &self.kind {
            Some(first) if *first != kind => {
                return Err(Fault::syntax(format!(
                    "\"{}\" array of different types are confused",
                    self.cursor.key
                )));
            }
            Some(_) => {}
            None => self.kind = Some(kind),
        }
        self.items.push(value);
        self.expect_element = false;
        self.settled = true;
        Ok(())
    }

    fn closed(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            b'\n' => {
                self.state = State::Done;
                Ok(Some(Value::Array(std::mem::take(&mut self.items))))
            }
            b' ' | b'\t' => Ok(None),
            b'#' => {
                self.resume = State::Closed;
                self.state = State::Comment;
                Ok(None)
            }
            _ => Err(Fault::syntax(format!(
                "\"{}\" array value is invalid",
                self.cursor.key
            ))),
        }
    }

    /// Forward a byte to the pending child, if any. `Some(true)` means the
    /// byte was consumed.
    fn feed_child(&mut self, offset: usize, b: u8) -> Result<Option<bool>, Fault> {
        let Some(child) = self.child.as_mut() else {
            return Ok(None);
        };
        let value = child.advance(offset, b)?;
        if !child.is_done() {
            return Ok(Some(true));
        }
        self.cursor.span.end = self.cursor.span.end.max(child.span().end);
        self.child = None;
        let Some(value) = value else {
            return Ok(Some(false));
        };
        let nested = matches!(value, Value::Array(_));
        self.push(value)?;
        Ok(Some(nested))
    }
}

impl Recognizer for Array<'_> {
    fn advance(&mut self, offset: usize, b: u8) -> Result<Option<Value>, Fault> {
        self.cursor.offset = offset;
        match self.state {
            State::Done => return Ok(None),
            State::Comment if b != b'\n' => return Ok(None),
            State::Comment => self.state = self.resume,
            State::Open | State::Closed => {}
        }
        if self.state == State::Closed {
            return self.closed(b);
        }

        // A nested array swallows its own `]`; a scalar shares its terminator
        // with this array.
        if self.feed_child(offset, b)? == Some(true) {
            return Ok(None);
        }

        if self.settled && !matches!(b, b' ' | b'\t' | b'\n' | b',' | b']' | b'#') {
            return Err(self.separator_invalid());
        }

        match b {
            b'+' | b'-' | b'0'..=b'9' | b't' | b'f' | b'"' | b'\'' | b'$' | b'[' => {
                self.child = recognizer::start(self.cursor.element());
                self.settled = false;
                Ok(None)
            }
            b']' => {
                self.cursor.accept();
                if !self.cursor.in_array {
                    self.state = State::Closed;
                    return Ok(None);
                }
                self.state = State::Done;
                Ok(Some(Value::Array(std::mem::take(&mut self.items))))
            }
            b' ' | b'\t' | b'\n' => Ok(None),
            b'#' => {
                self.resume = State::Open;
                self.state = State::Comment;
                Ok(None)
            }
            b',' => {
                if self.expect_element {
                    return Err(self.separator_invalid());
                }
                self.expect_element = true;
                self.settled = false;
                Ok(None)
            }
            _ => Err(Fault::syntax(format!(
                "\"{}\" array value is invalid",
                self.cursor.key
            ))),
        }
    }

    fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn span(&self) -> Span {
        self.cursor.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::recognize;

    fn array(src: &str) -> Vec<Value> {
        match recognize(src, false) {
            Ok(Value::Array(items)) => items,
            other => panic!("{:?} gave {:?}", src, other),
        }
    }

    fn error(src: &str) -> String {
        match recognize(src, false) {
            Err(Fault::Syntax(message)) => message,
            other => panic!("{:?} gave {:?}", src, other),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            array("[1, 2, 3]\n"),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
        assert_eq!(
            array("[\"a\", 'b',]\n"),
            vec![Value::from("a"), Value::from("b")]
        );
        assert_eq!(
            array("[true,false]\n"),
            vec![Value::Bool(true), Value::Bool(false)]
        );
        assert_eq!(
            array("[1s, 1ms]\n"),
            vec![Value::WideInteger(1000), Value::WideInteger(1)]
        );
        assert_eq!(array("[]\n"), vec![]);
        assert_eq!(array("[ ]\n"), vec![]);
    }

    #[test]
    fn test_multiline_with_comments() {
        assert_eq!(
            array("[\n  1, # one\n  2 # two\n  ,3,\n]\n"),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            array("[[1, 2], [3]]\n"),
            vec![
                Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
                Value::Array(vec![Value::Integer(3)]),
            ]
        );
        assert_eq!(
            array("[[], []]\n"),
            vec![Value::Array(vec![]), Value::Array(vec![])]
        );
    }

    #[test]
    fn test_mixed_types() {
        let confused = "\"key\" array of different types are confused";
        assert_eq!(error("[1, \"a\"]\n"), confused);
        assert_eq!(error("[1, 1.5]\n"), confused);
        assert_eq!(error("[1, 1s]\n"), confused);
        assert_eq!(error("[[1], [2.0]]\n"), confused);
        assert_eq!(error("[[1], []]\n"), confused);
    }

    #[test]
    fn test_separators() {
        let invalid = "\"key\" separator is invalid";
        assert_eq!(error("[,1]\n"), invalid);
        assert_eq!(error("[1,,2]\n"), invalid);
        assert_eq!(error("[[1] 2]\n"), invalid);
        assert_eq!(error("[\"a\" \"b\"]\n"), "\"key\" string invalid value");
    }

    #[test]
    fn test_invalid_element() {
        assert_eq!(error("[a]\n"), "\"key\" array value is invalid");
        assert_eq!(error("[1, =]\n"), "\"key\" array value is invalid");
    }

    #[test]
    fn test_trailing_text() {
        assert_eq!(array("[1, 2]  # two\n"), vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(array("[1]\t\n"), vec![Value::Integer(1)]);
        assert_eq!(error("[1] b = 2\n"), "\"key\" array value is invalid");
        assert_eq!(error("[1],\n"), "\"key\" array value is invalid");
    }
}
