//! Quoted strings.
//!
//! Four forms are recognized:
//!
//! ```text
//! "double"   escapes: \n \t \" \\
//! 'single'   escapes: \'
//! """block""" / '''block'''   verbatim, may span lines
//! ```
//!
//! A block drops exactly one newline right after the opening delimiter and
//! one right before the closing delimiter.

use crate::error::Fault;
use crate::recognizer::{Cursor, Recognizer, Span};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Inside a single-line string.
    Open,
    /// After the closing quote of a single-line string.
    Closed,
    /// Inside a triple-quoted block.
    Block,
    /// After the closing delimiter of a block.
    BlockClosed,
    Comment,
    Done,
}

pub(crate) struct Quoted<'a> {
    cursor: Cursor<'a>,
    quote: u8,
    state: State,
    resume: State,
    /// The last three bytes seen inside a block, most recent first.
    recent: [u8; 3],
}

impl<'a> Quoted<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        let quote = cursor.first();
        Self {
            cursor,
            quote,
            state: State::Open,
            resume: State::Open,
            recent: [0; 3],
        }
    }

    fn invalid(&self) -> Fault {
        Fault::syntax(format!("\"{}\" string invalid value", self.cursor.key))
    }

    fn open(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        if b == b'\n' {
            return Err(self.invalid());
        }
        self.cursor.accept();
        if b == self.quote && self.cursor.prev(1) != b'\\' {
            self.state = State::Closed;
        }
        Ok(None)
    }

    fn closed(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            _ if b == self.quote
                && self.state == State::Closed
                && self.cursor.prev(1) == self.quote
                && self.cursor.prev(2) == self.quote =>
            {
                self.cursor.accept();
                self.state = State::Block;
                Ok(None)
            }
            b' ' => Ok(None),
            b'#' => {
                self.resume = self.state;
                self.state = State::Comment;
                Ok(None)
            }
            _ => Err(self.invalid()),
        }
    }

    fn block(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        self.cursor.accept();
        let [last, before, third] = self.recent;
        if b == self.quote && last == self.quote && before == self.quote && third != b'\\' {
            self.state = State::BlockClosed;
        }
        self.recent = [b, last, before];
        Ok(None)
    }

    fn complete(&mut self) -> Result<Option<Value>, Fault> {
        let block = self.state == State::BlockClosed;
        self.state = State::Done;

        let raw = self.cursor.raw();
        let width = if block { 3 } else { 1 };
        let body = raw
            .get(width..raw.len().saturating_sub(width))
            .unwrap_or_default();
        let body = if block {
            let body = body.strip_prefix('\n').unwrap_or(body);
            body.strip_suffix('\n').unwrap_or(body)
        } else {
            body
        };
        let value = if block {
            body.to_string()
        } else {
            unescape(body, self.quote)
        };
        Ok(Some(Value::String(value)))
    }
}

impl Recognizer for Quoted<'_> {
    fn advance(&mut self, offset: usize, b: u8) -> Result<Option<Value>, Fault> {
        self.cursor.offset = offset;
        if self.state == State::Comment {
            if b != b'\n' {
                return Ok(None);
            }
            self.state = self.resume;
        }
        match self.state {
            State::Open => self.open(b),
            State::Block => self.block(b),
            State::Closed | State::BlockClosed if self.cursor.ends_value(b) => self.complete(),
            State::Closed | State::BlockClosed => self.closed(b),
            State::Comment | State::Done => Ok(None),
        }
    }

    fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn span(&self) -> Span {
        self.cursor.span
    }
}

/// Resolve the escapes allowed for `quote`; unknown escapes are kept as written.
fn unescape(body: &str, quote: u8) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let next = chars.clone().next();
        let resolved = match (quote, next) {
            (b'"', Some('n')) => Some('\n'),
            (b'"', Some('t')) => Some('\t'),
            (b'"', Some('"')) => Some('"'),
            (b'"', Some('\\')) => Some('\\'),
            (b'\'', Some('\'')) => Some('\''),
            _ => None,
        };
        match resolved {
            Some(r) => {
                out.push(r);
                chars.next();
            }
            None => out.push(c),
        }
    }
    out
}
