use crate::error::Fault;
use crate::recognizer::{Cursor, Recognizer, Span};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Open,
    Comment,
    Done,
}

/// Recognizer for `true` and `false`.
pub(crate) struct Boolean<'a> {
    cursor: Cursor<'a>,
    state: State,
}

impl<'a> Boolean<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            state: State::Open,
        }
    }

    fn complete(&mut self) -> Result<Option<Value>, Fault> {
        self.state = State::Done;
        match self.cursor.literal().as_str() {
            "true" => Ok(Some(Value::Bool(true))),
            "false" => Ok(Some(Value::Bool(false))),
            literal => Err(Fault::syntax(format!(
                "\"{} = {}\" boolean invalid value",
                self.cursor.key, literal
            ))),
        }
    }
}

impl Recognizer for Boolean<'_> {
    fn advance(&mut self, offset: usize, b: u8) -> Result<Option<Value>, Fault> {
        self.cursor.offset = offset;
        match self.state {
            State::Done => Ok(None),
            State::Comment if b == b'\n' => self.complete(),
            State::Comment => Ok(None),
            State::Open if self.cursor.ends_value(b) => self.complete(),
            State::Open => {
                match b {
                    b' ' => {}
                    b'#' => self.state = State::Comment,
                    _ => self.cursor.accept(),
                }
                Ok(None)
            }
        }
    }

    fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn span(&self) -> Span {
        self.cursor.span
    }
}
