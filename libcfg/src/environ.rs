//! `$NAME` references, resolved against the process environment.
//!
//! An unset variable reads as the empty string.

use std::env;

use crate::error::Fault;
use crate::recognizer::{Cursor, Recognizer, Span};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Open,
    Comment,
    Done,
}

pub(crate) struct Environ<'a> {
    cursor: Cursor<'a>,
    state: State,
}

impl<'a> Environ<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            state: State::Open,
        }
    }

    fn complete(&mut self) -> Result<Option<Value>, Fault> {
        self.state = State::Done;
        let literal = self.cursor.literal();
        if literal == "$" {
            return Err(Fault::syntax(format!(
                "\"{}\" environ invalid value",
                self.cursor.key
            )));
        }
        if literal.contains(' ') {
            return Err(Fault::syntax(format!(
                "\"{} = {}\" environ invalid value",
                self.cursor.key, literal
            )));
        }
        Ok(Some(Value::String(env::var(&literal[1..]).unwrap_or_default())))
    }
}

impl Recognizer for Environ<'_> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::recognize;

    #[test]
    fn test_resolves_variable() {
        env::set_var("LIBCFG_ENVIRON_TEST", "/home/cfg");
        assert_eq!(
            recognize("$LIBCFG_ENVIRON_TEST  # home\n", false),
            Ok(Value::from("/home/cfg"))
        );
        assert_eq!(
            recognize("$LIBCFG_ENVIRON_TEST]", true),
            Ok(Value::from("/home/cfg"))
        );
    }

    #[test]
    fn test_unset_variable_is_empty() {
        env::remove_var("LIBCFG_ENVIRON_UNSET");
        assert_eq!(
            recognize("$LIBCFG_ENVIRON_UNSET\n", false),
            Ok(Value::from(""))
        );
    }

    #[test]
    fn test_invalid_references() {
        assert_eq!(
            recognize("$\n", false),
            Err(Fault::syntax("\"key\" environ invalid value"))
        );
        assert_eq!(
            recognize("$HOME PATH\n", false),
            Err(Fault::syntax("\"key = $HOME PATH\" environ invalid value"))
        );
    }
}
