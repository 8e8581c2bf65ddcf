//! Document engine.
//!
//! Walks the normalized source one byte at a time, recognizing mode headers,
//! keys, and the `=` separator, and hands each value to a recognizer. Results
//! are inserted into the tree under `mode.key`.

use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{Fault, ParseError, Result};
use crate::path;
use crate::recognizer::{self, Cursor, Recognizer};
use crate::value::{Map, Value};

/// Mode that keys belong to before any `[mode]` header in permissive parsing.
pub const CATCH_ALL: &str = "_all_";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    None,
    Comment,
    Key,
    Value,
    Mode,
}

struct Engine<'a> {
    text: &'a [u8],
    state: State,
    /// 0-based line of the byte being read.
    line: usize,
    /// Line on which the active value started.
    value_line: usize,
    /// Start of the key or mode header being captured.
    start: usize,
    mode: Option<String>,
    key: Rc<str>,
    modes: HashSet<String>,
    tree: Map,
    active: Option<Box<dyn Recognizer + 'a>>,
}

/// Parse `source` into a tree keyed by mode.
///
/// With `mode` set, keys before the first header land in that mode;
/// without it, a key before any header is an error.
pub(crate) fn parse(source: &[u8], mode: Option<&str>) -> Result<Map> {
    let text = normalize(source);
    let mut engine = Engine {
        text: text.as_bytes(),
        state: State::None,
        line: 0,
        value_line: 0,
        start: 0,
        mode: mode.map(str::to_string),
        key: Rc::from(""),
        modes: HashSet::new(),
        tree: Map::new(),
        active: None,
    };
    engine.run()?;
    Ok(engine.tree)
}

/// Decode lossily, fold CRLF and CR into LF, and make sure the last line ends.
fn normalize(source: &[u8]) -> String {
    let text = String::from_utf8_lossy(source);
    let mut text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.push('\n');
    text
}

impl<'a> Engine<'a> {
    fn run(&mut self) -> Result<()> {
        let text = self.text;
        for (offset, &b) in text.iter().enumerate() {
            self.step(offset, b)
                .map_err(|fault| fault.at(self.line, &self.key))?;
            if b == b'\n' {
                self.line += 1;
            }
        }

        // Only an unterminated block string or array can still be open here.
        if self.state != State::None || self.active.is_some() {
            return Err(ParseError::Incomplete {
                line: self.value_line + 1,
                key: self.key.to_string(),
            });
        }
        Ok(())
    }

    fn step(&mut self, offset: usize, b: u8) -> std::result::Result<(), Fault> {
        if let Some(active) = self.active.as_mut() {
            let value = active.advance(offset, b)?;
            if active.is_done() {
                self.active = None;
                self.state = State::None;
            }
            if let Some(value) = value {
                let mode = self.mode.as_deref().unwrap_or(CATCH_ALL);
                path::insert(&mut self.tree, mode, &self.key, value)?;
            }
            return Ok(());
        }

        match self.state {
            State::None => self.none(offset, b),
            State::Comment => {
                if b == b'\n' {
                    self.state = State::None;
                }
                Ok(())
            }
            State::Key => self.key(offset, b),
            State::Value => self.value(offset, b),
            State::Mode => self.mode(offset, b),
        }
    }

    fn none(&mut self, offset: usize, b: u8) -> std::result::Result<(), Fault> {
        match b {
            b'#' => self.state = State::Comment,
            b'\n' | b' ' | b'\t' => {}
            b'[' => {
                self.state = State::Mode;
                self.start = offset + 1;
            }
            b'?' | b'!' | b'@' | b'$' | b'%' | b'^' | b'&' | b'*' | b'(' | b')' | b'+' | b'|'
            | b'\\' | b']' | b'`' | b'"' | b'-' | b'{' | b'}' | b':' | b';' | b'<' | b'>'
            | b'/' | b',' | b'~' | b'\'' | b'=' => {
                return Err(Fault::syntax("key name specified is not special character"));
            }
            _ => {
                if self.mode.is_none() {
                    return Err(Fault::syntax("mode name is empty"));
                }
                self.state = State::Key;
                self.start = offset;
            }
        }
        Ok(())
    }

    fn mode(&mut self, offset: usize, b: u8) -> std::result::Result<(), Fault> {
        match b {
            b'\n' => Err(Fault::syntax("no set modename")),
            b']' => {
                let name = self
                    .capture(offset)
                    .trim_matches(|c: char| c == ' ' || c == '\t')
                    .to_string();
                validate_mode(&name)?;
                if !self.modes.insert(name.clone()) {
                    return Err(Fault::syntax(format!("\"{}\" mode is already exists", name)));
                }
                self.tree
                    .entry(name.clone())
                    .or_insert_with(|| Value::Map(Map::new()));
                self.mode = Some(name);
                self.state = State::None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn key(&mut self, offset: usize, b: u8) -> std::result::Result<(), Fault> {
        match b {
            b'\n' => Err(Fault::syntax("invalid configuration")),
            b'=' => {
                let key = self
                    .capture(offset)
                    .trim_matches(|c: char| c == ' ' || c == '\t')
                    .to_lowercase();
                self.key = Rc::from(key.as_str());
                validate_key(&key)?;
                self.state = State::Value;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn value(&mut self, offset: usize, b: u8) -> std::result::Result<(), Fault> {
        if b == b' ' || b == b'\t' {
            return Ok(());
        }
        let cursor = Cursor::new(self.text, offset, Rc::clone(&self.key), false);
        match recognizer::start(cursor) {
            Some(active) => {
                self.active = Some(active);
                self.value_line = self.line;
                Ok(())
            }
            None => Err(Fault::syntax(format!("\"{}\" invalid value", self.key))),
        }
    }

    /// Text from the capture start up to, not including, `offset`.
    fn capture(&self, offset: usize) -> String {
        String::from_utf8_lossy(&self.text[self.start..offset]).into_owned()
    }
}

fn validate_mode(name: &str) -> std::result::Result<(), Fault> {
    if name.is_empty() {
        return Err(Fault::syntax("mode name is empty"));
    }
    if name.contains(|c: char| c.is_ascii_whitespace()) {
        return Err(Fault::syntax(format!("\"{}\" mode name is invalid", name)));
    }
    if name.starts_with('_') {
        return Err(Fault::syntax(format!(
            "\"{}\" can not specify '_' first character",
            name
        )));
    }
    Ok(())
}

/// Keys are dotted runs of `[a-z0-9_]` segments. No segment may be empty,
/// start with a digit or `_`, or end with `_`.
fn validate_key(key: &str) -> std::result::Result<(), Fault> {
    let invalid = || Fault::syntax(format!("\"{}\" key name is invalid", key));

    if !key
        .bytes()
        .all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
    {
        return Err(invalid());
    }
    for segment in key.split('.') {
        let (Some(first), Some(last)) = (segment.bytes().next(), segment.bytes().last()) else {
            return Err(invalid());
        };
        if first.is_ascii_digit() || first == b'_' || last == b'_' {
            return Err(invalid());
        }
    }
    Ok(())
}
