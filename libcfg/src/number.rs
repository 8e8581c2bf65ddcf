//! Numeric literal recognizer.
//!
//! One machine covers every literal that starts with a digit or a sign:
//!
//! | literal               | value                     |
//! |-----------------------|---------------------------|
//! | `1,000`, `-5`         | `Integer` (i32 range)     |
//! | `0644`, `0xFF`        | `Integer` (33-bit range)  |
//! | `3.14`                | `Float`                   |
//! | `2017-10-01 21:00:00` | `Datetime` (UTC)          |
//! | `1,000ms`, `2h`       | `WideInteger` (ms)        |
//! | `10KB`, `1TB`         | `WideInteger` (bytes)     |
//!
//! The first two bytes pick a family; each family has its own state.

use chrono::{NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Fault;
use crate::recognizer::{Cursor, Recognizer, Span};
use crate::value::Value;

static DATETIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}$").unwrap());

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Octal and hexadecimal literals must fit a signed 33-bit integer.
const RADIX_MIN: i64 = -(1 << 32);
const RADIX_MAX: i64 = (1 << 32) - 1;

const TOO_LARGE: &str = "number too large to fit in target type";

const SECOND: i64 = 1000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

const KB: i64 = 1024;
const MB: i64 = 1024 * KB;
const GB: i64 = 1024 * MB;
const TB: i64 = 1024 * GB;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Started with `0`: octal, hex, float, unit, or plain zero.
    LeadingZero,
    /// Started with a sign or `1`-`9`.
    Digits,
    /// Decimal digits with thousands separators.
    Separated,
    /// A sign followed by `0`; only a float may follow.
    SignedZero,
    Float,
    Octal,
    Hex,
    Datetime,
    Duration,
    Size,
    Comment,
    Done,
}

/// Recognizer for numbers, datetimes, durations and sizes.
pub(crate) struct Number<'a> {
    cursor: Cursor<'a>,
    state: State,
    resume: State,
    signed: bool,
    after_sign: bool,
}

impl<'a> Number<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        let first = cursor.first();
        let signed = first == b'+' || first == b'-';
        let state = if first == b'0' {
            State::LeadingZero
        } else {
            State::Digits
        };
        Self {
            cursor,
            state,
            resume: state,
            signed,
            after_sign: signed,
        }
    }

    fn invalid(&self, kind: &str) -> Fault {
        Fault::syntax(format!(
            "\"{} = {}\" {} invalid value",
            self.cursor.key,
            self.cursor.literal(),
            kind
        ))
    }

    /// Accept the current byte, then fail.
    fn reject(&mut self, kind: &str) -> Result<Option<Value>, Fault> {
        self.cursor.accept();
        Err(self.invalid(kind))
    }

    fn enter(&mut self, state: State) -> Result<Option<Value>, Fault> {
        self.cursor.accept();
        self.state = state;
        Ok(None)
    }

    fn comment(&mut self) -> Result<Option<Value>, Fault> {
        self.resume = self.state;
        self.state = State::Comment;
        Ok(None)
    }

    fn leading_zero(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            b'0'..=b'7' => self.enter(State::Octal),
            b'x' => self.enter(State::Hex),
            b'.' => self.enter(State::Float),
            b'm' | b's' | b'h' | b'd' => self.enter(State::Duration),
            b'B' | b'K' | b'M' | b'G' | b'T' => self.enter(State::Size),
            b'8' | b'9' => Err(Fault::syntax(format!(
                "\"{}\" oct invalid value",
                self.cursor.key
            ))),
            b' ' => Ok(None),
            b'#' => self.comment(),
            _ => Err(Fault::syntax(format!(
                "\"{}\" invalid value",
                self.cursor.key
            ))),
        }
    }

    fn digits(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        let step = match b {
            b'.' => self.enter(State::Float),
            b',' => self.enter(State::Separated),
            b'-' => {
                self.cursor.accept();
                if self.signed {
                    return Err(self.invalid("datetime"));
                }
                self.state = State::Datetime;
                Ok(None)
            }
            b'0' if self.after_sign => self.enter(State::SignedZero),
            b'0'..=b'9' => {
                self.cursor.accept();
                Ok(None)
            }
            b'm' | b's' | b'h' | b'd' => self.enter(State::Duration),
            b'B' | b'K' | b'M' | b'G' | b'T' => self.enter(State::Size),
            b' ' => Ok(None),
            b'#' => self.comment(),
            _ => self.reject("integer"),
        };
        self.after_sign = false;
        step
    }

    fn separated(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            b'0'..=b'9' | b',' => {
                self.cursor.accept();
                Ok(None)
            }
            b'm' | b's' | b'h' | b'd' => self.enter(State::Duration),
            b'B' | b'K' | b'M' | b'G' | b'T' => self.enter(State::Size),
            b' ' => Ok(None),
            b'#' => self.comment(),
            _ => self.reject("integer"),
        }
    }

    fn signed_zero(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            b'.' => self.enter(State::Float),
            _ => self.reject("oct"),
        }
    }

    /// Shared body for states that accept a fixed byte class.
    fn accept_if(&mut self, ok: bool, b: u8, kind: &str) -> Result<Option<Value>, Fault> {
        match b {
            _ if ok => {
                self.cursor.accept();
                Ok(None)
            }
            b' ' => Ok(None),
            b'#' => self.comment(),
            _ => self.reject(kind),
        }
    }

    fn duration(&mut self, b: u8) -> Result<Option<Value>, Fault> {
        match b {
            // Only `ms` may extend a unit; `ss`, `hs`, ` s` are rejected.
            b's' if self.cursor.prev(1) == b'm' => {
                self.cursor.accept();
                Ok(None)
            }
            b' ' => Ok(None),
            b'#' => self.comment(),
            _ => self.reject("time"),
        }
    }

    fn complete(&mut self) -> Result<Option<Value>, Fault> {
        let state = self.state;
        self.state = State::Done;
        let literal = self.cursor.literal();

        let value = match state {
            State::LeadingZero => Value::Integer(0),
            State::Digits => {
                self.ensure_compact(&literal, "integer")?;
                decimal(&literal)?
            }
            State::Separated => {
                self.ensure_compact(&literal, "integer")?;
                decimal(&self.strip_separators(&literal, &literal, "integer")?)?
            }
            State::SignedZero => return Err(self.invalid("oct")),
            State::Float => {
                self.ensure_compact(&literal, "float")?;
                if literal.ends_with('.') {
                    return Err(self.invalid("float"));
                }
                float(&literal)?
            }
            State::Octal => {
                self.ensure_compact(&literal, "oct")?;
                radix(&literal, &literal, 8)?
            }
            State::Hex => {
                self.ensure_compact(&literal, "hex")?;
                if literal.len() <= 2 {
                    return Err(self.invalid("hex"));
                }
                radix(&literal, &literal[2..], 16)?
            }
            State::Datetime => self.datetime(&literal)?,
            State::Duration => self.duration_value(&literal)?,
            State::Size => self.size_value(&literal)?,
            State::Comment | State::Done => return Ok(None),
        };
        Ok(Some(value))
    }

    fn ensure_compact(&self, literal: &str, kind: &str) -> Result<(), Fault> {
        if literal.contains(' ') {
            return Err(self.invalid(kind));
        }
        Ok(())
    }

    /// Remove thousands separators. Each must sit between two digits.
    fn strip_separators(&self, literal: &str, digits: &str, kind: &str) -> Result<String, Fault> {
        let unsigned = digits
            .strip_prefix(|c: char| c == '+' || c == '-')
            .unwrap_or(digits);
        if unsigned.starts_with(',') || unsigned.ends_with(',') || unsigned.contains(",,") {
            return Err(Fault::syntax(format!(
                "\"{} = {}\" {} invalid value",
                self.cursor.key, literal, kind
            )));
        }
        Ok(digits.replace(',', ""))
    }

    fn datetime(&self, literal: &str) -> Result<Value, Fault> {
        if !DATETIME.is_match(literal) {
            return Err(self.invalid("datetime"));
        }
        let naive = NaiveDateTime::parse_from_str(literal, DATETIME_FORMAT)
            .map_err(|_| self.invalid("datetime"))?;
        Ok(Value::Datetime(Utc.from_utc_datetime(&naive)))
    }

    fn duration_value(&self, literal: &str) -> Result<Value, Fault> {
        self.ensure_compact(literal, "time")?;
        let (count, unit) = if let Some(count) = literal.strip_suffix("ms") {
            (count, 1)
        } else if let Some(count) = literal.strip_suffix('s') {
            (count, SECOND)
        } else if let Some(count) = literal.strip_suffix('m') {
            (count, MINUTE)
        } else if let Some(count) = literal.strip_suffix('h') {
            (count, HOUR)
        } else if let Some(count) = literal.strip_suffix('d') {
            (count, DAY)
        } else {
            return Err(self.invalid("time"));
        };
        let count = self.strip_separators(literal, count, "time")?;
        scaled(literal, &count, unit)
    }

    fn size_value(&self, literal: &str) -> Result<Value, Fault> {
        self.ensure_compact(literal, "size")?;
        let (count, unit) = if let Some(count) = literal.strip_suffix("KB") {
            (count, KB)
        } else if let Some(count) = literal.strip_suffix("MB") {
            (count, MB)
        } else if let Some(count) = literal.strip_suffix("GB") {
            (count, GB)
        } else if let Some(count) = literal.strip_suffix("TB") {
            (count, TB)
        } else if let Some(count) = literal.strip_suffix('B') {
            (count, 1)
        } else {
            return Err(self.invalid("size"));
        };
        let count = self.strip_separators(literal, count, "size")?;
        scaled(literal, &count, unit)
    }
}

impl Recognizer for Number<'_> {
    fn advance(&mut self, offset: usize, b: u8) -> Result<Option<Value>, Fault> {
        self.cursor.offset = offset;
        if self.state == State::Comment {
            if b != b'\n' {
                return Ok(None);
            }
            self.state = self.resume;
        }
        if self.state == State::Done {
            return Ok(None);
        }
        if self.cursor.ends_value(b) {
            return self.complete();
        }

        match self.state {
            State::LeadingZero => self.leading_zero(b),
            State::Digits => self.digits(b),
            State::Separated => self.separated(b),
            State::SignedZero => self.signed_zero(b),
            State::Float => self.accept_if(b.is_ascii_digit(), b, "float"),
            State::Octal => self.accept_if(matches!(b, b'0'..=b'7'), b, "oct"),
            State::Hex => self.accept_if(b.is_ascii_hexdigit(), b, "hex"),
            State::Datetime => {
                self.accept_if(b.is_ascii_digit() || b == b'-' || b == b':', b, "datetime")
            }
            State::Duration => self.duration(b),
            State::Size => self.accept_if(b == b'B', b, "size"),
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

fn decimal(digits: &str) -> Result<Value, Fault> {
    digits
        .parse::<i32>()
        .map(|n| Value::Integer(i64::from(n)))
        .map_err(|e| Fault::number(digits, e))
}

fn float(literal: &str) -> Result<Value, Fault> {
    let f = literal
        .parse::<f32>()
        .map_err(|e| Fault::number(literal, e))?;
    if !f.is_finite() {
        return Err(Fault::number(literal, TOO_LARGE));
    }
    Ok(Value::Float(f))
}

fn radix(literal: &str, digits: &str, radix: u32) -> Result<Value, Fault> {
    let n = i64::from_str_radix(digits, radix).map_err(|e| Fault::number(literal, e))?;
    if !(RADIX_MIN..=RADIX_MAX).contains(&n) {
        return Err(Fault::number(literal, TOO_LARGE));
    }
    Ok(Value::Integer(n))
}

fn scaled(literal: &str, count: &str, unit: i64) -> Result<Value, Fault> {
    let n = count
        .parse::<i64>()
        .map_err(|e| Fault::number(count, e))?;
    n.checked_mul(unit)
        .map(Value::WideInteger)
        .ok_or_else(|| Fault::number(literal, TOO_LARGE))
}
