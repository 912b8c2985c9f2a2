//! The whitelisted methods that may be called in expressions.

use std::borrow::Cow;

use crate::render::fmt;
use crate::types::ast::Method;
use crate::types::span::Span;
use crate::value::List;
use crate::{Error, Result, Value};

/// The widest field `ljust`, `rjust` and `center` will pad to.
const MAX_WIDTH: usize = 65_536;

/// Calls a method on a receiver.
///
/// The number of arguments is checked when parsing.
pub fn call(
    source: &str,
    method: Method,
    receiver: &Value,
    args: &[Cow<'_, Value>],
    span: Span,
) -> Result<Value> {
    let cx = Call {
        source,
        method,
        span,
    };
    let value: Value = match method {
        Method::Upper => cx.string(receiver)?.to_uppercase().into(),
        Method::Lower => cx.string(receiver)?.to_lowercase().into(),
        Method::Title => title(cx.string(receiver)?).into(),
        Method::Capitalize => capitalize(cx.string(receiver)?).into(),
        Method::Strip => cx.string(receiver)?.trim().into(),
        Method::Lstrip => cx.string(receiver)?.trim_start().into(),
        Method::Rstrip => cx.string(receiver)?.trim_end().into(),
        Method::Ljust | Method::Rjust | Method::Center => {
            let s = cx.string(receiver)?;
            let width = cx.width(args)?;
            let fill = cx.fill(args)?;
            justify(method, s, width, fill).into()
        }
        Method::Join => {
            let sep = cx.string(receiver)?;
            join(&cx, sep, &args[0])?.into()
        }
        Method::Keys => {
            let map = cx.map(receiver)?;
            map.keys().map(String::as_str).collect()
        }
        Method::Values => {
            let map = cx.map(receiver)?;
            Value::List(map.values().cloned().collect())
        }
        Method::Items => {
            let map = cx.map(receiver)?;
            map.iter()
                .map(|(k, v)| Value::List(vec![Value::from(k.as_str()), v.clone()]))
                .collect()
        }
    };
    Ok(value)
}

/// The context of a single method call, used to build errors.
struct Call<'a> {
    source: &'a str,
    method: Method,
    span: Span,
}

impl Call<'_> {
    fn string<'v>(&self, value: &'v Value) -> Result<&'v str> {
        match value {
            Value::String(s) => Ok(s),
            value => Err(self.err_receiver("string", value)),
        }
    }

    fn map<'v>(&self, value: &'v Value) -> Result<&'v crate::Map<String, Value>> {
        match value {
            Value::Map(map) => Ok(map),
            value => Err(self.err_receiver("map", value)),
        }
    }

    fn width(&self, args: &[Cow<'_, Value>]) -> Result<usize> {
        match args.first().map(|v| &**v) {
            Some(Value::Integer(n)) if *n <= 0 => Ok(0),
            Some(Value::Integer(n)) => match usize::try_from(*n) {
                Ok(width) if width <= MAX_WIDTH => Ok(width),
                _ => {
                    let name = self.method.name();
                    let msg = format!("method `{name}` width {n} is too large, the maximum is {MAX_WIDTH}");
                    Err(Error::render(msg, self.source, self.span))
                }
            },
            Some(value) => Err(self.err_arg("width", "integer", value)),
            None => Ok(0),
        }
    }

    fn fill(&self, args: &[Cow<'_, Value>]) -> Result<char> {
        match args.get(1).map(|v| &**v) {
            None => Ok(' '),
            Some(Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::render(
                        "fill character must be exactly one character long",
                        self.source,
                        self.span,
                    )),
                }
            }
            Some(value) => Err(self.err_arg("fill character", "string", value)),
        }
    }

    fn err_receiver(&self, exp: &str, got: &Value) -> Error {
        let name = self.method.name();
        let got = got.human();
        Error::render(
            format!("method `{name}` expected {exp} receiver, found {got}"),
            self.source,
            self.span,
        )
    }

    fn err_arg(&self, arg: &str, exp: &str, got: &Value) -> Error {
        let name = self.method.name();
        let got = got.human();
        Error::render(
            format!("method `{name}` expected {exp} {arg}, found {got}"),
            self.source,
            self.span,
        )
    }
}

/// Uppercases the first letter of every word and lowercases the rest.
fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Pads the string with `fill` up to `width` characters.
fn justify(method: Method, s: &str, width: usize, fill: char) -> String {
    let len = s.chars().count();
    if width <= len {
        return s.to_owned();
    }
    let marg = width - len;
    let (left, right) = match method {
        Method::Ljust => (0, marg),
        Method::Rjust => (marg, 0),
        // Odd margins put the extra fill on the left only when the width is
        // also odd.
        _ => {
            let left = marg / 2 + (marg & width & 1);
            (left, marg - left)
        }
    };
    let mut out = String::with_capacity(s.len() + marg * fill.len_utf8());
    out.extend(std::iter::repeat(fill).take(left));
    out.push_str(s);
    out.extend(std::iter::repeat(fill).take(right));
    out
}

fn join(cx: &Call<'_>, sep: &str, seq: &Value) -> Result<String> {
    let items: List<String> = match seq {
        Value::List(list) => list.iter().map(fmt::to_string).collect(),
        Value::Map(map) => map.keys().cloned().collect(),
        Value::String(s) => s.chars().map(String::from).collect(),
        value => return Err(cx.err_arg("argument", "list", value)),
    };
    Ok(items.join(sep))
}
