//! Builtin field transforms, addressable by name from a schema file.

use chrono::{DateTime, NaiveDate};

use crate::error::TransformError;
use crate::record::Node;

/// Signature shared by every builtin.
pub type BuiltinTransform = fn(&Node) -> Result<Node, TransformError>;

const BUILTINS: &[(&str, BuiltinTransform)] = &[
    ("uppercase", uppercase),
    ("lowercase", lowercase),
    ("trim", trim),
    ("parse_integer", parse_integer),
    ("parse_float", parse_float),
    ("parse_bool", parse_bool),
    ("iso_date", iso_date),
    ("timestamp_millis", timestamp_millis),
];

/// Date layouts accepted by [`iso_date`], tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<BuiltinTransform> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, func)| *func)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

fn expect_str(value: &Node) -> Result<&str, TransformError> {
    value.as_str().ok_or(TransformError::UnexpectedType {
        expected: "string",
        actual: value.kind(),
    })
}

pub fn uppercase(value: &Node) -> Result<Node, TransformError> {
    Ok(Node::from(expect_str(value)?.to_uppercase()))
}

pub fn lowercase(value: &Node) -> Result<Node, TransformError> {
    Ok(Node::from(expect_str(value)?.to_lowercase()))
}

pub fn trim(value: &Node) -> Result<Node, TransformError> {
    Ok(Node::from(expect_str(value)?.trim()))
}

/// Numbers pass through when already integral.
pub fn parse_integer(value: &Node) -> Result<Node, TransformError> {
    if let Some(n) = value.as_i64() {
        return Ok(Node::from(n));
    }
    let text = expect_str(value)?.trim();
    text.parse::<i64>()
        .map(Node::from)
        .map_err(|e| TransformError::ExecutionError(format!("'{}' is not an integer: {}", text, e)))
}

pub fn parse_float(value: &Node) -> Result<Node, TransformError> {
    if let Some(n) = value.as_f64() {
        return Ok(Node::from(n));
    }
    let text = expect_str(value)?.trim();
    let parsed = text
        .parse::<f64>()
        .map_err(|e| TransformError::ExecutionError(format!("'{}' is not a number: {}", text, e)))?;
    if !parsed.is_finite() {
        return Err(TransformError::ExecutionError(format!("'{}' is not finite", text)));
    }
    Ok(Node::from(parsed))
}

pub fn parse_bool(value: &Node) -> Result<Node, TransformError> {
    if let Some(b) = value.as_bool() {
        return Ok(Node::from(b));
    }
    match expect_str(value)?.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(Node::from(true)),
        "false" | "no" | "n" | "0" => Ok(Node::from(false)),
        other => Err(TransformError::ExecutionError(format!(
            "'{}' is not a boolean",
            other
        ))),
    }
}

/// Normalize a date string to `YYYY-MM-DD`.
pub fn iso_date(value: &Node) -> Result<Node, TransformError> {
    let text = expect_str(value)?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| Node::from(date.format("%Y-%m-%d").to_string()))
        .ok_or_else(|| TransformError::ExecutionError(format!("'{}' is not a date", text)))
}

/// RFC 3339 timestamp to milliseconds since the Unix epoch.
pub fn timestamp_millis(value: &Node) -> Result<Node, TransformError> {
    let text = expect_str(value)?.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|ts| Node::from(ts.timestamp_millis()))
        .map_err(|e| TransformError::ExecutionError(format!("'{}' is not RFC 3339: {}", text, e)))
}
