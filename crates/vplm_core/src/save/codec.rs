//! Value codecs shared by the section encoder and decoder
//!
//! Numbers are written in shortest round-trip form (`{:?}` for `f64`), so a
//! value read back is bit-identical to the value written. Booleans use the
//! `True`/`False` spelling found in existing save files.

use super::error::{FieldError, SaveError};
use super::{FIELD_SEP, NONE_TOKEN, PLACEHOLDER};
use crate::parameter::{Bounds, Parameter, ParameterSet};

/// Reserved in every free-text slot
pub const TEXT_RESERVED: &[&str] = &["---", "+++"];
/// Reserved in slots written as exactly one line
pub const LINE_RESERVED: &[&str] = &["---", "+++", "\n", "\r"];
/// Reserved in `|`-separated fields
pub const FIELD_RESERVED: &[&str] = &["---", "+++", "\n", "\r", "|"];

pub fn fmt_float(value: f64) -> String {
    format!("{:?}", value)
}

pub fn parse_float(text: &str) -> Result<f64, FieldError> {
    let text = text.trim();
    text.parse::<f64>().map_err(|_| FieldError::Number(text.to_string()))
}

pub fn parse_int<T: std::str::FromStr>(text: &str) -> Result<T, FieldError> {
    let text = text.trim();
    text.parse::<T>().map_err(|_| FieldError::Integer(text.to_string()))
}

pub fn fmt_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn parse_bool(text: &str) -> Result<bool, FieldError> {
    match text.trim() {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(FieldError::Bool(other.to_string())),
    }
}

/// `[1.0, 2.5]`
pub fn fmt_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| fmt_float(*v)).collect();
    format!("[{}]", items.join(", "))
}

/// Inverse of `fmt_list`.
///
/// Text without both brackets yields an empty list instead of an error; older
/// saves rely on this. Entries between the brackets must be numbers.
pub fn parse_list(text: &str) -> Result<Vec<f64>, FieldError> {
    let (Some(open), Some(close)) = (text.find('['), text.rfind(']')) else {
        return Ok(Vec::new());
    };
    if close < open {
        return Ok(Vec::new());
    }
    let inner = text[open + 1..close].trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner.split(',').map(parse_float).collect()
}

/// `['Measure', 'pi1']`
pub fn fmt_str_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    format!("[{}]", items.join(", "))
}

pub fn parse_str_list(text: &str) -> Vec<String> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|item| item.replace('\'', "").trim().to_string()).collect()
}

/// Split a `|` line, requiring exactly `expected` fields
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, FieldError> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != expected {
        return Err(FieldError::FieldCount {
            expected,
            found: fields.len(),
            text: line.to_string(),
        });
    }
    Ok(fields)
}

/// Non-blank lines of a chunk, trimmed
pub fn record_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// `name|description|units|lower, upper|#` or `name|description|units|#|value`
pub fn encode_parameter(param: &Parameter) -> String {
    let (bounds, value) = match param.bounds {
        Bounds::Range { lower, upper } => {
            (format!("{}, {}", fmt_float(lower), fmt_float(upper)), PLACEHOLDER.to_string())
        }
        Bounds::Constant(value) => (PLACEHOLDER.to_string(), fmt_float(value)),
    };
    format!("{}|{}|{}|{}|{}", param.name, param.description, param.units, bounds, value)
}

pub fn decode_parameter(line: &str) -> Result<Parameter, FieldError> {
    let fields = split_fields(line, 5)?;
    let name = fields[0];
    let bounds = match (fields[3].trim(), fields[4].trim()) {
        (PLACEHOLDER, PLACEHOLDER) => {
            return Err(FieldError::MissingBoundsAndValue(line.to_string()));
        }
        (PLACEHOLDER, value) => Bounds::Constant(parse_float(value)?),
        (bounds, _) => {
            let values = bounds.split(',').map(parse_float).collect::<Result<Vec<_>, _>>()?;
            Bounds::from_values(name, &values)?
        }
    };
    Ok(Parameter::new(name, bounds, fields[2], fields[1])?)
}

/// One parameter per line in iteration order, or `None`
pub fn encode_parameter_set(set: Option<&ParameterSet>) -> String {
    match set {
        None => NONE_TOKEN.to_string(),
        Some(set) => set.iter().map(encode_parameter).collect::<Vec<_>>().join("\n"),
    }
}

pub fn decode_parameter_set(text: &str) -> Result<Option<ParameterSet>, FieldError> {
    if text.trim() == NONE_TOKEN {
        return Ok(None);
    }
    let params = record_lines(text).map(decode_parameter).collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ParameterSet::from_parameters(params)?))
}

/// Newline-joined expressions, `None` for an empty list
pub fn encode_pi_list(list: &[String]) -> String {
    if list.is_empty() {
        return NONE_TOKEN.to_string();
    }
    list.join("\n")
}

/// A `None` line anywhere means the list is empty; a single expression spelled
/// `None` therefore does not survive a round trip.
pub fn decode_pi_list(text: &str) -> Vec<String> {
    let mut list = Vec::new();
    for line in record_lines(text) {
        if line == NONE_TOKEN {
            return Vec::new();
        }
        list.push(line.to_string());
    }
    list
}

/// Refuse `value` if it contains any of `reserved`
pub fn ensure_clean(field: &str, value: &str, reserved: &[&'static str]) -> Result<(), SaveError> {
    match reserved.iter().find(|delimiter| value.contains(**delimiter)) {
        Some(delimiter) => {
            Err(SaveError::ReservedDelimiter { field: field.to_string(), delimiter: *delimiter })
        }
        None => Ok(()),
    }
}
