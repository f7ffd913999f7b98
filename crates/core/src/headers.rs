//! Metadata field extraction (`:Field: value` lines).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::code_fence::FenceTracker;
use crate::normalize::indent_of;

/// Value recorded for one metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// The field appeared once.
    Single(String),
    /// The field appeared several times, in order of appearance.
    List(Vec<String>),
}

impl PropertyValue {
    /// Returns the value when the field appeared exactly once.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Single(value) => Some(value),
            PropertyValue::List(_) => None,
        }
    }

    /// Returns every recorded value in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            PropertyValue::Single(value) => vec![value.as_str()],
            PropertyValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            PropertyValue::Single(first) => {
                *self = PropertyValue::List(vec![std::mem::take(first), value]);
            }
            PropertyValue::List(values) => values.push(value),
        }
    }
}

/// Bibliographic properties keyed by lower-cased field name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Records `value` under `name`, turning repeated fields into lists.
pub fn record_property(props: &mut Properties, name: &str, value: String) {
    let key = name.to_lowercase();
    match props.get_mut(&key) {
        Some(existing) => existing.push(value),
        None => {
            props.insert(key, PropertyValue::Single(value));
        }
    }
}

/// Splits a `:Name: value` line into its name and trimmed value.
///
/// The name must be non-empty and may not start or end with whitespace.
///
/// ```
/// use plexmark_core::headers::split_field;
///
/// assert_eq!(split_field(":Author: tav"), Some(("Author", "tav")));
/// assert_eq!(split_field("Author: tav"), None);
/// ```
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let marker = rest
        .char_indices()
        .find(|&(index, ch)| index >= 1 && ch == ':')
        .map(|(index, _)| index)?;
    let name = &rest[..marker];
    if name.is_empty() || name.starts_with(char::is_whitespace) || name.ends_with(char::is_whitespace)
    {
        return None;
    }
    Some((name, rest[marker + 1..].trim()))
}

fn is_continuation(line: &str) -> bool {
    indent_of(line) > 0 && split_field(line.trim_start()).is_none()
}

/// Scans source lines for metadata fields and records them in `props`.
///
/// Fields whose name starts with `private_prefix` (case-insensitive) are
/// recorded but removed from the returned lines, continuation lines
/// included. All other lines are returned unchanged. Indented lines directly
/// after a field continue its value, joined with single spaces.
pub fn parse_headers(lines: Vec<String>, props: &mut Properties, private_prefix: &str) -> Vec<String> {
    let private_prefix = private_prefix.to_lowercase();
    let mut fences = FenceTracker::new();
    let mut out = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();

    while let Some(line) = iter.next() {
        if fences.advance(&line) {
            out.push(line);
            continue;
        }

        let Some((name, value)) = split_field(&line) else {
            out.push(line);
            continue;
        };

        let private = !private_prefix.is_empty() && name.to_lowercase().starts_with(&private_prefix);
        let name = name.to_string();
        let mut value = value.to_string();

        if !private {
            out.push(line);
        }

        while let Some(next) = iter.next_if(|next| is_continuation(next)) {
            fences.advance(&next);
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(next.trim());
            if !private {
                out.push(next);
            }
        }

        record_property(props, &name, value);
    }

    out
}
