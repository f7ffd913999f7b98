//! Source decoding and whitespace normalization.

use std::borrow::Cow;

use crate::RenderError;

/// Decodes raw source bytes using an encoding label such as `utf-8` or
/// `windows-1252`.
///
/// Malformed input is an error rather than being replaced, and a leading
/// byte order mark is dropped.
///
/// ```
/// use plexmark_core::normalize::decode;
///
/// let text = decode(b"Caf\xe9 \x80", "windows-1252").unwrap();
/// assert_eq!(text, "Caf\u{e9} \u{20ac}");
/// ```
pub fn decode<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>, RenderError> {
    let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| RenderError::UnknownEncoding(label.to_string()))?;

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(RenderError::Encoding {
            encoding: encoding.name().to_string(),
        });
    }

    Ok(match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => Cow::Owned(stripped.to_string()),
            None => Cow::Owned(s),
        },
    })
}

/// Splits source text into normalized lines.
///
/// Vertical tabs and form feeds become spaces, tabs expand to `tab_width`
/// columns, and trailing whitespace is removed from every line.
pub fn normalize_lines(source: &str, tab_width: usize) -> Vec<String> {
    let source = source.trim_start_matches('\u{feff}');
    let mut lines = Vec::new();
    for raw in source.split('\n') {
        // Bare carriage returns end a line as well
        for line in raw.strip_suffix('\r').unwrap_or(raw).split('\r') {
            let line = line.replace(['\u{b}', '\u{c}'], " ");
            lines.push(expand_tabs(&line, tab_width).trim_end().to_string());
        }
    }
    // A trailing newline does not start another line
    if source.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Expands tab characters to the next multiple of `tab_width` columns.
pub fn expand_tabs(line: &str, tab_width: usize) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }

    let width = tab_width.max(1);
    let mut out = String::with_capacity(line.len() + width);
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = width - (column % width);
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    Cow::Owned(out)
}

/// Counts the leading spaces of a normalized line.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_and_drops_bom() {
        let text = decode("\u{feff}héllo".as_bytes(), "utf-8").unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn decodes_windows_1252() {
        let text = decode(b"Price in Caf\xe9s are often in \x80", "windows-1252").unwrap();
        assert_eq!(text, "Price in Caf\u{e9}s are often in \u{20ac}");
    }

    #[test]
    fn rejects_malformed_utf8() {
        let err = decode(b"Caf\xe9", "utf-8").unwrap_err();
        assert!(matches!(err, RenderError::Encoding { ref encoding } if encoding == "UTF-8"));
    }

    #[test]
    fn rejects_unknown_label() {
        let err = decode(b"abc", "klingon").unwrap_err();
        assert!(matches!(err, RenderError::UnknownEncoding(ref label) if label == "klingon"));
    }

    #[test]
    fn normalizes_whitespace() {
        let lines = normalize_lines("a\tb  \r\nc\u{b}d\u{c}\n\n", 4);
        assert_eq!(lines, vec!["a   b", "c d", ""]);
    }

    #[test]
    fn expands_tabs_to_column_stops() {
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("none", 4), "none");
    }

    #[test]
    fn counts_indent() {
        assert_eq!(indent_of("   text"), 3);
        assert_eq!(indent_of("text"), 0);
        assert_eq!(indent_of(""), 0);
    }
}
