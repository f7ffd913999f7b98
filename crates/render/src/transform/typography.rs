//! Typographic conversion of HTML text segments (curly quotes, dashes,
//! arrows, symbols and `[[wiki links]]`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const COMMENT_CLOSE: &str = " -->";
const COMMENT_SENTINEL: &str = "\u{0}PLEXMARK-COMMENT-CLOSE\u{0}";

/// Ordered literal replacements. `---` has to fire before `--` and the
/// arrows before either.
const LIGATURES: &[(&str, &str)] = &[
    ("-&gt;", "&rarr;"),
    ("&lt;-", "&larr;"),
    ("---", "&ndash;"),
    ("--", "&mdash;"),
    ("&lt;&lt;", "&laquo;"),
    ("&gt;&gt;", "&raquo;"),
    ("(C)", "&copy;"),
    ("(c)", "&copy;"),
    ("(tm)", "&trade;"),
    ("(TM)", "&trade;"),
    ("(r)", "&reg;"),
    ("(R)", "&reg;"),
    ("...", "&#8230;"),
];

static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[\[(.*?)\]\]").expect("wiki link pattern is valid"));

/// Converts one text segment found outside literal regions.
///
/// ```
/// use plexmark_render::transform::typography::convert;
///
/// assert_eq!(
///     convert("&quot;This is a quote&quot; -- Gandhi", ".html"),
///     "&ldquo;This is a quote&rdquo; &mdash; Gandhi"
/// );
/// ```
pub fn convert(content: &str, wiki_link_suffix: &str) -> String {
    let content = apply_ligatures(content);
    let content = curl_quotes(&content).replace('"', "&quot;");
    resolve_wiki_links(&content, wiki_link_suffix)
}

/// First pass: `&quot;` back to `"` plus the ordered ligature table.
pub fn apply_ligatures(content: &str) -> String {
    let mut content = content
        .replace("&quot;", "\"")
        .replace(COMMENT_CLOSE, COMMENT_SENTINEL);
    for (from, to) in LIGATURES {
        if content.contains(from) {
            content = content.replace(from, to);
        }
    }
    content.replace(COMMENT_SENTINEL, COMMENT_CLOSE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
}

impl Quote {
    fn of(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            _ => None,
        }
    }

    fn entities(self) -> (&'static str, &'static str) {
        match self {
            Quote::Single => ("&lsquo;", "&rsquo;"),
            Quote::Double => ("&ldquo;", "&rdquo;"),
        }
    }
}

enum Piece {
    Char(char),
    Entity(&'static str),
}

/// Quote scan over one segment.
///
/// A quote opens when none of its kind is open and the previous character
/// was whitespace (or the scan just started). It closes at a later quote of
/// the same kind not preceded by a backslash and followed by punctuation,
/// whitespace or the end of the segment. Quotes left open stay literal.
pub fn curl_quotes(content: &str) -> String {
    if !content.contains(['\'', '"']) {
        return content.to_string();
    }

    let chars: Vec<char> = content.chars().collect();
    let mut out: Vec<Piece> = Vec::with_capacity(chars.len());
    let mut open_single: Option<usize> = None;
    let mut open_double: Option<usize> = None;
    let mut after_space = true;
    let mut prev: Option<char> = None;

    for (index, &c) in chars.iter().enumerate() {
        let mut piece = Piece::Char(c);

        if let Some(kind) = Quote::of(c) {
            let open = match kind {
                Quote::Single => &mut open_single,
                Quote::Double => &mut open_double,
            };
            match *open {
                None if after_space => *open = Some(index),
                Some(start) if prev != Some('\\') => {
                    let closes = chars
                        .get(index + 1)
                        .is_none_or(|n| n.is_ascii_punctuation() || n.is_whitespace());
                    if closes {
                        let (left, right) = kind.entities();
                        out[start] = Piece::Entity(left);
                        piece = Piece::Entity(right);
                        *open = None;
                    }
                }
                _ => {}
            }
        }

        out.push(piece);
        prev = Some(c);
        after_space = c.is_whitespace();
    }

    let mut result = String::with_capacity(content.len() + 16);
    for piece in out {
        match piece {
            Piece::Char(c) => result.push(c),
            Piece::Entity(entity) => result.push_str(entity),
        }
    }
    result
}

/// Resolves `[[Target]]` and `[[Target|Label]]`.
pub fn resolve_wiki_links(content: &str, suffix: &str) -> String {
    if !content.contains("[[") {
        return content.to_string();
    }
    WIKI_LINK
        .replace_all(content, |caps: &Captures<'_>| {
            let inner = &caps[1];
            let (target, label) = inner.split_once('|').unwrap_or((inner, inner));
            let href = target
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase();
            format!("<a href=\"{href}{suffix}\">{label}</a>")
        })
        .into_owned()
}
