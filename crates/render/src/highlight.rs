//! Class-based syntax highlighting on top of syntect's default syntaxes.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Highlights `code` as `language`, returning `<span class="…">` markup.
///
/// Returns `None` when no syntax matches the language or syntect fails on
/// the input; callers fall back to [`plain`].
pub fn highlight(code: &str, language: &str) -> Option<String> {
    let syntax = SYNTAX_SET.find_syntax_by_token(language.trim())?;
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            log::debug!("highlighting {language:?} failed: {err}");
            return None;
        }
    }
    Some(generator.finalize())
}

/// Escapes `code` for display without highlighting.
pub fn plain(code: &str) -> String {
    html_escape::encode_text(code).into_owned()
}

/// Highlighted markup, or escaped plain text when the language is unknown.
///
/// The boolean reports whether highlighting was applied.
pub fn highlight_or_plain(code: &str, language: &str) -> (String, bool) {
    match highlight(code, language) {
        Some(html) => (html, true),
        None => {
            log::debug!("no syntax for {language:?}, rendering plain text");
            (plain(code), false)
        }
    }
}
