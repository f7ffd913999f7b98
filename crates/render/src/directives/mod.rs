//! Built-in directives.

mod contents;
mod figure;
mod plan;
mod raw;
mod rule;
mod syntax;
mod tag;

pub use contents::ContentsDirective;
pub(crate) use contents::{contents_marker, render_toc_html, render_toc_raw};
pub use figure::FigureDirective;
pub use plan::PlanDirective;
pub use raw::RawDirective;
pub use rule::BreakDirective;
pub use syntax::SyntaxDirective;
pub(crate) use syntax::{syntax_block, verbatim};
pub use tag::TagDirective;

use std::borrow::Cow;

/// Escapes a value for a double-quoted HTML attribute.
pub(crate) fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Escapes HTML text content.
pub(crate) fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}
