//! Structural rewrites of the final HTML.
//!
//! Each rewrite is a pure function over the whole document. They run in the
//! order listed by [`REWRITES`] and a second pass over their output changes
//! nothing.

use once_cell::sync::Lazy;
use regex::Regex;

static TOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<p class="topic-title([^"]*)"><a name="([^"]*)">([^<]*)</a></p>(.*?)</div>"#)
        .expect("toc pattern is valid")
});

static FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="figure([^"]*)"><p><img(.*?)/></p>(.*?)</div>"#)
        .expect("figure pattern is valid")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\n?\s*<!--(.*?)\s-->\s*\n?").expect("comment pattern is valid"));

static TITLE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<h1 class="title">(.*?)</h1>"#).expect("title pattern is valid"));

const ABSTRACT_OPEN: &str = r#"<div class="abstract topic">"#;

/// A named document rewrite.
pub type Rewrite = fn(&str) -> String;

/// The rewrites in application order.
pub const REWRITES: &[(&str, Rewrite)] = &[
    ("rewrite_toc", rewrite_toc),
    ("tag_abstract", tag_abstract),
    ("wrap_figures", wrap_figures),
    ("strip_comments", strip_comments),
    ("strip_title_headings", strip_title_headings),
];

/// Applies every rewrite in order.
pub fn restructure(html: &str) -> String {
    REWRITES.iter().fold(html.to_string(), |html, (name, rewrite)| {
        log::trace!("applying {name}");
        rewrite(&html)
    })
}

/// Splits a contents topic into a `document-toc` header and a
/// `document-toc-listing` div.
pub fn rewrite_toc(html: &str) -> String {
    TOC.replace_all(
        html,
        "<p class=\"topic-title$1\"><a name=\"$2\"></a><span id=\"document-toc\">$3</span></p>\n<div id=\"document-toc-listing\">$4</div></div>",
    )
    .into_owned()
}

/// Gives the abstract topic the `abstract` id.
pub fn tag_abstract(html: &str) -> String {
    html.replace(ABSTRACT_OPEN, r#"<div id="abstract" class="abstract topic">"#)
}

/// Wraps the image of each figure in three presentational divs.
pub fn wrap_figures(html: &str) -> String {
    FIGURE
        .replace_all(
            html,
            "<div class=\"figure$1\"><div class=\"wrap1\"><div class=\"wrap2\"><div class=\"wrap3\"><img$2/></div></div></div>$3</div>",
        )
        .into_owned()
}

/// Removes HTML comments along with the blank line around them.
pub fn strip_comments(html: &str) -> String {
    COMMENT.replace_all(html, "").into_owned()
}

/// Removes the document title heading.
pub fn strip_title_headings(html: &str) -> String {
    TITLE_HEADING.replace_all(html, "").into_owned()
}
