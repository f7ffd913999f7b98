//! Literal-region aware pass over rendered HTML.

use super::typography::convert;

/// Element whose text is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LiteralRegion {
    /// Any of the preformatted or code elements, keyed by tag name.
    Element(String),
    /// `<pre class="doctest-block">`.
    Doctest,
}

impl LiteralRegion {
    fn closing_tag(&self) -> &str {
        match self {
            LiteralRegion::Element(name) => name,
            LiteralRegion::Doctest => "pre",
        }
    }
}

const LITERAL_ELEMENTS: &[&str] = &["pre", "code", "tt", "style", "script"];

/// Splits `html` into alternating content and tag segments.
///
/// Even positions are content, odd positions are tag bodies without the
/// angle brackets. An unterminated `<` is left in the content.
fn split_tags(html: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open + 1..].find('>') else {
            break;
        };
        segments.push(&rest[..open]);
        segments.push(&rest[open + 1..open + 1 + close]);
        rest = &rest[open + 1 + close + 1..];
    }
    segments.push(rest);
    segments
}

fn tag_name(tag: &str) -> &str {
    let end = tag
        .find(|c: char| c.is_whitespace() || (c == '/' && !tag.starts_with('/')))
        .unwrap_or(tag.len());
    &tag[..end]
}

fn is_doctest_pre(tag: &str) -> bool {
    tag.split_whitespace()
        .skip(1)
        .any(|attr| attr.starts_with("class=") && attr.contains("doctest-block"))
}

/// Marks interactive prompts and output lines of a doctest block.
pub fn doctest_to_html(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.starts_with("&gt;&gt;&gt;") || line.starts_with("...") {
                format!("<span class=\"doctest-input\">{line}</span>")
            } else if !line.is_empty() {
                format!("<span class=\"doctest-output\">{line}</span>")
            } else {
                String::new()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies [`convert`] to text outside literal regions, marks doctest
/// lines, then re-escapes `<<` and bare ampersands.
///
/// One literal region is tracked at a time: a `pre`, `code`, `tt`, `style`
/// or `script` opening tag starts it when none is active and the matching
/// closing tag ends it.
pub fn escape_and_prettify(html: &str, wiki_link_suffix: &str) -> String {
    let mut region: Option<LiteralRegion> = None;
    let mut output = String::with_capacity(html.len() + html.len() / 8);

    for (index, segment) in split_tags(html.trim()).into_iter().enumerate() {
        if index % 2 == 1 {
            let name = tag_name(segment).to_ascii_lowercase();
            if let Some(closing) = name.strip_prefix('/') {
                if region.as_ref().is_some_and(|r| r.closing_tag() == closing) {
                    region = None;
                }
            } else if region.is_none() && LITERAL_ELEMENTS.contains(&name.as_str()) {
                region = Some(if name == "pre" && is_doctest_pre(segment) {
                    LiteralRegion::Doctest
                } else {
                    LiteralRegion::Element(name)
                });
            }
            output.push('<');
            output.push_str(segment);
            output.push('>');
            continue;
        }

        match region {
            Some(LiteralRegion::Doctest) => output.push_str(&doctest_to_html(segment)),
            Some(LiteralRegion::Element(_)) => output.push_str(segment),
            None => output.push_str(&convert(segment, wiki_link_suffix)),
        }
    }

    escape_bare_ampersands(&output.replace("<<", "&lt;<"))
}

/// Escapes every `&` that does not start a character reference, that is,
/// no `;` follows before the next whitespace or `&`.
pub fn escape_bare_ampersands(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        if c != '&' {
            out.push(c);
            continue;
        }
        let is_reference = text[index + 1..]
            .chars()
            .take_while(|n| !n.is_whitespace() && *n != '&')
            .any(|n| n == ';');
        if is_reference {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_alternating_segments() {
        assert_eq!(
            split_tags("a<b>c</b>"),
            vec!["a", "b", "c", "/b", ""]
        );
        assert_eq!(split_tags("x < y"), vec!["x < y"]);
    }

    #[test]
    fn text_outside_literals_is_converted() {
        assert_eq!(
            escape_and_prettify("<p>&quot;Hi&quot; -- there</p>", ".html"),
            "<p>&ldquo;Hi&rdquo; &mdash; there</p>"
        );
    }

    #[test]
    fn literal_regions_keep_straight_quotes_and_dashes() {
        let html = "<pre class=\"literal-block\">&quot;a&quot; -- b</pre>\n<p><tt class=\"docutils literal\">x--y</tt> -- z</p>";
        assert_eq!(
            escape_and_prettify(html, ".html"),
            "<pre class=\"literal-block\">&quot;a&quot; -- b</pre>\n<p><tt class=\"docutils literal\">x--y</tt> &mdash; z</p>"
        );
    }

    #[test]
    fn nested_markup_inside_region_does_not_end_it() {
        let html = "<div class=\"syntax\"><pre><span class=\"k\">a -- b</span></pre></div>";
        assert_eq!(escape_and_prettify(html, ".html"), html);
    }

    #[test]
    fn doctest_lines_are_marked() {
        let html = "<pre class=\"doctest-block\">\n&gt;&gt;&gt; 1 + 1\n2\n</pre>";
        assert_eq!(
            escape_and_prettify(html, ".html"),
            "<pre class=\"doctest-block\">\n<span class=\"doctest-input\">&gt;&gt;&gt; 1 + 1</span>\n<span class=\"doctest-output\">2</span></pre>"
        );
    }

    #[test]
    fn bare_ampersands_are_escaped() {
        assert_eq!(escape_bare_ampersands("a & b &amp; c &#8230;"), "a &amp; b &amp; c &#8230;");
        assert_eq!(escape_bare_ampersands("R&D; x"), "R&D; x");
        assert_eq!(escape_bare_ampersands("a&&b;"), "a&amp;&b;");
    }

    #[test]
    fn double_angle_is_reescaped() {
        assert_eq!(escape_and_prettify("a<<b>c</b>", ".html"), "a&lt;<b>c</b>");
    }
}
