//! `.. contents::` tables of contents.
//!
//! Headings after the directive are not known while it runs, so HTML and
//! raw output get a marker that is replaced once the whole document has
//! been written.

use plexmark_core::DirectiveSpec;

use super::{attr, text};
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::{HeadingEntry, PendingContents, RenderSession};

/// Lists the document's headings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentsDirective;

impl Directive for ContentsDirective {
    fn name(&self) -> &str {
        "contents"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            optional_arguments: 1,
            final_argument_whitespace: true,
            has_options: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        _session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        let title = invocation.argument(0).unwrap_or("Contents").to_string();
        let depth = match invocation.option("depth") {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
                DirectiveError::Invalid(format!("invalid depth value {value:?}"))
            })?),
            None => None,
        };
        Ok(vec![DirectiveNode::Contents { title, depth }])
    }
}

/// Placeholder written in place of pending contents `index`.
pub(crate) fn contents_marker(index: usize) -> String {
    format!("\u{1}plexmark-contents-{index}\u{1}")
}

struct TocItem<'a> {
    entry: &'a HeadingEntry,
    children: Vec<TocItem<'a>>,
}

fn nest<'a>(entries: &[&'a HeadingEntry]) -> Vec<TocItem<'a>> {
    let mut items = Vec::new();
    let mut index = 0;
    while index < entries.len() {
        let depth = entries[index].depth;
        let end = entries[index + 1..]
            .iter()
            .position(|entry| entry.depth <= depth)
            .map_or(entries.len(), |offset| index + 1 + offset);
        items.push(TocItem {
            entry: entries[index],
            children: nest(&entries[index + 1..end]),
        });
        index = end;
    }
    items
}

fn listed<'a>(contents: &PendingContents, headings: &'a [HeadingEntry]) -> Vec<TocItem<'a>> {
    let top = headings.iter().map(|h| h.depth).min().unwrap_or(1);
    let entries: Vec<&HeadingEntry> = headings
        .iter()
        .filter(|h| {
            contents
                .depth
                .is_none_or(|limit| usize::from(h.depth - top) < limit)
        })
        .collect();
    nest(&entries)
}

fn html_list(items: &[TocItem<'_>], out: &mut String) {
    out.push_str("<ul class=\"simple\">\n");
    for item in items {
        out.push_str(&format!(
            "<li><a class=\"reference internal\" href=\"#{}\">{}</a>",
            attr(&item.entry.slug),
            text(&item.entry.text)
        ));
        if !item.children.is_empty() {
            out.push('\n');
            html_list(&item.children, out);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

/// HTML contents topic.
pub(crate) fn render_toc_html(contents: &PendingContents, headings: &[HeadingEntry]) -> String {
    let id = attr(&contents.id);
    let mut out = format!(
        "<div class=\"contents topic\" id=\"{id}\">\n<p class=\"topic-title first\"><a name=\"{id}\">{}</a></p>\n",
        text(&contents.title)
    );
    let items = listed(contents, headings);
    if !items.is_empty() {
        html_list(&items, &mut out);
    }
    out.push_str("</div>\n");
    out
}

fn raw_list(items: &[TocItem<'_>], indent: usize, out: &mut String) {
    let pad = |level: usize| "    ".repeat(indent + level);
    out.push_str(&format!("{}<bullet_list>\n", pad(0)));
    for item in items {
        out.push_str(&format!("{}<list_item>\n", pad(1)));
        out.push_str(&format!("{}<paragraph>\n", pad(2)));
        out.push_str(&format!(
            "{}<reference internal=\"True\" refid=\"{}\">\n",
            pad(3),
            attr(&item.entry.slug)
        ));
        out.push_str(&format!("{}{}\n", pad(4), item.entry.text));
        if !item.children.is_empty() {
            raw_list(&item.children, indent + 2, out);
        }
    }
}

/// Pseudo-XML contents topic indented by `indent` levels.
pub(crate) fn render_toc_raw(
    contents: &PendingContents,
    headings: &[HeadingEntry],
    indent: usize,
) -> String {
    let pad = "    ".repeat(indent);
    let mut out = format!(
        "{pad}<topic classes=\"contents\" ids=\"{id}\" names=\"{id}\">\n{pad}    <title>\n{pad}        {}\n",
        contents.title,
        id = attr(&contents.id),
    );
    let items = listed(contents, headings);
    if !items.is_empty() {
        raw_list(&items, indent + 1, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::test_support::{html_session, run};
    use pretty_assertions::assert_eq;

    fn heading(depth: u8, slug: &str) -> HeadingEntry {
        HeadingEntry {
            depth,
            slug: slug.to_string(),
            text: slug.to_uppercase(),
        }
    }

    fn pending(depth: Option<usize>) -> PendingContents {
        PendingContents {
            id: "contents".into(),
            title: "Contents".into(),
            depth,
        }
    }

    #[test]
    fn directive_reads_title_and_depth() {
        let mut session = html_session();
        assert_eq!(
            run(&mut session, "contents", "Overview", &[":depth: 2"]).unwrap(),
            vec![DirectiveNode::Contents {
                title: "Overview".into(),
                depth: Some(2),
            }]
        );
        assert!(run(&mut session, "contents", "", &[":depth: many"]).is_err());
    }

    #[test]
    fn nested_html_listing() {
        let headings = [heading(2, "a"), heading(3, "b"), heading(2, "c")];
        assert_eq!(
            render_toc_html(&pending(None), &headings),
            "<div class=\"contents topic\" id=\"contents\">\n<p class=\"topic-title first\"><a name=\"contents\">Contents</a></p>\n<ul class=\"simple\">\n<li><a class=\"reference internal\" href=\"#a\">A</a>\n<ul class=\"simple\">\n<li><a class=\"reference internal\" href=\"#b\">B</a></li>\n</ul>\n</li>\n<li><a class=\"reference internal\" href=\"#c\">C</a></li>\n</ul>\n</div>\n"
        );
    }

    #[test]
    fn depth_limits_levels() {
        let headings = [heading(2, "a"), heading(3, "b"), heading(4, "d")];
        let html = render_toc_html(&pending(Some(1)), &headings);
        assert!(html.contains("#a"));
        assert!(!html.contains("#b"));
    }

    #[test]
    fn raw_listing_is_indented() {
        let headings = [heading(1, "a")];
        assert_eq!(
            render_toc_raw(&pending(None), &headings, 1),
            "    <topic classes=\"contents\" ids=\"contents\" names=\"contents\">\n        <title>\n            Contents\n        <bullet_list>\n            <list_item>\n                <paragraph>\n                    <reference internal=\"True\" refid=\"a\">\n                        A\n"
        );
    }
}
