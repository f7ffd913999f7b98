//! `.. tag:: token, token, id:anchor` annotation blocks.

use plexmark_core::DirectiveSpec;

use super::{attr, text};
use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

/// Wraps its content in an anchored block followed by sorted tag markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagDirective;

/// How a single tag token renders.
#[derive(Debug, PartialEq, Eq)]
struct TagMarker {
    kind: String,
    class: String,
    name: String,
    norm: String,
    text: String,
}

impl TagMarker {
    /// Classifies a trimmed, non-empty token.
    fn classify(tag: &str, plan: Option<&str>) -> Self {
        let words = |value: &str| {
            value
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
        };

        let (kind, class, text) = if let Some(rest) = tag.strip_prefix('@') {
            ("zuser".to_string(), words(rest), tag.to_string())
        } else if let Some(rest) = tag.strip_prefix('#') {
            ("2".to_string(), words(rest), tag.to_string())
        } else if let Some((key, value)) = tag.split_once(':') {
            let kind = key.trim().to_lowercase();
            let class = if kind == "dep" && !value.contains(':') {
                format!("dep-{}-{}", plan.unwrap_or("list"), value)
            } else {
                words(&tag.replace(':', " "))
            };
            (kind, class, value.to_string())
        } else {
            ("1".to_string(), words(tag), tag.to_uppercase())
        };

        let name = match tag.split_once(':') {
            Some((lead, _)) => format!("{}:{}", lead.to_lowercase(), text),
            None => text.clone(),
        };

        Self {
            kind,
            class,
            name,
            norm: tag.to_lowercase(),
            text,
        }
    }

    fn to_html(&self) -> String {
        format!(
            "<span class=\"tag tag-type-{} tag-val-{}\" tagname=\"{}\" tagnorm=\"{}\">{}</span> ",
            attr(&self.kind),
            attr(&self.class),
            attr(&self.name),
            attr(&self.norm),
            text(&self.text),
        )
    }
}

impl Directive for TagDirective {
    fn name(&self) -> &str {
        "tag"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            required_arguments: 0,
            optional_arguments: 1,
            final_argument_whitespace: true,
            has_options: false,
            has_content: true,
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        if invocation.content().iter().all(|line| line.trim().is_empty()) {
            return Ok(Vec::new());
        }

        let mut markers = Vec::new();
        let mut explicit_id = None;
        let tokens = invocation.argument(0).map(str::trim).unwrap_or_default();

        for raw in tokens.split(',') {
            let tag = raw.trim().trim_end_matches(',').trim();
            if tag.is_empty() {
                continue;
            }
            if let Some(id) = tag.strip_prefix("id:") {
                explicit_id = Some(id.to_string());
                continue;
            }
            markers.push(session.tag_marker(raw, |session| {
                TagMarker::classify(tag, session.current_plan()).to_html()
            }));
        }
        markers.sort();

        let id = session
            .claim_tag_id(explicit_id.as_deref())
            .map_err(DirectiveError::DuplicateTagId)?;

        if invocation.format == OutputFormat::Tex {
            return Ok(vec![invocation.nested_content()]);
        }

        let id = attr(&id);
        Ok(vec![
            DirectiveNode::html(format!(
                "<div id=\"tag-ref-{id}-main\" class=\"tag-content\">\n<ul id=\"tag-ref-{id}-content\">\n<li>"
            )),
            invocation.nested_content(),
            DirectiveNode::html("</li>\n</ul>\n"),
            DirectiveNode::html(format!(
                "<div class=\"tag-segment\" id=\"tag-ref-{id}\">{}<a class=\"tag-link\" href=\"#tag-ref-{id}-main\">&middot;</a></div>\n</div>\n",
                markers.concat()
            )),
        ])
    }
}
