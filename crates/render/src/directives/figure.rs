//! `.. figure:: uri` images with captions.

use plexmark_core::DirectiveSpec;

use super::attr;
use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

/// An image followed by a caption paragraph and an optional legend.
#[derive(Debug, Default, Clone, Copy)]
pub struct FigureDirective;

impl Directive for FigureDirective {
    fn name(&self) -> &str {
        "figure"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            required_arguments: 1,
            final_argument_whitespace: true,
            has_options: true,
            has_content: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        _session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        let uri: String = invocation
            .argument(0)
            .unwrap_or_default()
            .split_whitespace()
            .collect();
        let alt = invocation.option("alt").unwrap_or(&uri);
        let width = invocation.option("width");

        let content = invocation.content();
        let caption_end = content
            .iter()
            .position(|line| line.trim().is_empty())
            .unwrap_or(content.len());
        let caption = content[..caption_end].join("\n");
        let legend: Vec<String> = content
            .get(caption_end + 1..)
            .unwrap_or_default()
            .iter()
            .skip_while(|line| line.trim().is_empty())
            .cloned()
            .collect();
        let legend_line = invocation.parts.content_line + content.len() - legend.len();
        let caption_node = DirectiveNode::Inline {
            text: caption.clone(),
            line: invocation.parts.content_line,
        };
        let legend_node = DirectiveNode::Nested {
            lines: legend.clone(),
            line: legend_line,
        };

        if invocation.format == OutputFormat::Tex {
            let options = width.map(|w| format!("[width={w}]")).unwrap_or_default();
            let mut nodes = vec![DirectiveNode::tex(format!(
                "\\begin{{figure}}[htbp]\n\\centering\n\\includegraphics{options}{{{uri}}}\n"
            ))];
            if !caption.is_empty() {
                nodes.push(DirectiveNode::tex("\\caption{"));
                nodes.push(caption_node);
                nodes.push(DirectiveNode::tex("}\n"));
            }
            if !legend.is_empty() {
                nodes.push(legend_node);
            }
            nodes.push(DirectiveNode::tex("\\end{figure}\n"));
            return Ok(nodes);
        }

        let class = invocation
            .option("class")
            .map(|class| format!(" {}", attr(class)))
            .unwrap_or_default();
        let width = width
            .map(|width| format!(" width=\"{}\"", attr(width)))
            .unwrap_or_default();
        let mut nodes = vec![DirectiveNode::html(format!(
            "<div class=\"figure{class}\"><p><img alt=\"{}\" src=\"{}\"{width} /></p>\n",
            attr(alt),
            attr(&uri),
        ))];
        if !caption.is_empty() {
            nodes.push(DirectiveNode::html("<p class=\"caption\">"));
            nodes.push(caption_node);
            nodes.push(DirectiveNode::html("</p>\n"));
        }
        if !legend.is_empty() {
            nodes.push(DirectiveNode::html("<div class=\"legend\">\n"));
            nodes.push(legend_node);
            nodes.push(DirectiveNode::html("</div>\n"));
        }
        nodes.push(DirectiveNode::html("</div>\n"));
        Ok(nodes)
    }
}
