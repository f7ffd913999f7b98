//! Markdown parsing through markdown-rs with text preprocessing hooks.

use crate::{RenderError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use std::borrow::Cow;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// Defaults for plexmark documents: GFM on, raw HTML off.
    pub const fn documents() -> Self {
        Self {
            gfm: true,
            code_indented: true,
            raw_html: false,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::documents()
    }
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform: Send + Sync {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str> + Send + Sync,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Configurable parsing pipeline with text preprocessors.
pub struct ParserPipeline {
    options: markdown::ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from markdown-rs parse options.
    pub fn new(options: markdown::ParseOptions) -> Self {
        Self {
            options,
            text_transforms: Vec::new(),
        }
    }

    /// Pipeline with the reStructuredText compatibility rewrites installed.
    pub fn with_compat(options: &ParseOptions) -> Self {
        let mut pipeline = Self::new(options.to_markdown());
        pipeline.add_text_transform(crate::compat::section_titles);
        pipeline.add_text_transform(crate::compat::literal_markers);
        pipeline
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Parse markdown into MDAST using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<Node, RenderError> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let changed = match transform.transform(current.as_ref()) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = changed {
                current = Cow::Owned(next);
            }
        }

        parse_mdast_with_options(&current, &self.options)
    }
}

impl Default for ParserPipeline {
    fn default() -> Self {
        Self::with_compat(&ParseOptions::default())
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, RenderError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, RenderError> {
    markdown::to_mdast(input, options).map_err(|err| RenderError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child(root: &Node) -> &Node {
        &root.children().expect("root has children")[0]
    }

    #[test]
    fn parses_gfm_tables() {
        let root = parse_mdast("| a |\n|---|\n| b |", &ParseOptions::default()).unwrap();
        assert!(matches!(first_child(&root), Node::Table(_)));
    }

    #[test]
    fn raw_html_is_text() {
        let root = parse_mdast("<div>x</div>", &ParseOptions::default()).unwrap();
        assert!(matches!(first_child(&root), Node::Paragraph(_)));
    }

    #[test]
    fn compat_pipeline_turns_adorned_titles_into_headings() {
        let pipeline = ParserPipeline::default();
        let root = pipeline.parse("=====\nTitle\n=====\n\nText::\n\n  literal").unwrap();
        let children = root.children().unwrap();
        match &children[0] {
            Node::Heading(heading) => assert_eq!(heading.depth, 1),
            other => panic!("expected heading, got {other:?}"),
        }
        assert!(matches!(children[2], Node::Code(_)));
    }

    fn a_to_b(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace('a', "b"))
    }

    fn b_to_emphasis(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace('b', "*c*"))
    }

    #[test]
    fn transforms_run_in_order() {
        let mut pipeline = ParserPipeline::new(ParseOptions::default().to_markdown());
        pipeline.add_text_transform(a_to_b);
        pipeline.add_text_transform(b_to_emphasis);
        let root = pipeline.parse("a").unwrap();
        let Node::Paragraph(paragraph) = first_child(&root) else {
            panic!("expected paragraph");
        };
        assert!(matches!(paragraph.children[0], Node::Emphasis(_)));
    }
}
