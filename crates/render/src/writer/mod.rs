//! Output writers over the parsed document tree.
//!
//! A [`Fragment`] is one parsed piece of markup: the whole document, or the
//! content of a directive rendered in place. Extracted blocks are looked up
//! through the placeholder paragraphs they left behind.

pub(crate) mod html;
pub(crate) mod raw;
pub(crate) mod tex;

use std::collections::HashMap;

use markdown::mdast::Node;
use plexmark_core::{
    ExtractedBlock, FieldList, ParserPipeline, RenderError, extract_blocks, parse_placeholder,
};

use crate::options::RenderOptions;
use crate::registry::{DirectiveNode, DirectiveRegistry};
use crate::session::RenderSession;

/// Everything a writer needs besides the fragment it is writing.
pub(crate) struct WriteContext<'a> {
    pub registry: &'a DirectiveRegistry,
    pub options: &'a RenderOptions,
    pub pipeline: &'a ParserPipeline,
    pub session: &'a mut RenderSession,
}

/// Target of a link reference definition.
#[derive(Debug, Clone)]
pub(crate) struct Definition {
    pub url: String,
    pub title: Option<String>,
}

/// A parsed piece of markup plus the blocks extracted from it.
#[derive(Debug)]
pub(crate) struct Fragment {
    pub root: Node,
    blocks: Vec<ExtractedBlock>,
    first_index: usize,
    first_line: usize,
    definitions: HashMap<String, Definition>,
    footnotes: Vec<Footnote>,
}

/// A footnote definition with the element id assigned to it.
#[derive(Debug)]
pub(crate) struct Footnote {
    pub identifier: String,
    pub id: String,
    pub children: Vec<Node>,
}

impl Fragment {
    /// Top-level nodes.
    pub fn children(&self) -> &[Node] {
        self.root.children().map(Vec::as_slice).unwrap_or_default()
    }

    /// The extracted block behind a placeholder paragraph.
    pub fn block(&self, node: &Node) -> Option<&ExtractedBlock> {
        let Node::Paragraph(paragraph) = node else {
            return None;
        };
        let [Node::Text(text)] = paragraph.children.as_slice() else {
            return None;
        };
        let index = parse_placeholder(&text.value)?;
        self.blocks.get(index.checked_sub(self.first_index)?)
    }

    /// Approximate source line of `node`.
    ///
    /// Extracted blocks shift the lines after them, so this is only used for
    /// diagnostics.
    pub fn source_line(&self, node: &Node) -> usize {
        node.position()
            .map_or(self.first_line, |position| self.first_line + position.start.line - 1)
    }

    pub fn definition(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.get(&identifier.to_lowercase())
    }

    /// Footnote definitions in document order.
    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    /// Number (counting from 1) and definition of footnote `identifier`.
    pub fn footnote(&self, identifier: &str) -> Option<(usize, &Footnote)> {
        self.footnotes
            .iter()
            .enumerate()
            .find(|(_, footnote)| footnote.identifier.eq_ignore_ascii_case(identifier))
            .map(|(index, footnote)| (index + 1, footnote))
    }
}

fn collect_definitions(
    node: &Node,
    definitions: &mut HashMap<String, Definition>,
    footnotes: &mut Vec<(String, Vec<Node>)>,
) {
    match node {
        Node::Definition(definition) => {
            definitions
                .entry(definition.identifier.to_lowercase())
                .or_insert_with(|| Definition {
                    url: definition.url.clone(),
                    title: definition.title.clone(),
                });
        }
        Node::FootnoteDefinition(footnote) => {
            footnotes.push((footnote.identifier.clone(), footnote.children.clone()));
        }
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_definitions(child, definitions, footnotes);
                }
            }
        }
    }
}

/// Extracts blocks from `lines` and parses the rest.
///
/// `first_line` is the source line number of `lines[0]`.
pub(crate) fn parse_fragment(
    ctx: &mut WriteContext<'_>,
    lines: &[String],
    first_line: usize,
) -> Result<Fragment, RenderError> {
    let first_index = ctx.session.next_block_index();
    let extraction = extract_blocks(lines, first_index, first_line);
    ctx.session.consume_blocks(extraction.blocks.len());
    ctx.session.extend_diagnostics(extraction.diagnostics);

    let root = ctx.pipeline.parse(&extraction.text)?;
    let mut definitions = HashMap::new();
    let mut found = Vec::new();
    collect_definitions(&root, &mut definitions, &mut found);
    let footnotes = found
        .into_iter()
        .map(|(identifier, children)| Footnote {
            id: ctx.session.next_slug(&format!("footnote {identifier}")),
            identifier,
            children,
        })
        .collect();

    Ok(Fragment {
        root,
        blocks: extraction.blocks,
        first_index,
        first_line,
        definitions,
        footnotes,
    })
}

/// Output of a document writer, split the way callers assemble it.
#[derive(Debug, Default)]
pub(crate) struct WrittenDocument {
    /// Plain text of the title.
    pub title: Option<String>,
    /// Plain text of the subtitle.
    pub subtitle: Option<String>,
    /// Title rendered in the output format.
    pub title_markup: String,
    /// Subtitle rendered in the output format.
    pub subtitle_markup: String,
    /// Rendered docinfo block, empty without one.
    pub docinfo: String,
    /// Rendered body.
    pub body: String,
    /// Docinfo fields as (lower-cased name, plain value) for document headers.
    pub meta: Vec<(String, String)>,
}

/// Runs the directive behind `block`.
pub(crate) fn run_directive(
    ctx: &mut WriteContext<'_>,
    block: &plexmark_core::DirectiveBlock,
) -> Result<Vec<DirectiveNode>, RenderError> {
    ctx.registry.dispatch(block, ctx.session)
}

/// Title, subtitle and docinfo split off the start of a document.
#[derive(Debug)]
pub(crate) struct DocumentParts<'f> {
    pub title: Option<&'f [Node]>,
    pub subtitle: Option<&'f [Node]>,
    pub docinfo: Option<&'f FieldList>,
    pub body: &'f [Node],
}

/// Splits a document fragment into its title parts and body.
///
/// A level one heading at the very start is the title, a level two heading
/// right after it the subtitle. A field list following them (or opening the
/// document) is the docinfo.
pub(crate) fn split_document(fragment: &Fragment) -> DocumentParts<'_> {
    let mut body = fragment.children();
    let mut title = None;
    let mut subtitle = None;
    let mut docinfo = None;

    if let Some((Node::Heading(heading), rest)) = body.split_first()
        && heading.depth == 1
    {
        title = Some(heading.children.as_slice());
        body = rest;
        if let Some((Node::Heading(heading), rest)) = body.split_first()
            && heading.depth == 2
        {
            subtitle = Some(heading.children.as_slice());
            body = rest;
        }
    }

    if let Some((first, rest)) = body.split_first()
        && let Some(ExtractedBlock::FieldList(fields)) = fragment.block(first)
    {
        docinfo = Some(fields);
        body = rest;
    }

    DocumentParts {
        title,
        subtitle,
        docinfo,
        body,
    }
}

/// Bibliographic fields rendered as docinfo rows rather than generic fields.
pub(crate) const BIBLIOGRAPHIC_FIELDS: &[&str] = &[
    "author",
    "authors",
    "organization",
    "address",
    "contact",
    "version",
    "revision",
    "status",
    "date",
    "copyright",
];

/// Docinfo fields that become topics at the start of the body.
pub(crate) const TOPIC_FIELDS: &[&str] = &["abstract", "dedication"];

/// Whether a field is hidden from output.
pub(crate) fn is_private_field(name: &str, prefix: &str) -> bool {
    !prefix.is_empty() && name.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Extracts plain text from a list of nodes.
pub(crate) fn plain_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        push_plain_text(node, &mut text);
    }
    text.trim().to_string()
}

fn push_plain_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::InlineMath(math) => buffer.push_str(&math.value),
        Node::Image(image) => buffer.push_str(&image.alt),
        Node::Break(_) => buffer.push(' '),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    push_plain_text(child, buffer);
                }
            }
        }
    }
}

/// Whether a fenced code block holds an interactive session.
pub(crate) fn is_doctest_language(lang: Option<&str>) -> bool {
    matches!(lang, Some("pycon" | "doctest"))
}
