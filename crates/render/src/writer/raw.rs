//! Pseudo-XML writer showing the document tree, one node per line.

use markdown::mdast::{List, Node, Table};
use plexmark_core::{ExtractedBlock, FieldList, RenderError};

use super::{
    BIBLIOGRAPHIC_FIELDS, Fragment, TOPIC_FIELDS, WriteContext, WrittenDocument,
    is_doctest_language, is_private_field, parse_fragment, plain_text, run_directive,
    split_document,
};
use crate::directives::{attr, contents_marker};
use crate::registry::DirectiveNode;
use crate::session::{HeadingEntry, PendingContents};

const INDENT: &str = "    ";

pub(crate) struct RawWriter<'w, 'a> {
    ctx: &'w mut WriteContext<'a>,
    fragment: &'w Fragment,
    out: String,
    indent: usize,
    /// Depths of the open sections, innermost last.
    sections: Vec<u8>,
}

impl<'w, 'a> RawWriter<'w, 'a> {
    pub(crate) fn new(ctx: &'w mut WriteContext<'a>, fragment: &'w Fragment, indent: usize) -> Self {
        Self {
            ctx,
            fragment,
            out: String::new(),
            indent,
            sections: Vec::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, value: &str) {
        self.out.push_str(&INDENT.repeat(self.indent));
        self.out.push_str(value);
        self.out.push('\n');
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        let mut element = format!("<{tag}");
        for (name, value) in attributes {
            element.push_str(&format!(" {name}=\"{}\"", attr(value)));
        }
        element.push('>');
        self.line(&element);
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent -= 1;
    }

    fn text(&mut self, value: &str) {
        for line in value.split('\n') {
            self.line(line);
        }
    }

    fn leaf(&mut self, tag: &str, attributes: &[(&str, &str)], value: &str) {
        self.open(tag, attributes);
        self.text(value);
        self.close();
    }

    /// Writes `nodes` followed by the fragment's footnotes.
    fn write_body(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        self.write_blocks(nodes)?;
        self.indent -= self.sections.len();
        self.sections.clear();

        let fragment = self.fragment;
        for (index, footnote) in fragment.footnotes().iter().enumerate() {
            self.open(
                "footnote",
                &[("ids", footnote.id.as_str()), ("names", footnote.identifier.as_str())],
            );
            self.leaf("label", &[], &(index + 1).to_string());
            self.write_blocks(&footnote.children)?;
            self.close();
        }
        Ok(())
    }

    fn write_blocks(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            self.write_block(node)?;
        }
        Ok(())
    }

    fn write_block(&mut self, node: &Node) -> Result<(), RenderError> {
        let fragment = self.fragment;
        if let Some(block) = fragment.block(node) {
            return self.write_extracted(block);
        }

        match node {
            Node::Paragraph(paragraph) => {
                self.open("paragraph", &[]);
                self.write_inlines(&paragraph.children)?;
                self.close();
            }
            Node::Heading(heading) => {
                while let Some(&open) = self.sections.last()
                    && open >= heading.depth
                {
                    self.sections.pop();
                    self.indent -= 1;
                }
                let text = plain_text(&heading.children);
                let slug = self.ctx.session.next_slug(&text);
                let name = text.to_lowercase();
                self.ctx.session.add_heading(HeadingEntry {
                    depth: heading.depth,
                    slug: slug.clone(),
                    text,
                });
                self.open("section", &[("ids", slug.as_str()), ("names", name.as_str())]);
                self.sections.push(heading.depth);
                self.open("title", &[]);
                self.write_inlines(&heading.children)?;
                self.close();
            }
            Node::Blockquote(quote) => {
                self.open("block_quote", &[]);
                self.write_blocks(&quote.children)?;
                self.close();
            }
            Node::List(list) => self.write_list(list)?,
            Node::Code(code) => {
                let lang = code.lang.as_deref();
                if is_doctest_language(lang) {
                    self.leaf("doctest_block", &[("xml:space", "preserve")], &code.value);
                } else if let Some(lang) = lang {
                    let classes = format!("code {lang}");
                    self.leaf(
                        "literal_block",
                        &[("classes", classes.as_str()), ("xml:space", "preserve")],
                        &code.value,
                    );
                } else {
                    self.leaf("literal_block", &[("xml:space", "preserve")], &code.value);
                }
            }
            Node::Math(math) => self.leaf("math_block", &[("xml:space", "preserve")], &math.value),
            Node::Html(html) => self.leaf(
                "raw",
                &[("format", "html"), ("xml:space", "preserve")],
                &html.value,
            ),
            Node::ThematicBreak(_) => self.line("<transition>"),
            Node::Table(table) => self.write_table(table)?,
            Node::Definition(_) | Node::FootnoteDefinition(_) => {}
            Node::Yaml(_) | Node::Toml(_) => {}
            other => {
                log::warn!("unhandled block node: {other:?}");
            }
        }
        Ok(())
    }

    fn write_extracted(&mut self, block: &ExtractedBlock) -> Result<(), RenderError> {
        match block {
            ExtractedBlock::Directive(directive) => {
                let nodes = run_directive(self.ctx, directive)?;
                self.write_directive_nodes(nodes)
            }
            ExtractedBlock::FieldList(fields) => self.write_field_list(fields),
            ExtractedBlock::Doctest(doctest) => {
                self.leaf(
                    "doctest_block",
                    &[("xml:space", "preserve")],
                    &doctest.lines.join("\n"),
                );
                Ok(())
            }
        }
    }

    fn write_directive_nodes(&mut self, nodes: Vec<DirectiveNode>) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                DirectiveNode::Raw { format, text } => self.leaf(
                    "raw",
                    &[("format", format.as_str()), ("xml:space", "preserve")],
                    text.strip_suffix('\n').unwrap_or(&text),
                ),
                DirectiveNode::Literal { text } => {
                    self.leaf("literal_block", &[("xml:space", "preserve")], &text);
                }
                DirectiveNode::Nested { lines, line } => {
                    let written = render_at(self.ctx, &lines, line, self.indent, false)?;
                    self.out.push_str(&written);
                }
                DirectiveNode::Inline { text, line } => {
                    let lines: Vec<String> = text.lines().map(str::to_string).collect();
                    let written = render_at(self.ctx, &lines, line, self.indent, true)?;
                    self.out.push_str(&written);
                }
                DirectiveNode::Contents { title, depth } => {
                    let id = self.ctx.session.next_slug(&title);
                    let index = self
                        .ctx
                        .session
                        .defer_contents(PendingContents { id, title, depth });
                    self.line(&contents_marker(index));
                }
            }
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<(), RenderError> {
        let start = list.start.unwrap_or(1).to_string();
        if list.ordered {
            let mut attributes = vec![("enumtype", "arabic"), ("prefix", ""), ("suffix", ".")];
            if start != "1" {
                attributes.push(("start", start.as_str()));
            }
            self.open("enumerated_list", &attributes);
        } else {
            self.open("bullet_list", &[("bullet", "-")]);
        }
        for child in &list.children {
            let Node::ListItem(item) = child else {
                continue;
            };
            self.open("list_item", &[]);
            self.write_blocks(&item.children)?;
            self.close();
        }
        self.close();
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> Result<(), RenderError> {
        let columns = table
            .children
            .first()
            .and_then(Node::children)
            .map_or(0, Vec::len)
            .to_string();
        self.open("table", &[]);
        self.open("tgroup", &[("cols", columns.as_str())]);
        for (index, row) in table.children.iter().enumerate() {
            let Some(cells) = row.children() else {
                continue;
            };
            if index < 2 {
                self.open(if index == 0 { "thead" } else { "tbody" }, &[]);
            }
            self.open("row", &[]);
            for cell in cells {
                self.open("entry", &[]);
                if let Some(children) = cell.children()
                    && !children.is_empty()
                {
                    self.open("paragraph", &[]);
                    self.write_inlines(children)?;
                    self.close();
                }
                self.close();
            }
            self.close();
            if index == 0 {
                self.close();
            }
        }
        if table.children.len() > 1 {
            self.close();
        }
        self.close();
        self.close();
        Ok(())
    }

    fn write_field_list(&mut self, fields: &FieldList) -> Result<(), RenderError> {
        let prefix = self.ctx.options.private_field_prefix.clone();
        self.open("field_list", &[]);
        for field in &fields.fields {
            if is_private_field(&field.name, &prefix) {
                continue;
            }
            self.write_field(&field.name, &field.body, fields.line)?;
        }
        self.close();
        Ok(())
    }

    fn write_field(&mut self, name: &str, body: &str, line: usize) -> Result<(), RenderError> {
        self.open("field", &[]);
        self.leaf("field_name", &[], name);
        self.open("field_body", &[]);
        let lines: Vec<String> = body.lines().map(str::to_string).collect();
        let written = render_at(self.ctx, &lines, line, self.indent, false)?;
        self.out.push_str(&written);
        self.close();
        self.close();
        Ok(())
    }

    fn write_inlines(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            self.write_inline(node)?;
        }
        Ok(())
    }

    fn write_inline(&mut self, node: &Node) -> Result<(), RenderError> {
        let fragment = self.fragment;
        match node {
            Node::Text(text) => self.text(&text.value),
            Node::Emphasis(emphasis) => {
                self.open("emphasis", &[]);
                self.write_inlines(&emphasis.children)?;
                self.close();
            }
            Node::Strong(strong) => {
                self.open("strong", &[]);
                self.write_inlines(&strong.children)?;
                self.close();
            }
            Node::Delete(delete) => {
                self.open("inline", &[("classes", "strike")]);
                self.write_inlines(&delete.children)?;
                self.close();
            }
            Node::InlineCode(code) => self.leaf("literal", &[], &code.value),
            Node::InlineMath(math) => self.leaf("math", &[], &math.value),
            Node::Break(_) => self.text(""),
            Node::Link(link) => {
                self.open("reference", &[("refuri", link.url.as_str())]);
                self.write_inlines(&link.children)?;
                self.close();
            }
            Node::LinkReference(reference) => {
                match fragment.definition(&reference.identifier) {
                    Some(definition) => {
                        self.open("reference", &[("refuri", definition.url.as_str())]);
                        self.write_inlines(&reference.children)?;
                        self.close();
                    }
                    None => {
                        self.open("problematic", &[]);
                        self.write_inlines(&reference.children)?;
                        self.close();
                    }
                }
            }
            Node::Image(image) => {
                self.line(&format!(
                    "<image alt=\"{}\" uri=\"{}\">",
                    attr(&image.alt),
                    attr(&image.url)
                ));
            }
            Node::ImageReference(reference) => {
                if let Some(definition) = fragment.definition(&reference.identifier) {
                    self.line(&format!(
                        "<image alt=\"{}\" uri=\"{}\">",
                        attr(&reference.alt),
                        attr(&definition.url)
                    ));
                }
            }
            Node::FootnoteReference(reference) => {
                if let Some((number, footnote)) = fragment.footnote(&reference.identifier) {
                    let ids = format!("{}-ref", footnote.id);
                    self.leaf(
                        "footnote_reference",
                        &[("ids", ids.as_str()), ("refid", footnote.id.as_str())],
                        &number.to_string(),
                    );
                }
            }
            Node::Html(html) => self.leaf(
                "raw",
                &[("format", "html"), ("xml:space", "preserve")],
                &html.value,
            ),
            other => {
                log::warn!("unhandled inline node: {other:?}");
            }
        }
        Ok(())
    }
}

/// Parses `lines` and writes them at `indent`, unwrapping a lone paragraph
/// when `inline` is set.
fn render_at(
    ctx: &mut WriteContext<'_>,
    lines: &[String],
    line: usize,
    indent: usize,
    inline: bool,
) -> Result<String, RenderError> {
    let fragment = parse_fragment(ctx, lines, line)?;
    let mut writer = RawWriter::new(ctx, &fragment, indent);
    match fragment.children() {
        [node @ Node::Paragraph(paragraph)] if inline && fragment.block(node).is_none() => {
            writer.write_inlines(&paragraph.children)?;
        }
        children => writer.write_body(children)?,
    }
    Ok(writer.finish())
}

fn write_docinfo(writer: &mut RawWriter<'_, '_>, fields: &FieldList) -> Result<(), RenderError> {
    let prefix = writer.ctx.options.private_field_prefix.clone();
    let visible: Vec<_> = fields
        .fields
        .iter()
        .filter(|field| !is_private_field(&field.name, &prefix))
        .collect();

    let (topics, info): (Vec<_>, Vec<_>) = visible
        .into_iter()
        .partition(|field| TOPIC_FIELDS.contains(&field.name.to_lowercase().as_str()));

    if !info.is_empty() {
        writer.open("docinfo", &[]);
        for field in info {
            let lower = field.name.to_lowercase();
            if BIBLIOGRAPHIC_FIELDS.contains(&lower.as_str()) {
                writer.open(&lower, &[]);
                let lines: Vec<String> = field.body.lines().map(str::to_string).collect();
                let written = render_at(writer.ctx, &lines, fields.line, writer.indent, true)?;
                writer.out.push_str(&written);
                writer.close();
            } else {
                writer.write_field(&field.name, &field.body, fields.line)?;
            }
        }
        writer.close();
    }

    for field in topics {
        let lower = field.name.to_lowercase();
        writer.open("topic", &[("classes", lower.as_str())]);
        writer.leaf("title", &[], &field.name);
        let lines: Vec<String> = field.body.lines().map(str::to_string).collect();
        let written = render_at(writer.ctx, &lines, fields.line, writer.indent, false)?;
        writer.out.push_str(&written);
        writer.close();
    }
    Ok(())
}

/// Writes the whole document tree. The pseudo-XML is always a complete
/// document, so the result carries everything in `body`.
pub(crate) fn write_document(
    ctx: &mut WriteContext<'_>,
    fragment: &Fragment,
) -> Result<WrittenDocument, RenderError> {
    let parts = split_document(fragment);
    let mut document = WrittenDocument {
        title: parts.title.map(plain_text),
        subtitle: parts.subtitle.map(plain_text),
        ..WrittenDocument::default()
    };

    let mut writer = RawWriter::new(ctx, fragment, 0);
    match &document.title {
        Some(title) => writer.open(
            "document",
            &[("source", "[dynamic-text]"), ("title", title.as_str())],
        ),
        None => writer.open("document", &[("source", "[dynamic-text]")]),
    }
    for (tag, nodes) in [("title", parts.title), ("subtitle", parts.subtitle)] {
        if let Some(nodes) = nodes {
            writer.open(tag, &[]);
            writer.write_inlines(nodes)?;
            writer.close();
        }
    }
    if let Some(fields) = parts.docinfo {
        write_docinfo(&mut writer, fields)?;
    }
    writer.write_body(parts.body)?;
    document.body = writer.finish();
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OutputFormat, RenderOptions};
    use crate::session::RenderSession;
    use plexmark_core::ParserPipeline;
    use pretty_assertions::assert_eq;

    fn write(source: &str) -> String {
        let registry = crate::registry::defaults::default_registry();
        let options = RenderOptions::with_format(OutputFormat::Raw);
        let pipeline = ParserPipeline::default();
        let mut session = RenderSession::new(OutputFormat::Raw);
        let mut ctx = WriteContext {
            registry: &registry,
            options: &options,
            pipeline: &pipeline,
            session: &mut session,
        };
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let fragment = parse_fragment(&mut ctx, &lines, 1).unwrap();
        write_document(&mut ctx, &fragment).unwrap().body
    }

    #[test]
    fn inline_nodes_on_their_own_lines() {
        assert_eq!(
            write("This is a **test** document."),
            "<document source=\"[dynamic-text]\">\n    <paragraph>\n        This is a \n        <strong>\n            test\n         document.\n"
        );
    }

    #[test]
    fn title_and_docinfo() {
        assert_eq!(
            write("# Doc\n\n:Author: tav\n:Mood: fine"),
            "<document source=\"[dynamic-text]\" title=\"Doc\">\n    <title>\n        Doc\n    <docinfo>\n        <author>\n            tav\n        <field>\n            <field_name>\n                Mood\n            <field_body>\n                <paragraph>\n                    fine\n"
        );
    }

    #[test]
    fn sections_nest_by_depth() {
        assert_eq!(
            write("Intro.\n\n## A\n\n### B\n\n## C"),
            "<document source=\"[dynamic-text]\">\n    <paragraph>\n        Intro.\n    <section ids=\"a\" names=\"a\">\n        <title>\n            A\n        <section ids=\"b\" names=\"b\">\n            <title>\n                B\n    <section ids=\"c\" names=\"c\">\n        <title>\n            C\n"
        );
    }

    #[test]
    fn raw_directive_keeps_its_format() {
        assert_eq!(
            write(".. raw:: html\n\n   <b>x</b>"),
            "<document source=\"[dynamic-text]\">\n    <raw format=\"html\" xml:space=\"preserve\">\n        <b>x</b>\n"
        );
    }

    #[test]
    fn contents_leave_an_indented_marker() {
        let output = write(".. contents::\n\n## A");
        assert!(output.contains(&format!("\n    {}\n", contents_marker(0))));
    }
}
