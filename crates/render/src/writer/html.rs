//! HTML writer producing html4css1-style markup.

use markdown::mdast::{AlignKind, List, ListItem, Node, Table};
use plexmark_core::{DoctestBlock, ExtractedBlock, FieldList, RenderError};

use super::{
    BIBLIOGRAPHIC_FIELDS, Fragment, TOPIC_FIELDS, WriteContext, WrittenDocument,
    is_doctest_language, is_private_field, parse_fragment, plain_text, run_directive,
    split_document,
};
use crate::directives::{attr, contents_marker, syntax_block};
use crate::options::OutputFormat;
use crate::registry::DirectiveNode;
use crate::session::{HeadingEntry, PendingContents};

/// Escapes text content, including double quotes.
fn escape(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

fn literal_block(class: &str, text: &str) -> String {
    format!("<pre class=\"{class}\">\n{}\n</pre>\n", escape(text))
}

/// Label shown for a field name: known fields capitalized, others as written.
fn field_label(name: &str) -> String {
    let lower = name.to_lowercase();
    if BIBLIOGRAPHIC_FIELDS.contains(&lower.as_str()) || TOPIC_FIELDS.contains(&lower.as_str()) {
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        name.to_string()
    }
}

pub(crate) struct HtmlWriter<'w, 'a> {
    ctx: &'w mut WriteContext<'a>,
    fragment: &'w Fragment,
    out: String,
    /// Tightness of the enclosing lists, innermost last.
    tight: Vec<bool>,
}

impl<'w, 'a> HtmlWriter<'w, 'a> {
    pub(crate) fn new(ctx: &'w mut WriteContext<'a>, fragment: &'w Fragment) -> Self {
        Self {
            ctx,
            fragment,
            out: String::new(),
            tight: Vec::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    /// Writes `nodes` followed by the fragment's footnotes.
    pub(crate) fn write_body(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        self.write_blocks(nodes)?;
        self.write_footnotes()
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
                self.out.push_str("<p>");
                self.write_inlines(&paragraph.children)?;
                self.out.push_str("</p>\n");
            }
            Node::Heading(heading) => {
                let text = plain_text(&heading.children);
                let slug = self.ctx.session.next_slug(&text);
                self.ctx.session.add_heading(HeadingEntry {
                    depth: heading.depth,
                    slug: slug.clone(),
                    text,
                });
                self.out
                    .push_str(&format!("<h{} id=\"{}\">", heading.depth, attr(&slug)));
                self.write_inlines(&heading.children)?;
                self.out.push_str(&format!("</h{}>\n", heading.depth));
            }
            Node::Blockquote(quote) => {
                self.out.push_str("<blockquote>\n");
                self.write_blocks(&quote.children)?;
                self.out.push_str("</blockquote>\n");
            }
            Node::List(list) => self.write_list(list)?,
            Node::Code(code) => {
                let lang = code.lang.as_deref();
                if is_doctest_language(lang) {
                    self.out.push_str(&literal_block("doctest-block", &code.value));
                } else if let Some(lang) = lang {
                    let line = fragment.source_line(node);
                    let html = syntax_block(&code.value, lang, line, self.ctx.session);
                    self.out.push_str(&html);
                } else {
                    self.out.push_str(&literal_block("literal-block", &code.value));
                }
            }
            Node::Math(math) => {
                self.out.push_str(&literal_block("math", &math.value));
            }
            Node::Html(html) => {
                self.out.push_str(&html.value);
                self.out.push('\n');
            }
            Node::ThematicBreak(_) => self.out.push_str("<hr class=\"docutils\" />\n"),
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
                self.write_doctest(doctest);
                Ok(())
            }
        }
    }

    fn write_doctest(&mut self, doctest: &DoctestBlock) {
        self.out
            .push_str(&literal_block("doctest-block", &doctest.lines.join("\n")));
    }

    fn write_directive_nodes(&mut self, nodes: Vec<DirectiveNode>) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                DirectiveNode::Raw { format, text } => {
                    if format == OutputFormat::Html {
                        self.out.push_str(&text);
                    }
                }
                DirectiveNode::Literal { text } => {
                    self.out.push_str(&literal_block("literal-block", &text));
                }
                DirectiveNode::Nested { lines, line } => {
                    let html = render_nested(self.ctx, &lines, line)?;
                    self.out.push_str(&html);
                }
                DirectiveNode::Inline { text, line } => {
                    let html = render_inline(self.ctx, &text, line)?;
                    self.out.push_str(&html);
                }
                DirectiveNode::Contents { title, depth } => {
                    let id = self.ctx.session.next_slug(&title);
                    let index = self
                        .ctx
                        .session
                        .defer_contents(PendingContents { id, title, depth });
                    self.out.push_str(&contents_marker(index));
                    self.out.push('\n');
                }
            }
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<(), RenderError> {
        let simple = if list.spread { "" } else { " simple" };
        let tag = if list.ordered {
            let start = match list.start {
                Some(start) if start != 1 => format!(" start=\"{start}\""),
                _ => String::new(),
            };
            self.out
                .push_str(&format!("<ol class=\"arabic{simple}\"{start}>\n"));
            "ol"
        } else {
            if list.spread {
                self.out.push_str("<ul>\n");
            } else {
                self.out.push_str("<ul class=\"simple\">\n");
            }
            "ul"
        };

        self.tight.push(!list.spread);
        for child in &list.children {
            if let Node::ListItem(item) = child {
                self.write_list_item(item)?;
            }
        }
        self.tight.pop();

        self.out.push_str(&format!("</{tag}>\n"));
        Ok(())
    }

    fn write_list_item(&mut self, item: &ListItem) -> Result<(), RenderError> {
        let tight = self.tight.last().copied().unwrap_or(false);
        self.out.push_str("<li>");
        if let Some(checked) = item.checked {
            let checked = if checked { " checked=\"checked\"" } else { "" };
            self.out.push_str(&format!(
                "<input type=\"checkbox\" disabled=\"disabled\"{checked} /> "
            ));
        }

        let fragment = self.fragment;
        for (index, child) in item.children.iter().enumerate() {
            match child {
                Node::Paragraph(paragraph) if tight && fragment.block(child).is_none() => {
                    self.write_inlines(&paragraph.children)?;
                    if index + 1 < item.children.len() {
                        self.out.push('\n');
                    }
                }
                _ => self.write_block(child)?,
            }
        }
        self.out.push_str("</li>\n");
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> Result<(), RenderError> {
        self.out.push_str("<table border=\"1\" class=\"docutils\">\n");
        for (index, row) in table.children.iter().enumerate() {
            let Node::TableRow(row) = row else {
                continue;
            };
            let head = index == 0;
            if head {
                self.out.push_str("<thead valign=\"bottom\">\n");
            } else if index == 1 {
                self.out.push_str("<tbody valign=\"top\">\n");
            }

            self.out.push_str("<tr>");
            for (column, cell) in row.children.iter().enumerate() {
                let Node::TableCell(cell) = cell else {
                    continue;
                };
                let align = match table.align.get(column) {
                    Some(AlignKind::Left) => " align=\"left\"",
                    Some(AlignKind::Right) => " align=\"right\"",
                    Some(AlignKind::Center) => " align=\"center\"",
                    _ => "",
                };
                if head {
                    self.out.push_str(&format!("<th class=\"head\"{align}>"));
                    self.write_inlines(&cell.children)?;
                    self.out.push_str("</th>\n");
                } else {
                    self.out.push_str(&format!("<td{align}>"));
                    self.write_inlines(&cell.children)?;
                    self.out.push_str("</td>\n");
                }
            }
            self.out.push_str("</tr>\n");

            if head {
                self.out.push_str("</thead>\n");
            }
        }
        if table.children.len() > 1 {
            self.out.push_str("</tbody>\n");
        }
        self.out.push_str("</table>\n");
        Ok(())
    }

    fn write_field_list(&mut self, fields: &FieldList) -> Result<(), RenderError> {
        let prefix = self.ctx.options.private_field_prefix.as_str();
        let visible: Vec<_> = fields
            .fields
            .iter()
            .filter(|field| !is_private_field(&field.name, prefix))
            .collect();
        if visible.is_empty() {
            return Ok(());
        }

        self.out.push_str(
            "<table class=\"docutils field-list\" frame=\"void\" rules=\"none\">\n<col class=\"field-name\" />\n<col class=\"field-body\" />\n<tbody valign=\"top\">\n",
        );
        for field in visible {
            let body = render_inline(self.ctx, &field.body, fields.line)?;
            self.out.push_str(&format!(
                "<tr class=\"field\"><th class=\"field-name\">{}:</th><td class=\"field-body\">{}</td>\n</tr>\n",
                escape(&field.name),
                body
            ));
        }
        self.out.push_str("</tbody>\n</table>\n");
        Ok(())
    }

    fn write_footnotes(&mut self) -> Result<(), RenderError> {
        let fragment = self.fragment;
        for (index, footnote) in fragment.footnotes().iter().enumerate() {
            let id = attr(&footnote.id);
            self.out.push_str(&format!(
                "<table class=\"docutils footnote\" frame=\"void\" id=\"{id}\" rules=\"none\">\n<colgroup><col class=\"label\" /><col /></colgroup>\n<tbody valign=\"top\">\n<tr><td class=\"label\"><a class=\"fn-backref\" href=\"#{id}-ref\">[{}]</a></td><td>",
                index + 1
            ));
            let mut writer = HtmlWriter::new(&mut *self.ctx, fragment);
            writer.write_blocks(&footnote.children)?;
            let content = writer.finish();
            self.out.push_str(content.trim_end());
            self.out.push_str("</td></tr>\n</tbody>\n</table>\n");
        }
        Ok(())
    }

    fn write_inlines(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            self.write_inline(node)?;
        }
        Ok(())
    }

    fn write_link_open(&mut self, url: &str, title: Option<&str>) {
        let kind = if url.starts_with('#') { "internal" } else { "external" };
        self.out.push_str(&format!(
            "<a class=\"reference {kind}\" href=\"{}\"",
            attr(url)
        ));
        if let Some(title) = title {
            self.out.push_str(&format!(" title=\"{}\"", attr(title)));
        }
        self.out.push('>');
    }

    fn write_image(&mut self, alt: &str, url: &str, title: Option<&str>) {
        self.out
            .push_str(&format!("<img alt=\"{}\" src=\"{}\"", attr(alt), attr(url)));
        if let Some(title) = title {
            self.out.push_str(&format!(" title=\"{}\"", attr(title)));
        }
        self.out.push_str(" />");
    }

    fn write_inline(&mut self, node: &Node) -> Result<(), RenderError> {
        let fragment = self.fragment;
        match node {
            Node::Text(text) => self.out.push_str(&escape(&text.value)),
            Node::Emphasis(emphasis) => {
                self.out.push_str("<em>");
                self.write_inlines(&emphasis.children)?;
                self.out.push_str("</em>");
            }
            Node::Strong(strong) => {
                self.out.push_str("<strong>");
                self.write_inlines(&strong.children)?;
                self.out.push_str("</strong>");
            }
            Node::Delete(delete) => {
                self.out.push_str("<del>");
                self.write_inlines(&delete.children)?;
                self.out.push_str("</del>");
            }
            Node::InlineCode(code) => {
                self.out.push_str("<tt class=\"docutils literal\">");
                self.out.push_str(&escape(&code.value));
                self.out.push_str("</tt>");
            }
            Node::InlineMath(math) => {
                self.out.push_str("<span class=\"math\">");
                self.out.push_str(&escape(&math.value));
                self.out.push_str("</span>");
            }
            Node::Break(_) => self.out.push_str("<br />\n"),
            Node::Link(link) => {
                self.write_link_open(&link.url, link.title.as_deref());
                self.write_inlines(&link.children)?;
                self.out.push_str("</a>");
            }
            Node::LinkReference(reference) => match fragment.definition(&reference.identifier) {
                Some(definition) => {
                    self.write_link_open(&definition.url, definition.title.as_deref());
                    self.write_inlines(&reference.children)?;
                    self.out.push_str("</a>");
                }
                None => {
                    self.out.push('[');
                    self.write_inlines(&reference.children)?;
                    self.out.push(']');
                }
            },
            Node::Image(image) => self.write_image(&image.alt, &image.url, image.title.as_deref()),
            Node::ImageReference(reference) => match fragment.definition(&reference.identifier) {
                Some(definition) => {
                    self.write_image(&reference.alt, &definition.url, definition.title.as_deref())
                }
                None => self.out.push_str(&escape(&format!("![{}]", reference.alt))),
            },
            Node::FootnoteReference(reference) => match fragment.footnote(&reference.identifier) {
                Some((number, footnote)) => {
                    let id = attr(&footnote.id);
                    self.out.push_str(&format!(
                        "<a class=\"footnote-reference\" href=\"#{id}\" id=\"{id}-ref\"><sup>{number}</sup></a>"
                    ));
                }
                None => self
                    .out
                    .push_str(&escape(&format!("[^{}]", reference.identifier))),
            },
            Node::Html(html) => self.out.push_str(&html.value),
            other => {
                log::warn!("unhandled inline node: {other:?}");
            }
        }
        Ok(())
    }
}

/// Parses and writes `lines` as block content.
pub(crate) fn render_nested(
    ctx: &mut WriteContext<'_>,
    lines: &[String],
    line: usize,
) -> Result<String, RenderError> {
    let fragment = parse_fragment(ctx, lines, line)?;
    let mut writer = HtmlWriter::new(ctx, &fragment);
    writer.write_body(fragment.children())?;
    Ok(writer.finish())
}

/// Parses and writes `text` as inline content when it is a single
/// paragraph, as block content otherwise.
pub(crate) fn render_inline(
    ctx: &mut WriteContext<'_>,
    text: &str,
    line: usize,
) -> Result<String, RenderError> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let fragment = parse_fragment(ctx, &lines, line)?;
    let mut writer = HtmlWriter::new(ctx, &fragment);
    match fragment.children() {
        [node @ Node::Paragraph(paragraph)] if fragment.block(node).is_none() => {
            writer.write_inlines(&paragraph.children)?;
        }
        children => writer.write_body(children)?,
    }
    Ok(writer.finish())
}

fn write_docinfo(
    ctx: &mut WriteContext<'_>,
    fields: &FieldList,
    document: &mut WrittenDocument,
) -> Result<String, RenderError> {
    let prefix = ctx.options.private_field_prefix.clone();
    let mut rows = String::new();
    let mut topics = String::new();

    for field in &fields.fields {
        if is_private_field(&field.name, &prefix) {
            continue;
        }
        let lower = field.name.to_lowercase();
        let body = render_inline(ctx, &field.body, fields.line)?;
        let label = field_label(&field.name);

        if TOPIC_FIELDS.contains(&lower.as_str()) {
            topics.push_str(&format!(
                "<div class=\"{lower} topic\">\n<p class=\"topic-title first\">{label}</p>\n<p>{body}</p>\n</div>\n"
            ));
            continue;
        }

        document.meta.push((lower.clone(), field.body.clone()));
        if BIBLIOGRAPHIC_FIELDS.contains(&lower.as_str()) {
            rows.push_str(&format!(
                "<tr><th class=\"docinfo-name\">{label}:</th>\n<td>{body}</td></tr>\n"
            ));
        } else {
            rows.push_str(&format!(
                "<tr class=\"field\"><th class=\"docinfo-name\">{}:</th><td class=\"field-body\">{body}</td>\n</tr>\n",
                escape(&label)
            ));
        }
    }

    if !rows.is_empty() {
        document.docinfo = format!(
            "<table class=\"docinfo\" frame=\"void\" rules=\"none\">\n<col class=\"docinfo-name\" />\n<col class=\"docinfo-content\" />\n<tbody valign=\"top\">\n{rows}</tbody>\n</table>\n"
        );
    }
    Ok(topics)
}

/// Writes a whole document, splitting off title, subtitle and docinfo.
pub(crate) fn write_document(
    ctx: &mut WriteContext<'_>,
    fragment: &Fragment,
) -> Result<WrittenDocument, RenderError> {
    let parts = split_document(fragment);
    let mut document = WrittenDocument::default();

    for (nodes, text, markup) in [
        (parts.title, &mut document.title, &mut document.title_markup),
        (parts.subtitle, &mut document.subtitle, &mut document.subtitle_markup),
    ] {
        if let Some(nodes) = nodes {
            *text = Some(plain_text(nodes));
            let mut writer = HtmlWriter::new(ctx, fragment);
            writer.write_inlines(nodes)?;
            *markup = writer.finish();
        }
    }

    let mut body = match parts.docinfo {
        Some(fields) => write_docinfo(ctx, fields, &mut document)?,
        None => String::new(),
    };

    let mut writer = HtmlWriter::new(ctx, fragment);
    writer.write_body(parts.body)?;
    body.push_str(&writer.finish());
    document.body = body;
    Ok(document)
}

/// Complete XHTML page around a written document.
pub(crate) fn whole_document(document: &WrittenDocument, encoding: &str, id: &str) -> String {
    let title = document.title.as_deref().map(escape).unwrap_or_default();
    let mut page = format!(
        "<?xml version=\"1.0\" encoding=\"{encoding}\" ?>\n<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n<head>\n<meta http-equiv=\"Content-Type\" content=\"text/html; charset={encoding}\" />\n<meta name=\"generator\" content=\"plexmark\" />\n<title>{title}</title>\n"
    );
    for (name, value) in &document.meta {
        if matches!(name.as_str(), "author" | "authors" | "copyright" | "date") {
            page.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\" />\n",
                attr(name),
                attr(value)
            ));
        }
    }
    page.push_str("</head>\n<body>\n");

    if id.is_empty() {
        page.push_str("<div class=\"document\">\n");
    } else {
        page.push_str(&format!("<div class=\"document\" id=\"{}\">\n", attr(id)));
    }
    if document.title.is_some() {
        page.push_str(&format!("<h1 class=\"title\">{}</h1>\n", document.title_markup));
    }
    if document.subtitle.is_some() {
        page.push_str(&format!(
            "<h2 class=\"subtitle\">{}</h2>\n",
            document.subtitle_markup
        ));
    }
    page.push_str(&document.docinfo);
    page.push_str(&document.body);
    page.push_str("</div>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::session::RenderSession;
    use plexmark_core::ParserPipeline;
    use pretty_assertions::assert_eq;

    fn write(source: &str) -> WrittenDocument {
        let registry = crate::registry::defaults::default_registry();
        let options = RenderOptions::default();
        let pipeline = ParserPipeline::default();
        let mut session = RenderSession::new(OutputFormat::Html);
        let mut ctx = WriteContext {
            registry: &registry,
            options: &options,
            pipeline: &pipeline,
            session: &mut session,
        };
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let fragment = parse_fragment(&mut ctx, &lines, 1).unwrap();
        write_document(&mut ctx, &fragment).unwrap()
    }

    #[test]
    fn paragraphs_and_inline_markup() {
        assert_eq!(
            write("This is a **test** document.").body,
            "<p>This is a <strong>test</strong> document.</p>\n"
        );
        assert_eq!(
            write("Use `x < y` and *this*.").body,
            "<p>Use <tt class=\"docutils literal\">x &lt; y</tt> and <em>this</em>.</p>\n"
        );
    }

    #[test]
    fn text_escapes_quotes() {
        assert_eq!(write("\"a\" & b").body, "<p>&quot;a&quot; &amp; b</p>\n");
    }

    #[test]
    fn headings_get_ids() {
        assert_eq!(
            write("Intro.\n\n## Getting Started").body,
            "<p>Intro.</p>\n<h2 id=\"getting-started\">Getting Started</h2>\n"
        );
    }

    #[test]
    fn tight_lists_are_simple() {
        assert_eq!(
            write("- one\n- two").body,
            "<ul class=\"simple\">\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(
            write("3. three\n4. four").body,
            "<ol class=\"arabic simple\" start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n"
        );
    }

    #[test]
    fn literal_and_doctest_blocks() {
        assert_eq!(
            write("```\na < b\n```").body,
            "<pre class=\"literal-block\">\na &lt; b\n</pre>\n"
        );
        assert_eq!(
            write(">>> 1 + 1\n2").body,
            "<pre class=\"doctest-block\">\n&gt;&gt;&gt; 1 + 1\n2\n</pre>\n"
        );
    }

    #[test]
    fn tables_use_docutils_classes() {
        assert_eq!(
            write("| a |\n|---|\n| b |").body,
            "<table border=\"1\" class=\"docutils\">\n<thead valign=\"bottom\">\n<tr><th class=\"head\">a</th>\n</tr>\n</thead>\n<tbody valign=\"top\">\n<tr><td>b</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn footnotes_become_tables() {
        let body = write("Text[^a].\n\n[^a]: Note.").body;
        assert!(body.starts_with(
            "<p>Text<a class=\"footnote-reference\" href=\"#footnote-a\" id=\"footnote-a-ref\"><sup>1</sup></a>.</p>\n"
        ));
        assert!(body.contains("<td><p>Note.</p></td>"));
    }

    #[test]
    fn docinfo_rows_and_topics() {
        let document = write(
            "# Title\n\n## Sub\n\n:Author: tav\n:Some-Field: some value\n:Abstract: Short.\n:X-Secret: hidden\n\nBody.",
        );
        assert_eq!(document.title.as_deref(), Some("Title"));
        assert_eq!(document.subtitle.as_deref(), Some("Sub"));
        assert_eq!(
            document.docinfo,
            "<table class=\"docinfo\" frame=\"void\" rules=\"none\">\n<col class=\"docinfo-name\" />\n<col class=\"docinfo-content\" />\n<tbody valign=\"top\">\n<tr><th class=\"docinfo-name\">Author:</th>\n<td>tav</td></tr>\n<tr class=\"field\"><th class=\"docinfo-name\">Some-Field:</th><td class=\"field-body\">some value</td>\n</tr>\n</tbody>\n</table>\n"
        );
        assert_eq!(
            document.body,
            "<div class=\"abstract topic\">\n<p class=\"topic-title first\">Abstract</p>\n<p>Short.</p>\n</div>\n<p>Body.</p>\n"
        );
    }

    #[test]
    fn directives_render_in_place() {
        assert_eq!(
            write("Before.\n\n.. break::\n\nAfter.").body,
            "<p>Before.</p>\n<hr class=\"clear\" />\n<p>After.</p>\n"
        );
    }

    #[test]
    fn unknown_directive_is_literal() {
        assert_eq!(
            write(".. imap:: x").body,
            "<pre class=\"literal-block\">\n.. imap:: x\n</pre>\n"
        );
    }

    #[test]
    fn figure_caption_is_inline() {
        assert_eq!(
            write(".. figure:: a.png\n\n   The *cap*.").body,
            "<div class=\"figure\"><p><img alt=\"a.png\" src=\"a.png\" /></p>\n<p class=\"caption\">The <em>cap</em>.</p>\n</div>\n"
        );
    }

    #[test]
    fn whole_page_wraps_title_and_body() {
        let document = write("# Hello\n\nBody.");
        let page = whole_document(&document, "utf-8", "hello");
        assert!(page.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<!DOCTYPE html"));
        assert!(page.contains("<title>Hello</title>"));
        assert!(page.contains("<div class=\"document\" id=\"hello\">\n<h1 class=\"title\">Hello</h1>\n<p>Body.</p>\n</div>\n</body>\n</html>\n"));
    }
}
