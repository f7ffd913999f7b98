//! LaTeX writer.

use markdown::mdast::{List, Node, Table};
use plexmark_core::{ExtractedBlock, FieldList, RenderError};

use super::{
    Fragment, WriteContext, WrittenDocument, is_private_field, parse_fragment, plain_text,
    run_directive, split_document,
};
use crate::directives::verbatim;
use crate::options::OutputFormat;
use crate::registry::DirectiveNode;
use crate::session::HeadingEntry;

/// Opens every TeX body, fragment or whole document.
pub(crate) const LINE_WIDTH: &str = "\\setlength{\\locallinewidth}{\\linewidth}\n";

const SECTIONS: &[&str] = &[
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Escapes characters with a special meaning in TeX.
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a URL for `\href` and `\includegraphics`.
fn escape_url(url: &str) -> String {
    url.replace('\\', "/")
        .replace('%', "\\%")
        .replace('#', "\\#")
}

pub(crate) struct TexWriter<'w, 'a> {
    ctx: &'w mut WriteContext<'a>,
    fragment: &'w Fragment,
    out: String,
    /// Depth of the headings written as `\section`, less one.
    heading_offset: u8,
}

impl<'w, 'a> TexWriter<'w, 'a> {
    pub(crate) fn new(
        ctx: &'w mut WriteContext<'a>,
        fragment: &'w Fragment,
        heading_offset: u8,
    ) -> Self {
        Self {
            ctx,
            fragment,
            out: String::new(),
            heading_offset,
        }
    }

    fn finish(self) -> String {
        self.out
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
                self.write_inlines(&paragraph.children)?;
                self.out.push_str("\n\n");
            }
            Node::Heading(heading) => {
                let text = plain_text(&heading.children);
                let slug = self.ctx.session.next_slug(&text);
                self.ctx.session.add_heading(HeadingEntry {
                    depth: heading.depth,
                    slug: slug.clone(),
                    text,
                });
                let level = usize::from(heading.depth.saturating_sub(self.heading_offset).max(1));
                let command = SECTIONS[(level - 1).min(SECTIONS.len() - 1)];
                self.out.push_str(&format!("\\{command}{{"));
                self.write_inlines(&heading.children)?;
                self.out.push_str(&format!("}}\\label{{{slug}}}\n\n"));
            }
            Node::Blockquote(quote) => {
                self.out.push_str("\\begin{quote}\n");
                self.write_blocks(&quote.children)?;
                self.out.push_str("\\end{quote}\n\n");
            }
            Node::List(list) => self.write_list(list)?,
            Node::Code(code) => {
                self.out.push_str(&verbatim(&code.value));
                self.out.push('\n');
            }
            Node::Math(math) => {
                self.out.push_str(&format!("\\[\n{}\n\\]\n\n", math.value));
            }
            Node::ThematicBreak(_) => self.out.push_str("\\par\\noindent\\hrulefill\\par\n\n"),
            Node::Table(table) => self.write_table(table)?,
            Node::Html(_) => log::debug!("raw HTML dropped from TeX output"),
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
                self.out.push_str(&verbatim(&doctest.lines.join("\n")));
                self.out.push('\n');
                Ok(())
            }
        }
    }

    fn write_directive_nodes(&mut self, nodes: Vec<DirectiveNode>) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                DirectiveNode::Raw { format, text } => {
                    if format == OutputFormat::Tex {
                        self.out.push_str(&text);
                    }
                }
                DirectiveNode::Literal { text } => {
                    self.out.push_str(&verbatim(&text));
                    self.out.push('\n');
                }
                DirectiveNode::Nested { lines, line } => {
                    let fragment = parse_fragment(self.ctx, &lines, line)?;
                    let mut writer = TexWriter::new(&mut *self.ctx, &fragment, self.heading_offset);
                    writer.write_blocks(fragment.children())?;
                    let tex = writer.finish();
                    self.out.push_str(&tex);
                }
                DirectiveNode::Inline { text, line } => {
                    let tex = render_inline(self.ctx, &text, line)?;
                    self.out.push_str(&tex);
                }
                DirectiveNode::Contents { .. } => self.out.push_str("\\tableofcontents\n\n"),
            }
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<(), RenderError> {
        let environment = if list.ordered { "enumerate" } else { "itemize" };
        self.out.push_str(&format!("\\begin{{{environment}}}\n"));
        if list.ordered
            && let Some(start) = list.start
            && start > 1
        {
            self.out
                .push_str(&format!("\\setcounter{{enumi}}{{{}}}\n", start - 1));
        }

        let fragment = self.fragment;
        for child in &list.children {
            let Node::ListItem(item) = child else {
                continue;
            };
            self.out.push_str("\\item ");
            for node in &item.children {
                match node {
                    Node::Paragraph(paragraph) if fragment.block(node).is_none() => {
                        self.write_inlines(&paragraph.children)?;
                        self.out.push('\n');
                    }
                    _ => self.write_block(node)?,
                }
            }
        }
        self.out.push_str(&format!("\\end{{{environment}}}\n\n"));
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> Result<(), RenderError> {
        let columns = table
            .children
            .first()
            .and_then(Node::children)
            .map_or(0, Vec::len);
        self.out.push_str(&format!(
            "\\begin{{tabular}}{{|{}}}\n\\hline\n",
            "l|".repeat(columns)
        ));
        for row in &table.children {
            let Some(cells) = row.children() else {
                continue;
            };
            for (index, cell) in cells.iter().enumerate() {
                if index > 0 {
                    self.out.push_str(" & ");
                }
                if let Some(children) = cell.children() {
                    self.write_inlines(children)?;
                }
            }
            self.out.push_str(" \\\\\n\\hline\n");
        }
        self.out.push_str("\\end{tabular}\n\n");
        Ok(())
    }

    fn write_field_list(&mut self, fields: &FieldList) -> Result<(), RenderError> {
        let prefix = self.ctx.options.private_field_prefix.clone();
        let visible: Vec<_> = fields
            .fields
            .iter()
            .filter(|field| !is_private_field(&field.name, &prefix))
            .collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.out.push_str("\\begin{description}\n");
        for field in visible {
            let body = render_inline(self.ctx, &field.body, fields.line)?;
            self.out
                .push_str(&format!("\\item[{}:] {}\n", escape(&field.name), body.trim_end()));
        }
        self.out.push_str("\\end{description}\n\n");
        Ok(())
    }

    fn write_inlines(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            self.write_inline(node)?;
        }
        Ok(())
    }

    fn write_wrapped(&mut self, command: &str, nodes: &[Node]) -> Result<(), RenderError> {
        self.out.push_str(&format!("\\{command}{{"));
        self.write_inlines(nodes)?;
        self.out.push('}');
        Ok(())
    }

    fn write_inline(&mut self, node: &Node) -> Result<(), RenderError> {
        let fragment = self.fragment;
        match node {
            Node::Text(text) => self.out.push_str(&escape(&text.value)),
            Node::Emphasis(emphasis) => self.write_wrapped("emph", &emphasis.children)?,
            Node::Strong(strong) => self.write_wrapped("textbf", &strong.children)?,
            Node::Delete(delete) => self.write_wrapped("sout", &delete.children)?,
            Node::InlineCode(code) => {
                self.out
                    .push_str(&format!("\\texttt{{{}}}", escape(&code.value)));
            }
            Node::InlineMath(math) => self.out.push_str(&format!("${}$", math.value)),
            Node::Break(_) => self.out.push_str("\\\\\n"),
            Node::Link(link) => {
                self.out.push_str(&format!("\\href{{{}}}{{", escape_url(&link.url)));
                self.write_inlines(&link.children)?;
                self.out.push('}');
            }
            Node::LinkReference(reference) => match fragment.definition(&reference.identifier) {
                Some(definition) => {
                    self.out
                        .push_str(&format!("\\href{{{}}}{{", escape_url(&definition.url)));
                    self.write_inlines(&reference.children)?;
                    self.out.push('}');
                }
                None => {
                    self.out.push('[');
                    self.write_inlines(&reference.children)?;
                    self.out.push(']');
                }
            },
            Node::Image(image) => self
                .out
                .push_str(&format!("\\includegraphics{{{}}}", escape_url(&image.url))),
            Node::ImageReference(reference) => {
                if let Some(definition) = fragment.definition(&reference.identifier) {
                    self.out.push_str(&format!(
                        "\\includegraphics{{{}}}",
                        escape_url(&definition.url)
                    ));
                }
            }
            Node::FootnoteReference(reference) => {
                if let Some((_, footnote)) = fragment.footnote(&reference.identifier) {
                    self.out.push_str("\\footnote{");
                    for child in &footnote.children {
                        match child {
                            Node::Paragraph(paragraph) => self.write_inlines(&paragraph.children)?,
                            other => self.write_block(other)?,
                        }
                    }
                    self.out.push('}');
                }
            }
            Node::Html(_) => {}
            other => {
                log::warn!("unhandled inline node: {other:?}");
            }
        }
        Ok(())
    }
}

fn render_inline(ctx: &mut WriteContext<'_>, text: &str, line: usize) -> Result<String, RenderError> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let fragment = parse_fragment(ctx, &lines, line)?;
    let mut writer = TexWriter::new(ctx, &fragment, 0);
    match fragment.children() {
        [node @ Node::Paragraph(paragraph)] if fragment.block(node).is_none() => {
            writer.write_inlines(&paragraph.children)?;
        }
        children => writer.write_blocks(children)?,
    }
    Ok(writer.finish())
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
            let mut writer = TexWriter::new(ctx, fragment, 0);
            writer.write_inlines(nodes)?;
            *markup = writer.finish();
        }
    }

    let mut body = String::new();
    if let Some(fields) = parts.docinfo {
        let prefix = ctx.options.private_field_prefix.clone();
        let mut rows = String::new();
        for field in &fields.fields {
            if is_private_field(&field.name, &prefix) {
                continue;
            }
            let lower = field.name.to_lowercase();
            let value = render_inline(ctx, &field.body, fields.line)?;
            match lower.as_str() {
                "abstract" => body.push_str(&format!(
                    "\\begin{{abstract}}\n{}\n\\end{{abstract}}\n\n",
                    value.trim_end()
                )),
                "dedication" => body.push_str(&format!(
                    "\\begin{{quote}}\n\\emph{{{}}}\n\\end{{quote}}\n\n",
                    value.trim_end()
                )),
                // Author and date go to \maketitle.
                "author" | "authors" | "date" => {
                    document.meta.push((lower, value.trim_end().to_string()));
                }
                _ => rows.push_str(&format!(
                    "\\item[{}:] {}\n",
                    escape(&field.name),
                    value.trim_end()
                )),
            }
        }
        if !rows.is_empty() {
            document.docinfo = format!("\\begin{{description}}\n{rows}\\end{{description}}\n\n");
        }
    }

    let offset = parts
        .body
        .iter()
        .filter_map(|node| match node {
            Node::Heading(heading) => Some(heading.depth),
            _ => None,
        })
        .min()
        .map_or(0, |depth| depth - 1);
    let mut writer = TexWriter::new(ctx, fragment, offset);
    writer.write_blocks(parts.body)?;
    body.push_str(&writer.finish());
    document.body = body;
    Ok(document)
}

/// Complete `article` document around a written document.
pub(crate) fn whole_document(document: &WrittenDocument) -> String {
    let mut page = String::from(
        "\\documentclass[a4paper]{article}\n\\usepackage[utf8]{inputenc}\n\\usepackage[T1]{fontenc}\n\\usepackage{graphicx}\n\\usepackage{hyperref}\n\\usepackage[normalem]{ulem}\n\\newlength{\\locallinewidth}\n\n",
    );

    let has_title = document.title.is_some();
    if has_title {
        let mut title = document.title_markup.clone();
        if document.subtitle.is_some() {
            title.push_str(&format!("\\\\ \\large{{{}}}", document.subtitle_markup));
        }
        page.push_str(&format!("\\title{{{title}}}\n"));
        let field = |names: &[&str]| {
            document
                .meta
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join(" \\and ")
        };
        page.push_str(&format!("\\author{{{}}}\n", field(&["author", "authors"])));
        page.push_str(&format!("\\date{{{}}}\n", field(&["date"])));
    }

    page.push_str("\n\\begin{document}\n");
    page.push_str(LINE_WIDTH);
    if has_title {
        page.push_str("\\maketitle\n");
    }
    page.push('\n');
    page.push_str(&document.docinfo);
    page.push_str(&document.body);
    page.push_str("\\end{document}\n");
    page
}
