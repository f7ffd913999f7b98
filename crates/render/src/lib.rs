#![deny(missing_docs)]
//! plexmark render engine: directives, HTML/TeX/pseudo-XML writers and the
//! typographic and structural post-processors.

/// Built-in directive handlers.
pub mod directives;
/// Syntax highlighting over syntect.
pub mod highlight;
/// Render options, sources and results.
pub mod options;
/// Directive trait and registry.
pub mod registry;
/// Per-call render state.
pub mod session;
/// HTML post-processing passes.
pub mod transform;

mod writer;

use std::borrow::Cow;

use plexmark_core::{
    ParserPipeline, Properties, PropertyValue, RenderError, decode, make_id, normalize_lines,
    parse_headers,
};

pub use options::{OutputFormat, RenderOptions, Rendered, Source};
pub use registry::{Directive, DirectiveError, DirectiveNode, DirectiveRegistry, Invocation};
pub use session::RenderSession;

use directives::{contents_marker, render_toc_html, render_toc_raw};
use writer::{WriteContext, WrittenDocument, parse_fragment};

/// A configured renderer. Immutable once built, so one value can serve
/// concurrent calls; every call gets a fresh [`RenderSession`].
pub struct Renderer {
    registry: DirectiveRegistry,
    options: RenderOptions,
    pipeline: ParserPipeline,
}

impl Renderer {
    /// Renderer with the built-in directives.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            registry: registry::defaults::default_registry(),
            options,
            pipeline: ParserPipeline::default(),
        }
    }

    /// Registers an extra directive, replacing a built-in of the same name.
    pub fn with_directive<D: Directive + 'static>(mut self, directive: D) -> Self {
        self.registry.register(directive);
        self
    }

    /// Options used by [`Renderer::render`].
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders `source` in the configured format.
    pub fn render<'s>(&self, source: impl Into<Source<'s>>) -> Result<Rendered, RenderError> {
        let options = &self.options;
        let text = match source.into() {
            Source::Text(text) => Cow::Borrowed(text),
            Source::Bytes(bytes) => decode(bytes, &options.encoding)?,
        };

        let mut lines = normalize_lines(&text, options.tab_width);
        let mut props = Properties::new();
        if options.with_props {
            lines = parse_headers(lines, &mut props, &options.private_field_prefix);
        }

        let mut session = RenderSession::new(options.format);
        let document = {
            let mut ctx = WriteContext {
                registry: &self.registry,
                options,
                pipeline: &self.pipeline,
                session: &mut session,
            };
            let fragment = parse_fragment(&mut ctx, &lines, 1)?;
            match options.format {
                OutputFormat::Html => writer::html::write_document(&mut ctx, &fragment)?,
                OutputFormat::Tex => writer::tex::write_document(&mut ctx, &fragment)?,
                OutputFormat::Raw => writer::raw::write_document(&mut ctx, &fragment)?,
            }
        };
        log::debug!(
            "rendered {} document with {} heading(s)",
            options.format,
            session.headings().len()
        );

        let mut output = resolve_contents(assemble(&document, options), &session, options.format);
        if options.format == OutputFormat::Html {
            if options.enable_typography {
                output = transform::escape_and_prettify(&output, &options.wiki_link_suffix);
            }
            output = transform::restructure(&output);
            output.truncate(output.trim_end().len());
        }

        let props = options.with_props.then(|| {
            for (key, value) in [("title", &document.title), ("subtitle", &document.subtitle)] {
                props
                    .entry(key.to_string())
                    .or_insert_with(|| PropertyValue::Single(value.clone().unwrap_or_default()));
            }
            props
        });

        Ok(Rendered {
            output,
            props,
            diagnostics: session.take_diagnostics(),
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Renders `source` with the built-in directives.
///
/// ```
/// use plexmark_render::{RenderOptions, render};
///
/// let rendered = render("This is a **test** document.", &RenderOptions::default()).unwrap();
/// assert_eq!(rendered.output, "<p>This is a <strong>test</strong> document.</p>");
/// ```
pub fn render<'s>(
    source: impl Into<Source<'s>>,
    options: &RenderOptions,
) -> Result<Rendered, RenderError> {
    Renderer::new(options.clone()).render(source)
}

/// Puts the written parts together for the requested output shape.
fn assemble(document: &WrittenDocument, options: &RenderOptions) -> String {
    match options.format {
        OutputFormat::Html if options.as_whole => {
            let id = document.title.as_deref().map(make_id).unwrap_or_default();
            writer::html::whole_document(document, "utf-8", &id)
        }
        OutputFormat::Html if options.with_docinfo && !options.with_props => format!(
            "<div class=\"docinfo\">\n{}\n</div>\n<div class=\"document\">\n{}</div>",
            document.docinfo, document.body
        ),
        OutputFormat::Tex if options.as_whole => writer::tex::whole_document(document),
        OutputFormat::Tex => format!("{}\n{}", writer::tex::LINE_WIDTH, document.body),
        _ => document.body.clone(),
    }
}

/// Replaces contents markers with the listings of the headings written.
fn resolve_contents(mut output: String, session: &RenderSession, format: OutputFormat) -> String {
    for (index, contents) in session.pending_contents().iter().enumerate() {
        let marker = contents_marker(index);
        output = match format {
            OutputFormat::Raw => output
                .split_inclusive('\n')
                .map(|line| {
                    let trimmed = line.trim_start_matches(' ');
                    if trimmed.trim_end() == marker {
                        let indent = (line.len() - trimmed.len()) / 4;
                        Cow::Owned(render_toc_raw(contents, session.headings(), indent))
                    } else {
                        Cow::Borrowed(line)
                    }
                })
                .collect(),
            _ => output.replace(
                &format!("{marker}\n"),
                &render_toc_html(contents, session.headings()),
            ),
        };
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn docinfo_wrap_only_without_props() {
        let mut options = RenderOptions {
            with_docinfo: true,
            ..RenderOptions::default()
        };
        let output = render(":Version: 1\n\nBody.", &options).unwrap().output;
        assert!(output.starts_with("<div class=\"docinfo\">\n<table class=\"docinfo\""));
        assert!(output.ends_with("<div class=\"document\">\n<p>Body.</p>\n</div>"));

        options.with_props = true;
        let output = render(":Version: 1\n\nBody.", &options).unwrap().output;
        assert_eq!(output, "<p>Body.</p>");
    }

    #[test]
    fn props_default_title_and_subtitle() {
        let options = RenderOptions {
            with_props: true,
            ..RenderOptions::default()
        };
        let props = render("Just text.", &options).unwrap().props.unwrap();
        assert_eq!(props["title"], PropertyValue::Single(String::new()));
        assert_eq!(props["subtitle"], PropertyValue::Single(String::new()));
    }

    #[test]
    fn explicit_title_field_wins() {
        let options = RenderOptions {
            with_props: true,
            ..RenderOptions::default()
        };
        let props = render(":Title: Field\n\n# Heading", &options).unwrap().props.unwrap();
        assert_eq!(props["title"].as_str(), Some("Field"));
    }

    #[test]
    fn custom_directive_replaces_builtin() {
        struct Shout;

        impl Directive for Shout {
            fn name(&self) -> &str {
                "break"
            }

            fn spec(&self) -> plexmark_core::DirectiveSpec {
                plexmark_core::DirectiveSpec::default()
            }

            fn run(
                &self,
                _invocation: &Invocation<'_>,
                _session: &mut RenderSession,
            ) -> Result<Vec<DirectiveNode>, DirectiveError> {
                Ok(vec![DirectiveNode::html("<p>LOUD</p>\n")])
            }
        }

        let renderer = Renderer::default().with_directive(Shout);
        assert_eq!(renderer.render(".. break::").unwrap().output, "<p>LOUD</p>");
    }
}
