//! `.. syntax:: language` highlighted code.

use plexmark_core::{DirectiveSpec, ParseWarning, SourceLocation};

use crate::highlight;
use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

/// Highlights its content, degrading to plain text for unknown languages.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxDirective;

/// Renders `code` in the syntax container, recording a warning when the
/// language has no syntax definition.
pub(crate) fn syntax_block(
    code: &str,
    language: &str,
    line: usize,
    session: &mut RenderSession,
) -> String {
    let (html, highlighted) = highlight::highlight_or_plain(code, language);
    if !highlighted {
        session.warn(ParseWarning::UnknownLanguage {
            location: SourceLocation::line(line),
            language: language.to_string(),
        });
    }
    format!("<div class=\"syntax\"><pre>{}</pre></div>\n", html.trim_end_matches('\n'))
}

/// TeX rendition of a code block.
pub(crate) fn verbatim(code: &str) -> String {
    format!("\\begin{{verbatim}}\n{code}\n\\end{{verbatim}}\n")
}

impl Directive for SyntaxDirective {
    fn name(&self) -> &str {
        "syntax"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            required_arguments: 1,
            has_options: true,
            has_content: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        let language = invocation.argument(0).unwrap_or_default();
        if let Some(format) = invocation.option("format") {
            log::debug!("syntax format option {format:?} ignored");
        }
        let code = invocation.content().join("\n");

        Ok(vec![match invocation.format {
            OutputFormat::Tex => DirectiveNode::tex(verbatim(&code)),
            _ => DirectiveNode::html(syntax_block(&code, language, invocation.line, session)),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::test_support::{html_session, run};
    use pretty_assertions::assert_eq;

    #[test]
    fn highlights_known_language() {
        let mut session = html_session();
        let nodes = run(&mut session, "syntax", "python", &["", "import os"]).unwrap();
        let DirectiveNode::Raw { text, .. } = &nodes[0] else {
            panic!("expected raw output");
        };
        assert!(text.starts_with("<div class=\"syntax\"><pre><span class=\""));
        assert!(text.ends_with("</pre></div>\n"));
        assert_eq!(session.take_diagnostics().count(), 0);
    }

    #[test]
    fn unknown_language_is_plain_text_with_warning() {
        let mut session = html_session();
        let nodes = run(&mut session, "syntax", "klingon", &["", "a < b"]).unwrap();
        assert_eq!(
            nodes,
            vec![DirectiveNode::html("<div class=\"syntax\"><pre>a &lt; b</pre></div>\n")]
        );
        let diagnostics = session.take_diagnostics();
        assert!(matches!(
            &diagnostics.warnings[..],
            [ParseWarning::UnknownLanguage { language, .. }] if language == "klingon"
        ));
    }

    #[test]
    fn format_option_is_accepted() {
        let mut session = html_session();
        let nodes = run(&mut session, "syntax", "rust", &[":format: html", "", "fn main() {}"]);
        assert!(nodes.is_ok());
    }

    #[test]
    fn tex_uses_verbatim() {
        let mut session = RenderSession::new(OutputFormat::Tex);
        let nodes = run(&mut session, "syntax", "rust", &["", "let x = 1;"]).unwrap();
        assert_eq!(
            nodes,
            vec![DirectiveNode::tex("\\begin{verbatim}\nlet x = 1;\n\\end{verbatim}\n")]
        );
    }
}
