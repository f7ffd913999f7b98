//! `.. raw:: format` pass-through blocks.

use plexmark_core::DirectiveSpec;

use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

/// Emits its content verbatim when writing the named format.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDirective;

impl Directive for RawDirective {
    fn name(&self) -> &str {
        "raw"
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
        if invocation.content().is_empty() {
            return Err(DirectiveError::Invalid(
                "The \"raw\" directive requires content; none supplied.".into(),
            ));
        }

        let name = invocation.argument(0).unwrap_or_default();
        let Ok(format) = name.parse::<OutputFormat>() else {
            log::debug!("raw block for unsupported format {name:?} skipped");
            return Ok(Vec::new());
        };

        let mut text = invocation.content().join("\n");
        text.push('\n');
        Ok(vec![DirectiveNode::Raw { format, text }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::test_support::{html_session, run};

    #[test]
    fn keeps_format_and_content() {
        let mut session = html_session();
        assert_eq!(
            run(&mut session, "raw", "latex", &["", "\\newpage"]).unwrap(),
            vec![DirectiveNode::tex("\\newpage\n")]
        );
        assert_eq!(
            run(&mut session, "raw", "html", &["", "<b>x</b>", "<i>y</i>"]).unwrap(),
            vec![DirectiveNode::html("<b>x</b>\n<i>y</i>\n")]
        );
    }

    #[test]
    fn unsupported_format_is_dropped() {
        let mut session = html_session();
        assert!(run(&mut session, "raw", "odt", &["", "x"]).unwrap().is_empty());
    }

    #[test]
    fn requires_content() {
        let mut session = html_session();
        assert!(run(&mut session, "raw", "html", &[]).is_err());
    }
}
