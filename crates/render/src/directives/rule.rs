//! `.. break::` horizontal rules.

use plexmark_core::DirectiveSpec;

use super::attr;
use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

/// Emits `<hr class="…" />`, `clear` unless a class is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreakDirective;

impl Directive for BreakDirective {
    fn name(&self) -> &str {
        "break"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            optional_arguments: 1,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        _session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        Ok(vec![match invocation.format {
            OutputFormat::Tex => DirectiveNode::tex("\\par\\noindent\\hrulefill\\par\n"),
            _ => {
                let class = invocation.argument(0).unwrap_or("clear");
                DirectiveNode::html(format!("<hr class=\"{}\" />\n", attr(class)))
            }
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::test_support::{html_session, run};

    #[test]
    fn default_and_custom_class() {
        let mut session = html_session();
        assert_eq!(
            run(&mut session, "break", "", &[]).unwrap(),
            vec![DirectiveNode::html("<hr class=\"clear\" />\n")]
        );
        assert_eq!(
            run(&mut session, "break", "page", &[]).unwrap(),
            vec![DirectiveNode::html("<hr class=\"page\" />\n")]
        );
    }

    #[test]
    fn rejects_content() {
        let mut session = html_session();
        assert!(run(&mut session, "break", "", &["", "text"]).is_err());
    }
}
