//! `.. plan:: id` sectioning.

use plexmark_core::DirectiveSpec;

use crate::options::OutputFormat;
use crate::registry::{Directive, DirectiveError, DirectiveNode, Invocation};
use crate::session::RenderSession;

const PLAN_BOOTSTRAP: &str = "<div id=\"plan-container\"></div><script type=\"text/javascript\" src=\"static/plan.js\"></script><hr class=\"clear\" />\n";

/// Switches the plan that namespaces subsequent tag ids.
///
/// The first plan of a render call also emits the plan viewer container.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanDirective;

impl Directive for PlanDirective {
    fn name(&self) -> &str {
        "plan"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            required_arguments: 1,
            final_argument_whitespace: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &Invocation<'_>,
        session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        let first = session.current_plan().is_none();
        let plan = invocation.argument(0).unwrap_or_default().trim();
        log::debug!("switching to plan {plan:?}");
        session.set_plan(plan);

        if first && invocation.format != OutputFormat::Tex {
            Ok(vec![DirectiveNode::html(PLAN_BOOTSTRAP)])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::test_support::{html_session, run};

    #[test]
    fn only_first_plan_emits_bootstrap() {
        let mut session = html_session();
        let first = run(&mut session, "plan", "alpha", &[]).unwrap();
        assert_eq!(first, vec![DirectiveNode::html(PLAN_BOOTSTRAP)]);
        assert_eq!(session.current_plan(), Some("alpha"));

        let second = run(&mut session, "plan", "beta", &[]).unwrap();
        assert!(second.is_empty());
        assert_eq!(session.current_plan(), Some("beta"));
    }

    #[test]
    fn plan_namespaces_tag_ids() {
        let mut session = html_session();
        run(&mut session, "plan", "alpha", &[]).unwrap();
        assert_eq!(session.claim_tag_id(None).unwrap(), "alpha-temp-1");
    }

    #[test]
    fn plan_requires_an_argument() {
        let mut session = html_session();
        assert!(run(&mut session, "plan", "", &[]).is_err());
        assert_eq!(session.current_plan(), None);
    }
}
