//! Directive handler interface and the name-to-handler registry.

pub mod defaults;

use std::collections::BTreeMap;
use std::sync::Arc;

use plexmark_core::{DirectiveBlock, DirectiveParts, DirectiveSpec, ParseWarning, RenderError, SourceLocation};
use thiserror::Error;

use crate::options::OutputFormat;
use crate::session::RenderSession;

/// Why a directive handler refused its input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectiveError {
    /// The tag anchor id was already used in this render call.
    #[error("The tag id '{0}' has already been used!")]
    DuplicateTagId(String),
    /// An argument or option value is not acceptable.
    #[error("{0}")]
    Invalid(String),
}

/// Output produced by a directive handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveNode {
    /// Markup emitted verbatim when writing `format`.
    Raw {
        /// Format the markup belongs to.
        format: OutputFormat,
        /// The markup itself.
        text: String,
    },
    /// Preformatted text.
    Literal {
        /// Text shown as is.
        text: String,
    },
    /// Markup source parsed and rendered in place as block content.
    Nested {
        /// Source lines.
        lines: Vec<String>,
        /// Source line number of the first line.
        line: usize,
    },
    /// Markup source rendered in place as inline content.
    Inline {
        /// Source text.
        text: String,
        /// Source line number.
        line: usize,
    },
    /// Table of contents built once the whole document has been written.
    Contents {
        /// Title above the listing.
        title: String,
        /// Deepest level listed.
        depth: Option<usize>,
    },
}

impl DirectiveNode {
    /// HTML markup.
    pub fn html(text: impl Into<String>) -> Self {
        DirectiveNode::Raw {
            format: OutputFormat::Html,
            text: text.into(),
        }
    }

    /// TeX markup.
    pub fn tex(text: impl Into<String>) -> Self {
        DirectiveNode::Raw {
            format: OutputFormat::Tex,
            text: text.into(),
        }
    }
}

/// A directive occurrence handed to its handler.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Directive name, lower-cased.
    pub name: &'a str,
    /// Arguments, options and content split by the handler's spec.
    pub parts: DirectiveParts,
    /// Line number of the directive line.
    pub line: usize,
    /// The directive block as written.
    pub block_text: &'a str,
    /// Output format being written.
    pub format: OutputFormat,
}

impl Invocation<'_> {
    /// Positional argument `index`, if given.
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.parts.arguments.get(index).map(String::as_str)
    }

    /// Option value, if given.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.parts.option(name)
    }

    /// Content lines.
    pub fn content(&self) -> &[String] {
        &self.parts.content
    }

    /// The content as a block to be parsed and rendered in place.
    pub fn nested_content(&self) -> DirectiveNode {
        DirectiveNode::Nested {
            lines: self.parts.content.clone(),
            line: self.parts.content_line,
        }
    }
}

/// A block handler registered under a directive name.
pub trait Directive: Send + Sync {
    /// Name the directive is invoked by.
    fn name(&self) -> &str;

    /// Argument rules used to split the block before [`Directive::run`].
    fn spec(&self) -> DirectiveSpec;

    /// Runs the directive.
    fn run(
        &self,
        invocation: &Invocation<'_>,
        session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, DirectiveError>;
}

/// Directive handlers by name.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    directives: BTreeMap<String, Arc<dyn Directive>>,
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.directives.keys()).finish()
    }
}

impl DirectiveRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any handler of the same name.
    pub fn register<D: Directive + 'static>(&mut self, directive: D) {
        self.directives
            .insert(directive.name().to_lowercase(), Arc::new(directive));
    }

    /// Handler registered for `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.directives.get(&name.to_lowercase()).map(|d| d.as_ref())
    }

    /// Whether a handler is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }

    /// Runs the handler for an extracted block.
    ///
    /// Unknown names are not an error: a warning is recorded and the block
    /// text comes back as a literal block. Argument problems and handler
    /// errors abort the render call.
    pub fn dispatch(
        &self,
        block: &DirectiveBlock,
        session: &mut RenderSession,
    ) -> Result<Vec<DirectiveNode>, RenderError> {
        let Some(directive) = self.get(&block.name) else {
            session.warn(ParseWarning::UnknownDirective {
                location: SourceLocation::line(block.line),
                name: block.name.clone(),
            });
            return Ok(vec![DirectiveNode::Literal {
                text: block.block_text.clone(),
            }]);
        };

        let parts = block
            .parse(&directive.spec())
            .map_err(|message| RenderError::directive_error(&block.name, message, block.line))?;

        log::debug!("running directive {:?} at line {}", block.name, block.line);
        let invocation = Invocation {
            name: &block.name,
            parts,
            line: block.line,
            block_text: &block.block_text,
            format: session.format(),
        };
        directive
            .run(&invocation, session)
            .map_err(|err| RenderError::directive_error(&block.name, err.to_string(), block.line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Directive for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn spec(&self) -> DirectiveSpec {
            DirectiveSpec {
                required_arguments: 1,
                ..DirectiveSpec::default()
            }
        }

        fn run(
            &self,
            invocation: &Invocation<'_>,
            _session: &mut RenderSession,
        ) -> Result<Vec<DirectiveNode>, DirectiveError> {
            match invocation.argument(0) {
                Some("fail") => Err(DirectiveError::Invalid("refused".into())),
                Some(value) => Ok(vec![DirectiveNode::html(value)]),
                None => Ok(Vec::new()),
            }
        }
    }

    fn block(name: &str, first_line: &str) -> DirectiveBlock {
        DirectiveBlock {
            name: name.into(),
            first_line: first_line.into(),
            body: Vec::new(),
            line: 4,
            block_text: format!(".. {name}:: {first_line}"),
        }
    }

    #[test]
    fn dispatches_by_lowercased_name() {
        let mut registry = DirectiveRegistry::new();
        registry.register(Echo);
        assert!(registry.contains("ECHO"));

        let mut session = RenderSession::new(OutputFormat::Html);
        let nodes = registry.dispatch(&block("echo", "hi"), &mut session).unwrap();
        assert_eq!(nodes, vec![DirectiveNode::html("hi")]);
    }

    #[test]
    fn unknown_directive_becomes_literal_with_warning() {
        let registry = DirectiveRegistry::new();
        let mut session = RenderSession::new(OutputFormat::Html);
        let nodes = registry.dispatch(&block("imap", "x"), &mut session).unwrap();
        assert_eq!(
            nodes,
            vec![DirectiveNode::Literal {
                text: ".. imap:: x".into()
            }]
        );
        assert_eq!(session.take_diagnostics().count(), 1);
    }

    #[test]
    fn argument_and_handler_errors_are_fatal() {
        let mut registry = DirectiveRegistry::new();
        registry.register(Echo);
        let mut session = RenderSession::new(OutputFormat::Html);

        let err = registry.dispatch(&block("echo", ""), &mut session).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in \"echo\" directive at 4:1: 1 argument(s) required, 0 supplied"
        );

        let err = registry.dispatch(&block("echo", "fail"), &mut session).unwrap_err();
        assert!(matches!(err, RenderError::Directive { ref message, .. } if message == "refused"));
    }
}
