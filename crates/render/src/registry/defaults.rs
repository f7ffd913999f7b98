//! The built-in directive set.

use super::DirectiveRegistry;
use crate::directives::{
    BreakDirective, ContentsDirective, FigureDirective, PlanDirective, RawDirective,
    SyntaxDirective, TagDirective,
};

/// Creates a registry holding every built-in directive.
///
/// This registry includes:
/// - `tag` annotation blocks and `plan` sections
/// - `syntax` highlighting
/// - `break`, `raw`, `figure` and `contents`
///
/// # Example
///
/// ```
/// use plexmark_render::registry::defaults::default_registry;
///
/// let registry = default_registry();
/// assert!(registry.contains("tag"));
/// assert!(!registry.contains("imagemap"));
/// ```
pub fn default_registry() -> DirectiveRegistry {
    let mut registry = DirectiveRegistry::new();
    registry.register(TagDirective);
    registry.register(PlanDirective);
    registry.register(SyntaxDirective);
    registry.register(BreakDirective);
    registry.register(RawDirective);
    registry.register(FigureDirective);
    registry.register(ContentsDirective);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_builtins_in_name_order() {
        let registry = default_registry();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["break", "contents", "figure", "plan", "raw", "syntax", "tag"]
        );
    }
}
