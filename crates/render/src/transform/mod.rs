//! HTML post-processing passes.

/// Literal-region aware dispatch of the typographic pass.
pub mod prettify;
/// Structural rewrites of the rendered HTML.
pub mod structure;
/// Quotes, dashes, symbols and wiki links.
pub mod typography;

pub use prettify::escape_and_prettify;
pub use structure::restructure;
pub use typography::convert;
