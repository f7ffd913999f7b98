#![deny(missing_docs)]
//! plexmark core: source normalization, metadata fields, explicit-markup
//! blocks and the markdown parse pipeline.

/// Explicit-markup block extraction (directives, field lists, doctests).
pub mod blocks;
/// Code fence detection utilities.
pub mod code_fence;
/// reStructuredText compatibility rewrites.
pub mod compat;
/// Core error and diagnostic types.
pub mod error;
/// Metadata field extraction.
pub mod headers;
/// Decoding and whitespace normalization.
pub mod normalize;
/// Markdown parsing utilities and preprocessing hooks.
pub mod parse;
/// Identifier generation for headings.
pub mod slug;

pub use blocks::{
    DirectiveBlock, DirectiveParts, DirectiveSpec, DoctestBlock, ExtractedBlock, Extraction, Field,
    FieldList, extract_blocks, parse_placeholder, placeholder,
};
pub use code_fence::{FenceTracker, OpenFence};
pub use error::{ParseDiagnostics, ParseWarning, RenderError, SourceLocation};
pub use headers::{Properties, PropertyValue, parse_headers, record_property, split_field};
pub use normalize::{decode, normalize_lines};
pub use parse::{ParseOptions, ParserPipeline, TextTransform, parse_mdast, parse_mdast_with_options};
pub use slug::{Slugger, make_id};
