//! Render options, input sources and results.

use std::fmt;
use std::str::FromStr;

use plexmark_core::{ParseDiagnostics, Properties, RenderError};
use serde::{Deserialize, Serialize};

/// Output format of a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    /// HTML fragment or XHTML page.
    #[default]
    Html,
    /// LaTeX body or article.
    Tex,
    /// Indented pseudo-XML of the document tree.
    Raw,
}

impl OutputFormat {
    /// Canonical name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Tex => "tex",
            OutputFormat::Raw => "raw",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" | "xhtml" => Ok(OutputFormat::Html),
            "tex" | "latex" => Ok(OutputFormat::Tex),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(RenderError::InvalidFormat(value.to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(format: OutputFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one render call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Encoding label used when the source is given as bytes.
    pub encoding: String,
    /// Also return the metadata fields, title and subtitle.
    pub with_props: bool,
    /// Wrap HTML fragments in `docinfo` and `document` divs.
    pub with_docinfo: bool,
    /// Produce a complete document instead of the body fragment.
    pub as_whole: bool,
    /// Apply the typographic post-processor to HTML output.
    pub enable_typography: bool,
    /// Suffix appended to `[[wiki link]]` targets.
    pub wiki_link_suffix: String,
    /// Metadata fields starting with this prefix are hidden from the output.
    pub private_field_prefix: String,
    /// Tab stop width used when expanding tabs.
    pub tab_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            encoding: "utf-8".to_string(),
            with_props: false,
            with_docinfo: false,
            as_whole: false,
            enable_typography: true,
            wiki_link_suffix: ".html".to_string(),
            private_field_prefix: "x-".to_string(),
            tab_width: 4,
        }
    }
}

impl RenderOptions {
    /// Default options for the given format.
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Markup source, either decoded text or raw bytes.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Already decoded text.
    Text(&'a str),
    /// Bytes decoded with [`RenderOptions::encoding`].
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

/// Result of a render call.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    /// Rendered document or fragment.
    pub output: String,
    /// Metadata fields plus `title` and `subtitle`, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Properties>,
    /// Non-fatal problems found while rendering.
    #[serde(skip)]
    pub diagnostics: ParseDiagnostics,
}
