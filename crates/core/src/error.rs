use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of the first column of a line.
    pub fn line(line: usize) -> Self {
        Self::new(line, 1)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort a render call.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested output format is not one of html, tex or raw.
    #[error("Unknown format: {0:?}")]
    InvalidFormat(String),
    /// The encoding label is not known.
    #[error("Unknown encoding: {0:?}")]
    UnknownEncoding(String),
    /// The source bytes are not valid in the requested encoding.
    #[error("Source is not valid {encoding}")]
    Encoding {
        /// Encoding label used for decoding
        encoding: String,
    },
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A directive handler refused its input.
    #[error("Error in \"{name}\" directive at {location}: {message}")]
    Directive {
        /// Directive name
        name: String,
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// IO error while reading sources or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a directive error with location
    pub fn directive_error(
        name: impl Into<String>,
        message: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::Directive {
            name: name.into(),
            message: message.into(),
            location: SourceLocation::line(line),
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Directive name with no registered handler
    UnknownDirective {
        /// Source location of the directive line
        location: SourceLocation,
        /// Directive name as written
        name: String,
    },
    /// Highlighting language that the highlighter does not know
    UnknownLanguage {
        /// Source location of the code block
        location: SourceLocation,
        /// Language name as written
        language: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. } => location,
            ParseWarning::UnknownDirective { location, .. } => location,
            ParseWarning::UnknownLanguage { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}) opened at {}", marker, location)
            }
            ParseWarning::UnknownDirective { location, name } => {
                write!(f, "{}: Unknown directive type \"{}\"", location, name)
            }
            ParseWarning::UnknownLanguage { location, language } => {
                write!(
                    f,
                    "{}: No highlighting for \"{}\", rendered as plain text",
                    location, language
                )
            }
        }
    }
}

/// Collection of parse diagnostics gathered during one render call
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Move all warnings from another collection into this one
    pub fn extend(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_error_names_directive_and_line() {
        let err = RenderError::directive_error("tag", "The tag id 'list-a' has already been used!", 7);
        assert_eq!(
            err.to_string(),
            "Error in \"tag\" directive at 7:1: The tag id 'list-a' has already been used!"
        );
    }

    #[test]
    fn invalid_format_quotes_value() {
        let err = RenderError::InvalidFormat("pdf".into());
        assert_eq!(err.to_string(), "Unknown format: \"pdf\"");
    }

    #[test]
    fn diagnostics_collect_warnings() {
        let mut diagnostics = ParseDiagnostics::new();
        assert!(!diagnostics.has_warnings());
        diagnostics.add_warning(ParseWarning::UnknownDirective {
            location: SourceLocation::line(3),
            name: "imap".into(),
        });
        assert_eq!(diagnostics.count(), 1);
        assert_eq!(diagnostics.warnings[0].location().line, 3);
        assert_eq!(
            diagnostics.warnings[0].to_string(),
            "3:1: Unknown directive type \"imap\""
        );
    }
}
