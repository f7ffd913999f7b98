//! Explicit-markup block extraction.
//!
//! The markdown engine knows nothing about directive blocks
//! (`.. name:: arguments`), comments (`.. anything`), field lists
//! (`:Name: value`) or doctest blocks (`>>> code`). Before parsing, these
//! blocks are cut out of the source and replaced by placeholder paragraphs
//! (`plexmark-block-N`). Writers recognise a paragraph made of a single
//! placeholder and render the extracted block in its place.
//!
//! Blocks are only recognised at the start of a paragraph at column zero and
//! never inside fenced code.

use crate::code_fence::FenceTracker;
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};
use crate::headers::split_field;
use crate::normalize::indent_of;

const PLACEHOLDER_PREFIX: &str = "plexmark-block-";

/// Builds the placeholder paragraph text for block `index`.
pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}")
}

/// Returns the block index if `text` is exactly a placeholder.
///
/// ```
/// use plexmark_core::blocks::{parse_placeholder, placeholder};
///
/// assert_eq!(parse_placeholder(&placeholder(12)), Some(12));
/// assert_eq!(parse_placeholder("plexmark-block-x"), None);
/// ```
pub fn parse_placeholder(text: &str) -> Option<usize> {
    text.trim().strip_prefix(PLACEHOLDER_PREFIX)?.parse().ok()
}

/// One `.. name:: arguments` block with its indented body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock {
    /// Directive name, lower-cased.
    pub name: String,
    /// Text following `::` on the directive line.
    pub first_line: String,
    /// Indented lines after the directive line, dedented, trailing blanks removed.
    pub body: Vec<String>,
    /// Line number of the directive line (1-indexed).
    pub line: usize,
    /// The block exactly as written.
    pub block_text: String,
}

/// Argument rules a directive declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectiveSpec {
    /// Number of required arguments.
    pub required_arguments: usize,
    /// Number of optional arguments.
    pub optional_arguments: usize,
    /// Whether the last argument may contain whitespace.
    pub final_argument_whitespace: bool,
    /// Whether options (`:name: value` lines) are accepted.
    pub has_options: bool,
    /// Whether a content block is accepted.
    pub has_content: bool,
}

/// A directive block split according to its [`DirectiveSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectiveParts {
    /// Positional arguments.
    pub arguments: Vec<String>,
    /// Options in order of appearance.
    pub options: Vec<(String, String)>,
    /// Content lines, dedented.
    pub content: Vec<String>,
    /// Line number of the first content line (1-indexed).
    pub content_line: usize,
}

impl DirectiveParts {
    /// Returns the value of option `name`, if given.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl DirectiveBlock {
    /// Splits the block into arguments, options and content.
    ///
    /// Arguments and options end at the first blank line. A directive that
    /// takes neither gets its whole body as content.
    pub fn parse(&self, spec: &DirectiveSpec) -> Result<DirectiveParts, String> {
        let first = self.first_line.trim();
        // An empty directive line is not part of the argument block
        let base_offset = usize::from(first.is_empty());
        let mut lines: Vec<&str> = Vec::with_capacity(self.body.len() + 1);
        if !first.is_empty() {
            lines.push(first);
        }
        lines.extend(self.body.iter().map(String::as_str));

        let takes_arguments = spec.required_arguments + spec.optional_arguments > 0;
        let mut line_offset = base_offset;
        let (mut header, mut content) = if takes_arguments || spec.has_options {
            let split = lines
                .iter()
                .position(|line| line.trim().is_empty())
                .unwrap_or(lines.len());
            line_offset += split + 1;
            (
                lines[..split].to_vec(),
                lines.get(split + 1..).unwrap_or_default().to_vec(),
            )
        } else {
            (Vec::new(), lines.clone())
        };

        let mut options = Vec::new();
        if spec.has_options
            && let Some(first_option) = header
                .iter()
                .position(|line| split_field(line.trim()).is_some())
        {
            for line in header.drain(first_option..) {
                match split_field(line.trim()) {
                    Some((name, value)) => options.push((name.to_lowercase(), value.to_string())),
                    None => match options.last_mut() {
                        Some((_, value)) => {
                            value.push(' ');
                            value.push_str(line.trim());
                        }
                        None => return Err(format!("invalid option block: {:?}", line)),
                    },
                }
            }
        }

        if !header.is_empty() && !takes_arguments {
            // No blank line after an argument-less directive: it was all content
            let mut merged = std::mem::take(&mut header);
            merged.push("");
            merged.extend(content);
            content = merged;
            line_offset = base_offset;
        }

        let arguments = split_arguments(&header.join(" "), spec)?;

        let leading_blank = content.iter().take_while(|line| line.trim().is_empty()).count();
        content.drain(..leading_blank);
        while content.last().is_some_and(|line| line.trim().is_empty()) {
            content.pop();
        }

        if !content.is_empty() && !spec.has_content {
            return Err("no content permitted".into());
        }

        Ok(DirectiveParts {
            arguments,
            options,
            content: content.into_iter().map(str::to_string).collect(),
            content_line: self.line + line_offset + leading_blank,
        })
    }
}

fn split_arguments(text: &str, spec: &DirectiveSpec) -> Result<Vec<String>, String> {
    let max = spec.required_arguments + spec.optional_arguments;
    let mut arguments: Vec<String> = text.split_whitespace().map(str::to_string).collect();

    if arguments.len() > max {
        if spec.final_argument_whitespace && max > 0 {
            let mut parts = Vec::with_capacity(max);
            let mut rest = text.trim();
            for _ in 0..max - 1 {
                let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                parts.push(head.to_string());
                rest = tail.trim_start();
            }
            parts.push(rest.to_string());
            arguments = parts;
        } else {
            return Err(format!(
                "maximum {} argument(s) allowed, {} supplied",
                max,
                arguments.len()
            ));
        }
    }

    if arguments.len() < spec.required_arguments {
        return Err(format!(
            "{} argument(s) required, {} supplied",
            spec.required_arguments,
            arguments.len()
        ));
    }

    Ok(arguments)
}

/// One `:Name: value` entry of a field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name as written.
    pub name: String,
    /// Field body with continuation lines joined by spaces.
    pub body: String,
}

/// Consecutive field lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    /// Fields in order of appearance.
    pub fields: Vec<Field>,
    /// Line number of the first field (1-indexed).
    pub line: usize,
}

/// Interactive session paragraph starting with `>>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctestBlock {
    /// Lines of the session.
    pub lines: Vec<String>,
    /// Line number of the first line (1-indexed).
    pub line: usize,
}

/// A block cut out of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedBlock {
    /// `.. name::` directive.
    Directive(DirectiveBlock),
    /// `:Name: value` field list.
    FieldList(FieldList),
    /// `>>>` doctest block.
    Doctest(DoctestBlock),
}

/// Result of [`extract_blocks`].
#[derive(Debug, Default)]
pub struct Extraction {
    /// Source text with blocks replaced by placeholder paragraphs.
    pub text: String,
    /// Extracted blocks; block `i` is behind placeholder `first_index + i`.
    pub blocks: Vec<ExtractedBlock>,
    /// Warnings found while scanning.
    pub diagnostics: ParseDiagnostics,
}

/// Cuts explicit-markup blocks out of `lines`.
///
/// `first_index` numbers the placeholders so nested extractions never reuse
/// an index; `first_line` is the source line number of `lines[0]`.
pub fn extract_blocks(lines: &[String], first_index: usize, first_line: usize) -> Extraction {
    let mut extraction = Extraction::default();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut fences = FenceTracker::new();
    let mut fence_line = first_line;
    let mut paragraph_start = true;
    let mut index = 0;

    while index < lines.len() {
        let line = &lines[index];
        let line_number = first_line + index;

        let was_inside = fences.is_inside();
        if fences.advance(line) {
            if !was_inside {
                fence_line = line_number;
            }
            out.push(line.clone());
            paragraph_start = false;
            index += 1;
            continue;
        }

        let (block, end) = if !paragraph_start {
            (None, index)
        } else if is_explicit_markup(line) {
            let end = indented_block_end(lines, index + 1);
            // Anything starting with `..` that is not a directive is a comment
            let block = parse_directive(lines, index, end, line_number).map(ExtractedBlock::Directive);
            (block, end)
        } else if split_field(line).is_some() {
            let (fields, end) = collect_fields(lines, index);
            let list = FieldList {
                fields,
                line: line_number,
            };
            (Some(ExtractedBlock::FieldList(list)), end)
        } else if line.starts_with(">>>") {
            let end = lines[index..]
                .iter()
                .position(|line| line.trim().is_empty())
                .map_or(lines.len(), |offset| index + offset);
            let doctest = DoctestBlock {
                lines: lines[index..end].to_vec(),
                line: line_number,
            };
            (Some(ExtractedBlock::Doctest(doctest)), end)
        } else {
            (None, index)
        };

        if end == index {
            out.push(line.clone());
            paragraph_start = line.trim().is_empty();
            index += 1;
            continue;
        }

        if let Some(block) = block {
            log::debug!("extracted block at line {}", line_number);
            if out.last().is_some_and(|line| !line.is_empty()) {
                out.push(String::new());
            }
            out.push(placeholder(first_index + extraction.blocks.len()));
            extraction.blocks.push(block);
        }

        index = end;
        while lines.get(index).is_some_and(|line| line.trim().is_empty()) {
            index += 1;
        }
        if index < lines.len() && out.last().is_some_and(|line| !line.is_empty()) {
            out.push(String::new());
        }
        paragraph_start = true;
    }

    if let Some(open) = fences.unclosed() {
        extraction
            .diagnostics
            .add_warning(ParseWarning::UnclosedCodeFence {
                location: SourceLocation::line(fence_line),
                marker: open.marker,
            });
    }

    extraction.text = out.join("\n");
    extraction
}

fn is_explicit_markup(line: &str) -> bool {
    line == ".." || line.starts_with(".. ")
}

/// Index one past the last indented line following `start`, excluding
/// trailing blank lines.
fn indented_block_end(lines: &[String], start: usize) -> usize {
    let mut end = start;
    let mut cursor = start;
    while let Some(line) = lines.get(cursor) {
        if line.trim().is_empty() {
            cursor += 1;
            continue;
        }
        if indent_of(line) == 0 {
            break;
        }
        cursor += 1;
        end = cursor;
    }
    end
}

fn parse_directive(lines: &[String], start: usize, end: usize, line: usize) -> Option<DirectiveBlock> {
    let marker = lines[start].strip_prefix("..")?.trim_start();
    let (name, first_line) = marker.split_once("::")?;
    if name.is_empty()
        || !name
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | '+'))
        || first_line.starts_with(|ch: char| !ch.is_whitespace())
    {
        return None;
    }

    let body = &lines[start + 1..end];
    let dedent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);
    let body = body
        .iter()
        .map(|line| line.get(dedent..).unwrap_or("").to_string())
        .collect();

    Some(DirectiveBlock {
        name: name.to_lowercase(),
        first_line: first_line.trim().to_string(),
        body,
        line,
        block_text: lines[start..end].join("\n"),
    })
}

fn collect_fields(lines: &[String], start: usize) -> (Vec<Field>, usize) {
    let mut fields: Vec<Field> = Vec::new();
    let mut index = start;
    while let Some(line) = lines.get(index) {
        if let Some((name, value)) = split_field(line) {
            fields.push(Field {
                name: name.to_string(),
                body: value.to_string(),
            });
        } else if indent_of(line) > 0
            && !line.trim().is_empty()
            && let Some(field) = fields.last_mut()
        {
            if !field.body.is_empty() {
                field.body.push(' ');
            }
            field.body.push_str(line.trim());
        } else {
            break;
        }
        index += 1;
    }
    (fields, index)
}
