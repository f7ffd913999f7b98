//! Text rewrites for reStructuredText habits the markdown engine does not
//! understand.
//!
//! Both rewrites are [`TextTransform`](crate::parse::TextTransform)s and run
//! right before the markdown engine. Lines inside fenced code are never
//! touched.

use std::borrow::Cow;

use crate::code_fence::FenceTracker;
use crate::normalize::indent_of;

/// Characters that may form a section title adornment. Backticks are left
/// out so code fences are never mistaken for one.
const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_{|}~";

/// Rewrites adorned section titles into ATX headings.
///
/// A title is either overlined and underlined with the same character, or
/// underlined only, with the underline at least as long as the title. Heading
/// levels follow the order in which adornment styles first appear, as in
/// reStructuredText.
///
/// ```
/// use plexmark_core::compat::section_titles;
///
/// let text = "=====\nTitle\n=====\n\nSub\n---";
/// assert_eq!(section_titles(text), "# Title\n\n## Sub");
/// ```
pub fn section_titles(input: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut styles: Vec<(bool, char)> = Vec::new();
    let mut fences = FenceTracker::new();
    let mut changed = false;
    let mut index = 0;

    while index < lines.len() {
        let after_blank = index == 0 || lines[index - 1].trim().is_empty();
        if after_blank
            && !fences.is_inside()
            && let Some((style, title, used)) = match_title(&lines[index..])
        {
            let level = match styles.iter().position(|known| *known == style) {
                Some(position) => position + 1,
                None => {
                    styles.push(style);
                    styles.len()
                }
            };
            out.push(Cow::Owned(format!("{} {}", "#".repeat(level.min(6)), title)));
            changed = true;
            index += used;
            continue;
        }

        fences.advance(lines[index]);
        out.push(Cow::Borrowed(lines[index]));
        index += 1;
    }

    if changed {
        Cow::Owned(out.join("\n"))
    } else {
        Cow::Borrowed(input)
    }
}

fn adornment_char(line: &str) -> Option<char> {
    let first = line.chars().next()?;
    (ADORNMENT_CHARS.contains(first) && line.chars().all(|ch| ch == first)).then_some(first)
}

fn is_list_item(text: &str) -> bool {
    if let Some(rest) = text.strip_prefix(['-', '*', '+']) {
        return rest.is_empty() || rest.starts_with(' ');
    }
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && text[digits..].starts_with(['.', ')'])
}

fn can_be_title(line: &str) -> bool {
    let text = line.trim();
    !text.is_empty()
        && adornment_char(text).is_none()
        && !text.starts_with(['#', '>', '|', ':'])
        && !text.starts_with("..")
        && !is_list_item(text)
}

/// Matches a title at the start of `lines`, returning its style, its text
/// and the number of lines it spans.
fn match_title(lines: &[&str]) -> Option<((bool, char), String, usize)> {
    let first = *lines.first()?;

    if let Some(over) = adornment_char(first)
        && first.chars().count() >= 3
        && let (Some(text), Some(under)) = (lines.get(1), lines.get(2))
        && can_be_title(text)
        && adornment_char(under) == Some(over)
    {
        return Some(((true, over), text.trim().to_string(), 3));
    }

    let under = lines.get(1)?;
    let underline = adornment_char(under)?;
    (indent_of(first) == 0
        && can_be_title(first)
        && under.chars().count() >= first.chars().count().max(2))
    .then(|| ((false, underline), first.to_string(), 2))
}

/// Collapses the `::` marker that introduces an indented literal block.
///
/// A paragraph line ending in `::`, followed by a blank line and an indented
/// block, loses the marker: `Example::` becomes `Example:`, `Example ::`
/// becomes `Example`, and a bare `::` line disappears. The literal block is
/// indented to at least four columns so the engine reads it as code.
///
/// ```
/// use plexmark_core::compat::literal_markers;
///
/// let text = "Example::\n\n  code here";
/// assert_eq!(literal_markers(text), "Example:\n\n    code here");
/// ```
pub fn literal_markers(input: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut fences = FenceTracker::new();
    let mut changed = false;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        if fences.advance(line) {
            out.push(Cow::Borrowed(line));
            index += 1;
            continue;
        }

        let Some((start, end, indent)) = line
            .ends_with("::")
            .then(|| literal_block(&lines, index))
            .flatten()
        else {
            out.push(Cow::Borrowed(line));
            index += 1;
            continue;
        };

        let text = &line[..line.len() - 2];
        if text.trim().is_empty() {
            // A bare marker disappears entirely
        } else if text.ends_with(char::is_whitespace) {
            out.push(Cow::Owned(text.trim_end().to_string()));
        } else {
            out.push(Cow::Owned(format!("{text}:")));
        }
        out.extend(lines[index + 1..start].iter().map(|line| Cow::Borrowed(*line)));

        let pad = " ".repeat(4usize.saturating_sub(indent));
        for block_line in &lines[start..end] {
            if pad.is_empty() || block_line.trim().is_empty() {
                out.push(Cow::Borrowed(*block_line));
            } else {
                out.push(Cow::Owned(format!("{pad}{block_line}")));
            }
        }

        changed = true;
        index = end;
    }

    if changed {
        Cow::Owned(out.join("\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Finds the indented block introduced by the marker line at `marker`.
///
/// Returns the block's first line, one past its last line, and its minimum
/// indentation.
fn literal_block(lines: &[&str], marker: usize) -> Option<(usize, usize, usize)> {
    if indent_of(lines[marker]) != 0 || !lines.get(marker + 1)?.trim().is_empty() {
        return None;
    }

    let start = marker
        + 1
        + lines[marker + 1..]
            .iter()
            .take_while(|line| line.trim().is_empty())
            .count();
    if indent_of(lines.get(start)?) == 0 {
        return None;
    }

    let mut end = start;
    let mut indent = usize::MAX;
    for (offset, line) in lines[start..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_indent = indent_of(line);
        if line_indent == 0 {
            break;
        }
        indent = indent.min(line_indent);
        end = start + offset + 1;
    }

    Some((start, end, indent))
}
