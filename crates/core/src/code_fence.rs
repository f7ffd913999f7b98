//! Fenced code tracking for line-based scanners.
//!
//! Header extraction, block extraction and the text transforms all work on
//! raw lines before the markdown engine runs. None of them may touch lines
//! inside a fenced code block, so they share this tracker.

/// Current fence state (marker, indent, and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Fence marker character (``` or ~~~).
    pub marker: char,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
    /// Index of the opening line (0-indexed).
    pub line: usize,
}

/// Line-by-line fence tracker.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<OpenFence>,
    line: usize,
}

impl FenceTracker {
    /// Creates a tracker positioned before the first line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line and returns whether it belongs to a fence
    /// (opener, content or closer).
    pub fn advance(&mut self, line: &str) -> bool {
        let index = self.line;
        self.line += 1;

        let (visual_indent, byte_offset) = leading_whitespace_info(line);
        let after_indent = &line[byte_offset..];

        match self.open {
            None => {
                // 4+ columns of indentation is an indented code block, not a fence
                if visual_indent > 3 {
                    return false;
                }
                match detect_fence_marker(after_indent) {
                    Some((marker, length)) => {
                        self.open = Some(OpenFence {
                            marker,
                            length,
                            line: index,
                        });
                        true
                    }
                    None => false,
                }
            }
            Some(open) => {
                if visual_indent <= 3
                    && is_closing_fence(after_indent)
                    && let Some((marker, length)) = detect_fence_marker(after_indent)
                    && marker == open.marker
                    && length >= open.length
                {
                    self.open = None;
                }
                true
            }
        }
    }

    /// Whether the last line fed left a fence open.
    pub fn is_inside(&self) -> bool {
        self.open.is_some()
    }

    /// The fence still open after the last line, if any.
    pub fn unclosed(&self) -> Option<OpenFence> {
        self.open
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4);
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn detect_fence_marker(after_indent: &str) -> Option<(char, usize)> {
    let mut chars = after_indent.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = 1 + chars.take_while(|c| *c == first).count();
    (run_len >= 3).then_some((first, run_len))
}

/// A closing fence has only fence markers followed by optional whitespace.
fn is_closing_fence(after_indent: &str) -> bool {
    let Some(first) = after_indent.chars().next() else {
        return false;
    };
    let rest = after_indent.trim_start_matches(first);
    after_indent.len() - rest.len() >= 3 && rest.trim().is_empty()
}
