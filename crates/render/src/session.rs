//! Per-call render state.

use std::collections::{HashMap, HashSet};

use plexmark_core::{ParseDiagnostics, ParseWarning, Slugger};

use crate::options::OutputFormat;

/// A heading seen in the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading level (1-6).
    pub depth: u8,
    /// Identifier assigned to the heading.
    pub slug: String,
    /// Plain text of the heading.
    pub text: String,
}

/// A table of contents waiting for the whole document to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContents {
    /// Identifier of the contents topic.
    pub id: String,
    /// Title shown above the listing.
    pub title: String,
    /// Deepest heading level listed, relative to the shallowest heading.
    pub depth: Option<usize>,
}

/// State shared by everything that runs during one top-level render call.
///
/// A fresh session is created for every call and handed to directive
/// handlers explicitly, so separate calls never see each other's tag ids,
/// plan or caches.
#[derive(Debug)]
pub struct RenderSession {
    format: OutputFormat,
    seen_tag_ids: HashSet<String>,
    tag_counter: usize,
    current_plan_id: Option<String>,
    /// Rendered markers keyed by (current plan, raw token).
    tag_cache: HashMap<(Option<String>, String), String>,
    next_block: usize,
    slugger: Slugger,
    headings: Vec<HeadingEntry>,
    contents: Vec<PendingContents>,
    diagnostics: ParseDiagnostics,
}

impl RenderSession {
    /// Creates an empty session for a render call producing `format`.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            seen_tag_ids: HashSet::new(),
            tag_counter: 0,
            current_plan_id: None,
            tag_cache: HashMap::new(),
            next_block: 0,
            slugger: Slugger::new(),
            headings: Vec::new(),
            contents: Vec::new(),
            diagnostics: ParseDiagnostics::new(),
        }
    }

    /// Output format of the current call.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Plan id set by the most recent `plan` directive.
    pub fn current_plan(&self) -> Option<&str> {
        self.current_plan_id.as_deref()
    }

    /// Sets the plan id that namespaces subsequent tag ids.
    pub fn set_plan(&mut self, plan: impl Into<String>) {
        self.current_plan_id = Some(plan.into());
    }

    /// Claims the anchor id for a tag block.
    ///
    /// Without an explicit id the session counter provides `temp-N`. The id
    /// is prefixed with the current plan (or `list`). Returns the id that is
    /// already taken as the error.
    pub fn claim_tag_id(&mut self, explicit: Option<&str>) -> Result<String, String> {
        let local = match explicit {
            Some(id) => id.to_string(),
            None => {
                self.tag_counter += 1;
                format!("temp-{}", self.tag_counter)
            }
        };
        let id = format!("{}-{}", self.current_plan().unwrap_or("list"), local);
        if !self.seen_tag_ids.insert(id.clone()) {
            return Err(id);
        }
        Ok(id)
    }

    /// Returns the cached marker for a raw tag token, rendering it on a miss.
    ///
    /// Markers depend on the current plan (`dep:` classes), so the plan is
    /// part of the key.
    pub fn tag_marker(&mut self, token: &str, render: impl FnOnce(&Self) -> String) -> String {
        let key = (self.current_plan_id.clone(), token.to_string());
        if let Some(marker) = self.tag_cache.get(&key) {
            return marker.clone();
        }
        let marker = render(self);
        self.tag_cache.insert(key, marker.clone());
        marker
    }

    /// Number of markers in the tag cache.
    pub fn cached_tags(&self) -> usize {
        self.tag_cache.len()
    }

    /// Index the next extracted block's placeholder will get.
    pub(crate) fn next_block_index(&self) -> usize {
        self.next_block
    }

    /// Marks `count` placeholder indexes as used.
    pub(crate) fn consume_blocks(&mut self, count: usize) {
        self.next_block += count;
    }

    /// Generates a unique identifier for heading or topic text.
    pub fn next_slug(&mut self, text: &str) -> String {
        self.slugger.next_slug(text)
    }

    /// Records a body heading for tables of contents.
    pub(crate) fn add_heading(&mut self, entry: HeadingEntry) {
        self.headings.push(entry);
    }

    /// Body headings seen so far, in document order.
    pub fn headings(&self) -> &[HeadingEntry] {
        &self.headings
    }

    /// Queues a table of contents and returns its index.
    pub(crate) fn defer_contents(&mut self, contents: PendingContents) -> usize {
        self.contents.push(contents);
        self.contents.len() - 1
    }

    /// Tables of contents queued during the call.
    pub(crate) fn pending_contents(&self) -> &[PendingContents] {
        &self.contents
    }

    /// Records a non-fatal problem.
    pub fn warn(&mut self, warning: ParseWarning) {
        self.diagnostics.add_warning(warning);
    }

    /// Merges diagnostics collected elsewhere.
    pub(crate) fn extend_diagnostics(&mut self, diagnostics: ParseDiagnostics) {
        self.diagnostics.extend(diagnostics);
    }

    /// Takes the diagnostics collected so far.
    pub(crate) fn take_diagnostics(&mut self) -> ParseDiagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_count_and_namespace() {
        let mut session = RenderSession::new(OutputFormat::Html);
        assert_eq!(session.claim_tag_id(None).unwrap(), "list-temp-1");
        assert_eq!(session.claim_tag_id(Some("main")).unwrap(), "list-main");
        session.set_plan("alpha");
        assert_eq!(session.claim_tag_id(None).unwrap(), "alpha-temp-2");
        assert_eq!(session.claim_tag_id(Some("main")).unwrap(), "alpha-main");
    }

    #[test]
    fn duplicate_tag_id_is_rejected() {
        let mut session = RenderSession::new(OutputFormat::Html);
        session.claim_tag_id(Some("x")).unwrap();
        assert_eq!(session.claim_tag_id(Some("x")).unwrap_err(), "list-x");
    }

    #[test]
    fn tag_cache_renders_once() {
        let mut session = RenderSession::new(OutputFormat::Html);
        let mut calls = 0;
        let first = session.tag_marker("foo", |_| {
            calls += 1;
            "<span>FOO</span>".to_string()
        });
        let second = session.tag_marker("foo", |_| {
            calls += 1;
            String::new()
        });
        assert_eq!(first, second);
        assert_eq!(calls, 1);
        assert_eq!(session.cached_tags(), 1);
    }

    #[test]
    fn block_indexes_advance() {
        let mut session = RenderSession::new(OutputFormat::Tex);
        assert_eq!(session.next_block_index(), 0);
        session.consume_blocks(3);
        assert_eq!(session.next_block_index(), 3);
    }

    #[test]
    fn tag_cache_is_keyed_by_plan() {
        let mut session = RenderSession::new(OutputFormat::Html);
        session.set_plan("alpha");
        let alpha = session.tag_marker("dep:build", |s| format!("{:?}", s.current_plan()));
        session.set_plan("beta");
        let beta = session.tag_marker("dep:build", |s| format!("{:?}", s.current_plan()));
        assert_eq!(alpha, "Some(\"alpha\")");
        assert_eq!(beta, "Some(\"beta\")");
        assert_eq!(session.cached_tags(), 2);
    }
}
