use std::collections::HashMap;

/// Turns heading text into an identifier.
///
/// Lower-cases the text, turns every run of ASCII characters other than
/// letters and digits into a single hyphen, keeps non-ASCII letters and
/// digits, and strips leading digits and hyphens as well as trailing hyphens.
///
/// ```
/// use plexmark_core::slug::make_id;
///
/// assert_eq!(make_id("Yet Another Title"), "yet-another-title");
/// assert_eq!(make_id("2. Installing (quickly)"), "installing-quickly");
/// ```
pub fn make_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || (!ch.is_ascii() && ch.is_alphanumeric()) {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.extend(ch.to_lowercase());
        } else if ch.is_ascii() {
            pending_hyphen = true;
        }
    }

    let start = id
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit() && *ch != '-')
        .map_or(id.len(), |(index, _)| index);
    id[start..].trim_end_matches('-').to_string()
}

/// Hands out identifiers unique within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next identifier for the given heading text.
    ///
    /// Text without usable characters falls back to `section`; repeats get
    /// `-1`, `-2`, ... appended.
    pub fn next_slug(&mut self, text: &str) -> String {
        let mut slug = make_id(text);
        if slug.is_empty() {
            slug.push_str("section");
        }

        loop {
            let count = self.counts.entry(slug.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return slug;
            }
            let candidate = format!("{}-{}", slug, *count - 1);
            if !self.counts.contains_key(&candidate) {
                self.counts.insert(candidate.clone(), 1);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(make_id("Hello,   World!"), "hello-world");
        assert_eq!(make_id("import.meta.glob"), "import-meta-glob");
        assert_eq!(make_id("TypeScript & JSX"), "typescript-jsx");
    }

    #[test]
    fn strips_leading_digits_and_hyphens() {
        assert_eq!(make_id("1.2.3 Release"), "release");
        assert_eq!(make_id("--draft--"), "draft");
        assert_eq!(make_id("42"), "");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(make_id("Héllo Wörld"), "héllo-wörld");
        assert_eq!(make_id("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(make_id("🚀 Getting Started"), "getting-started");
    }

    #[test]
    fn deduplication() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Title"), "title");
        assert_eq!(slugger.next_slug("Title"), "title-1");
        assert_eq!(slugger.next_slug("Title"), "title-2");
    }

    #[test]
    fn generated_suffix_does_not_shadow_real_heading() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Title 1"), "title-1");
        assert_eq!(slugger.next_slug("Title"), "title");
        assert_eq!(slugger.next_slug("Title"), "title-2");
    }

    #[test]
    fn empty_text_falls_back() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("!!!"), "section");
        assert_eq!(slugger.next_slug(""), "section-1");
    }
}
