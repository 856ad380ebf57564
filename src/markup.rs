//! Pattern-based structural HTML access.
//!
//! Post bodies are template-produced fragments with a narrow shape, so the
//! passes never build a DOM. Every structural question they ask goes through
//! the [`Markup`] trait; [`RegexMarkup`] answers it with regular expressions.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Classes of the `<section>` blocks the engine itself generates.
pub const GENERATED_SECTION_CLASSES: &[&str] = &["related-reading", "faq-section", "conclusion"];

static ARTICLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<article\b[^>]*>").unwrap());
static ARTICLE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</article\s*>").unwrap());
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<header\b[^>]*>.*?</header\s*>").unwrap());
static HEADING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    (1..=6)
        .map(|n| Regex::new(&format!(r"(?is)<h{n}\b([^>]*)>(.*?)</h{n}\s*>")).unwrap())
        .collect()
});
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap());
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<section\b([^>]*)>(.*?)</section\s*>").unwrap());
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)\bclass\s*=\s*["']([^"']*)["']"#).unwrap());
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#).unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static LINK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<a\b").unwrap());
static LINK_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^</a\s*>").unwrap());

/// One heading element located in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    /// Byte span of the whole element, tags included.
    pub span: Range<usize>,
    /// Raw attribute text of the opening tag, leading whitespace included.
    pub attrs: String,
    pub inner: String,
}

/// One `<section>` block located in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub span: Range<usize>,
    pub class: Option<String>,
    pub inner: String,
}

impl SectionBlock {
    pub fn is_generated(&self) -> bool {
        self.class.as_deref().is_some_and(|class| {
            class
                .split_whitespace()
                .any(|c| GENERATED_SECTION_CLASSES.contains(&c))
        })
    }
}

pub trait Markup {
    /// Offset just past the opening content container tag.
    fn content_start(&self, html: &str) -> Option<usize>;

    /// Offset of the last closing content container tag.
    fn content_end(&self, html: &str) -> Option<usize>;

    /// Offset just past a header block that opens inside the content container.
    fn header_end(&self, html: &str) -> Option<usize>;

    /// Headings of one level, in document order.
    fn headings(&self, html: &str, level: u8) -> Vec<Heading>;

    /// Every `<section>` block, in document order.
    fn sections(&self, html: &str) -> Vec<SectionBlock>;

    /// All `href` values of anchors, in document order.
    fn link_targets(&self, html: &str) -> Vec<String>;

    /// First case-insensitive occurrence of `phrase` in paragraph text that is
    /// outside any link and outside generated sections.
    fn find_in_prose(&self, html: &str, phrase: &str) -> Option<Range<usize>>;

    /// Body with all tags replaced by whitespace.
    fn text_content(&self, html: &str) -> String;

    /// True if any marker occurs verbatim anywhere in the body.
    fn contains_marker(&self, html: &str, markers: &[&str]) -> bool {
        markers.iter().any(|m| html.contains(m))
    }

    /// True if any anchor points at a URL whose path ends in `path`.
    fn links_to(&self, html: &str, path: &str) -> bool {
        self.link_targets(html).iter().any(|href| {
            let bare = href
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .trim_end_matches('/');
            bare.ends_with(path)
        })
    }

    fn word_count(&self, html: &str) -> usize {
        self.text_content(html).split_whitespace().count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RegexMarkup;

impl Markup for RegexMarkup {
    fn content_start(&self, html: &str) -> Option<usize> {
        ARTICLE_OPEN_RE.find(html).map(|m| m.end())
    }

    fn content_end(&self, html: &str) -> Option<usize> {
        ARTICLE_CLOSE_RE.find_iter(html).last().map(|m| m.start())
    }

    fn header_end(&self, html: &str) -> Option<usize> {
        let start = self.content_start(html)?;
        HEADER_RE
            .find_at(html, start)
            .filter(|m| self.content_end(html).map_or(true, |end| m.end() <= end))
            .map(|m| m.end())
    }

    fn headings(&self, html: &str, level: u8) -> Vec<Heading> {
        let Some(re) = (level as usize).checked_sub(1).and_then(|i| HEADING_RES.get(i)) else {
            return Vec::new();
        };
        re.captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Heading {
                    level,
                    span: whole.range(),
                    attrs: caps[1].to_string(),
                    inner: caps[2].to_string(),
                })
            })
            .collect()
    }

    fn sections(&self, html: &str) -> Vec<SectionBlock> {
        SECTION_RE
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(SectionBlock {
                    span: whole.range(),
                    class: CLASS_RE.captures(&caps[1]).map(|c| c[1].to_string()),
                    inner: caps[2].to_string(),
                })
            })
            .collect()
    }

    fn link_targets(&self, html: &str) -> Vec<String> {
        HREF_RE
            .captures_iter(html)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    fn find_in_prose(&self, html: &str, phrase: &str) -> Option<Range<usize>> {
        let needle = phrase_regex(phrase)?;
        let excluded: Vec<Range<usize>> = self
            .sections(html)
            .into_iter()
            .filter(SectionBlock::is_generated)
            .map(|s| s.span)
            .collect();

        for caps in PARAGRAPH_RE.captures_iter(html) {
            let Some(inner) = caps.get(1) else { continue };
            if excluded.iter().any(|r| r.contains(&inner.start())) {
                continue;
            }
            if let Some(hit) = find_outside_links(inner.as_str(), &needle) {
                return Some(inner.start() + hit.start..inner.start() + hit.end);
            }
        }
        None
    }

    fn text_content(&self, html: &str) -> String {
        TAG_RE.replace_all(html, " ").into_owned()
    }
}

/// Case-insensitive matcher for an anchor phrase, bounded at word edges so
/// "edge AI" does not fire inside "knowledge aid".
fn phrase_regex(phrase: &str) -> Option<Regex> {
    let trimmed = phrase.trim();
    if trimmed.is_empty() {
        return None;
    }
    let bound = |c: Option<char>| if c.is_some_and(char::is_alphanumeric) { r"\b" } else { "" };
    let pattern = format!(
        "(?i){}{}{}",
        bound(trimmed.chars().next()),
        regex::escape(trimmed),
        bound(trimmed.chars().last()),
    );
    Regex::new(&pattern).ok()
}

/// Search the text runs of a paragraph's inner HTML, skipping anything inside `<a>`.
fn find_outside_links(inner: &str, needle: &Regex) -> Option<Range<usize>> {
    let mut depth = 0usize;
    let mut cursor = 0;
    let search = |from: usize, to: usize| needle.find(&inner[from..to]).map(|m| from + m.start()..from + m.end());

    for tag in TAG_RE.find_iter(inner) {
        if depth == 0 && tag.start() > cursor {
            if let Some(hit) = search(cursor, tag.start()) {
                return Some(hit);
            }
        }
        if LINK_OPEN_RE.is_match(tag.as_str()) {
            depth += 1;
        } else if LINK_CLOSE_RE.is_match(tag.as_str()) {
            depth = depth.saturating_sub(1);
        }
        cursor = tag.end();
    }
    if depth == 0 && cursor < inner.len() {
        return search(cursor, inner.len());
    }
    None
}

/// Insert `fragment` at byte offset `at`.
pub fn insert_at(html: &str, at: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..at]);
    out.push_str(fragment);
    out.push_str(&html[at..]);
    out
}

/// Insert `fragment` before the end of the content container, or append it
/// to the body when there is no container.
pub fn append_to_content(markup: &dyn Markup, html: &str, fragment: &str) -> String {
    match markup.content_end(html) {
        Some(at) => insert_at(html, at, &format!("{fragment}\n")),
        None => format!("{html}{fragment}\n"),
    }
}

/// Rewrite one heading element at a new level, keeping attributes and content.
pub fn retag_heading(html: &str, heading: &Heading, level: u8) -> String {
    let replacement = format!("<h{level}{}>{}</h{level}>", heading.attrs, heading.inner);
    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..heading.span.start]);
    out.push_str(&replacement);
    out.push_str(&html[heading.span.end..]);
    out
}

/// Escape text for use inside an element.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
