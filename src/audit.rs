//! Structural SEO analysis of a post body and a simple 0-100 score.

use crate::markup::Markup;
use crate::passes::depth::has_conclusion;
use crate::passes::faq::FAQ_MARKERS;

const RELATED_MARKERS: &[&str] = &["Related Reading", "قراءة ذات صلة"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoAnalysis {
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub has_faq: bool,
    /// Links to other posts on the site.
    pub internal_links: usize,
    pub has_conclusion: bool,
    pub has_related: bool,
    pub word_count: usize,
    pub section_count: usize,
}

pub fn analyze(markup: &dyn Markup, body: &str, base_url: &str) -> SeoAnalysis {
    let post_prefix = format!("{}/post/", base_url.trim_end_matches('/'));
    let sections = markup.sections(body);
    SeoAnalysis {
        h1_count: markup.headings(body, 1).len(),
        h2_count: markup.headings(body, 2).len(),
        h3_count: markup.headings(body, 3).len(),
        has_faq: markup.contains_marker(body, FAQ_MARKERS),
        internal_links: markup
            .link_targets(body)
            .iter()
            .filter(|href| href.starts_with(&post_prefix))
            .count(),
        has_conclusion: has_conclusion(markup, body),
        has_related: sections
            .iter()
            .any(|s| s.class.as_deref() == Some("related-reading"))
            || markup.contains_marker(body, RELATED_MARKERS),
        word_count: markup.word_count(body),
        section_count: sections.len(),
    }
}

impl SeoAnalysis {
    pub fn score(&self) -> u8 {
        let mut score: u32 = match self.h1_count {
            0 => 0,
            1 => 20,
            _ => 10,
        };
        if self.h2_count >= 3 {
            score += 10;
        }
        if self.h3_count >= 2 {
            score += 5;
        }
        score += match self.internal_links {
            0 => 0,
            1 | 2 => 10,
            _ => 20,
        };
        if self.has_faq {
            score += 15;
        }
        if self.has_conclusion {
            score += 10;
        }
        if self.has_related {
            score += 10;
        }
        score += match self.word_count {
            n if n >= 1500 => 10,
            n if n >= 1000 => 5,
            _ => 0,
        };
        score.min(100) as u8
    }
}
