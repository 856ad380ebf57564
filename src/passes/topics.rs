//! Topic resolution over the static cluster and keyword tables.

use itertools::Itertools;

use super::language::Language;
use crate::tables::SeoTables;

/// Upper bound on cross-links per post.
pub const MAX_RELATED: usize = 3;

/// Up to [`MAX_RELATED`] sibling slugs from every cluster containing `slug`,
/// earlier clusters first, deduplicated, never `slug` itself.
pub fn related_slugs<'t>(tables: &'t SeoTables, slug: &str) -> Vec<&'t str> {
    tables
        .clusters
        .iter()
        .filter(|c| c.slugs.iter().any(|s| s == slug))
        .flat_map(|c| c.slugs.iter())
        .map(String::as_str)
        .filter(|s| *s != slug)
        .unique()
        .take(MAX_RELATED)
        .collect()
}

/// FAQ topic for a slug. The topic list is ranked: when a slug carries
/// keywords of several topics, the highest-ranked one is used.
pub fn faq_topic<'t>(tables: &'t SeoTables, slug: &str) -> Option<&'t str> {
    tables
        .faq_topics
        .iter()
        .find(|t| t.keywords.iter().any(|k| slug.contains(k.as_str())))
        .map(|t| t.topic.as_str())
}

/// Anchor phrase candidates for linking to `slug`: the first table rule whose
/// key occurs in the slug, else the slug rendered as a title.
pub fn anchor_phrases(tables: &SeoTables, slug: &str, lang: Language) -> Vec<String> {
    tables
        .anchor_rules(lang)
        .iter()
        .find(|rule| slug.contains(rule.key.as_str()))
        .map(|rule| rule.phrases.clone())
        .unwrap_or_else(|| vec![slug_to_title(slug)])
}

/// "smart-supply-chain" -> "Smart Supply Chain".
pub fn slug_to_title(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}
