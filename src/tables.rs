//! Static SEO tables: topic clusters, anchor phrases, FAQ templates and
//! localized boilerplate. Loaded once per run and only ever read afterwards.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::TablesError;
use crate::passes::language::Language;

const BUILTIN_TABLES: &str = include_str!("../seo_tables.json");

#[derive(Debug, Clone, Deserialize)]
pub struct TopicCluster {
    pub topic: String,
    pub slugs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorRule {
    /// Slug fragment that selects this rule.
    pub key: String,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqTopic {
    pub topic: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqTemplate {
    pub topic: String,
    pub language: Language,
    pub items: Vec<FaqItem>,
}

/// Fixed copy the passes render, one set per language.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedCopy {
    pub faq_heading: String,
    pub related_heading: String,
    pub related_intro: String,
    pub conclusion_heading: String,
    pub conclusion_paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeoTables {
    pub target_slugs: Vec<String>,
    pub clusters: Vec<TopicCluster>,
    #[serde(default)]
    pub anchors: HashMap<Language, Vec<AnchorRule>>,
    /// Ranked: the first topic whose keyword appears in a slug wins.
    pub faq_topics: Vec<FaqTopic>,
    pub faq_templates: Vec<FaqTemplate>,
    pub copy: HashMap<Language, LocalizedCopy>,
}

impl SeoTables {
    pub fn builtin() -> Result<Self, TablesError> {
        Self::from_json(BUILTIN_TABLES)
    }

    pub fn from_path(path: &Path) -> Result<Self, TablesError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TablesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, TablesError> {
        let tables: SeoTables = serde_json::from_str(raw)?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), TablesError> {
        for cluster in &self.clusters {
            let mut seen = HashSet::new();
            for slug in &cluster.slugs {
                if !seen.insert(slug.as_str()) {
                    return Err(TablesError::DuplicateSlug {
                        topic: cluster.topic.clone(),
                        slug: slug.clone(),
                    });
                }
            }
        }
        for lang in Language::ALL {
            if !self.copy.contains_key(&lang) {
                return Err(TablesError::MissingCopy(lang));
            }
        }
        for template in &self.faq_templates {
            if !self.faq_topics.iter().any(|t| t.topic == template.topic) {
                return Err(TablesError::UnrankedTopic(template.topic.clone()));
            }
        }
        Ok(())
    }

    pub fn copy(&self, lang: Language) -> &LocalizedCopy {
        // validate() guarantees both languages are present
        &self.copy[&lang]
    }

    pub fn anchor_rules(&self, lang: Language) -> &[AnchorRule] {
        self.anchors.get(&lang).map(Vec::as_slice).unwrap_or_default()
    }

    /// Template for a topic in `lang`, else in the other language.
    pub fn faq_template(&self, topic: &str, lang: Language) -> Option<&FaqTemplate> {
        let find = |l: Language| {
            self.faq_templates
                .iter()
                .find(|t| t.topic == topic && t.language == l && !t.items.is_empty())
        };
        find(lang).or_else(|| find(lang.other()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_load() {
        let tables = SeoTables::builtin().unwrap();
        assert_eq!(tables.target_slugs.len(), 19);
        assert_eq!(tables.clusters[0].topic, "predictive-maintenance");
        assert!(!tables.anchor_rules(Language::Arabic).is_empty());
        assert_eq!(tables.copy(Language::English).faq_heading, "Frequently Asked Questions");
    }

    #[test]
    fn faq_template_falls_back_to_other_language() {
        let tables = SeoTables::builtin().unwrap();
        let ar = tables.faq_template("predictive-maintenance", Language::Arabic).unwrap();
        assert_eq!(ar.language, Language::Arabic);
        let oee = tables.faq_template("oee", Language::Arabic).unwrap();
        assert_eq!(oee.language, Language::English);
        assert!(tables.faq_template("supply-chain", Language::English).is_none());
    }

    #[test]
    fn duplicate_slug_in_cluster_is_rejected() {
        let raw = r#"{
            "target_slugs": [],
            "clusters": [{"topic": "t", "slugs": ["a", "b", "a"]}],
            "faq_topics": [],
            "faq_templates": [],
            "copy": {}
        }"#;
        let err = SeoTables::from_json(raw).unwrap_err();
        assert!(matches!(err, TablesError::DuplicateSlug { ref slug, .. } if slug == "a"));
    }

    #[test]
    fn missing_copy_is_rejected() {
        let raw = r#"{
            "target_slugs": [],
            "clusters": [],
            "faq_topics": [],
            "faq_templates": [],
            "copy": {"en": {
                "faq_heading": "FAQ", "related_heading": "R", "related_intro": "I",
                "conclusion_heading": "Conclusion", "conclusion_paragraphs": []
            }}
        }"#;
        let err = SeoTables::from_json(raw).unwrap_err();
        assert!(matches!(err, TablesError::MissingCopy(Language::Arabic)));
    }

    #[test]
    fn unknown_language_key_fails_to_parse() {
        let raw = r#"{"target_slugs": [], "clusters": [], "faq_topics": [],
            "faq_templates": [], "copy": {"fr": {}}}"#;
        assert!(matches!(SeoTables::from_json(raw), Err(TablesError::Parse(_))));
    }
}
