//! Sequencing of the content passes over the target posts.

use tracing::{info, warn};

use crate::audit;
use crate::db::{Post, PostStore};
use crate::markup::Markup;
use crate::passes::language::{self, Language};
use crate::passes::{depth, faq, headings, links, ChangeRecord, PassContext, PassOutput};
use crate::tables::SeoTables;

type PassFn = fn(&PassContext<'_>, &str) -> PassOutput;

/// Fixed pass order. Depth runs last so that the generated FAQ and related
/// blocks already exist when it looks for thin sections and a conclusion.
const PASSES: [(&str, PassFn); 4] = [
    ("headings", headings::run),
    ("links", links::run),
    ("faq", faq::run),
    ("depth", depth::run),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub slug: String,
    pub status: Status,
    pub language: Option<Language>,
    pub changes: Vec<ChangeRecord>,
    pub advisories: Vec<String>,
    pub dry_run: bool,
    /// SEO score before and after the passes.
    pub score: Option<(u8, u8)>,
}

impl PipelineResult {
    fn error(slug: &str, message: impl Into<String>, dry_run: bool) -> Self {
        PipelineResult {
            slug: slug.to_string(),
            status: Status::Error(message.into()),
            language: None,
            changes: Vec::new(),
            advisories: Vec::new(),
            dry_run,
            score: None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error(_))
    }

    pub fn is_updated(&self) -> bool {
        !self.is_error() && !self.changes.is_empty()
    }

    pub fn is_unchanged(&self) -> bool {
        !self.is_error() && self.changes.is_empty()
    }
}

/// In-memory outcome of running every pass over one post.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub body: String,
    /// Set only when the title itself changed.
    pub title: Option<String>,
    pub language: Language,
    pub changes: Vec<ChangeRecord>,
    pub advisories: Vec<String>,
}

pub struct Pipeline<'a> {
    store: &'a dyn PostStore,
    tables: &'a SeoTables,
    markup: &'a dyn Markup,
    base_url: &'a str,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a dyn PostStore,
        tables: &'a SeoTables,
        markup: &'a dyn Markup,
        base_url: &'a str,
        dry_run: bool,
    ) -> Self {
        Pipeline {
            store,
            tables,
            markup,
            base_url,
            dry_run,
        }
    }

    pub fn transform(&self, post: &Post) -> Transformed {
        let language = language::detect(&post.content);
        let mut changes = Vec::new();
        let mut advisories = Vec::new();

        let new_title = headings::fill_missing_title(&post.slug, &post.title).map(|(title, change)| {
            changes.push(change);
            title
        });
        let ctx = PassContext {
            slug: &post.slug,
            title: new_title.as_deref().unwrap_or(&post.title),
            language,
            base_url: self.base_url,
            tables: self.tables,
            markup: self.markup,
        };

        let mut body = post.content.clone();
        for (name, pass) in PASSES {
            let out = pass(&ctx, &body);
            if !out.changes.is_empty() {
                info!(slug = %post.slug, pass = name, changes = out.changes.len(), "pass changed post");
            }
            body = out.body;
            changes.extend(out.changes);
            advisories.extend(out.advisories);
        }

        Transformed {
            body,
            title: new_title,
            language,
            changes,
            advisories,
        }
    }

    pub fn process_post(&self, slug: &str) -> PipelineResult {
        let post = match self.store.get(slug) {
            Ok(Some(post)) => post,
            Ok(None) => {
                warn!(slug, "post not found");
                return PipelineResult::error(slug, "Post not found in database", self.dry_run);
            }
            Err(e) => {
                warn!(slug, error = %e, "failed to read post");
                return PipelineResult::error(slug, format!("Failed to read post: {e}"), self.dry_run);
            }
        };

        let before = audit::analyze(self.markup, &post.content, self.base_url).score();
        let t = self.transform(&post);
        let after = audit::analyze(self.markup, &t.body, self.base_url).score();

        let mut result = PipelineResult {
            slug: slug.to_string(),
            status: Status::Success,
            language: Some(t.language),
            changes: t.changes,
            advisories: t.advisories,
            dry_run: self.dry_run,
            score: Some((before, after)),
        };

        if result.changes.is_empty() {
            info!(slug, "no changes needed");
        } else if self.dry_run {
            info!(slug, changes = result.changes.len(), "dry run, not writing");
        } else {
            match self.store.update(slug, &t.body, t.title.as_deref()) {
                Ok(()) => info!(slug, changes = result.changes.len(), "post updated"),
                Err(e) => {
                    warn!(slug, error = %e, "failed to update post");
                    result.status = Status::Error(format!("Failed to update database: {e}"));
                }
            }
        }
        result
    }

    /// Process every slug in order. One post's failure never stops the batch.
    pub fn process_all(
        &self,
        slugs: &[String],
        mut on_result: impl FnMut(&PipelineResult),
    ) -> Vec<PipelineResult> {
        slugs
            .iter()
            .map(|slug| {
                let result = self.process_post(slug);
                on_result(&result);
                result
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::testing::MemoryStore;
    use super::*;
    use crate::markup::RegexMarkup;
    use crate::passes::testing::{fixture, TABLES};

    const BASE: &str = "https://www.iiot-bay.com";
    const ESP32: &str = "esp32-vs-raspberry-pi-saudi-iot-guide";

    fn post(slug: &str, title: &str, content: &str) -> Post {
        Post {
            id: 1,
            slug: slug.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            author: None,
            created_at: None,
        }
    }

    fn pipeline<'a>(store: &'a MemoryStore, dry_run: bool) -> Pipeline<'a> {
        Pipeline::new(store, &TABLES, &RegexMarkup, BASE, dry_run)
    }

    #[test]
    fn full_pipeline_is_idempotent() {
        let store = MemoryStore::default();
        let p = pipeline(&store, false);
        let cases = [
            (ESP32, "thin_english"),
            ("predictive-maintenance-industrial-iot-ksa", "multi_h1"),
            ("مراقبة-الحالة-والتنبيهات-انترنت-الاشياء-الصناعية", "arabic_post"),
            ("smart-supply-chain-saudi-arabia", "thin_english"),
            ("edge-computing-riyadh-iiot-smart-city", "multi_h1"),
        ];
        for (slug, name) in cases {
            let first = p.transform(&post(slug, "A Title", &fixture(name)));
            assert!(!first.changes.is_empty(), "{slug}: first run changed nothing");
            let second = p.transform(&post(slug, "A Title", &first.body));
            assert_eq!(second.changes, Vec::<ChangeRecord>::new(), "{slug}/{name}");
            assert_eq!(second.body, first.body, "{slug}/{name}");
        }
    }

    #[test]
    fn generated_faq_answers_are_never_linked() {
        // the iot-hardware FAQ mentions "edge computing"; a rerun must not link it
        let store = MemoryStore::default();
        let p = pipeline(&store, false);
        let first = p.transform(&post(ESP32, "T", "<article><p>text about ESP32 and Raspberry Pi</p></article>"));
        assert!(first.body.contains("Raspberry Pi suits edge computing"));
        let second = p.transform(&post(ESP32, "T", &first.body));
        assert!(second.changes.is_empty());
        assert!(!second.body.contains("/post/edge-computing-industrial-iot-saudi-arabia"));
    }

    #[test]
    fn spec_example_links_once_without_fallback() {
        let store = MemoryStore::default();
        let p = pipeline(&store, false);
        let t = p.transform(&post(ESP32, "ESP32 vs Raspberry Pi", "<article><p>text about ESP32 and Raspberry Pi</p></article>"));
        let descriptions: Vec<_> = t.changes.iter().map(|c| c.0.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Added H1 heading with post title",
                "Added internal link to iot-iiot-opencv-raspberry-pi-saudi-education-guide",
                "Added FAQ section with 2 questions",
                "Added conclusion section",
            ]
        );
        assert!(!t.body.contains("related-reading"));
    }

    #[test]
    fn depth_runs_after_injected_sections() {
        let store = MemoryStore::default();
        let p = pipeline(&store, false);
        let t = p.transform(&post(
            "industrial-iot-cybersecurity-saudi-arabia",
            "T",
            "<article><p>no sections here</p></article>",
        ));
        assert!(t.advisories.iter().all(|a| !a.starts_with("Section")), "{:?}", t.advisories);
        let faq_at = t.body.find("faq-section").unwrap();
        let conclusion_at = t.body.find("class=\"conclusion\"").unwrap();
        assert!(faq_at < conclusion_at);
    }

    #[test]
    fn missing_slug_does_not_stop_the_batch() {
        let store = MemoryStore::with_posts(&[
            ("oee-optimization-industrial-iot-saudi-arabia", "OEE", "<article><p>OEE</p></article>"),
            ("smart-supply-chain-saudi-arabia", "Supply", "<article><p>x</p></article>"),
        ]);
        let p = pipeline(&store, false);
        let slugs: Vec<String> = [
            "oee-optimization-industrial-iot-saudi-arabia",
            "does-not-exist",
            "smart-supply-chain-saudi-arabia",
        ]
        .map(String::from)
        .to_vec();
        let mut seen = 0;
        let results = p.process_all(&slugs, |_| seen += 1);
        assert_eq!(seen, 3);
        assert_eq!(results.iter().filter(|r| r.is_error()).count(), 1);
        assert_eq!(results[1].status, Status::Error("Post not found in database".into()));
        assert!(results[0].is_updated() && results[2].is_updated());
        assert_eq!(store.writes.borrow().len(), 2);
    }

    #[test]
    fn write_failure_keeps_changes_and_continues() {
        let mut store = MemoryStore::with_posts(&[
            ("a-post", "A", "<article><p>x</p></article>"),
            ("b-post", "B", "<article><p>y</p></article>"),
        ]);
        store.reject.insert("a-post".to_string());
        let p = pipeline(&store, false);
        let results = p.process_all(&["a-post".to_string(), "b-post".to_string()], |_| {});
        assert!(results[0].is_error());
        assert!(!results[0].changes.is_empty());
        assert!(matches!(&results[0].status, Status::Error(m) if m.contains("disk full")));
        assert!(results[1].is_updated());
        assert_eq!(*store.writes.borrow(), vec!["b-post".to_string()]);
    }

    #[test]
    fn dry_run_reports_but_never_writes() {
        let body = "<article><p>x</p></article>";
        let store = MemoryStore::with_posts(&[("a-post", "A", body)]);
        let p = pipeline(&store, true);
        let result = p.process_post("a-post");
        assert!(result.dry_run);
        assert!(result.is_updated());
        assert!(store.writes.borrow().is_empty());
        assert_eq!(store.content("a-post"), body);
    }

    #[test]
    fn second_live_run_reports_unchanged() {
        let store = MemoryStore::with_posts(&[(ESP32, "ESP32", "<article><p>ESP32 vs Raspberry Pi</p></article>")]);
        let p = pipeline(&store, false);
        assert!(p.process_post(ESP32).is_updated());
        let again = p.process_post(ESP32);
        assert!(again.is_unchanged());
        assert_eq!(store.writes.borrow().len(), 1);
        let (before, after) = again.score.unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn blank_title_is_written_back() {
        let store = MemoryStore::with_posts(&[("smart-supply-chain-saudi-arabia", "", "<article><p>x</p></article>")]);
        let p = pipeline(&store, false);
        p.process_post("smart-supply-chain-saudi-arabia");
        let saved = store.posts.borrow()["smart-supply-chain-saudi-arabia"].clone();
        assert_eq!(saved.title, "Smart Supply Chain Saudi Arabia");
        assert!(saved.content.contains("<h1>Smart Supply Chain Saudi Arabia</h1>"));
    }
}
