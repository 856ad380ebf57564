//! Plain-text run report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::pipeline::{PipelineResult, Status};

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

const WHY_IT_HELPS: &str = "\
1. Heading structure (H1 -> H2 -> H3)
   - Lets crawlers read the content hierarchy
   - One H1 per page names the topic unambiguously

2. Internal linking
   - Spreads page authority across related posts
   - Helps crawlers discover every post in a topic cluster
   - Keeps readers on the site longer

3. FAQ sections
   - Targets featured snippets and \"People also ask\"
   - Carries schema.org FAQPage structured data
   - Answers search intent directly

4. Content depth
   - Reduces thin-content signals
   - A closing summary gives the page a clear end state

Together these signal that each post is well structured, part of a
coherent topical cluster, and worth prioritising for indexing.
";

pub fn render(results: &[PipelineResult], dry_run: bool, now: DateTime<Local>) -> String {
    let updated: Vec<_> = results.iter().filter(|r| r.is_updated()).collect();
    let unchanged = results.iter().filter(|r| r.is_unchanged()).count();
    let errors: Vec<_> = results.iter().filter(|r| r.is_error()).collect();

    let mut lines = vec![
        RULE.to_string(),
        "SEO CONTENT FIX - SUMMARY REPORT".to_string(),
        RULE.to_string(),
        String::new(),
        format!("Date: {}", now.format("%Y-%m-%d %H:%M:%S")),
        format!(
            "Mode: {}",
            if dry_run { "DRY RUN (nothing written)" } else { "LIVE" }
        ),
        format!("Total posts processed: {}", results.len()),
        String::new(),
        format!(
            "{}: {}",
            if dry_run { "Would update posts" } else { "Updated posts" },
            updated.len()
        ),
        format!("No changes needed: {unchanged}"),
        format!("Errors: {}", errors.len()),
    ];

    if !updated.is_empty() {
        lines.extend([String::new(), THIN_RULE.into(), "UPDATED POSTS:".into(), THIN_RULE.into()]);
        for r in &updated {
            lines.push(String::new());
            lines.push(r.slug.clone());
            lines.push(format!(
                "  Language: {}",
                r.language.map_or("N/A", |l| l.code())
            ));
            if let Some((before, after)) = r.score {
                lines.push(format!(
                    "  SEO score: {before}/100 -> {after}/100 ({:+})",
                    i32::from(after) - i32::from(before)
                ));
            }
            let label = if r.dry_run { "Changes (not written)" } else { "Changes" };
            lines.push(format!("  {label}: {}", r.changes.len()));
            lines.extend(r.changes.iter().map(|c| format!("    • {c}")));
        }
    }

    let advised: Vec<_> = results.iter().filter(|r| !r.advisories.is_empty()).collect();
    if !advised.is_empty() {
        lines.extend([String::new(), THIN_RULE.into(), "MANUAL REVIEW SUGGESTED:".into(), THIN_RULE.into()]);
        for r in advised {
            lines.push(String::new());
            lines.push(r.slug.clone());
            lines.extend(r.advisories.iter().map(|a| format!("    - {a}")));
        }
    }

    if !errors.is_empty() {
        lines.extend([String::new(), THIN_RULE.into(), "ERRORS:".into(), THIN_RULE.into()]);
        for r in &errors {
            let Status::Error(message) = &r.status else { continue };
            lines.push(String::new());
            lines.push(format!("{}: {message}", r.slug));
            if !r.changes.is_empty() {
                lines.push("  Changes not saved:".to_string());
                lines.extend(r.changes.iter().map(|c| format!("    • {c}")));
            }
        }
    }

    lines.extend([
        String::new(),
        RULE.into(),
        "WHY THESE CHANGES HELP WITH INDEXING:".into(),
        RULE.into(),
        String::new(),
        WHY_IT_HELPS.into(),
    ]);
    lines.join("\n")
}

/// Write the report as `seo_fix_report_<timestamp>.txt` under `dir`.
pub fn save(dir: &Path, report: &str, now: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("seo_fix_report_{}.txt", now.format("%Y%m%d_%H%M%S")));
    fs::write(&path, report).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::passes::language::Language;
    use crate::passes::ChangeRecord;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 2, 14, 5, 9).unwrap()
    }

    fn result(slug: &str, status: Status, changes: &[&str]) -> PipelineResult {
        PipelineResult {
            slug: slug.to_string(),
            status,
            language: Some(Language::English),
            changes: changes.iter().map(|c| ChangeRecord::new(*c)).collect(),
            advisories: Vec::new(),
            dry_run: false,
            score: Some((30, 75)),
        }
    }

    #[test]
    fn renders_counts_and_sections() {
        let mut thin = result("thin-post", Status::Success, &[]);
        thin.advisories.push("Content is relatively short (300 words) - consider manual expansion".into());
        let results = vec![
            result("oee", Status::Success, &["Added H1 heading with post title", "Added conclusion section"]),
            thin,
            result("ghost", Status::Error("Post not found in database".into()), &[]),
        ];
        let text = render(&results, false, now());

        assert!(text.contains("Date: 2025-03-02 14:05:09"));
        assert!(text.contains("Mode: LIVE"));
        assert!(text.contains("Total posts processed: 3"));
        assert!(text.contains("Updated posts: 1"));
        assert!(text.contains("No changes needed: 1"));
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("oee\n  Language: en\n  SEO score: 30/100 -> 75/100 (+45)\n  Changes: 2\n    • Added H1 heading with post title"));
        assert!(text.contains("thin-post\n    - Content is relatively short"));
        assert!(text.contains("ghost: Post not found in database"));
        assert!(text.contains("WHY THESE CHANGES HELP WITH INDEXING:"));
    }

    #[test]
    fn failed_write_lists_unsaved_changes() {
        let results = vec![result(
            "oee",
            Status::Error("Failed to update database: write rejected: disk full".into()),
            &["Added conclusion section"],
        )];
        let text = render(&results, false, now());
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("Updated posts: 0"));
        assert!(text.contains("  Changes not saved:\n    • Added conclusion section"));
    }

    #[test]
    fn dry_run_wording() {
        let mut r = result("oee", Status::Success, &["Added conclusion section"]);
        r.dry_run = true;
        let text = render(&[r], true, now());
        assert!(text.contains("Mode: DRY RUN (nothing written)"));
        assert!(text.contains("Would update posts: 1"));
        assert!(text.contains("  Changes (not written): 1"));
    }

    #[test]
    fn saves_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&dir.path().join("reports"), "hello", now()).unwrap();
        assert_eq!(path.file_name().unwrap(), "seo_fix_report_20250302_140509.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
