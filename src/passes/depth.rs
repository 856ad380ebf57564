//! Thin-content checks and the closing section.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{ChangeRecord, PassContext, PassOutput};
use crate::markup::{append_to_content, Markup};

pub const MIN_POST_WORDS: usize = 1500;
pub const MIN_SECTION_WORDS: usize = 50;

static CONCLUSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)conclusion|summary|الخلاصة|الخاتمة").unwrap());

pub fn run(ctx: &PassContext<'_>, body: &str) -> PassOutput {
    let m = ctx.markup;
    let mut advisories = Vec::new();

    let words = m.word_count(body);
    if words < MIN_POST_WORDS {
        advisories.push(format!(
            "Content is relatively short ({words} words) - consider manual expansion"
        ));
    }

    for (i, section) in m.sections(body).iter().enumerate() {
        if section.is_generated() {
            continue;
        }
        let n = m.word_count(&section.inner);
        if n > 0 && n < MIN_SECTION_WORDS {
            advisories.push(format!(
                "Section {} is thin ({n} words) - consider adding more detail",
                i + 1
            ));
        }
    }

    let mut html = body.to_string();
    let mut changes = Vec::new();
    if !has_conclusion(m, body) {
        html = append_to_content(m, &html, &conclusion(ctx));
        changes.push(ChangeRecord::new("Added conclusion section"));
    }

    debug!(slug = ctx.slug, words, advisories = advisories.len(), "depth pass");
    PassOutput {
        body: html,
        changes,
        advisories,
    }
}

/// True if any heading, at any level, reads like a closing section.
pub fn has_conclusion(markup: &dyn Markup, body: &str) -> bool {
    (1..=6).any(|level| {
        markup
            .headings(body, level)
            .iter()
            .any(|h| CONCLUSION_RE.is_match(&h.inner))
    })
}

fn conclusion(ctx: &PassContext<'_>) -> String {
    let copy = ctx.tables.copy(ctx.language);
    let paragraphs: String = copy
        .conclusion_paragraphs
        .iter()
        .map(|p| format!("        <p>\n            {p}\n        </p>\n"))
        .collect();
    format!(
        "\n    <section class=\"conclusion\">\n        <h2>{}</h2>\n{}    </section>",
        copy.conclusion_heading, paragraphs
    )
}
