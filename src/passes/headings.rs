//! Heading hierarchy: exactly one H1, and no H3 ahead of the first H2.

use tracing::debug;

use super::topics::slug_to_title;
use super::{ChangeRecord, PassContext, PassOutput};
use crate::markup::{escape_text, insert_at, retag_heading};

/// Title to use when the stored one is blank, derived from the slug.
pub fn fill_missing_title(slug: &str, title: &str) -> Option<(String, ChangeRecord)> {
    if !title.trim().is_empty() {
        return None;
    }
    let derived = slug_to_title(slug);
    let change = ChangeRecord::new(format!("Set missing post title to '{derived}'"));
    Some((derived, change))
}

pub fn run(ctx: &PassContext<'_>, body: &str) -> PassOutput {
    let m = ctx.markup;
    let mut html = body.to_string();
    let mut changes = Vec::new();

    if m.headings(&html, 1).is_empty() {
        let at = m
            .header_end(&html)
            .or_else(|| m.content_start(&html))
            .unwrap_or(0);
        let tag = format!("\n    <h1>{}</h1>\n", escape_text(ctx.title));
        html = insert_at(&html, at, &tag);
        changes.push(ChangeRecord::new("Added H1 heading with post title"));
    }

    let h1s = m.headings(&html, 1);
    if h1s.len() > 1 {
        // back to front so earlier spans stay valid
        for h in h1s[1..].iter().rev() {
            html = retag_heading(&html, h, 2);
        }
        changes.push(ChangeRecord::new(format!(
            "Converted {} additional H1 tags to H2",
            h1s.len() - 1
        )));
    }

    if let Some(h3) = m.headings(&html, 3).into_iter().next() {
        let first_h2 = m.headings(&html, 2).first().map(|h| h.span.start);
        if first_h2.map_or(true, |pos| h3.span.start < pos) {
            html = retag_heading(&html, &h3, 2);
            changes.push(ChangeRecord::new("Converted orphan H3 to H2 for proper hierarchy"));
        }
    }

    debug!(slug = ctx.slug, changes = changes.len(), "headings pass");
    PassOutput {
        body: html,
        changes,
        advisories: Vec::new(),
    }
}
