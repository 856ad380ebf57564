//! Internal cross-links between posts of the same topic cluster.

use tracing::debug;

use super::topics::{anchor_phrases, related_slugs, slug_to_title};
use super::{ChangeRecord, PassContext, PassOutput};
use crate::markup::{append_to_content, escape_text};
use crate::settings::post_url;

pub fn run(ctx: &PassContext<'_>, body: &str) -> PassOutput {
    let candidates = related_slugs(ctx.tables, ctx.slug);
    if candidates.is_empty() {
        return PassOutput::unchanged(body);
    }

    let m = ctx.markup;
    let mut html = body.to_string();
    let mut changes = Vec::new();
    let mut any_linked = false;

    for &related in &candidates {
        if m.links_to(&html, &format!("/post/{related}")) {
            any_linked = true;
            continue;
        }
        for phrase in anchor_phrases(ctx.tables, related, ctx.language) {
            let Some(hit) = m.find_in_prose(&html, &phrase) else {
                continue;
            };
            let url = post_url(ctx.base_url, related);
            let linked = format!(r#"<a href="{url}">{}</a>"#, &html[hit.clone()]);
            html.replace_range(hit, &linked);
            any_linked = true;
            changes.push(ChangeRecord::new(format!("Added internal link to {related}")));
            break;
        }
    }

    // Fallback only for a post with no link to any sibling at all; once one
    // exists (ours or an editor's) reruns leave the body alone.
    if !any_linked {
        let block = related_reading(ctx, &candidates);
        html = append_to_content(m, &html, &block);
        changes.push(ChangeRecord::new(format!(
            "Added 'Related Reading' section with {} links",
            candidates.len()
        )));
    }

    debug!(slug = ctx.slug, candidates = candidates.len(), changes = changes.len(), "links pass");
    PassOutput {
        body: html,
        changes,
        advisories: Vec::new(),
    }
}

fn related_reading(ctx: &PassContext<'_>, slugs: &[&str]) -> String {
    let copy = ctx.tables.copy(ctx.language);
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                "            <li><a href=\"{}\">{}</a></li>\n",
                post_url(ctx.base_url, slug),
                escape_text(&slug_to_title(slug))
            )
        })
        .collect();
    format!(
        "\n    <section class=\"related-reading\">\n        <h2>{}</h2>\n        <p>{}</p>\n        <ul>\n{}        </ul>\n    </section>",
        copy.related_heading, copy.related_intro, items
    )
}
