//! FAQ block with schema.org FAQPage microdata.

use tracing::debug;

use super::topics::faq_topic;
use super::{ChangeRecord, PassContext, PassOutput};
use crate::markup::append_to_content;
use crate::tables::FaqTemplate;

/// Presence of any of these means the post already has an FAQ.
pub const FAQ_MARKERS: &[&str] = &["FAQ", "Frequently Asked", "الأسئلة الشائعة"];

pub fn run(ctx: &PassContext<'_>, body: &str) -> PassOutput {
    if ctx.markup.contains_marker(body, FAQ_MARKERS) {
        return PassOutput::unchanged(body);
    }
    let Some(topic) = faq_topic(ctx.tables, ctx.slug) else {
        debug!(slug = ctx.slug, "no FAQ topic");
        return PassOutput::unchanged(body);
    };
    let Some(template) = ctx.tables.faq_template(topic, ctx.language) else {
        debug!(slug = ctx.slug, topic, "no FAQ template");
        return PassOutput::unchanged(body);
    };

    let block = render(ctx, template);
    PassOutput {
        body: append_to_content(ctx.markup, body, &block),
        changes: vec![ChangeRecord::new(format!(
            "Added FAQ section with {} questions",
            template.items.len()
        ))],
        advisories: Vec::new(),
    }
}

fn render(ctx: &PassContext<'_>, template: &FaqTemplate) -> String {
    // heading follows the post language even when the template fell back
    let heading = &ctx.tables.copy(ctx.language).faq_heading;
    let items = template
        .items
        .iter()
        .map(|item| {
            format!(
                r#"        <div class="faq-item" itemscope itemprop="mainEntity" itemtype="https://schema.org/Question">
            <h3 itemprop="name">{}</h3>
            <div itemscope itemprop="acceptedAnswer" itemtype="https://schema.org/Answer">
                <p itemprop="text">{}</p>
            </div>
        </div>"#,
                item.question, item.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\n    <section class=\"faq-section\" itemscope itemtype=\"https://schema.org/FAQPage\">\n        <h2>{heading}</h2>\n{items}\n    </section>"
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::markup::{Markup, RegexMarkup};
    use crate::passes::language::Language;
    use crate::passes::testing::ctx;

    #[test]
    fn appends_topic_faq_before_article_end() {
        let body = "<article><p>x</p></article>";
        let out = run(&ctx("esp32-vs-raspberry-pi-saudi-iot-guide", "T", Language::English), body);
        assert_eq!(out.changes, vec![ChangeRecord::new("Added FAQ section with 2 questions")]);
        assert!(out.body.contains("itemtype=\"https://schema.org/FAQPage\""));
        assert!(out.body.contains("<h2>Frequently Asked Questions</h2>"));
        assert!(out.body.ends_with("</section>\n</article>"));
        let m = RegexMarkup;
        assert_eq!(m.headings(&out.body, 3).len(), 2);
    }

    #[test]
    fn arabic_post_gets_arabic_template() {
        let out = run(
            &ctx("الصيانة-التنبؤية-في-المصانع", "T", Language::Arabic),
            "<article></article>",
        );
        assert!(out.body.contains("<h2>الأسئلة الشائعة</h2>"));
        assert!(out.body.contains("ما الفرق بين الصيانة التنبؤية والصيانة الوقائية؟"));
    }

    #[test]
    fn arabic_post_falls_back_to_english_template() {
        let out = run(
            &ctx("oee-optimization-industrial-iot-saudi-arabia", "T", Language::Arabic),
            "<article></article>",
        );
        assert_eq!(out.changes.len(), 1);
        assert!(out.body.contains("What is OEE and why does it matter?"));
        assert!(out.body.contains("<h2>الأسئلة الشائعة</h2>"));
    }

    #[test]
    fn existing_marker_leaves_body_byte_identical() {
        for body in [
            "<article><h2>FAQ</h2></article>",
            "<article><p>Frequently Asked about OEE</p></article>",
            "<article><h2>الأسئلة الشائعة</h2></article>",
        ] {
            let out = run(&ctx("oee-optimization-industrial-iot-saudi-arabia", "T", Language::English), body);
            assert_eq!(out.body, body);
            assert!(out.changes.is_empty());
        }
    }

    #[test]
    fn unresolved_topic_is_silently_skipped() {
        let body = "<article><p>x</p></article>";
        let out = run(&ctx("smart-supply-chain-saudi-arabia", "T", Language::English), body);
        assert_eq!(out.body, body);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let c = ctx("industrial-iot-cybersecurity-saudi-arabia", "T", Language::English);
        let first = run(&c, "<article><p>x</p></article>");
        let second = run(&c, &first.body);
        assert_eq!(second.body, first.body);
        assert!(second.changes.is_empty());
    }
}
