use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::record::Challenge;

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.accordion-item-name.challenge-name").unwrap());
static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.pr-2").unwrap());
static DESCRIPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".challenge-description").unwrap());

/// Challenge headings on a module page, in page order. A heading without a
/// name span is not a challenge.
pub fn extract(html: &str, with_descriptions: bool) -> Vec<Challenge> {
    let doc = Html::parse_document(html);

    doc.select(&HEADING_SEL)
        .filter_map(|h4| {
            let span = h4.select(&NAME_SEL).next()?;
            let name = span.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return None;
            }
            let description = if with_descriptions { find_description(h4) } else { None };
            Some(Challenge { name, description })
        })
        .collect()
}

/// Inner markup of the description belonging to this heading: the
/// `.challenge-description` inside the enclosing accordion item, else the
/// first later sibling whose class mentions "description", searched only up
/// to the next challenge heading.
fn find_description(h4: ElementRef<'_>) -> Option<String> {
    let item = h4
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().classes().any(|c| c == "accordion-item"));
    if let Some(desc) = item.and_then(|item| item.select(&DESCRIPTION_SEL).next()) {
        return non_blank(desc.inner_html());
    }

    h4.next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|e| !HEADING_SEL.matches(e))
        .find(|e| e.value().attr("class").is_some_and(|c| c.contains("description")))
        .and_then(|desc| non_blank(desc.inner_html()))
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
