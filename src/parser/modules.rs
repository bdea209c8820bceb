use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use super::progress::parse_module_label;
use crate::dojo::Dojo;
use crate::record::Module;

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Module links on a dojo page: anchors under `/<dojo>/`, slug taken from the
/// second-to-last path segment.
pub fn extract(dojo: Dojo, html: &str) -> Vec<Module> {
    let doc = Html::parse_document(html);
    let prefix = dojo.path();

    let mut seen = HashSet::new();
    let mut modules = Vec::new();

    for a in doc.select(&LINK_SEL) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !href.starts_with(&prefix) {
            continue;
        }
        let Some(slug) = slug_from_href(href) else {
            continue;
        };
        if slug == dojo.slug() || !seen.insert(slug.to_string()) {
            continue;
        }

        let raw: String = a.text().collect::<Vec<_>>().join(" ");
        let Some(label) = parse_module_label(&raw) else {
            debug!(dojo = %dojo, slug, "Dropping module link with empty name");
            continue;
        };

        modules.push(Module {
            name: label.name,
            slug: slug.to_string(),
            solvers: label.solvers,
            completed: label.completed,
            total: label.total,
            percentage: label.percentage,
        });
    }

    modules
}

/// `/program-security/memory-errors/` → `memory-errors`
fn slug_from_href(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    Some(parts[parts.len() - 2]).filter(|s| !s.is_empty())
}
