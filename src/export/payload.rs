use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::warn;

use crate::dojo::Dojo;
use crate::parser::blocks::{Block, Span};
use crate::record::{Challenge, Record};

/// Notion rejects text objects longer than this.
pub const MAX_TEXT_LEN: usize = 2000;
/// Max children per create/append request, and max items per rich text array.
pub const MAX_CHILDREN: usize = 100;

pub const NOTE_SECTIONS: [&str; 6] = ["Objective", "Approach", "Solution", "Flag", "Learnings", "References"];

/// Split on char boundaries into pieces of at most `MAX_TEXT_LEN` chars.
fn chunk_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(MAX_TEXT_LEN).map(|c| c.iter().collect()).collect()
}

/// Same-style neighbours are merged first. Past `MAX_CHILDREN` pieces the
/// tail is folded into one unformatted piece so no text is silently lost;
/// only what overflows that piece is dropped, with a warning.
pub fn rich_text(spans: &[Span]) -> Vec<Value> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prev) if prev.same_style(span) => prev.text.push_str(&span.text),
            _ => merged.push(span.clone()),
        }
    }

    let mut pieces: Vec<Span> = merged
        .into_iter()
        .flat_map(|span| {
            chunk_text(&span.text)
                .into_iter()
                .map(move |text| Span { text, ..span.clone() })
        })
        .collect();

    if pieces.len() > MAX_CHILDREN {
        let rest: String = pieces.drain(MAX_CHILDREN - 1..).map(|p| p.text).collect();
        let total = rest.chars().count();
        if total > MAX_TEXT_LEN {
            warn!("Rich text exceeds Notion limits, dropping {} chars", total - MAX_TEXT_LEN);
        }
        pieces.push(Span::plain(rest.chars().take(MAX_TEXT_LEN).collect::<String>()));
    }

    pieces.iter().map(text_object).collect()
}

fn text_object(span: &Span) -> Value {
    let link = span.link.as_ref().map(|url| json!({ "url": url }));
    json!({
        "type": "text",
        "text": { "content": span.text, "link": link },
        "annotations": {
            "bold": span.bold,
            "italic": span.italic,
            "code": span.code,
        },
    })
}

fn plain(text: &str) -> Vec<Value> {
    rich_text(&[Span::plain(text)])
}

fn block(kind: &str, body: Value) -> Value {
    json!({ "object": "block", "type": kind, kind: body })
}

pub fn block_json(b: &Block) -> Value {
    match b {
        Block::Paragraph(spans) => block("paragraph", json!({ "rich_text": rich_text(spans) })),
        Block::Heading { level, text } => {
            let kind = format!("heading_{}", (*level).clamp(1, 3));
            block(&kind, json!({ "rich_text": plain(text) }))
        }
        Block::Code { language, text } => {
            block("code", json!({ "rich_text": plain(text), "language": language }))
        }
        Block::Bulleted(spans) => block("bulleted_list_item", json!({ "rich_text": rich_text(spans) })),
        Block::Numbered(spans) => block("numbered_list_item", json!({ "rich_text": rich_text(spans) })),
    }
}

/// Page body for one challenge: its description followed by the empty
/// note-taking template.
pub fn challenge_children(description: &[Block]) -> Vec<Value> {
    let mut children = vec![block_json(&Block::Heading {
        level: 2,
        text: "Description".into(),
    })];
    children.extend(description.iter().map(block_json));
    children.push(block("divider", json!({})));
    for section in NOTE_SECTIONS {
        children.push(block_json(&Block::Heading {
            level: 2,
            text: section.into(),
        }));
        children.push(block("paragraph", json!({ "rich_text": [] })));
    }
    children
}

fn dojo_options() -> Vec<Value> {
    Dojo::ALL.iter().map(|d| json!({ "name": d.title() })).collect()
}

pub fn challenges_schema() -> Value {
    json!({
        "Name": { "title": {} },
        "Dojo": { "select": { "options": dojo_options() } },
        "Module": { "rich_text": {} },
        "Order": { "number": {} },
        "Status": { "select": { "options": [
            { "name": "Not started" },
            { "name": "In progress" },
            { "name": "Solved" },
        ] } },
    })
}

pub fn modules_schema() -> Value {
    json!({
        "Module": { "title": {} },
        "Dojo": { "select": { "options": dojo_options() } },
        "Challenges": { "rich_text": {} },
        "Solvers": { "number": {} },
        "Completed": { "number": {} },
        "Total": { "number": {} },
        "Progress": { "number": { "format": "percent" } },
    })
}

pub fn challenge_properties(record: &Record, challenge: &Challenge, order: usize) -> Value {
    json!({
        "Name": { "title": plain(&challenge.name) },
        "Dojo": { "select": { "name": record.dojo.title() } },
        "Module": { "rich_text": plain(&record.module.name) },
        "Order": { "number": order },
        "Status": { "select": { "name": "Not started" } },
    })
}

/// Challenge names as rich text, each linked to its page when one was created.
pub fn challenge_cell(record: &Record, links: &HashMap<String, String>) -> Vec<Value> {
    let linked = record.challenges.iter().filter(|c| links.contains_key(&c.name)).count();
    if linked * 2 > MAX_CHILDREN {
        warn!(
            dojo = %record.dojo,
            module = %record.module.name,
            "Too many linked challenges for one cell, the last ones are unlinked"
        );
    }

    let mut spans = Vec::new();
    for (i, c) in record.challenges.iter().enumerate() {
        if i > 0 {
            spans.push(Span::plain(", "));
        }
        spans.push(Span {
            text: c.name.clone(),
            link: links.get(&c.name).cloned(),
            ..Default::default()
        });
    }
    rich_text(&spans)
}

pub fn module_properties(record: &Record, links: &HashMap<String, String>) -> Value {
    let m = &record.module;
    json!({
        "Module": { "title": plain(&m.name) },
        "Dojo": { "select": { "name": record.dojo.title() } },
        "Challenges": { "rich_text": challenge_cell(record, links) },
        "Solvers": { "number": m.solvers },
        "Completed": { "number": m.completed },
        "Total": { "number": m.total },
        "Progress": { "number": f64::from(m.percentage) / 100.0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;

    #[test]
    fn long_text_is_chunked() {
        let text = "é".repeat(MAX_TEXT_LEN * 2 + 5);
        let rt = rich_text(&[Span::plain(text)]);
        assert_eq!(rt.len(), 3);
        assert_eq!(rt[0]["text"]["content"].as_str().unwrap().chars().count(), MAX_TEXT_LEN);
        assert_eq!(rt[2]["text"]["content"].as_str().unwrap().chars().count(), 5);
    }

    #[test]
    fn link_and_annotations() {
        let rt = rich_text(&[Span {
            text: "docs".into(),
            link: Some("https://pwn.college/docs".into()),
            code: true,
            ..Default::default()
        }]);
        assert_eq!(rt[0]["text"]["link"]["url"], "https://pwn.college/docs");
        assert_eq!(rt[0]["annotations"]["code"], true);
        assert!(rich_text(&[Span::plain("x")])[0]["text"]["link"].is_null());
    }

    #[test]
    fn block_shapes() {
        let code = block_json(&Block::Code {
            language: "python",
            text: "print(1)".into(),
        });
        assert_eq!(code["type"], "code");
        assert_eq!(code["code"]["language"], "python");

        let h = block_json(&Block::Heading { level: 3, text: "Hint".into() });
        assert_eq!(h["type"], "heading_3");
        assert_eq!(h["heading_3"]["rich_text"][0]["text"]["content"], "Hint");

        let li = block_json(&Block::Numbered(vec![Span::plain("step")]));
        assert_eq!(li["type"], "numbered_list_item");
    }

    #[test]
    fn template_follows_description() {
        let children = challenge_children(&[Block::placeholder()]);
        // heading + description + divider + 6 * (heading + paragraph)
        assert_eq!(children.len(), 3 + NOTE_SECTIONS.len() * 2);
        let headings: Vec<&str> = children
            .iter()
            .filter(|c| c["type"] == "heading_2")
            .map(|c| c["heading_2"]["rich_text"][0]["text"]["content"].as_str().unwrap())
            .collect();
        assert_eq!(headings, ["Description", "Objective", "Approach", "Solution", "Flag", "Learnings", "References"]);
    }

    #[test]
    fn challenge_cell_links_known_pages() {
        let r = record(Dojo::ProgramSecurity, "Memory Errors", &["Challenge A", "Challenge B"]);
        let links = HashMap::from([("Challenge B".to_string(), "https://www.notion.so/b".to_string())]);
        let cell = challenge_cell(&r, &links);
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[0]["text"]["content"], "Challenge A, ");
        assert!(cell[0]["text"]["link"].is_null());
        assert_eq!(cell[1]["text"]["link"]["url"], "https://www.notion.so/b");
    }

    fn cell_text(cell: &[Value]) -> String {
        cell.iter().map(|v| v["text"]["content"].as_str().unwrap()).collect()
    }

    #[test]
    fn large_module_keeps_every_challenge() {
        let names: Vec<String> = (1..=60).map(|i| format!("level{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let r = record(Dojo::ProgramSecurity, "Memory Errors", &refs);

        let unlinked = challenge_cell(&r, &HashMap::new());
        assert_eq!(unlinked.len(), 1);
        assert_eq!(cell_text(&unlinked), names.join(", "));

        let links: HashMap<String, String> = names
            .iter()
            .map(|n| (n.clone(), format!("https://www.notion.so/{}", n)))
            .collect();
        let linked = challenge_cell(&r, &links);
        assert_eq!(linked.len(), MAX_CHILDREN);
        assert_eq!(cell_text(&linked), names.join(", "));
        assert_eq!(linked[0]["text"]["link"]["url"], "https://www.notion.so/level1");
        assert!(linked[MAX_CHILDREN - 1]["text"]["link"].is_null());
        assert!(cell_text(&linked).ends_with("level59, level60"));
    }

    #[test]
    fn module_row_progress_is_fraction() {
        let mut r = record(Dojo::SystemSecurity, "Sandboxing", &["a"]);
        r.module.percentage = 25;
        let props = module_properties(&r, &HashMap::new());
        assert_eq!(props["Progress"]["number"], 0.25);
        assert_eq!(props["Dojo"]["select"]["name"], "System Security");
    }
}
