use scraper::{ElementRef, Html, Node};
use url::Url;

use super::language::normalize_language;
use super::links::sanitize_url;

pub const PLACEHOLDER: &str = "No description available.";

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub link: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn same_style(&self, other: &Span) -> bool {
        self.link == other.link && self.bold == other.bold && self.italic == other.italic && self.code == other.code
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Span>),
    Heading { level: u8, text: String },
    Code { language: &'static str, text: String },
    Bulleted(Vec<Span>),
    Numbered(Vec<Span>),
}

impl Block {
    pub fn placeholder() -> Self {
        Block::Paragraph(vec![Span::plain(PLACEHOLDER)])
    }
}

#[derive(Clone, Default)]
struct Style {
    link: Option<String>,
    bold: bool,
    italic: bool,
    code: bool,
}

/// Convert a description fragment into blocks. Never returns an empty list.
pub fn convert(fragment: Option<&str>, base: &Url) -> Vec<Block> {
    let Some(html) = fragment.filter(|f| !f.trim().is_empty()) else {
        return vec![Block::placeholder()];
    };

    let doc = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    let mut pending: Vec<Span> = Vec::new();

    for child in doc.root_element().children() {
        let Some(el) = ElementRef::wrap(child) else {
            if let Node::Text(t) = child.value() {
                push_text(t, &Style::default(), &mut pending);
            }
            continue;
        };
        let name = el.value().name();
        if is_inline(name) {
            collect_element(el, &Style::default(), base, &mut pending);
            continue;
        }

        flush_paragraph(&mut pending, &mut blocks);
        convert_element(el, name, base, &mut blocks);
    }
    flush_paragraph(&mut pending, &mut blocks);

    if blocks.is_empty() {
        blocks.push(Block::placeholder());
    }
    blocks
}

fn convert_element(el: ElementRef<'_>, name: &str, base: &Url, blocks: &mut Vec<Block>) {
    match name {
        "p" => {
            let spans = inline_spans(el, base);
            if !spans.is_empty() {
                blocks.push(Block::Paragraph(spans));
            }
        }
        "pre" => {
            let text: String = el.text().collect();
            let text = text.trim_end_matches('\n').to_string();
            if text.trim().is_empty() {
                return;
            }
            let hint = code_hint(el);
            blocks.push(Block::Code {
                language: normalize_language(hint.as_deref(), &text),
                text,
            });
        }
        "ul" | "ol" => {
            for li in el.children().filter_map(ElementRef::wrap).filter(|c| c.value().name() == "li") {
                let spans = inline_spans(li, base);
                if spans.is_empty() {
                    continue;
                }
                blocks.push(if name == "ul" {
                    Block::Bulleted(spans)
                } else {
                    Block::Numbered(spans)
                });
            }
        }
        "h1" | "h2" | "h3" => {
            let text = stripped_text(el);
            if !text.is_empty() {
                let level = name.as_bytes()[1] - b'0';
                blocks.push(Block::Heading { level, text });
            }
        }
        "h4" | "h5" | "h6" => {
            let text = stripped_text(el);
            if !text.is_empty() {
                blocks.push(Block::Paragraph(vec![Span {
                    text,
                    bold: true,
                    ..Default::default()
                }]));
            }
        }
        _ => {
            let text = stripped_text(el);
            if !text.is_empty() {
                blocks.push(Block::Paragraph(vec![Span::plain(text)]));
            }
        }
    }
}

fn is_inline(name: &str) -> bool {
    matches!(
        name,
        "a" | "code" | "kbd" | "samp" | "strong" | "b" | "em" | "i" | "span" | "br" | "u" | "s" | "small" | "mark" | "sub" | "sup"
    )
}

/// Class or `data-lang` on the `<pre>` or its `<code>` child.
fn code_hint(pre: ElementRef<'_>) -> Option<String> {
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "code");
    let hints: Vec<&str> = [Some(pre), code]
        .into_iter()
        .flatten()
        .flat_map(|e| [e.value().attr("data-lang"), e.value().attr("class")])
        .flatten()
        .collect();
    if hints.is_empty() {
        None
    } else {
        Some(hints.join(" "))
    }
}

fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn inline_spans(el: ElementRef<'_>, base: &Url) -> Vec<Span> {
    let mut spans = Vec::new();
    collect_children(el, &Style::default(), base, &mut spans);
    normalize(spans)
}

fn collect_children(el: ElementRef<'_>, style: &Style, base: &Url, out: &mut Vec<Span>) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => push_text(t, style, out),
            Node::Element(_) => {
                if let Some(e) = ElementRef::wrap(child) {
                    collect_element(e, style, base, out);
                }
            }
            _ => {}
        }
    }
}

fn collect_element(el: ElementRef<'_>, style: &Style, base: &Url, out: &mut Vec<Span>) {
    let mut inner = style.clone();
    match el.value().name() {
        "br" => {
            out.push(Span::plain("\n"));
            return;
        }
        "a" => inner.link = el.value().attr("href").and_then(|h| sanitize_url(h, base)),
        "code" | "kbd" | "samp" => inner.code = true,
        "strong" | "b" => inner.bold = true,
        "em" | "i" => inner.italic = true,
        _ => {}
    }
    collect_children(el, &inner, base, out);
}

fn push_text(raw: &str, style: &Style, out: &mut Vec<Span>) {
    let text = if style.code { raw.to_string() } else { collapse_ws(raw) };
    if !text.is_empty() {
        out.push(Span {
            text,
            link: style.link.clone(),
            bold: style.bold,
            italic: style.italic,
            code: style.code,
        });
    }
}

fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

/// Merge same-style neighbours, drop doubled spaces at span boundaries and
/// trim the ends. Whitespace-only results come back empty.
fn normalize(spans: Vec<Span>) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for mut span in spans {
        if !span.code && merged.last().is_some_and(|p| p.text.ends_with([' ', '\n'])) {
            span.text = span.text.trim_start_matches(' ').to_string();
        }
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(prev) if prev.same_style(&span) => prev.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }

    if let Some(first) = merged.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = merged.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    merged.retain(|s| !s.text.is_empty());
    merged
}

fn flush_paragraph(pending: &mut Vec<Span>, blocks: &mut Vec<Block>) {
    let spans = normalize(std::mem::take(pending));
    if !spans.is_empty() {
        blocks.push(Block::Paragraph(spans));
    }
}
