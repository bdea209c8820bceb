use std::sync::LazyLock;

use regex::Regex;

static HACKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*hacking\s*(\d+)\s*/\s*(\d+)").unwrap());
static FRACTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLabel {
    pub name: String,
    pub solvers: u32,
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Split `"Memory Errors 1234 hacking 3/12 25%"` into the name and its stats.
/// Returns `None` when nothing but progress stats was in the label.
pub fn parse_module_label(raw: &str) -> Option<ModuleLabel> {
    let mut solvers = 0;
    let mut completed = 0;
    let mut total = 0;
    let mut spans = Vec::new();

    if let Some(caps) = HACKING_RE.captures(raw) {
        solvers = caps[1].parse().unwrap_or(0);
        completed = caps[2].parse().unwrap_or(0);
        total = caps[3].parse().unwrap_or(0);
        spans.push(caps.get(0).map(|m| m.range()));
    } else if let Some(caps) = FRACTION_RE.captures(raw) {
        completed = caps[1].parse().unwrap_or(0);
        total = caps[2].parse().unwrap_or(0);
        spans.push(caps.get(0).map(|m| m.range()));
    }

    let percentage = match PERCENT_RE.captures(raw) {
        Some(caps) => {
            spans.push(caps.get(0).map(|m| m.range()));
            caps[1].parse::<f64>().map(|p| p.round().clamp(0.0, 100.0) as u8).unwrap_or(0)
        }
        None => 0,
    };

    let name = strip_spans(raw, spans.into_iter().flatten().collect());
    if name.is_empty() {
        return None;
    }

    Some(ModuleLabel {
        name,
        solvers,
        completed,
        total,
        percentage,
    })
}

/// Remove byte ranges from `raw` and collapse the leftover whitespace.
fn strip_spans(raw: &str, mut spans: Vec<std::ops::Range<usize>>) -> String {
    spans.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    for span in spans {
        if span.start >= pos {
            out.push_str(&raw[pos..span.start]);
            out.push(' ');
        }
        pos = pos.max(span.end);
    }
    out.push_str(&raw[pos..]);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str, solvers: u32, completed: u32, total: u32, percentage: u8) -> ModuleLabel {
        ModuleLabel {
            name: name.to_string(),
            solvers,
            completed,
            total,
            percentage,
        }
    }

    #[test]
    fn observed_label_shapes() {
        let cases = [
            ("Memory Errors 1234 hacking 3/12 25%", Some(label("Memory Errors", 1234, 3, 12, 25))),
            ("Memory Errors\n  1234 hacking\n  3 / 12\n 25%", Some(label("Memory Errors", 1234, 3, 12, 25))),
            ("Shellcode Injection 0/15", Some(label("Shellcode Injection", 0, 0, 15, 0))),
            ("Reverse Engineering 42 Hacking 15/15 100%", Some(label("Reverse Engineering", 42, 15, 15, 100))),
            ("Assembly Crash Course", Some(label("Assembly Crash Course", 0, 0, 0, 0))),
            ("x86 Assembly 7 hacking 1/4", Some(label("x86 Assembly", 7, 1, 4, 0))),
            ("Web Security 33.4%", Some(label("Web Security", 0, 0, 0, 33))),
            ("Return Oriented Programming 3/10 30 %", Some(label("Return Oriented Programming", 0, 3, 10, 30))),
            ("120 hacking 5/5 100%", None),
            ("2/7", None),
            ("   ", None),
            ("", None),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_module_label(raw), expected, "label {:?}", raw);
        }
    }

    #[test]
    fn hacking_pattern_removed_from_name() {
        let l = parse_module_label("Kernel Security 88 hacking 2/9").unwrap();
        assert!(!l.name.contains("hacking"));
        assert!(!l.name.contains("2/9"));
        assert_eq!((l.solvers, l.completed, l.total), (88, 2, 9));
    }

    #[test]
    fn bare_fraction_defaults_solvers() {
        let l = parse_module_label("Sandboxing 4/20").unwrap();
        assert_eq!(l.solvers, 0);
        assert_eq!((l.completed, l.total), (4, 20));
    }

    #[test]
    fn names_with_numbers_survive() {
        let l = parse_module_label("Level 2 Heap Exploitation 2024").unwrap();
        assert_eq!(l.name, "Level 2 Heap Exploitation 2024");
    }
}
