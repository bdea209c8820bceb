use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::record::Record;

pub const DEFAULT_OUTPUT: &str = "pwn_college_structure.md";

const HEADERS: [&str; 6] = ["Dojo", "Module", "Challenges", "Solvers", "Completed", "Progress"];

/// Render records as a pipe table sorted by (dojo, module).
pub fn render(records: &[Record], quoted: bool) -> String {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut out = String::new();
    out.push_str(&row(HEADERS.iter().map(|h| h.to_string())));
    out.push_str(&row(HEADERS.iter().map(|_| ":---".to_string())));
    for r in sorted {
        out.push_str(&row([
            r.dojo.title(),
            r.module.name.clone(),
            r.challenge_list(quoted),
            r.module.solvers.to_string(),
            format!("{}/{}", r.module.completed, r.module.total),
            format!("{}%", r.module.percentage),
        ]));
    }
    out
}

fn row(cells: impl IntoIterator<Item = String>) -> String {
    let cells: Vec<String> = cells.into_iter().map(|c| escape(&c)).collect();
    format!("| {} |\n", cells.join(" | "))
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Write the table to `path`, replacing whatever was there.
pub fn write(path: &Path, records: &[Record], quoted: bool) -> Result<()> {
    let table = render(records, quoted);
    fs::write(path, table).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Saved {} rows to {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dojo::Dojo;
    use crate::record::fixtures::record;

    #[test]
    fn single_record_table() {
        let records = vec![record(Dojo::ProgramSecurity, "Memory Errors", &["Challenge A", "Challenge B"])];
        let md = render(&records, true);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "| Dojo | Module | Challenges | Solvers | Completed | Progress |");
        assert_eq!(lines[1], "| :--- | :--- | :--- | :--- | :--- | :--- |");
        assert_eq!(
            lines[2],
            "| Program Security | Memory Errors | `Challenge A`, `Challenge B` | 0 | 0/0 | 0% |"
        );
    }

    #[test]
    fn rows_sorted_by_dojo_then_module() {
        let records = vec![
            record(Dojo::SystemSecurity, "Sandboxing", &["a"]),
            record(Dojo::ProgramSecurity, "Shellcode Injection", &["b"]),
            record(Dojo::IntroToCybersecurity, "Web Security", &["c"]),
            record(Dojo::ProgramSecurity, "Memory Errors", &["d"]),
        ];
        let md = render(&records, false);
        let modules: Vec<&str> = md
            .lines()
            .skip(2)
            .map(|l| l.split(" | ").nth(1).unwrap())
            .collect();
        assert_eq!(modules, ["Web Security", "Memory Errors", "Shellcode Injection", "Sandboxing"]);
    }

    #[test]
    fn render_is_order_independent() {
        let a = record(Dojo::ProgramSecurity, "A", &["x"]);
        let b = record(Dojo::ProgramSecurity, "B", &["y"]);
        assert_eq!(render(&[a.clone(), b.clone()], true), render(&[b, a], true));
    }

    #[test]
    fn pipes_escaped() {
        let records = vec![record(Dojo::ProgramSecurity, "Pipes | Redirects", &["a|b"])];
        let md = render(&records, false);
        assert!(md.contains("Pipes \\| Redirects"));
        assert!(md.contains("a\\|b"));
    }

    #[test]
    fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT);
        std::fs::write(&path, "stale content that is much longer than the table\n".repeat(50)).unwrap();

        let records = vec![record(Dojo::ProgramSecurity, "Memory Errors", &["Challenge A"])];
        write(&path, &records, true).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale"));
        assert_eq!(written.lines().count(), 3);
    }
}
