/// Every language identifier the Notion API accepts on a code block.
pub const NOTION_LANGUAGES: &[&str] = &[
    "abap", "agda", "arduino", "ascii art", "assembly", "bash", "basic", "bnf", "c", "c#", "c++",
    "clojure", "coffeescript", "coq", "css", "dart", "dhall", "diff", "docker", "ebnf", "elixir",
    "elm", "erlang", "f#", "flow", "fortran", "gherkin", "glsl", "go", "graphql", "groovy",
    "haskell", "hcl", "html", "idris", "java", "javascript", "json", "julia", "kotlin", "latex",
    "less", "lisp", "livescript", "llvm ir", "lua", "makefile", "markdown", "markup", "matlab",
    "mathematica", "mermaid", "nix", "notion formula", "objective-c", "ocaml", "pascal", "perl",
    "php", "plain text", "powershell", "prolog", "protobuf", "purescript", "python", "r",
    "racket", "reason", "ruby", "rust", "sass", "scala", "scheme", "scss", "shell", "smalltalk",
    "solidity", "sql", "swift", "toml", "typescript", "vb.net", "verilog", "vhdl",
    "visual basic", "webassembly", "xml", "yaml", "java/c/c++/c#",
];

pub const PLAIN_TEXT: &str = "plain text";

const SYNONYMS: &[(&str, &str)] = &[
    ("sh", "shell"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("terminal", "shell"),
    ("shell-session", "shell"),
    ("shellsession", "shell"),
    ("bash-session", "shell"),
    ("ps1", "powershell"),
    ("pwsh", "powershell"),
    ("py", "python"),
    ("py3", "python"),
    ("python3", "python"),
    ("python2", "python"),
    ("pycon", "python"),
    ("ipython", "python"),
    ("sage", "python"),
    ("js", "javascript"),
    ("node", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("rs", "rust"),
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("cc", "c++"),
    ("hpp", "c++"),
    ("h", "c"),
    ("csharp", "c#"),
    ("cs", "c#"),
    ("fsharp", "f#"),
    ("objc", "objective-c"),
    ("asm", "assembly"),
    ("nasm", "assembly"),
    ("gas", "assembly"),
    ("x86", "assembly"),
    ("x86asm", "assembly"),
    ("x86-64", "assembly"),
    ("amd64", "assembly"),
    ("arm", "assembly"),
    ("aarch64", "assembly"),
    ("mips", "assembly"),
    ("riscv", "assembly"),
    ("s", "assembly"),
    ("llvm", "llvm ir"),
    ("wasm", "webassembly"),
    ("wat", "webassembly"),
    ("golang", "go"),
    ("rb", "ruby"),
    ("pl", "perl"),
    ("kt", "kotlin"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("htm", "html"),
    ("xhtml", "html"),
    ("svg", "xml"),
    ("dockerfile", "docker"),
    ("make", "makefile"),
    ("mk", "makefile"),
    ("tex", "latex"),
    ("patch", "diff"),
    ("udiff", "diff"),
    ("proto", "protobuf"),
    ("sol", "solidity"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("coffee", "coffeescript"),
    ("vb", "visual basic"),
    ("vbnet", "vb.net"),
    ("sv", "verilog"),
    ("systemverilog", "verilog"),
    ("terraform", "hcl"),
    ("tf", "hcl"),
    ("gql", "graphql"),
    ("mysql", "sql"),
    ("postgres", "sql"),
    ("postgresql", "sql"),
    ("sqlite", "sql"),
    ("jsonc", "json"),
    ("json5", "json"),
    ("text", PLAIN_TEXT),
    ("txt", PLAIN_TEXT),
    ("plain", PLAIN_TEXT),
    ("plaintext", PLAIN_TEXT),
    ("none", PLAIN_TEXT),
    ("output", PLAIN_TEXT),
    ("nohighlight", PLAIN_TEXT),
];

/// Resolve a language for a code block from its class/data hint, falling
/// back to keyword sniffing of the code itself.
pub fn normalize_language(hint: Option<&str>, code: &str) -> &'static str {
    hint.and_then(from_hint).unwrap_or_else(|| guess_from_code(code))
}

/// `"language-python"`, `"lang-sh"`, `"highlight-source-c"`, `"Python 3"`…
fn from_hint(hint: &str) -> Option<&'static str> {
    hint.split_whitespace().find_map(|token| {
        let token = token.to_lowercase();
        let stripped = ["language-", "lang-", "highlight-source-", "highlight-", "source-"]
            .iter()
            .find_map(|p| token.strip_prefix(p))
            .unwrap_or(&token);
        lookup(stripped)
    })
    .or_else(|| lookup(&hint.trim().to_lowercase()))
}

fn lookup(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Some(lang) = NOTION_LANGUAGES.iter().find(|l| **l == name) {
        return Some(*lang);
    }
    if let Some((_, lang)) = SYNONYMS.iter().find(|(k, _)| *k == name) {
        return Some(*lang);
    }
    // "python 3", "c99", "bash-5"
    let alpha: String = name.chars().take_while(|c| c.is_ascii_alphabetic() || *c == '+' || *c == '#').collect();
    if alpha.len() < name.len() && !alpha.is_empty() {
        return lookup(&alpha);
    }
    None
}

fn guess_from_code(code: &str) -> &'static str {
    let trimmed = code.trim_start();
    let first_line = trimmed.lines().next().unwrap_or("");

    if let Some(shebang) = first_line.strip_prefix("#!") {
        if shebang.contains("python") {
            return "python";
        }
        if shebang.contains("sh") {
            return "shell";
        }
        if shebang.contains("node") {
            return "javascript";
        }
        if shebang.contains("perl") {
            return "perl";
        }
        if shebang.contains("ruby") {
            return "ruby";
        }
    }

    let has = |needles: &[&str]| needles.iter().any(|n| code.contains(n));

    if trimmed.starts_with("<?php") {
        "php"
    } else if has(&["#include", "int main(", "printf(", "malloc("]) {
        "c"
    } else if has(&["fn main(", "let mut ", "impl ", "println!("]) {
        "rust"
    } else if has(&["def ", "import pwn", "from pwn import", "print(", "elif "]) {
        "python"
    } else if has(&[".intel_syntax", "syscall", "mov rax", "mov eax", "push rbp", "int 0x80"]) {
        "assembly"
    } else if code.lines().any(|l| {
        let l = l.trim_start();
        l.starts_with("$ ") || l.starts_with("hacker@") || (l.starts_with("# ") && l.len() > 2 && !l[2..].starts_with('#'))
    }) {
        "shell"
    } else if has(&["function ", "const ", "console.log", "=> {"]) {
        "javascript"
    } else if has(&["SELECT ", "INSERT INTO", "CREATE TABLE"]) {
        "sql"
    } else {
        PLAIN_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints() {
        assert_eq!(normalize_language(Some("language-python"), ""), "python");
        assert_eq!(normalize_language(Some("lang-sh"), ""), "shell");
        assert_eq!(normalize_language(Some("hljs language-cpp"), ""), "c++");
        assert_eq!(normalize_language(Some("language-x86asm"), ""), "assembly");
        assert_eq!(normalize_language(Some("Python 3"), ""), "python");
        assert_eq!(normalize_language(Some("c99"), ""), "c");
        assert_eq!(normalize_language(Some("language-text"), "$ ls"), PLAIN_TEXT);
    }

    #[test]
    fn every_synonym_targets_a_notion_language() {
        for (_, lang) in SYNONYMS {
            assert!(NOTION_LANGUAGES.contains(lang), "{} not supported", lang);
        }
    }

    #[test]
    fn unknown_hint_falls_back_to_code() {
        assert_eq!(normalize_language(Some("language-brainfuck"), "#include <stdio.h>"), "c");
        assert_eq!(normalize_language(None, "$ /challenge/run\n"), "shell");
        assert_eq!(normalize_language(None, "hacker@dojo:~$ cat /flag"), "shell");
        assert_eq!(normalize_language(None, "from pwn import *\np = process('/challenge/run')"), "python");
        assert_eq!(normalize_language(None, "mov rax, 60\nsyscall"), "assembly");
        assert_eq!(normalize_language(None, "#!/bin/bash\necho hi"), "shell");
    }

    #[test]
    fn default_is_plain_text() {
        assert_eq!(normalize_language(None, "pwn.college{...}"), PLAIN_TEXT);
        assert_eq!(normalize_language(None, ""), PLAIN_TEXT);
    }
}
