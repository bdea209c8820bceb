use crate::dojo::Dojo;

/// A module link scraped from a dojo page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub slug: String,
    pub solvers: u32,
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

impl Module {
    /// Module page path, e.g. `/program-security/memory-errors/`.
    pub fn path(&self, dojo: Dojo) -> String {
        format!("/{}/{}/", dojo.slug(), self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub name: String,
    /// Raw HTML of the description, converted to blocks only on export.
    pub description: Option<String>,
}

/// One output row: a module and its challenges. Never built with zero challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub dojo: Dojo,
    pub module: Module,
    pub challenges: Vec<Challenge>,
}

impl Record {
    /// Key the Markdown table is ordered by.
    pub fn sort_key(&self) -> (String, &str, String) {
        (self.dojo.title(), self.module.name.as_str(), self.challenge_list(false))
    }

    /// Challenge names joined with `", "`, optionally wrapped in backticks.
    pub fn challenge_list(&self, quoted: bool) -> String {
        self.challenges
            .iter()
            .map(|c| if quoted { format!("`{}`", c.name) } else { c.name.clone() })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn assemble(dojo: Dojo, module: Module, challenges: Vec<Challenge>) -> Option<Record> {
    if challenges.is_empty() {
        return None;
    }
    Some(Record {
        dojo,
        module,
        challenges,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn empty_module_not_assembled() {
        assert!(assemble(Dojo::ProgramSecurity, module("Empty"), vec![]).is_none());
    }

    #[test]
    fn challenge_list_quoting() {
        let r = assemble(
            Dojo::ProgramSecurity,
            module("Memory Errors"),
            vec![challenge("Challenge A"), challenge("Challenge B")],
        )
        .unwrap();
        assert_eq!(r.challenge_list(true), "`Challenge A`, `Challenge B`");
        assert_eq!(r.challenge_list(false), "Challenge A, Challenge B");
        assert_eq!(r.module.path(r.dojo), "/program-security/memory-errors/");
    }
}
