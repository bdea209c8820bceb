use std::fmt;

use clap::ValueEnum;

/// The core dojos scraped on every run, in scrape order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Dojo {
    IntroToCybersecurity,
    ProgramSecurity,
    SystemSecurity,
    SoftwareExploitation,
}

impl Dojo {
    pub const ALL: [Dojo; 4] = [
        Dojo::IntroToCybersecurity,
        Dojo::ProgramSecurity,
        Dojo::SystemSecurity,
        Dojo::SoftwareExploitation,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Dojo::IntroToCybersecurity => "intro-to-cybersecurity",
            Dojo::ProgramSecurity => "program-security",
            Dojo::SystemSecurity => "system-security",
            Dojo::SoftwareExploitation => "software-exploitation",
        }
    }

    /// Path of the dojo page relative to the platform origin, e.g. `/program-security/`.
    pub fn path(self) -> String {
        format!("/{}/", self.slug())
    }

    /// Display title: `intro-to-cybersecurity` → `Intro To Cybersecurity`.
    pub fn title(self) -> String {
        title_case(self.slug())
    }
}

impl fmt::Display for Dojo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        assert_eq!(Dojo::IntroToCybersecurity.title(), "Intro To Cybersecurity");
        assert_eq!(Dojo::SoftwareExploitation.title(), "Software Exploitation");
    }

    #[test]
    fn paths() {
        assert_eq!(Dojo::ProgramSecurity.path(), "/program-security/");
        assert_eq!(Dojo::SystemSecurity.to_string(), "system-security");
    }

    #[test]
    fn clap_names_match_slugs() {
        for dojo in Dojo::ALL {
            let value = dojo.to_possible_value().unwrap();
            assert_eq!(value.get_name(), dojo.slug());
        }
    }
}
