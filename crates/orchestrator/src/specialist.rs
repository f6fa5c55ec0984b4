//! Specialist identifiers and their static routing metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A registered specialist agent.
///
/// Variants are declared in lexical order of their identifiers, which is
/// also the order used to break routing ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    GitHub,
    Math,
}

/// Names accepted by a manual switch, in the order they are listed to users.
pub const SWITCH_ALIASES: [(&str, Specialist); 6] = [
    ("github", Specialist::GitHub),
    ("git", Specialist::GitHub),
    ("code", Specialist::GitHub),
    ("math", Specialist::Math),
    ("calc", Specialist::Math),
    ("calculator", Specialist::Math),
];

impl Specialist {
    pub const ALL: [Specialist; 2] = [Specialist::GitHub, Specialist::Math];

    /// Stable identifier, as used in classifier answers and API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Specialist::GitHub => "github",
            Specialist::Math => "math",
        }
    }

    /// User-facing name, e.g. "Math Agent".
    pub fn display_name(self) -> &'static str {
        match self {
            Specialist::GitHub => "Github Agent",
            Specialist::Math => "Math Agent",
        }
    }

    /// Keyword table used by keyword scoring.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Specialist::GitHub => &[
                "github",
                "repository",
                "repo",
                "code",
                "file",
                "branch",
                "commit",
                "pull",
                "issue",
                "fork",
            ],
            Specialist::Math => &[
                "calculate",
                "math",
                "add",
                "subtract",
                "multiply",
                "divide",
                "equation",
                "expression",
                "number",
                "compute",
            ],
        }
    }

    /// Resolve a manual-switch name or alias, case-insensitively.
    pub fn from_alias(name: &str) -> Option<Specialist> {
        let name = name.trim().to_lowercase();
        SWITCH_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, specialist)| *specialist)
    }

    /// Comma-separated alias list for error messages.
    pub fn alias_list() -> String {
        SWITCH_ALIASES
            .iter()
            .map(|(alias, _)| *alias)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialist {
    type Err = ();

    /// Parses an exact identifier only; aliases go through [`Specialist::from_alias`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialist::ALL
            .into_iter()
            .find(|specialist| specialist.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_lexically_ordered() {
        let ids: Vec<_> = Specialist::ALL.iter().map(|s| s.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Specialist::from_alias("git"), Some(Specialist::GitHub));
        assert_eq!(Specialist::from_alias("Calculator"), Some(Specialist::Math));
        assert_eq!(Specialist::from_alias("nonexistent"), None);
        assert_eq!(
            Specialist::alias_list(),
            "github, git, code, math, calc, calculator"
        );
    }

    #[test]
    fn test_from_str_exact_only() {
        assert_eq!("math".parse::<Specialist>(), Ok(Specialist::Math));
        assert!("calc".parse::<Specialist>().is_err());
        assert!("Math".parse::<Specialist>().is_err());
    }

    #[test]
    fn test_serde_identifiers() {
        assert_eq!(serde_json::to_string(&Specialist::GitHub).unwrap(), "\"github\"");
        assert_eq!(serde_json::to_string(&Specialist::Math).unwrap(), "\"math\"");
    }
}
