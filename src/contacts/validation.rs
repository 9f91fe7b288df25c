//! Company name normalization
//!
//! Company identity within a tenant is the case-insensitive, trimmed name.
//! Fields are private to force construction through [`CompanyName::parse`].

use std::fmt;

/// Trimmed, non-empty company name with its lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyName {
    display: String,
    key: String,
}

impl CompanyName {
    /// Parse a free-text company name.
    ///
    /// Returns `None` for blank input; blank names are treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let display = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            return None;
        }
        let key = display.to_lowercase();
        Some(Self { display, key })
    }

    /// Name as it should be stored
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case-insensitive lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether two raw names denote the same company
    pub fn same(a: &str, b: &str) -> bool {
        match (Self::parse(a), Self::parse(b)) {
            (Some(a), Some(b)) => a.key == b.key,
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Best-effort website domain guess from a company name: `"Acme Corp"` -> `"acmecorp.com"`.
pub fn guess_domain(name: &CompanyName) -> Option<String> {
    let slug: String = name
        .key()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if slug.is_empty() {
        None
    } else {
        Some(format!("{}.com", slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_collapses() {
        let name = CompanyName::parse("  Acme   Corp ").unwrap();
        assert_eq!(name.as_str(), "Acme Corp");
        assert_eq!(name.key(), "acme corp");
    }

    #[test]
    fn test_blank_is_absent() {
        assert!(CompanyName::parse("").is_none());
        assert!(CompanyName::parse("   ").is_none());
    }

    #[test]
    fn test_same_is_case_insensitive() {
        assert!(CompanyName::same("ACME corp", "acme Corp"));
        assert!(!CompanyName::same("Acme", "Acme Labs"));
        assert!(!CompanyName::same("Acme", " "));
    }

    #[test]
    fn test_guess_domain() {
        let name = CompanyName::parse("Acme & Sons, Inc.").unwrap();
        assert_eq!(guess_domain(&name).as_deref(), Some("acmesonsinc.com"));
        let symbols = CompanyName::parse("&&&").unwrap();
        assert_eq!(guess_domain(&symbols), None);
    }
}
