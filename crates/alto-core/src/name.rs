use std::hash::{Hash, Hasher};

use smol_str::SmolStr;

/// An AL identifier as written in source.
///
/// AL identifiers are case-insensitive and may be quoted (`"No."`). Equality
/// and hashing ignore both case and surrounding quotes; the original spelling
/// is kept for rendering.
#[derive(Clone, Debug)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    /// The identifier exactly as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without surrounding double quotes.
    pub fn unquoted(&self) -> &str {
        unquote(&self.0)
    }

    pub fn is_quoted(&self) -> bool {
        self.0.len() >= 2 && self.0.starts_with('"') && self.0.ends_with('"')
    }

    /// Case- and quote-insensitive comparison against raw identifier text.
    pub fn matches(&self, other: &str) -> bool {
        self.unquoted().eq_ignore_ascii_case(unquote(other))
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.unquoted().bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_case_and_quotes() {
        assert_eq!(Name::new("Customer"), Name::new("CUSTOMER"));
        assert_eq!(Name::new("\"Sales Header\""), Name::new("\"sales header\""));
        assert_eq!(Name::new("\"Amount\""), Name::new("amount"));
        assert_ne!(Name::new("No"), Name::new("No."));
    }

    #[test]
    fn hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(Name::new("Rec"));
        assert!(set.contains(&Name::new("\"REC\"")));
    }
}
