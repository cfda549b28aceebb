use std::fmt;

use crate::utils::config::ALL_NAMESPACES;

/// Which pods a fetch looks at. "All namespaces" is its own scope, not a
/// namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NamespaceScope {
    #[default]
    All,
    Named(String),
}

impl NamespaceScope {
    /// Interprets a persisted or selected value; the sentinel and the empty
    /// string both mean all namespaces.
    pub fn from_setting(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_NAMESPACES {
            NamespaceScope::All
        } else {
            NamespaceScope::Named(value.to_string())
        }
    }

    pub fn as_setting(&self) -> &str {
        match self {
            NamespaceScope::All => ALL_NAMESPACES,
            NamespaceScope::Named(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, NamespaceScope::All)
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => write!(f, "All Namespaces"),
            NamespaceScope::Named(name) => write!(f, "{}", name),
        }
    }
}
