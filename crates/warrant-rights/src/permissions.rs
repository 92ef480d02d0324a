//! Permission symbol sets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A set of single-character permission symbols (e.g. `r`, `w`, `R`, `W`).
///
/// Order and repetition in the source string are irrelevant: `"wrr"` and
/// `"rw"` are the same set. The [`Display`](fmt::Display) form lists the
/// symbols in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Permissions(BTreeSet<char>);

impl Permissions {
    /// The empty set, granting nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from every character of `symbols`.
    #[must_use]
    pub fn parse(symbols: &str) -> Self {
        Self(symbols.chars().collect())
    }

    /// Symbols present in both `self` and `other`.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// Whether `symbol` is in the set.
    #[must_use]
    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains(&symbol)
    }

    /// Whether every symbol of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the symbols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

impl FromStr for Permissions {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Permissions {
    fn from(symbols: &str) -> Self {
        Self::parse(symbols)
    }
}

impl From<String> for Permissions {
    fn from(symbols: String) -> Self {
        Self::parse(&symbols)
    }
}

impl From<Permissions> for String {
    fn from(permissions: Permissions) -> Self {
        permissions.to_string()
    }
}

impl FromIterator<char> for Permissions {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Intersect two permission strings, returning the common symbols sorted.
#[must_use]
pub fn intersect_permissions(requested: &str, granted: &str) -> String {
    Permissions::parse(requested)
        .intersect(&Permissions::parse(granted))
        .to_string()
}
