//! Recommendation lists
//!
//! Recommendations are kept in composition order: severity items first, then
//! disease items, then lab items. A reviewing doctor may replace the whole
//! list with their own items.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Which block of the composer produced an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationOrigin {
    /// Derived from the severity tier
    Severity,
    /// Derived from the disease identity
    Disease,
    /// Derived from an abnormal lab signal
    Lab,
    /// Written by a reviewing doctor
    Reviewer,
}

impl fmt::Display for RecommendationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Severity => "severity",
            Self::Disease => "disease",
            Self::Lab => "lab",
            Self::Reviewer => "reviewer",
        };
        write!(f, "{name}")
    }
}

/// A single recommendation item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    /// Block that produced the item
    pub origin: RecommendationOrigin,
    /// Recommendation text
    pub text: String,
}

impl Recommendation {
    /// Create a new recommendation item
    #[must_use]
    pub fn new(origin: RecommendationOrigin, text: impl Into<String>) -> Self {
        Self {
            origin,
            text: text.into(),
        }
    }
}

/// Ordered, append-only list of recommendations
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationList {
    items: SmallVec<[Recommendation; 8]>,
}

impl RecommendationList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one item
    pub fn push(&mut self, origin: RecommendationOrigin, text: impl Into<String>) {
        self.items.push(Recommendation::new(origin, text));
    }

    /// Append a block of items with the same origin
    pub fn extend_block<I, S>(&mut self, origin: RecommendationOrigin, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items
            .extend(texts.into_iter().map(|t| Recommendation::new(origin, t)));
    }

    /// All items in order
    #[must_use]
    pub fn items(&self) -> &[Recommendation] {
        &self.items
    }

    /// Recommendation texts in order
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.text.as_str()).collect()
    }

    /// Items from a single block, in order
    pub fn by_origin(&self, origin: RecommendationOrigin) -> impl Iterator<Item = &Recommendation> {
        self.items.iter().filter(move |r| r.origin == origin)
    }

    /// Whether any item came from the given block
    #[must_use]
    pub fn has_origin(&self, origin: RecommendationOrigin) -> bool {
        self.items.iter().any(|r| r.origin == origin)
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for RecommendationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "{}. [{}] {}", i + 1, item.origin, item.text)?;
        }
        Ok(())
    }
}
