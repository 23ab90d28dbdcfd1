//! Hierarchical document identifiers
//!
//! Uids encode parent/child document families as `<parent>[.<child>]*`.
//! The separator `.` is reserved and may not appear inside a segment, so
//! ancestors always sort before their descendants under lexicographic order.

use std::borrow::Borrow;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{HierarchyError, HierarchyResult};

/// Reserved hierarchy separator. Must not appear in legal uid content.
pub const HIERARCHY_SEPARATOR: char = '.';

/// Grammar for a legal uid: non-empty segments joined by the separator.
fn uid_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new(r"^[^.]+(\.[^.]+)*$").expect("uid grammar is a valid regex"))
}

/// A validated hierarchical document identifier.
///
/// Ordering is lexicographic on the raw string, which places every ancestor
/// before all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Parses and validates a raw uid string.
    pub fn parse(raw: impl Into<String>) -> HierarchyResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(HierarchyError::Empty);
        }
        if !uid_grammar().is_match(&raw) {
            return Err(HierarchyError::EmptySegment(raw));
        }
        Ok(Self(raw))
    }

    /// Wraps a string already known to satisfy the uid grammar.
    pub(crate) fn from_validated(raw: String) -> Self {
        Self(raw)
    }

    /// Returns the raw uid string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of hierarchy segments.
    pub fn depth(&self) -> usize {
        self.0.split(HIERARCHY_SEPARATOR).count()
    }

    /// Returns true if `other` is a strict descendant of this uid, i.e.
    /// `other` begins with this uid followed by the separator.
    pub fn is_ancestor_of(&self, other: &Uid) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(HIERARCHY_SEPARATOR)
    }

    /// Returns true if this uid is a strict descendant of `other`.
    pub fn is_descendant_of(&self, other: &Uid) -> bool {
        other.is_ancestor_of(self)
    }

    /// Returns the immediate parent, or None for a top-level uid.
    pub fn parent(&self) -> Option<Uid> {
        self.0
            .rfind(HIERARCHY_SEPARATOR)
            .map(|at| Uid(self.0[..at].to_string()))
    }

    /// Iterates the strict ancestors of this uid, nearest parent first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { remaining: &self.0 }
    }

    /// Appends a child discriminator, producing a descendant uid.
    pub fn child(&self, discriminator: &str) -> HierarchyResult<Uid> {
        Uid::parse(format!("{}{}{}", self.0, HIERARCHY_SEPARATOR, discriminator))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Uid {
    type Error = HierarchyError;

    fn try_from(raw: String) -> HierarchyResult<Self> {
        Uid::parse(raw)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> String {
        uid.0
    }
}

// Ord on Uid is the Ord on its raw string, so str-keyed range queries over
// sets of uids are sound.
impl Borrow<str> for Uid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Iterator over the strict ancestors of a uid, nearest parent first.
#[derive(Debug)]
pub struct Ancestors<'a> {
    remaining: &'a str,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Uid;

    fn next(&mut self) -> Option<Uid> {
        let at = self.remaining.rfind(HIERARCHY_SEPARATOR)?;
        self.remaining = &self.remaining[..at];
        Some(Uid(self.remaining.to_string()))
    }
}
