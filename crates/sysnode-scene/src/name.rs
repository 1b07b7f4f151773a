//! Namespace-qualified node names
//!
//! Provides [`NamePath`] for splitting names such as `rig:body:ctrl` into
//! their namespace and leaf parts.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between namespace segments and the leaf name
pub const NAMESPACE_SEPARATOR: char = ':';

/// Name split on the namespace separator
///
/// The last segment of a node name is its leaf; everything before it is the
/// namespace. A namespace path is simply a `NamePath` without a leaf.
///
/// # Examples
/// - `duck` → namespace `""`, leaf `duck`
/// - `farm:pond:duck` → namespace `farm:pond`, leaf `duck`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamePath(Vec<String>);

impl NamePath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Empty path (root namespace)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root namespace
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment (the leaf name)
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Everything but the leaf
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Namespace part as a string, empty for root-level names
    #[must_use]
    pub fn namespace(&self) -> String {
        self.parent().map(|p| p.to_string()).unwrap_or_default()
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this path lives strictly inside the namespace `ns`
    ///
    /// Every non-root path is within the root namespace.
    #[inline]
    #[must_use]
    pub fn is_within(&self, ns: &Self) -> bool {
        ns.0.len() < self.0.len() && ns.is_prefix_of(self)
    }

    /// Swap the leading `from` segments for `to`
    ///
    /// Returns `None` if `from` is not a prefix of this path.
    #[must_use]
    pub fn reparent(&self, from: &Self, to: &Self) -> Option<Self> {
        if !from.is_prefix_of(self) {
            return None;
        }
        let mut segments = to.0.clone();
        segments.extend_from_slice(&self.0[from.0.len()..]);
        Some(Self(segments))
    }

    /// Iterator over every enclosing namespace, outermost first
    ///
    /// `a:b:c` yields `a`, then `a:b`.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }
}

/// Namespace part of a raw name without validating it
///
/// `ns:duck` → `ns`, `duck` → `""`, `ns:` → `ns`.
#[inline]
#[must_use]
pub fn namespace_of(name: &str) -> &str {
    name.rsplit_once(NAMESPACE_SEPARATOR)
        .map_or("", |(ns, _)| ns)
}

/// True if the raw name ends with the namespace separator (`ns:`)
#[inline]
#[must_use]
pub fn ends_with_separator(name: &str) -> bool {
    name.ends_with(NAMESPACE_SEPARATOR)
}

impl Display for NamePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, "{NAMESPACE_SEPARATOR}")?;
            }
            first = false;
            f.write_str(seg)?;
        }
        Ok(())
    }
}

impl FromStr for NamePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = s
            .split(NAMESPACE_SEPARATOR)
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else if seg.starts_with(|c: char| c.is_ascii_digit()) {
                    Err(PathError::LeadingDigit(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Default for NamePath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to node and namespace names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in name
    #[error("name '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),

    /// Segment starts with a digit
    #[error("invalid segment: {0} (must not start with a digit)")]
    LeadingDigit(String),
}
