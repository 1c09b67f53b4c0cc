/*
 *  Copyright 2025 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Department Path
//!
//! A `DepartmentPath` is an immutable value derived from a space-delimited
//! organizational hierarchy string, most-general segment first
//! (e.g. `"L1 L2.1 L3.1"`). It answers the parent/ancestor/relevance queries
//! that drive step access evaluation.
//!
//! Two paths are interchangeable when their strings match case-insensitively;
//! there is no identity beyond the string. Embedded spaces inside a segment
//! are not supported - this is a format constraint inherited by every
//! producer of these strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth tolerance for the relevance test. Organizational charts sometimes
/// skip intermediate levels, so relevance is intentionally approximate
/// rather than exact ancestry.
const RELEVANCE_LEVEL_TOLERANCE: usize = 2;

/// An organizational hierarchy path.
///
/// The input string is trimmed on construction and split on single spaces
/// into ordered segments. An empty or blank input normalizes to a single
/// empty segment, so `level()` is always at least 1 - callers must not
/// assume a path is non-empty.
///
/// # Examples
///
/// ```rust
/// use orgflow::DepartmentPath;
///
/// let path = DepartmentPath::new("L1 L2.1 L3.1");
/// assert_eq!(path.level(), 3);
/// assert_eq!(path.parent().as_str(), "L1 L2.1");
/// assert!(path.is_relevant(&DepartmentPath::new("L1 L2.1")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentPath {
    full: String,
}

impl DepartmentPath {
    /// Creates a path from a hierarchy string, trimming surrounding
    /// whitespace.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            full: path.into().trim().to_string(),
        }
    }

    /// Returns the full path string.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Returns the ordered segments of the path.
    ///
    /// Splitting is on single spaces; the empty path yields one empty
    /// segment.
    pub fn segments(&self) -> Vec<&str> {
        self.full.split(' ').collect()
    }

    /// Returns the number of hierarchy levels (segment count, minimum 1).
    pub fn level(&self) -> usize {
        self.segments().len()
    }

    /// Returns the path with the last segment removed.
    pub fn parent(&self) -> DepartmentPath {
        self.ancestor(1)
    }

    /// Returns the path with the last `n` segments removed.
    ///
    /// Removing every segment yields the empty path, which normalizes back
    /// to a single empty segment.
    pub fn ancestor(&self, n: usize) -> DepartmentPath {
        let segments = self.segments();
        let keep = segments.len().saturating_sub(n);
        DepartmentPath::new(segments[..keep].join(" "))
    }

    /// Returns the path truncated to the first `max(level, 1)` segments.
    pub fn to_level(&self, level: usize) -> DepartmentPath {
        let segments = self.segments();
        let keep = level.max(1).min(segments.len());
        DepartmentPath::new(segments[..keep].join(" "))
    }

    /// Ancestor/descendant/near-sibling test used everywhere resource-owner
    /// relevance is decided.
    ///
    /// True when the levels differ by at most 2 and either path is a
    /// case-insensitive string prefix of the other. Commutative by
    /// construction of the OR'd prefix check.
    pub fn is_relevant(&self, other: &DepartmentPath) -> bool {
        let delta = self.level().abs_diff(other.level());
        if delta > RELEVANCE_LEVEL_TOLERANCE {
            return false;
        }
        let a = self.full.to_lowercase();
        let b = other.full.to_lowercase();
        a.starts_with(&b) || b.starts_with(&a)
    }

    /// Strict ancestor check without the depth tolerance: true when `other`
    /// starts with this path's string (case-insensitive). A path is its own
    /// parent under this test.
    pub fn is_parent_of(&self, other: &DepartmentPath) -> bool {
        other
            .full
            .to_lowercase()
            .starts_with(&self.full.to_lowercase())
    }

    /// Case-insensitive full-string equality.
    pub fn is_department(&self, other: &DepartmentPath) -> bool {
        self.full.eq_ignore_ascii_case(&other.full)
    }

    /// Returns the last three segments joined, for display use only.
    /// Not authorization-relevant.
    pub fn short_name(&self) -> String {
        let segments = self.segments();
        let start = segments.len().saturating_sub(3);
        segments[start..].join(" ")
    }
}

impl From<&str> for DepartmentPath {
    fn from(path: &str) -> Self {
        DepartmentPath::new(path)
    }
}

impl fmt::Display for DepartmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full)
    }
}
