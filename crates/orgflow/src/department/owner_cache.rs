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

//! Department Owner Cache
//!
//! Time-bounded cache mapping a department identifier to its resource-owner
//! identity and searchable text. Authorization checks hit this cache instead
//! of round-tripping to the department directory on every evaluation.
//!
//! Staleness is tracked as a single scalar: the earliest expiry across all
//! entries. Once that entry has expired the whole cache is treated as stale
//! and must be refreshed from source - a slightly eager invalidation in
//! exchange for an O(1) staleness check.
//!
//! The cache is shared across concurrent authorization checks; all mutation
//! happens under a mutex since `first_expiry` is derived from set-wide state.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Default entry time-to-live: one day.
const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// A cached department ownership record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentOwner {
    /// Department identifier (hierarchy path string).
    pub department_id: String,
    /// Identity of the resource owner for this department.
    pub resource_owner_id: String,
    /// Free text matched by [`DepartmentOwnerCache::search`].
    pub search_text: String,
}

struct CacheEntry {
    owner: DepartmentOwner,
    expires_at: DateTime<Utc>,
}

struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Earliest absolute expiry across all entries; unset when empty.
    first_expiry: Option<DateTime<Utc>>,
}

/// Shared TTL cache of department resource owners.
pub struct DepartmentOwnerCache {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl DepartmentOwnerCache {
    /// Creates an empty cache with the default one-day TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    /// Creates an empty cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                first_expiry: None,
            }),
            ttl,
        }
    }

    /// Inserts or replaces an entry, stamping its expiry at `now + TTL`.
    pub fn upsert(&self, item: DepartmentOwner) {
        self.upsert_at(item, Utc::now());
    }

    /// Inserts or replaces an entry against an explicit clock.
    pub fn upsert_at(&self, item: DepartmentOwner, now: DateTime<Utc>) {
        let expires_at = now + self.ttl;
        let mut state = self.state.lock();
        state.first_expiry = Some(match state.first_expiry {
            Some(first) => first.min(expires_at),
            None => expires_at,
        });
        debug!(
            department_id = %item.department_id,
            expires_at = %expires_at,
            "Cached department owner"
        );
        state.entries.insert(
            item.department_id.to_lowercase(),
            CacheEntry {
                owner: item,
                expires_at,
            },
        );
    }

    /// Whole-cache validity check: true only while every entry is fresh.
    ///
    /// Returns false when the cache is empty or the earliest-expiring entry
    /// has passed its expiry, signalling a refresh from source.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Validity check against an explicit clock.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.state.lock().first_expiry {
            Some(first) => now < first,
            None => false,
        }
    }

    /// Looks up a department by identifier (case-insensitive).
    pub fn get(&self, department_id: &str) -> Option<DepartmentOwner> {
        self.state
            .lock()
            .entries
            .get(&department_id.to_lowercase())
            .map(|entry| entry.owner.clone())
    }

    /// Case-insensitive substring search over entry search text.
    ///
    /// An empty query returns every entry.
    pub fn search(&self, text: &str) -> Vec<DepartmentOwner> {
        let needle = text.to_lowercase();
        self.state
            .lock()
            .entries
            .values()
            .filter(|entry| {
                needle.is_empty() || entry.owner.search_text.to_lowercase().contains(&needle)
            })
            .map(|entry| entry.owner.clone())
            .collect()
    }

    /// Empties storage and unsets the first expiry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.first_expiry = None;
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DepartmentOwnerCache {
    fn default() -> Self {
        Self::new()
    }
}
