//! Scope identifiers confining one sanitized document's CSS to its own
//! container.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

pub const DEFAULT_SCOPE_PREFIX: &str = "defanged";

static PROCESS_COUNTER: LazyLock<Arc<ScopeCounter>> =
    LazyLock::new(|| Arc::new(ScopeCounter::new()));

/// The id of one sanitization call, e.g. `defanged42`.
///
/// Used verbatim as the container's `id` and as the `<scope>-` prefix of every
/// rewritten id, class, `for` reference and keyframes name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(prefix: &str, serial: u64) -> Self {
        ScopeId(format!("{prefix}{serial}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `name` moved into this scope's namespace: `<scope>-<name>`.
    pub fn prefixed(&self, name: &str) -> String {
        format!("{}-{}", self.0, name)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out scope serials. Never reset and never reuses a value, so any two
/// calls sharing a counter get distinct ids; share it through an `Arc` when
/// several sanitizers render into the same page.
#[derive(Debug, Default)]
pub struct ScopeCounter {
    next: AtomicU64,
}

impl ScopeCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(serial: u64) -> Self {
        ScopeCounter {
            next: AtomicU64::new(serial),
        }
    }

    /// The counter shared by every sanitizer in this process that was not
    /// given one explicitly.
    pub fn process_wide() -> Arc<ScopeCounter> {
        Arc::clone(&PROCESS_COUNTER)
    }

    pub fn allocate(&self, prefix: &str) -> ScopeId {
        let serial = self.next.fetch_add(1, Ordering::Relaxed);
        ScopeId::new(prefix, serial)
    }
}
