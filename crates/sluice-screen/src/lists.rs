//! Operator-curated address lists.

use std::collections::HashSet;

use sluice_core::address::Address;

/// Blocklist and allowlist, matched on the encoded address form.
///
/// A blocklist hit outranks an allowlist hit; the scorer checks in
/// that order.
#[derive(Debug, Default, Clone)]
pub struct Lists {
    blocked: HashSet<String>,
    allowed: HashSet<String>,
}

impl Lists {
    pub fn new(
        blocked: impl IntoIterator<Item = String>,
        allowed: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            blocked: blocked.into_iter().collect(),
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_blocked(&self, address: &Address) -> bool {
        self.blocked.contains(&address.encode())
    }

    pub fn is_allowed(&self, address: &Address) -> bool {
        self.allowed.contains(&address.encode())
    }

    /// (blocked, allowed) entry counts, for startup logging.
    pub fn counts(&self) -> (usize, usize) {
        (self.blocked.len(), self.allowed.len())
    }
}
