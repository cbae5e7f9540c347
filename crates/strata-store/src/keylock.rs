//! Canonical-id-scoped write serialization.
//!
//! Every mutation of a canonical object runs inside that object's token so
//! concurrent writers on the same canonical id cannot interleave, while
//! writes to different canonical ids proceed fully in parallel. Staleness
//! checks are re-verified after acquisition to close the read-then-lock
//! race window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strata_types::CanonicalId;

/// A map of per-canonical-id serialization tokens.
pub struct KeyLocks {
    locks: Mutex<HashMap<CanonicalId, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Create an empty lock map.
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the serialization token for `id`.
    ///
    /// Tokens are created lazily and kept for the process lifetime; the
    /// registry lock is only held long enough to fetch the token, never
    /// while `f` runs.
    pub fn with_key<R>(&self, id: CanonicalId, f: impl FnOnce() -> R) -> R {
        let token = {
            let mut locks = self.locks.lock().expect("lock poisoned");
            Arc::clone(locks.entry(id).or_default())
        };
        let _guard = token.lock().expect("lock poisoned");
        f()
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new()
    }
}
