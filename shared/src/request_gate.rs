//! Request tokens for discarding stale responses.
//!
//! Every fetch is issued a token from a counter shared by all keys of one
//! gate. Only the latest token issued for a key is current; a response that
//! arrives carrying an older token is stale and must be dropped. There is no
//! real cancellation: superseding a request is the cancellation.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct RequestGate<K> {
    counter: u64,
    latest: HashMap<K, RequestToken>,
}

impl<K> Default for RequestGate<K> {
    fn default() -> Self {
        Self {
            counter: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RequestGate<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `key`, invalidating any earlier one.
    pub fn issue(&mut self, key: K) -> RequestToken {
        self.counter += 1;
        let token = RequestToken(self.counter);
        self.latest.insert(key, token);
        token
    }

    /// True iff no newer `issue` has happened for `key` since `token`.
    #[must_use]
    pub fn is_current(&self, key: &K, token: RequestToken) -> bool {
        self.latest.get(key) == Some(&token)
    }
}
