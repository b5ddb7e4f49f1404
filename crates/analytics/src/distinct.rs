//! Distinct counting over identity keys.
//!
//! An absent key is one bucket of its own; an empty string is a present
//! key distinct from absent. With [`KeyPolicy::Exact`] no normalization is
//! applied, so `A@x.com` and `a@x.com` count as two customers.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How identity keys are compared before counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// Raw value, byte-for-byte.
    #[default]
    Exact,
    /// Trimmed and lowercased.
    CaseInsensitive,
}

impl KeyPolicy {
    fn normalize<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self {
            Self::Exact => Cow::Borrowed(key),
            Self::CaseInsensitive => Cow::Owned(key.trim().to_lowercase()),
        }
    }
}

/// Hashed set of optional keys.
#[derive(Debug, Default)]
pub struct DistinctCounter<'a> {
    policy: KeyPolicy,
    seen: HashSet<Option<Cow<'a, str>>>,
}

impl<'a> DistinctCounter<'a> {
    pub fn new(policy: KeyPolicy) -> Self {
        Self {
            policy,
            seen: HashSet::new(),
        }
    }

    pub fn insert(&mut self, key: Option<&'a str>) {
        let policy = self.policy;
        self.seen.insert(key.map(|k| policy.normalize(k)));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
