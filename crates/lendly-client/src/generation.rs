//! # Generation Guard
//!
//! Keeps slow, superseded fetches from overwriting newer results.
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  time ─────────────────────────────────────────────────────────────►    │
//! │                                                                         │
//! │  issue() → N     fetch N ······································► done  │
//! │                                 issue() → N+1   fetch N+1 ──► done      │
//! │                                                       │           │     │
//! │                                                   commit(N+1)  commit(N)│
//! │                                                    Applied      Stale   │
//! │                                                                         │
//! │  • every request takes a token before its first await                   │
//! │  • a result is applied only if its token is still the newest issued     │
//! │  • stale requests still run to completion; their results are dropped    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Same idea as an election term used as a fencing token: a writer holding an
//! older number is refused.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Proof of which request produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of [`GenerationToken`]s.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, superseding every earlier token.
    pub fn issue(&self) -> GenerationToken {
        GenerationToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The newest token issued so far, if any.
    pub fn latest(&self) -> Option<GenerationToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(GenerationToken(n)),
        }
    }

    /// Whether no newer token has been issued since `token`.
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// What happened to a finished request's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The result was the newest and is now visible.
    Applied,
    /// A newer request was issued meanwhile; the result was dropped.
    Stale {
        token: GenerationToken,
        latest: GenerationToken,
    },
}

impl Commit {
    pub fn is_applied(&self) -> bool {
        matches!(self, Commit::Applied)
    }
}
