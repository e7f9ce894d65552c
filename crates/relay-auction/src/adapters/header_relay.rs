//! # In-Memory Header Relay
//!
//! Keeps the relay's view of the tracked chain: headers by digest, their
//! heights and parent links, and the best tip. Only linkage is checked,
//! not proof of work.

use crate::domain::{Digest, RawHeader, RelayError};
use crate::ports::HeaderRelay;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Blocks per difficulty period on the tracked chain.
pub const RETARGET_PERIOD: u64 = 2016;

#[derive(Clone, Copy)]
struct StoredHeader {
    header: RawHeader,
    height: u64,
}

struct RelayStore {
    headers: HashMap<Digest, StoredHeader>,
    best: Digest,
}

impl RelayStore {
    fn height(&self, digest: &Digest) -> Result<u64, RelayError> {
        self.headers
            .get(digest)
            .map(|stored| stored.height)
            .ok_or(RelayError::UnknownDigest(*digest))
    }

    fn is_ancestor(&self, ancestor: &Digest, descendant: &Digest, limit: u64) -> bool {
        let mut cursor = *descendant;
        for _ in 0..=limit {
            if cursor == *ancestor {
                return true;
            }
            match self.headers.get(&cursor) {
                Some(stored) => cursor = stored.header.parent(),
                None => return false,
            }
        }
        false
    }

    fn append(&mut self, anchor: &Digest, headers: &[RawHeader]) -> Result<u64, RelayError> {
        if headers.is_empty() {
            return Err(RelayError::EmptyHeaders);
        }
        let base = self.height(anchor)?;

        let mut parent = *anchor;
        for (index, header) in headers.iter().enumerate() {
            if header.parent() != parent {
                return Err(RelayError::BrokenChain { index });
            }
            parent = header.digest();
        }

        let mut height = base;
        for header in headers {
            height += 1;
            self.headers
                .entry(header.digest())
                .or_insert(StoredHeader {
                    header: *header,
                    height,
                });
        }
        Ok(height)
    }
}

/// Header relay backed by a hash map.
pub struct InMemoryHeaderRelay {
    store: RwLock<RelayStore>,
}

impl InMemoryHeaderRelay {
    /// Relay whose chain starts at `genesis`, placed at `height`.
    pub fn new(genesis: RawHeader, height: u64) -> Self {
        let digest = genesis.digest();
        let mut headers = HashMap::new();
        headers.insert(
            digest,
            StoredHeader {
                header: genesis,
                height,
            },
        );
        Self {
            store: RwLock::new(RelayStore {
                headers,
                best: digest,
            }),
        }
    }

    /// Digest of the current best tip.
    pub fn best(&self) -> Digest {
        self.store.read().best
    }

    /// Number of stored headers.
    pub fn len(&self) -> usize {
        self.store.read().headers.len()
    }

    /// True if no header is stored.
    pub fn is_empty(&self) -> bool {
        self.store.read().headers.is_empty()
    }

    /// Stored header for `digest`.
    pub fn header(&self, digest: &Digest) -> Option<RawHeader> {
        self.store.read().headers.get(digest).map(|s| s.header)
    }
}

/// Build `count` headers extending `parent`. `salt` separates forks built
/// on the same parent.
pub fn chain_on(parent: &RawHeader, count: usize, salt: u32) -> Vec<RawHeader> {
    let mut headers = Vec::with_capacity(count);
    let mut previous = parent.digest();
    for nonce in 0..count as u32 {
        let header = RawHeader::from_parts(0x2000_0000, previous, [0; 32], salt, 0x1d00_ffff, nonce);
        previous = header.digest();
        headers.push(header);
    }
    headers
}

#[async_trait]
impl HeaderRelay for InMemoryHeaderRelay {
    async fn best_known_digest(&self) -> Result<Digest, RelayError> {
        Ok(self.store.read().best)
    }

    async fn height_of(&self, digest: Digest) -> Result<u64, RelayError> {
        self.store.read().height(&digest)
    }

    async fn is_ancestor(
        &self,
        ancestor: Digest,
        descendant: Digest,
        limit: u64,
    ) -> Result<bool, RelayError> {
        Ok(self.store.read().is_ancestor(&ancestor, &descendant, limit))
    }

    async fn add_headers(
        &self,
        anchor: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError> {
        let top = self.store.write().append(&anchor.digest(), headers)?;
        debug!(count = headers.len(), top, "[auction] relay appended headers");
        Ok(true)
    }

    async fn add_headers_with_retarget(
        &self,
        old_period_start: &RawHeader,
        old_period_end: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError> {
        let mut store = self.store.write();
        let start = store.height(&old_period_start.digest())?;
        let end = store.height(&old_period_end.digest())?;
        let span = end.saturating_sub(start);
        if end < start || span != RETARGET_PERIOD - 1 {
            return Err(RelayError::InvalidRetargetPeriod {
                actual: span,
                expected: RETARGET_PERIOD - 1,
            });
        }
        let top = store.append(&old_period_end.digest(), headers)?;
        debug!(count = headers.len(), top, "[auction] relay appended retarget headers");
        Ok(true)
    }

    async fn mark_new_heaviest(
        &self,
        ancestor: Digest,
        current_best: &RawHeader,
        new_best: &RawHeader,
        limit: u64,
    ) -> Result<bool, RelayError> {
        let mut store = self.store.write();
        let current_digest = current_best.digest();
        if current_digest != store.best {
            return Err(RelayError::NotBestTip(current_digest));
        }

        let new_digest = new_best.digest();
        let current = store.height(&current_digest)?;
        let candidate = store.height(&new_digest)?;
        store.height(&ancestor)?;

        if !store.is_ancestor(&ancestor, &new_digest, limit)
            || !store.is_ancestor(&ancestor, &current_digest, limit)
        {
            return Err(RelayError::NotAncestor { ancestor, limit });
        }
        if candidate <= current {
            return Err(RelayError::NotHeavier { current, candidate });
        }

        store.best = new_digest;
        info!(height = candidate, "[auction] relay best tip moved");
        Ok(true)
    }
}
