// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

/// Content address of a notification. Two events share an id only when they have the same kind
/// and an equal payload, which is what the bus deduplicates on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId([u8; 32]);

impl EventId {
    pub fn from_payload<T: Hash>(kind: &str, payload: &T) -> Self {
        let mut fingerprint = DefaultHasher::new();
        payload.hash(&mut fingerprint);
        let digest = Sha256::new()
            .chain_update(kind.as_bytes())
            .chain_update(fingerprint.finish().to_be_bytes())
            .finalize();
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bs58::encode(self.0).into_string();
        let short: String = encoded.chars().take(8).collect();
        write!(f, "evt:{short}")
    }
}
