// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use chrono::{DateTime, Utc};
use contrib_fhe::Ciphertext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Ciphertext")]
pub struct EncryptedUpdate<C> {
    pub id: u64,
    pub encrypted_weights: C,
    pub encrypted_metrics: C,
    pub submitted_at: DateTime<Utc>,
}

/// Append only store of submitted updates. Owns the id counter: ids start at 1, strictly
/// increase and are never reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Ciphertext")]
pub struct UpdateLedger<C> {
    last_id: u64,
    updates: BTreeMap<u64, EncryptedUpdate<C>>,
}

impl<C: Ciphertext> Default for UpdateLedger<C> {
    fn default() -> Self {
        Self {
            last_id: 0,
            updates: BTreeMap::new(),
        }
    }
}

impl<C: Ciphertext> UpdateLedger<C> {
    pub fn submit(
        &mut self,
        encrypted_weights: C,
        encrypted_metrics: C,
        submitted_at: DateTime<Utc>,
    ) -> u64 {
        self.last_id += 1;
        let id = self.last_id;
        self.updates.insert(
            id,
            EncryptedUpdate {
                id,
                encrypted_weights,
                encrypted_metrics,
                submitted_at,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<&EncryptedUpdate<C>> {
        self.updates.get(&id)
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
