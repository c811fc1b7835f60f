// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub participant_id: u64,
    pub shapley_value: u32,
    pub revealed: bool,
}

impl ContributionRecord {
    fn unrevealed(participant_id: u64) -> Self {
        Self {
            participant_id,
            shapley_value: 0,
            revealed: false,
        }
    }
}

/// Per update record of the revealed Shapley value. A record goes from unrevealed to revealed
/// exactly once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionLedger {
    records: BTreeMap<u64, ContributionRecord>,
}

impl ContributionLedger {
    pub fn open(&mut self, id: u64) {
        self.records
            .entry(id)
            .or_insert_with(|| ContributionRecord::unrevealed(id));
    }

    pub fn get(&self, id: u64) -> Option<&ContributionRecord> {
        self.records.get(&id)
    }

    pub fn is_revealed(&self, id: u64) -> bool {
        self.records.get(&id).is_some_and(|r| r.revealed)
    }

    /// Check and set. Fails without touching the record when it is missing or already revealed.
    pub fn mark_revealed(&mut self, id: u64, shapley_value: u32) -> Result<(), ProtocolError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(ProtocolError::NotFound(id))?;
        if record.revealed {
            return Err(ProtocolError::AlreadyRevealed(id));
        }
        record.shapley_value = shapley_value;
        record.revealed = true;
        Ok(())
    }
}
