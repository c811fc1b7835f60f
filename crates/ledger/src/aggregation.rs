// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use contrib_fhe::Ciphertext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running encrypted sum of revealed Shapley values for one id. An entry only exists once a value
/// has been accumulated for the id, so presence in the engine is what marks a total initialized.
/// `total.is_initialized()` holds for every stored entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Ciphertext")]
pub struct AggregateTotal<C> {
    pub target_id: u64,
    pub total: C,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Ciphertext")]
pub struct AggregationEngine<C> {
    totals: BTreeMap<u64, AggregateTotal<C>>,
    participants: Vec<u64>,
}

impl<C: Ciphertext> Default for AggregationEngine<C> {
    fn default() -> Self {
        Self {
            totals: BTreeMap::new(),
            participants: Vec::new(),
        }
    }
}

impl<C: Ciphertext> AggregationEngine<C> {
    /// Add a revealed value to the id's encrypted total. The first accumulation for an id starts
    /// the total from zero and records the id as a participant.
    pub fn accumulate(&mut self, target_id: u64, value: u32) -> &C {
        let plain = C::from_plain(u64::from(value));
        let participants = &mut self.participants;
        let entry = self.totals.entry(target_id).or_insert_with(|| {
            participants.push(target_id);
            AggregateTotal {
                target_id,
                total: C::zero(),
            }
        });
        entry.total = entry.total.add(&plain);
        &entry.total
    }

    pub fn get_total(&self, target_id: u64) -> Option<&C> {
        self.totals.get(&target_id).map(|t| &t.total)
    }

    /// Ids with at least one accumulation, in order of their first accumulation
    pub fn participants(&self) -> &[u64] {
        &self.participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrib_fhe::TaggedCiphertext;

    #[test]
    fn totals_are_isolated_per_id() {
        let mut engine = AggregationEngine::<TaggedCiphertext>::default();
        engine.accumulate(1, 10);
        engine.accumulate(2, 3);
        engine.accumulate(1, 5);

        assert_eq!(engine.get_total(1).and_then(|c| c.reveal()), Some(15));
        assert_eq!(engine.get_total(2).and_then(|c| c.reveal()), Some(3));
        assert_eq!(engine.get_total(3), None);
    }

    #[test]
    fn participants_listed_once_in_first_seen_order() {
        let mut engine = AggregationEngine::<TaggedCiphertext>::default();
        engine.accumulate(4, 1);
        engine.accumulate(2, 1);
        engine.accumulate(4, 1);
        assert_eq!(engine.participants(), &[4, 2]);
    }

    #[test]
    fn accumulating_zero_still_initializes() {
        let mut engine = AggregationEngine::<TaggedCiphertext>::default();
        let total = engine.accumulate(1, 0).clone();
        assert!(total.is_initialized());
        assert_eq!(total.reveal(), Some(0));
    }
}
