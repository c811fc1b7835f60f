// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CleartextError;
use serde::{Deserialize, Serialize};

pub const WORD_SIZE: usize = 32;

/// Cleartext payload returned by the oracle: one 32 byte big-endian word for every ciphertext
/// handle of the request, in request order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cleartexts(Vec<u8>);

impl Cleartexts {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn encode(values: &[u64]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * WORD_SIZE);
        for value in values {
            bytes.extend_from_slice(&[0u8; WORD_SIZE - 8]);
            bytes.extend_from_slice(&value.to_be_bytes());
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn word(&self, index: usize) -> Result<&[u8], CleartextError> {
        if self.0.len() % WORD_SIZE != 0 {
            return Err(CleartextError::Misaligned(self.0.len()));
        }
        let start = index * WORD_SIZE;
        self.0
            .get(start..start + WORD_SIZE)
            .ok_or(CleartextError::MissingWord(index))
    }

    pub fn decode_u64(&self, index: usize) -> Result<u64, CleartextError> {
        let word = self.word(index)?;
        let (high, low) = word.split_at(WORD_SIZE - 8);
        if high.iter().any(|b| *b != 0) {
            return Err(CleartextError::Overflow { index, bits: 64 });
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(low);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn decode_u32(&self, index: usize) -> Result<u32, CleartextError> {
        let value = self.decode_u64(index)?;
        u32::try_from(value).map_err(|_| CleartextError::Overflow { index, bits: 32 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_words_in_order() {
        let cleartexts = Cleartexts::encode(&[30, 7]);
        assert_eq!(cleartexts.len(), 64);
        assert_eq!(cleartexts.decode_u32(0), Ok(30));
        assert_eq!(cleartexts.decode_u64(1), Ok(7));
        assert_eq!(
            cleartexts.decode_u32(2),
            Err(CleartextError::MissingWord(2))
        );
    }

    #[test]
    fn rejects_values_too_wide_for_target() {
        let cleartexts = Cleartexts::encode(&[u64::from(u32::MAX) + 1]);
        assert_eq!(
            cleartexts.decode_u32(0),
            Err(CleartextError::Overflow { index: 0, bits: 32 })
        );
        assert_eq!(cleartexts.decode_u64(0), Ok(u64::from(u32::MAX) + 1));

        let mut wide = vec![0u8; WORD_SIZE];
        wide[0] = 1;
        assert_eq!(
            Cleartexts::from_bytes(wide).decode_u64(0),
            Err(CleartextError::Overflow { index: 0, bits: 64 })
        );
    }

    #[test]
    fn rejects_misaligned_payload() {
        let cleartexts = Cleartexts::from_bytes(vec![0u8; 33]);
        assert_eq!(cleartexts.decode_u32(0), Err(CleartextError::Misaligned(33)));
        assert_eq!(
            Cleartexts::default().decode_u32(0),
            Err(CleartextError::MissingWord(0))
        );
    }
}
