// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Ciphertext;
use serde::{Deserialize, Serialize};

/// Stand-in ciphertext that carries the value it represents in the clear.
///
/// Additions are tracked so that two handles compare equal exactly when they encrypt the same
/// value. `TaggedCiphertext::default()` is the uninitialized handle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedCiphertext {
    value: Option<u64>,
}

impl TaggedCiphertext {
    pub fn encrypt(value: u64) -> Self {
        Self { value: Some(value) }
    }

    /// The value this handle stands for. `None` for an uninitialized handle.
    pub fn reveal(&self) -> Option<u64> {
        self.value
    }
}

impl Ciphertext for TaggedCiphertext {
    fn zero() -> Self {
        Self::encrypt(0)
    }

    fn from_plain(value: u64) -> Self {
        Self::encrypt(value)
    }

    fn add(&self, other: &Self) -> Self {
        // An uninitialized operand behaves like an encryption of zero
        let lhs = self.value.unwrap_or_default();
        let rhs = other.value.unwrap_or_default();
        Self::encrypt(lhs.saturating_add(rhs))
    }

    fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}
