// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Handle to an encrypted value managed by an external encryption library.
///
/// The protocol never looks inside a handle. It only needs to create the additive identity, lift
/// a cleartext into the ciphertext space, add two handles and ask whether a handle has been
/// initialized. Handles are serializable so they can be stored in protocol snapshots.
pub trait Ciphertext:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// Encryption of zero
    fn zero() -> Self;

    /// Trivial encryption of a cleartext value
    fn from_plain(value: u64) -> Self;

    /// Homomorphic addition
    fn add(&self, other: &Self) -> Self;

    /// Whether the handle refers to an actual encrypted value
    fn is_initialized(&self) -> bool;
}
