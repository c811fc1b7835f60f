// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use contrib_events::RequestId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("A decryption request needs at least one ciphertext handle")]
    EmptyRequest,
    #[error("Request {0} contains an uninitialized ciphertext handle")]
    UninitializedHandle(RequestId),
    #[error("Invalid oracle key: {0}")]
    InvalidKey(String),
    #[error("Oracle gateway state is unavailable")]
    Unavailable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleartextError {
    #[error("cleartext payload length {0} is not a multiple of 32 bytes")]
    Misaligned(usize),
    #[error("cleartext payload has no word at index {0}")]
    MissingWord(usize),
    #[error("cleartext word {index} does not fit in {bits} bits")]
    Overflow { index: usize, bits: u32 },
}
