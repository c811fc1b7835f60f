// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RequestId;
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A decryption of an individual contribution was requested from the oracle.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct DecryptionRequested {
    pub id: u64,
    pub request_id: RequestId,
}

impl Display for DecryptionRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id: {}, request_id: {}", self.id, self.request_id)
    }
}

/// A decryption of the aggregate total for an id was requested from the oracle.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct TotalDecryptionRequested {
    pub id: u64,
    pub request_id: RequestId,
}

impl Display for TotalDecryptionRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id: {}, request_id: {}", self.id, self.request_id)
    }
}
