// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RequestId;
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Delivers the cleartext of an aggregate total. Nothing in the protocol state changes when a
/// total is decrypted, subscribers to this event are the sink for the value.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ContributionTotalDecrypted {
    pub id: u64,
    pub request_id: RequestId,
    pub value: u64,
}

impl Display for ContributionTotalDecrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, request_id: {}, value: {}",
            self.id, self.request_id, self.value
        )
    }
}
