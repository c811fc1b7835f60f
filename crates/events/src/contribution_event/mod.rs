// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod contribution_error;
mod contribution_revealed;
mod contribution_total_decrypted;
mod decryption_requested;
mod update_submitted;

pub use contribution_error::*;
pub use contribution_revealed::*;
pub use contribution_total_decrypted::*;
pub use decryption_requested::*;
pub use update_submitted::*;

use crate::{ErrorEvent, Event, EventId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to help define From traits for ContributionEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for ContributionEvent {
                fn from(data: $variant) -> Self {
                    ContributionEvent::$variant {
                        id: EventId::from_payload(stringify!($variant), &data),
                        data,
                    }
                }
            }
        )*
    };
}

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum ContributionEvent {
    UpdateSubmitted {
        id: EventId,
        data: UpdateSubmitted,
    },
    DecryptionRequested {
        id: EventId,
        data: DecryptionRequested,
    },
    ContributionRevealed {
        id: EventId,
        data: ContributionRevealed,
    },
    TotalDecryptionRequested {
        id: EventId,
        data: TotalDecryptionRequested,
    },
    ContributionTotalDecrypted {
        id: EventId,
        data: ContributionTotalDecrypted,
    },
    ContributionError {
        id: EventId,
        data: ContributionError,
    },
}

impl ContributionEvent {
    pub fn get_id(&self) -> EventId {
        self.clone().into()
    }

    /// The update id the event refers to, if any
    pub fn get_target_id(&self) -> Option<u64> {
        match self {
            ContributionEvent::UpdateSubmitted { data, .. } => Some(data.id),
            ContributionEvent::DecryptionRequested { data, .. } => Some(data.id),
            ContributionEvent::ContributionRevealed { data, .. } => Some(data.id),
            ContributionEvent::TotalDecryptionRequested { data, .. } => Some(data.id),
            ContributionEvent::ContributionTotalDecrypted { data, .. } => Some(data.id),
            ContributionEvent::ContributionError { .. } => None,
        }
    }

    pub fn get_data(&self) -> String {
        match self {
            ContributionEvent::UpdateSubmitted { data, .. } => format!("{}", data),
            ContributionEvent::DecryptionRequested { data, .. } => format!("{}", data),
            ContributionEvent::ContributionRevealed { data, .. } => format!("{}", data),
            ContributionEvent::TotalDecryptionRequested { data, .. } => format!("{}", data),
            ContributionEvent::ContributionTotalDecrypted { data, .. } => format!("{}", data),
            ContributionEvent::ContributionError { data, .. } => format!("{}", data),
        }
    }
}

impl Event for ContributionEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        let s = format!("{:?}", self);
        extract_event_name(&s).to_string()
    }

    fn event_id(&self) -> Self::Id {
        self.get_id()
    }

    /// Every rejection is reported, even when it repeats an earlier one word for word
    fn is_deduplicated(&self) -> bool {
        self.as_error().is_none()
    }
}

impl ErrorEvent for ContributionEvent {
    type Error = ContributionError;
    type ErrorType = ContributionErrorType;

    fn as_error(&self) -> Option<&Self::Error> {
        match self {
            ContributionEvent::ContributionError { data, .. } => Some(data),
            _ => None,
        }
    }

    fn from_error(err_type: Self::ErrorType, error: anyhow::Error) -> Self {
        ContributionEvent::from(ContributionError::new(err_type, error.to_string().as_str()))
    }
}

impl From<ContributionEvent> for EventId {
    fn from(value: ContributionEvent) -> Self {
        match value {
            ContributionEvent::UpdateSubmitted { id, .. } => id,
            ContributionEvent::DecryptionRequested { id, .. } => id,
            ContributionEvent::ContributionRevealed { id, .. } => id,
            ContributionEvent::TotalDecryptionRequested { id, .. } => id,
            ContributionEvent::ContributionTotalDecrypted { id, .. } => id,
            ContributionEvent::ContributionError { id, .. } => id,
        }
    }
}

impl_from_event!(
    UpdateSubmitted,
    DecryptionRequested,
    ContributionRevealed,
    TotalDecryptionRequested,
    ContributionTotalDecrypted,
    ContributionError
);

impl fmt::Display for ContributionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{}({})", self.event_type(), self.get_data()))
    }
}

fn extract_event_name(s: &str) -> &str {
    let bytes = s.as_bytes();
    for (i, &item) in bytes.iter().enumerate() {
        if item == b' ' || item == b'(' || item == b'{' {
            return &s[..i];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestId;

    #[test]
    fn event_type_is_variant_name() {
        let evt = ContributionEvent::from(ContributionRevealed {
            id: 3,
            request_id: RequestId::new(9),
            value: 30,
        });
        assert_eq!(evt.event_type(), "ContributionRevealed");
        assert_eq!(evt.get_target_id(), Some(3));
    }

    #[test]
    fn request_kinds_with_equal_payloads_have_distinct_ids() {
        let update = ContributionEvent::from(DecryptionRequested {
            id: 1,
            request_id: RequestId::new(7),
        });
        let total = ContributionEvent::from(TotalDecryptionRequested {
            id: 1,
            request_id: RequestId::new(7),
        });
        assert_ne!(update.get_id(), total.get_id());
    }

    #[test]
    fn error_events_expose_their_payload() {
        let evt = ContributionEvent::from_error(
            ContributionErrorType::Verification,
            anyhow::anyhow!("bad proof"),
        );
        assert_eq!(evt.event_type(), "ContributionError");
        assert_eq!(evt.get_target_id(), None);
        let err = evt.as_error().cloned();
        assert_eq!(
            err,
            Some(ContributionError::new(
                ContributionErrorType::Verification,
                "bad proof"
            ))
        );
    }
}
