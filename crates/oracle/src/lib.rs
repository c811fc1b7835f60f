// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod cleartexts;
mod error;
mod gateway;
mod relayer;
mod verifier;

pub use cleartexts::*;
pub use error::*;
pub use gateway::*;
pub use relayer::*;
pub use verifier::*;

pub use contrib_events::RequestId;
