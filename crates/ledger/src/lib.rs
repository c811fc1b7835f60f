// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod aggregation;
mod contribution_ledger;
mod error;
mod request_tracker;
mod store;
mod update_ledger;

pub use aggregation::*;
pub use contribution_ledger::*;
pub use error::*;
pub use request_tracker::*;
pub use store::*;
pub use update_ledger::*;
