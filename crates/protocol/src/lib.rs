// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod actor;
mod orchestrator;
mod repo;

pub use actor::*;
pub use orchestrator::*;
pub use repo::*;
