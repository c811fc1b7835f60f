// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod harness;
mod utils;
mod verifiers;

pub use harness::*;
pub use utils::*;
pub use verifiers::*;
