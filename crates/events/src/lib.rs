// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod contribution_event;
mod event_id;
mod eventbus;
mod request_id;
mod traits;

pub use contribution_event::*;
pub use event_id::*;
pub use eventbus::*;
pub use request_id::*;
pub use traits::*;
