// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the external collaborators of the routing core.
//!
//! All async traits use `#[async_trait]` so they can be held as trait objects.

pub mod clock;
pub mod handler;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use handler::TierHandler;
pub use sink::AlertSink;
