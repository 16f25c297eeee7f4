// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier routing for Switchyard.
//!
//! Picks the tier for each request from three inputs: a keyword/length
//! complexity score, a coarse emotional and time-of-day context, and the
//! current daily budget snapshot. Everything here is synchronous and free of
//! side effects.

pub mod classifier;
pub mod mood;
mod phrase;
pub mod selector;

pub use classifier::{ComplexityClassifier, ComplexityScore, Signal};
pub use mood::{DayKind, EmotionalContext, EmotionalContextAdviser, Mood, TimeOfDay};
pub use selector::{EMERGENCY_CEILING, SelectionRule, TierDecision, TierSelector, emergency_clamp};
