// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The five ordered service tiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A service tier, ordered from cheapest/fastest (`L1`) to most
/// capable/expensive (`L5`).
///
/// The derived `Ord` follows declaration order, so `Tier::L1 < Tier::L5`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 5] = [Tier::L1, Tier::L2, Tier::L3, Tier::L4, Tier::L5];

    /// The cheapest tier.
    pub const LOWEST: Tier = Tier::L1;

    /// The most capable tier.
    pub const HIGHEST: Tier = Tier::L5;

    /// Zero-based position of the tier, usable as an array index.
    pub const fn index(self) -> usize {
        match self {
            Tier::L1 => 0,
            Tier::L2 => 1,
            Tier::L3 => 2,
            Tier::L4 => 3,
            Tier::L5 => 4,
        }
    }

    /// The tier one step below, or `None` for `L1`.
    pub const fn lower(self) -> Option<Tier> {
        match self {
            Tier::L1 => None,
            Tier::L2 => Some(Tier::L1),
            Tier::L3 => Some(Tier::L2),
            Tier::L4 => Some(Tier::L3),
            Tier::L5 => Some(Tier::L4),
        }
    }
}
