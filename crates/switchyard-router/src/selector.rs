// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final tier selection.
//!
//! Combines the classifier's recommendation, the emotional context, and a
//! budget snapshot into one tier. Rule order: emergency clamp, else distress
//! escalation, else gentle substitution.

use serde::Serialize;
use strum::Display;
use switchyard_config::model::{MoodConfig, TierSubstitution};
use switchyard_core::{BudgetSnapshot, Tier};

use crate::classifier::ComplexityScore;
use crate::mood::{EmotionalContext, Mood, TimeOfDay};

/// Highest tier allowed while the budget is in emergency mode.
pub const EMERGENCY_CEILING: Tier = Tier::L3;

/// Which rule produced the final tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// The classifier's recommendation was used unchanged.
    Classified,
    EmergencyClamp,
    DistressEscalation,
    GentleSubstitution,
}

/// Outcome of tier selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierDecision {
    pub tier: Tier,
    /// The classifier's recommendation before any adjustment.
    pub base_tier: Tier,
    pub rule: SelectionRule,
    pub reason: String,
}

/// Emergency downgrade map: L5 and L4 drop to L3, lower tiers are kept.
pub const fn emergency_clamp(tier: Tier) -> Tier {
    match tier {
        Tier::L5 | Tier::L4 => EMERGENCY_CEILING,
        other => other,
    }
}

/// Pure tier selector configured from `[mood]`.
#[derive(Debug, Clone)]
pub struct TierSelector {
    distress_tier: Tier,
    substitutions: Vec<TierSubstitution>,
}

impl TierSelector {
    pub fn new(config: &MoodConfig) -> Self {
        Self {
            distress_tier: config.distress_tier,
            substitutions: config.gentle_substitutions.clone(),
        }
    }

    /// Select the tier for a request. Reads the budget snapshot, never mutates it.
    pub fn select(
        &self,
        score: &ComplexityScore,
        context: &EmotionalContext,
        budget: &BudgetSnapshot,
    ) -> TierDecision {
        let base = score.recommended_tier;

        if budget.emergency_mode {
            let tier = emergency_clamp(base);
            return TierDecision {
                tier,
                base_tier: base,
                rule: SelectionRule::EmergencyClamp,
                reason: format!(
                    "emergency mode at {:.0}% of daily budget caps {base} at {tier}",
                    budget.percentage() * 100.0
                ),
            };
        }

        if context.mood == Mood::HighDistress {
            return TierDecision {
                tier: self.distress_tier,
                base_tier: base,
                rule: SelectionRule::DistressEscalation,
                reason: format!(
                    "high distress forces {} (classifier suggested {base})",
                    self.distress_tier
                ),
            };
        }

        let gentle = context.time_of_day == TimeOfDay::LateNight || context.mood == Mood::Tired;
        if gentle {
            if let Some(sub) = self.substitutions.iter().find(|s| s.from == base) {
                return TierDecision {
                    tier: sub.to,
                    base_tier: base,
                    rule: SelectionRule::GentleSubstitution,
                    reason: format!(
                        "{} context substitutes {} for {base}",
                        if context.mood == Mood::Tired {
                            "tired"
                        } else {
                            "late-night"
                        },
                        sub.to
                    ),
                };
            }
        }

        TierDecision {
            tier: base,
            base_tier: base,
            rule: SelectionRule::Classified,
            reason: format!("classifier score {} recommends {base}", score.score),
        }
    }
}

impl Default for TierSelector {
    fn default() -> Self {
        Self::new(&MoodConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::mood::DayKind;

    fn score(tier: Tier) -> ComplexityScore {
        ComplexityScore {
            score: 0,
            signals: Vec::new(),
            highest_matched: Some(tier),
            recommended_tier: tier,
        }
    }

    fn budget(emergency: bool) -> BudgetSnapshot {
        let mut snap = BudgetSnapshot::fresh(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 5.0);
        if emergency {
            snap.cumulative_cost = 4.6;
            snap.fired_thresholds = vec![0.7, 0.9];
            snap.emergency_mode = true;
        }
        snap
    }

    fn context(time_of_day: TimeOfDay, mood: Mood) -> EmotionalContext {
        EmotionalContext {
            time_of_day,
            day_kind: DayKind::Weekday,
            mood,
        }
    }

    #[test]
    fn emergency_clamps_l5_to_l3_and_keeps_l2() {
        let selector = TierSelector::default();
        let ctx = EmotionalContext::neutral();
        let d = selector.select(&score(Tier::L5), &ctx, &budget(true));
        assert_eq!(d.tier, Tier::L3);
        assert_eq!(d.base_tier, Tier::L5);
        assert_eq!(d.rule, SelectionRule::EmergencyClamp);

        let d = selector.select(&score(Tier::L2), &ctx, &budget(true));
        assert_eq!(d.tier, Tier::L2);
    }

    #[test]
    fn emergency_map_is_fixed() {
        assert_eq!(emergency_clamp(Tier::L5), Tier::L3);
        assert_eq!(emergency_clamp(Tier::L4), Tier::L3);
        assert_eq!(emergency_clamp(Tier::L3), Tier::L3);
        assert_eq!(emergency_clamp(Tier::L2), Tier::L2);
        assert_eq!(emergency_clamp(Tier::L1), Tier::L1);
    }

    #[test]
    fn emergency_ignores_distress() {
        let selector = TierSelector::default();
        let ctx = context(TimeOfDay::Afternoon, Mood::HighDistress);
        let d = selector.select(&score(Tier::L1), &ctx, &budget(true));
        assert_eq!(d.tier, Tier::L1);
        assert_eq!(d.rule, SelectionRule::EmergencyClamp);
    }

    #[test]
    fn distress_forces_top_tier() {
        let selector = TierSelector::default();
        let ctx = context(TimeOfDay::LateNight, Mood::HighDistress);
        let d = selector.select(&score(Tier::L1), &ctx, &budget(false));
        assert_eq!(d.tier, Tier::L5);
        assert_eq!(d.rule, SelectionRule::DistressEscalation);
    }

    #[test]
    fn late_night_substitutes_gently() {
        let selector = TierSelector::default();
        let ctx = context(TimeOfDay::LateNight, Mood::Neutral);
        assert_eq!(selector.select(&score(Tier::L5), &ctx, &budget(false)).tier, Tier::L4);
        assert_eq!(selector.select(&score(Tier::L4), &ctx, &budget(false)).tier, Tier::L3);
        // Not a blanket downgrade.
        let d = selector.select(&score(Tier::L3), &ctx, &budget(false));
        assert_eq!(d.tier, Tier::L3);
        assert_eq!(d.rule, SelectionRule::Classified);
    }

    #[test]
    fn tired_substitutes_during_the_day() {
        let selector = TierSelector::default();
        let ctx = context(TimeOfDay::Morning, Mood::Tired);
        let d = selector.select(&score(Tier::L5), &ctx, &budget(false));
        assert_eq!(d.tier, Tier::L4);
        assert!(d.reason.contains("tired"));
    }

    #[test]
    fn neutral_daytime_passes_through() {
        let selector = TierSelector::default();
        for tier in Tier::ALL {
            let d = selector.select(&score(tier), &EmotionalContext::neutral(), &budget(false));
            assert_eq!(d.tier, tier);
        }
    }

    #[test]
    fn configured_distress_tier_is_used() {
        let config = MoodConfig {
            distress_tier: Tier::L4,
            ..MoodConfig::default()
        };
        let selector = TierSelector::new(&config);
        let ctx = context(TimeOfDay::Morning, Mood::HighDistress);
        assert_eq!(selector.select(&score(Tier::L1), &ctx, &budget(false)).tier, Tier::L4);
    }
}
