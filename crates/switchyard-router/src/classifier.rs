// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic request complexity classification.
//!
//! Scores request text against per-tier trigger phrases plus length bonuses.
//! Deterministic: no model call, no network, no shared state.

use serde::Serialize;
use switchyard_config::model::{ClassifierConfig, LengthBonusRule, ScoreThresholds};
use switchyard_core::Tier;

use crate::phrase::{PhraseSet, normalize};

/// One piece of evidence that contributed to a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// A tier's trigger phrase occurred in the text.
    Keyword { tier: Tier, phrase: String },
    /// The text was longer than `min_chars`.
    Length { min_chars: usize, bonus: i32 },
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Keyword { tier, phrase } => write!(f, "{tier}:\"{phrase}\""),
            Signal::Length { min_chars, bonus } => write!(f, "length>{min_chars}:+{bonus}"),
        }
    }
}

/// Result of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityScore {
    pub score: i32,
    pub signals: Vec<Signal>,
    /// Highest tier with a matching phrase, if any matched.
    pub highest_matched: Option<Tier>,
    pub recommended_tier: Tier,
}

/// Keyword and length based complexity classifier.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    /// Indexed by `Tier::index()`.
    phrases: [PhraseSet; 5],
    weights: [i32; 5],
    thresholds: ScoreThresholds,
    length_bonus: Vec<LengthBonusRule>,
}

impl ComplexityClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            phrases: Tier::ALL.map(|tier| PhraseSet::new(config.keywords.for_tier(tier))),
            weights: Tier::ALL.map(|tier| config.base_weights.for_tier(tier)),
            thresholds: config.score_thresholds.clone(),
            length_bonus: config.length_bonus.clone(),
        }
    }

    /// Classify `text`.
    ///
    /// Every tier's phrase set is tested (no short-circuit). Each tier with at
    /// least one match adds its base weight once. The recommendation is the
    /// higher of the highest matched tier and the tier the total score reaches.
    pub fn classify(&self, text: &str) -> ComplexityScore {
        let normalized = normalize(text);
        let mut score = 0;
        let mut signals = Vec::new();
        let mut highest_matched = None;

        for tier in Tier::ALL {
            let mut matched = false;
            for phrase in self.phrases[tier.index()].matches(&normalized) {
                matched = true;
                signals.push(Signal::Keyword {
                    tier,
                    phrase: phrase.to_string(),
                });
            }
            if matched {
                score += self.weights[tier.index()];
                highest_matched = Some(tier);
            }
        }

        let chars = text.chars().count();
        for rule in &self.length_bonus {
            if chars > rule.min_chars {
                score += rule.bonus;
                signals.push(Signal::Length {
                    min_chars: rule.min_chars,
                    bonus: rule.bonus,
                });
            }
        }

        let score_tier = self.thresholds.tier_for_score(score);
        let recommended_tier = highest_matched.map_or(score_tier, |t| t.max(score_tier));

        ComplexityScore {
            score,
            signals,
            highest_matched,
            recommended_tier,
        }
    }
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> ComplexityScore {
        ComplexityClassifier::default().classify(text)
    }

    fn padded(prefix: &str, len: usize) -> String {
        let mut text = prefix.to_string();
        while text.chars().count() < len {
            text.push_str(" zz");
        }
        text.truncate(len);
        text
    }

    #[test]
    fn only_l1_keyword_short_text_is_l1() {
        let text = padded("hello there", 50);
        assert_eq!(text.chars().count(), 50);
        let result = classify(&text);
        assert_eq!(result.recommended_tier, Tier::L1);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn l1_and_l5_keywords_pick_the_highest() {
        let result = classify("hello, can you research the history of tea?");
        assert_eq!(result.highest_matched, Some(Tier::L5));
        assert_eq!(result.recommended_tier, Tier::L5);
        assert_eq!(result.score, 11);
    }

    #[test]
    fn long_text_without_keywords_scores_four() {
        let text = padded("zz", 1200);
        let result = classify(&text);
        assert_eq!(result.score, 4);
        assert_eq!(result.highest_matched, None);
        assert_eq!(result.recommended_tier, Tier::L2);
        assert_eq!(result.signals.len(), 2);
    }

    #[test]
    fn medium_text_gets_single_bonus() {
        let text = padded("zz", 600);
        let result = classify(&text);
        assert_eq!(result.score, 2);
        assert_eq!(result.recommended_tier, Tier::L1);
    }

    #[test]
    fn empty_text_is_lowest_tier() {
        let result = classify("");
        assert_eq!(result.score, 0);
        assert!(result.signals.is_empty());
        assert_eq!(result.recommended_tier, Tier::L1);
    }

    #[test]
    fn score_can_lift_above_highest_match() {
        // L2 (3) + L3 (5) = 8 reaches the L4 threshold.
        let result = classify("summarize and explain this");
        assert_eq!(result.highest_matched, Some(Tier::L3));
        assert_eq!(result.score, 8);
        assert_eq!(result.recommended_tier, Tier::L4);
    }

    #[test]
    fn tier_weight_counts_once_per_tier() {
        let result = classify("debug and refactor");
        assert_eq!(result.score, 7);
        let keywords = result
            .signals
            .iter()
            .filter(|s| matches!(s, Signal::Keyword { .. }))
            .count();
        assert_eq!(keywords, 2);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("DEBUG THIS").recommended_tier, Tier::L4);
    }

    #[test]
    fn substrings_inside_words_do_not_match() {
        // "this" contains "hi", "planet" contains "plan".
        let result = classify("this planet");
        assert_eq!(result.highest_matched, None);
    }

    #[test]
    fn custom_keywords_are_honored() {
        let mut config = ClassifierConfig::default();
        config.keywords.l5 = vec!["formal proof".to_string()];
        let classifier = ComplexityClassifier::new(&config);
        assert_eq!(
            classifier.classify("need a formal proof").recommended_tier,
            Tier::L5
        );
        assert_eq!(classifier.classify("research").highest_matched, None);
    }

    #[test]
    fn signals_display_compactly() {
        let signal = Signal::Keyword {
            tier: Tier::L4,
            phrase: "debug".into(),
        };
        assert_eq!(signal.to_string(), "l4:\"debug\"");
        let length = Signal::Length {
            min_chars: 500,
            bonus: 2,
        };
        assert_eq!(length.to_string(), "length>500:+2");
    }
}
