// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coarse emotional and time-of-day context for a request.
//!
//! Purely advisory: the context only nudges the tier picked by
//! [`TierSelector`](crate::selector::TierSelector).

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use serde::Serialize;
use strum::Display;
use switchyard_config::model::MoodKeywords;

use crate::phrase::{PhraseSet, normalize};

/// Part of the day a request arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 23:00 to 04:59.
    LateNight,
    /// 05:00 to 11:59.
    Morning,
    /// 12:00 to 17:59.
    Afternoon,
    /// 18:00 to 22:59.
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=22 => TimeOfDay::Evening,
            _ => TimeOfDay::LateNight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Neutral,
    Tired,
    Stressed,
    Excited,
    HighDistress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EmotionalContext {
    pub time_of_day: TimeOfDay,
    pub day_kind: DayKind,
    pub mood: Mood,
}

impl EmotionalContext {
    /// A daytime weekday context with no detected mood.
    pub fn neutral() -> Self {
        Self {
            time_of_day: TimeOfDay::Afternoon,
            day_kind: DayKind::Weekday,
            mood: Mood::Neutral,
        }
    }
}

impl std::fmt::Display for EmotionalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.time_of_day, self.day_kind, self.mood)
    }
}

/// Derives an [`EmotionalContext`] from a timestamp and the request text.
#[derive(Debug, Clone)]
pub struct EmotionalContextAdviser {
    /// Checked in order; the first table with a match decides the mood.
    tables: Vec<(Mood, PhraseSet)>,
}

impl EmotionalContextAdviser {
    pub fn new(keywords: &MoodKeywords) -> Self {
        Self {
            tables: vec![
                (Mood::HighDistress, PhraseSet::new(&keywords.high_distress)),
                (Mood::Stressed, PhraseSet::new(&keywords.stressed)),
                (Mood::Tired, PhraseSet::new(&keywords.tired)),
                (Mood::Excited, PhraseSet::new(&keywords.excited)),
            ],
        }
    }

    pub fn advise(&self, at: DateTime<FixedOffset>, text: &str) -> EmotionalContext {
        EmotionalContext {
            time_of_day: TimeOfDay::from_hour(at.hour()),
            day_kind: DayKind::from_weekday(at.weekday()),
            mood: self.mood_of(text),
        }
    }

    pub fn mood_of(&self, text: &str) -> Mood {
        let normalized = normalize(text);
        self.tables
            .iter()
            .find(|(_, phrases)| phrases.any_match(&normalized))
            .map_or(Mood::Neutral, |(mood, _)| *mood)
    }
}

impl Default for EmotionalContextAdviser {
    fn default() -> Self {
        Self::new(&MoodKeywords::default())
    }
}
