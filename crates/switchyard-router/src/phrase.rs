// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case-insensitive whole-word phrase matching.

/// Lowercase `text`, turn every run of non-word characters into one space,
/// and pad both ends with a space.
///
/// Word characters are alphanumerics and apostrophes, so "Can't" stays one
/// token and "hi" never matches inside "this".
pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut pending_space = false;
    for ch in text.chars() {
        let ch = if ch == '\u{2019}' { '\'' } else { ch };
        if ch.is_alphanumeric() || ch == '\'' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(ch.to_lowercase());
        } else if out.len() > 1 {
            pending_space = true;
        }
    }
    out.push(' ');
    out
}

/// A set of phrases pre-normalized for matching against normalized text.
#[derive(Debug, Clone, Default)]
pub(crate) struct PhraseSet {
    /// `(original, normalized)` pairs. The normalized form is padded with spaces.
    phrases: Vec<(String, String)>,
}

impl PhraseSet {
    pub(crate) fn new(phrases: &[String]) -> Self {
        let phrases = phrases
            .iter()
            .map(|p| (p.clone(), normalize(p)))
            .filter(|(_, n)| !n.trim().is_empty())
            .collect();
        Self { phrases }
    }

    /// Every phrase occurring in `normalized_text`, in configuration order.
    pub(crate) fn matches<'a>(&'a self, normalized_text: &'a str) -> impl Iterator<Item = &'a str> {
        self.phrases
            .iter()
            .filter(move |(_, n)| normalized_text.contains(n.as_str()))
            .map(|(original, _)| original.as_str())
    }

    pub(crate) fn any_match(&self, normalized_text: &str) -> bool {
        self.matches(normalized_text).next().is_some()
    }
}
