/// Turns a free-form transcript into a `CriteriaDelta`.
///
/// Blood groups are matched on word boundaries, so "ab+" never reads as
/// "b+" and "a positive" does not fire inside "ab positive". Location is
/// whatever words remain once blood-group words and short filler words are
/// removed, unless a gazetteer of known places is configured and one of
/// them is mentioned.
use regex::Regex;
use tracing::debug;

use crate::model::{BloodGroup, CriteriaDelta};

const TRIM_CHARS: &[char] = &['.', ',', '!', '?', ';', ':'];
const MIN_LOCATION_WORD_LEN: usize = 3;

#[derive(Clone)]
pub struct CriteriaExtractor {
    group_patterns: Vec<(BloodGroup, Regex)>,
    /// Every symbolic and verbal blood-group form, lower-cased.
    group_forms: Vec<String>,
    gazetteer: Vec<(String, Regex)>,
}

impl CriteriaExtractor {
    pub fn new() -> Self {
        let group_patterns = BloodGroup::ALL
            .into_iter()
            .map(|group| {
                let symbolic = regex::escape(&group.symbolic());
                let verbal = group.verbal().replace(' ', r"\s+");
                let pattern =
                    format!(r"(?:^|[^a-z0-9])(?:{symbolic}|{verbal})(?:$|[^a-z0-9+\-])");
                (group, Regex::new(&pattern).expect("valid regex"))
            })
            .collect();

        let group_forms = BloodGroup::ALL
            .into_iter()
            .flat_map(|group| [group.symbolic(), group.verbal().to_string()])
            .collect();

        Self {
            group_patterns,
            group_forms,
            gazetteer: Vec::new(),
        }
    }

    /// Prefer known place names over the leftover-words rule.
    ///
    /// Places are tried in the order given; the first one mentioned as a
    /// whole word wins.
    pub fn with_gazetteer<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gazetteer = places
            .into_iter()
            .filter_map(|place| {
                let place = place.as_ref().trim().to_lowercase();
                if place.is_empty() {
                    return None;
                }
                let pattern = format!(r"(?:^|[^a-z0-9]){}(?:$|[^a-z0-9])", regex::escape(&place));
                Regex::new(&pattern).ok().map(|re| (place, re))
            })
            .collect();
        self
    }

    pub fn has_gazetteer(&self) -> bool {
        !self.gazetteer.is_empty()
    }

    /// Never fails: noise and empty input yield an empty delta.
    pub fn extract(&self, transcript: &str) -> CriteriaDelta {
        let normalized = transcript.to_lowercase();

        let blood_group = self
            .group_patterns
            .iter()
            .find(|(_, re)| re.is_match(&normalized))
            .map(|(group, _)| *group);

        let location = self
            .known_location(&normalized)
            .or_else(|| self.leftover_words(&normalized));

        debug!(
            blood_group = ?blood_group,
            location = ?location,
            "criteria extracted"
        );
        CriteriaDelta {
            blood_group,
            location,
        }
    }

    fn known_location(&self, normalized: &str) -> Option<String> {
        self.gazetteer
            .iter()
            .find(|(_, re)| re.is_match(normalized))
            .map(|(place, _)| place.clone())
    }

    fn leftover_words(&self, normalized: &str) -> Option<String> {
        let words: Vec<&str> = normalized
            .split_whitespace()
            .map(|w| w.trim_matches(TRIM_CHARS))
            .filter(|w| !self.is_group_word(w))
            .filter(|w| w.chars().count() >= MIN_LOCATION_WORD_LEN)
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }

    fn is_group_word(&self, word: &str) -> bool {
        !word.is_empty() && self.group_forms.iter().any(|form| form.contains(word))
    }
}

impl Default for CriteriaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot extraction without a gazetteer.
pub fn extract(transcript: &str) -> CriteriaDelta {
    CriteriaExtractor::new().extract(transcript)
}
