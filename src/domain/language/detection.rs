//! Per-turn language detections kept in a bounded ring buffer.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::Language;
use crate::domain::foundation::Timestamp;

/// Default number of detections kept per conversation.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One recognizer language guess, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub language: Language,
    pub confidence: f32,
    pub turn_number: u32,
    pub timestamp: Timestamp,
}

/// FIFO of recent detections; the oldest entry is evicted when full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageHistory {
    entries: VecDeque<LanguageDetection>,
    capacity: usize,
}

impl LanguageHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, detection: LanguageDetection) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(detection);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&LanguageDetection> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageDetection> {
        self.entries.iter()
    }

    /// Most frequent language in the buffer, ties going to the most recent.
    pub fn dominant(&self) -> Option<Language> {
        let mut best: Option<(Language, usize)> = None;
        for detection in self.entries.iter().rev() {
            let count = self
                .entries
                .iter()
                .filter(|d| d.language == detection.language)
                .count();
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((detection.language, count));
            }
        }
        best.map(|(language, _)| language)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for LanguageHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
