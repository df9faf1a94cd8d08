//! Phase transition engine.
//!
//! Suggests the next conversation phase from the latest utterance and the
//! lead data gathered so far. Suggestions are only suggestions: the tracker
//! applies them through the phase transition table and drops invalid ones.

use super::lead::LeadData;
use super::phase::ConversationPhase;

/// Phrases that indicate one kind of objection.
#[derive(Debug, Clone)]
pub struct ObjectionSignal {
    pub category: String,
    pub phrases: Vec<String>,
}

impl ObjectionSignal {
    fn new(category: &str, phrases: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            phrases: to_strings(phrases),
        }
    }
}

/// Keyword lists and thresholds driving phase suggestions.
#[derive(Debug, Clone)]
pub struct PhaseTransitionConfig {
    /// Completed turns before greeting may move on to discovery.
    pub min_turns_before_discovery: u32,
    /// Turns spent in discovery before qualification is suggested anyway.
    pub max_discovery_turns: u32,
    pub farewell_signals: Vec<String>,
    pub booking_signals: Vec<String>,
    pub presentation_signals: Vec<String>,
    pub resolution_signals: Vec<String>,
    pub objection_signals: Vec<ObjectionSignal>,
}

impl Default for PhaseTransitionConfig {
    fn default() -> Self {
        Self {
            min_turns_before_discovery: 1,
            max_discovery_turns: 3,
            farewell_signals: to_strings(&[
                "adiós", "adios", "hasta luego", "hasta pronto", "chao", "nos vemos", "bye",
                "goodbye", "see you", "that's all",
            ]),
            booking_signals: to_strings(&[
                "agendar", "agenda", "reunión", "reunion", "cita", "llamada", "demo", "calendario",
                "book", "schedule", "meeting", "call", "calendar",
            ]),
            presentation_signals: to_strings(&[
                "precio", "precios", "cuánto cuesta", "cuanto cuesta", "cómo funciona",
                "como funciona", "qué hacen", "que hacen", "price", "pricing", "how much",
                "how does it work", "what do you do", "features",
            ]),
            resolution_signals: to_strings(&[
                "entiendo", "tiene sentido", "vale", "de acuerdo", "ok", "okay", "makes sense",
                "i see", "got it", "fair enough", "sounds good",
            ]),
            objection_signals: vec![
                ObjectionSignal::new(
                    "price",
                    &["caro", "costoso", "muy caro", "expensive", "too much", "costly"],
                ),
                ObjectionSignal::new(
                    "timing",
                    &["no tengo tiempo", "ahora no", "más adelante", "mas adelante", "not now", "no time", "maybe later"],
                ),
                ObjectionSignal::new(
                    "competitor",
                    &["ya tenemos", "ya usamos", "otra empresa", "already have", "already use", "competitor"],
                ),
                ObjectionSignal::new(
                    "trust",
                    &["no estoy seguro", "no estoy segura", "no sé si", "no se si", "dudas", "not sure", "skeptical", "doubt"],
                ),
                ObjectionSignal::new(
                    "interest",
                    &["no me interesa", "not interested"],
                ),
            ],
        }
    }
}

/// Read-only view of the conversation used for one suggestion.
#[derive(Debug, Clone, Copy)]
pub struct ConversationSnapshot<'a> {
    /// Turns completed before this utterance.
    pub turn_count: u32,
    /// Turns spent in the current phase.
    pub turns_in_phase: u32,
    pub latest_user_message: &'a str,
    pub lead: &'a LeadData,
}

impl<'a> ConversationSnapshot<'a> {
    pub fn new(
        turn_count: u32,
        turns_in_phase: u32,
        latest_user_message: &'a str,
        lead: &'a LeadData,
    ) -> Self {
        Self {
            turn_count,
            turns_in_phase,
            latest_user_message,
            lead,
        }
    }

    /// Returns true if the utterance contains any of the phrases as whole words.
    pub fn contains_any(&self, phrases: &[String]) -> bool {
        let haystack = normalize_for_matching(self.latest_user_message);
        phrases
            .iter()
            .any(|phrase| haystack.contains(&normalize_for_matching(phrase)))
    }

    /// Category of the first objection found in the utterance.
    pub fn detect_objection(&self, signals: &[ObjectionSignal]) -> Option<String> {
        signals
            .iter()
            .find(|signal| self.contains_any(&signal.phrases))
            .map(|signal| signal.category.clone())
    }
}

/// Outcome of analysing one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSuggestion {
    pub phase: ConversationPhase,
    pub objection: Option<String>,
}

/// Engine for suggesting phase transitions from conversation signals.
#[derive(Debug, Clone, Default)]
pub struct PhaseTransitionEngine {
    config: PhaseTransitionConfig,
}

impl PhaseTransitionEngine {
    pub fn new(config: PhaseTransitionConfig) -> Self {
        Self { config }
    }

    /// Suggests the phase for the next reply. May return `current`.
    pub fn suggest(&self, current: ConversationPhase, snapshot: &ConversationSnapshot<'_>) -> PhaseSuggestion {
        let objection = snapshot.detect_objection(&self.config.objection_signals);

        let phase = if snapshot.contains_any(&self.config.farewell_signals) {
            ConversationPhase::Farewell
        } else {
            match current {
                ConversationPhase::Greeting => self.from_greeting(snapshot),
                ConversationPhase::Discovery => self.from_discovery(snapshot, objection.is_some()),
                ConversationPhase::Qualification => {
                    self.from_qualification(snapshot, objection.is_some())
                }
                ConversationPhase::Presentation => {
                    self.from_presentation(snapshot, objection.is_some())
                }
                ConversationPhase::ObjectionHandling => self.from_objection_handling(snapshot, objection.is_some()),
                ConversationPhase::Booking => {
                    if objection.is_some() {
                        ConversationPhase::ObjectionHandling
                    } else {
                        ConversationPhase::Booking
                    }
                }
                ConversationPhase::Farewell => ConversationPhase::Farewell,
            }
        };

        PhaseSuggestion { phase, objection }
    }

    fn from_greeting(&self, snapshot: &ConversationSnapshot<'_>) -> ConversationPhase {
        if snapshot.turn_count >= self.config.min_turns_before_discovery {
            ConversationPhase::Discovery
        } else {
            ConversationPhase::Greeting
        }
    }

    fn from_discovery(&self, snapshot: &ConversationSnapshot<'_>, objection: bool) -> ConversationPhase {
        if objection {
            ConversationPhase::ObjectionHandling
        } else if snapshot.contains_any(&self.config.presentation_signals) {
            ConversationPhase::Presentation
        } else if snapshot.lead.is_qualifiable()
            || snapshot.turns_in_phase >= self.config.max_discovery_turns
        {
            ConversationPhase::Qualification
        } else {
            ConversationPhase::Discovery
        }
    }

    fn from_qualification(
        &self,
        snapshot: &ConversationSnapshot<'_>,
        objection: bool,
    ) -> ConversationPhase {
        if objection {
            ConversationPhase::ObjectionHandling
        } else if snapshot.contains_any(&self.config.booking_signals) {
            ConversationPhase::Booking
        } else if snapshot.contains_any(&self.config.presentation_signals)
            || snapshot.lead.budget.is_some()
            || snapshot.lead.timeline.is_some()
        {
            ConversationPhase::Presentation
        } else {
            ConversationPhase::Qualification
        }
    }

    fn from_presentation(
        &self,
        snapshot: &ConversationSnapshot<'_>,
        objection: bool,
    ) -> ConversationPhase {
        if objection {
            ConversationPhase::ObjectionHandling
        } else if snapshot.contains_any(&self.config.booking_signals) {
            ConversationPhase::Booking
        } else {
            ConversationPhase::Presentation
        }
    }

    fn from_objection_handling(
        &self,
        snapshot: &ConversationSnapshot<'_>,
        objection: bool,
    ) -> ConversationPhase {
        if snapshot.contains_any(&self.config.booking_signals) {
            ConversationPhase::Booking
        } else if !objection && snapshot.contains_any(&self.config.resolution_signals) {
            ConversationPhase::Presentation
        } else {
            ConversationPhase::ObjectionHandling
        }
    }

    pub fn config(&self) -> &PhaseTransitionConfig {
        &self.config
    }
}

/// Lowercases, replaces punctuation with spaces and pads with spaces so
/// that `contains` only matches whole words.
fn normalize_for_matching(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggest(current: ConversationPhase, turn_count: u32, text: &str, lead: &LeadData) -> PhaseSuggestion {
        let engine = PhaseTransitionEngine::default();
        let snapshot = ConversationSnapshot::new(turn_count, 0, text, lead);
        engine.suggest(current, &snapshot)
    }

    mod snapshot {
        use super::*;

        #[test]
        fn matches_whole_words_only() {
            let lead = LeadData::default();
            let snapshot = ConversationSnapshot::new(0, 0, "Let me recall that", &lead);
            assert!(!snapshot.contains_any(&["call".to_string()]));
            let snapshot = ConversationSnapshot::new(0, 0, "Can we book a call?", &lead);
            assert!(snapshot.contains_any(&["call".to_string()]));
        }

        #[test]
        fn matches_multi_word_phrases_across_punctuation() {
            let lead = LeadData::default();
            let snapshot = ConversationSnapshot::new(0, 0, "Bueno... ¿cuánto cuesta?", &lead);
            assert!(snapshot.contains_any(&["cuánto cuesta".to_string()]));
        }

        #[test]
        fn detects_objection_category() {
            let lead = LeadData::default();
            let snapshot = ConversationSnapshot::new(2, 0, "Me parece muy caro", &lead);
            let config = PhaseTransitionConfig::default();
            assert_eq!(
                snapshot.detect_objection(&config.objection_signals),
                Some("price".to_string())
            );
        }
    }

    mod greeting {
        use super::*;

        #[test]
        fn first_utterance_stays_in_greeting() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Greeting, 0, "Hola, soy Ana de Acme", &lead);
            assert_eq!(s.phase, ConversationPhase::Greeting);
        }

        #[test]
        fn moves_to_discovery_after_first_turn() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Greeting, 1, "Buscamos mejorar ventas", &lead);
            assert_eq!(s.phase, ConversationPhase::Discovery);
        }

        #[test]
        fn farewell_wins_from_any_phase() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Greeting, 0, "Gracias, adiós", &lead);
            assert_eq!(s.phase, ConversationPhase::Farewell);
        }
    }

    mod funnel {
        use super::*;

        #[test]
        fn discovery_to_qualification_when_lead_is_qualifiable() {
            let lead = LeadData {
                company: Some("Acme".into()),
                role: Some("CTO".into()),
                ..Default::default()
            };
            let s = suggest(ConversationPhase::Discovery, 2, "Somos una empresa de logística", &lead);
            assert_eq!(s.phase, ConversationPhase::Qualification);
        }

        #[test]
        fn discovery_moves_on_after_enough_turns() {
            let engine = PhaseTransitionEngine::default();
            let lead = LeadData::default();
            let snapshot = ConversationSnapshot::new(5, 3, "pues no sé", &lead);
            assert_eq!(
                engine.suggest(ConversationPhase::Discovery, &snapshot).phase,
                ConversationPhase::Qualification
            );
        }

        #[test]
        fn pricing_question_triggers_presentation() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Discovery, 2, "How does it work?", &lead);
            assert_eq!(s.phase, ConversationPhase::Presentation);
        }

        #[test]
        fn objection_interrupts_presentation() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Presentation, 4, "Sounds expensive", &lead);
            assert_eq!(s.phase, ConversationPhase::ObjectionHandling);
            assert_eq!(s.objection.as_deref(), Some("price"));
        }

        #[test]
        fn resolved_objection_returns_to_presentation() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::ObjectionHandling, 5, "Ok, tiene sentido", &lead);
            assert_eq!(s.phase, ConversationPhase::Presentation);
        }

        #[test]
        fn booking_signal_from_presentation() {
            let lead = LeadData::default();
            let s = suggest(ConversationPhase::Presentation, 4, "¿Podemos agendar una demo?", &lead);
            assert_eq!(s.phase, ConversationPhase::Booking);
        }
    }
}
