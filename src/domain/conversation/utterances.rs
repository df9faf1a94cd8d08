//! Fixed localized utterances used outside the dialogue model.

use crate::domain::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CannedUtterance {
    Greeting,
    NotUnderstood,
    Fallback,
    RateLimited,
    ListenTimeout,
    Farewell,
}

impl CannedUtterance {
    pub fn text(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Greeting, Language::Es) => {
                "¡Hola! Soy el asistente de la empresa. ¿Con quién tengo el gusto de hablar?"
            }
            (Self::Greeting, Language::En) => {
                "Hi there! I'm the company's assistant. Who do I have the pleasure of talking to?"
            }
            (Self::NotUnderstood, Language::Es) => "Perdona, no te he entendido. ¿Puedes repetirlo?",
            (Self::NotUnderstood, Language::En) => "Sorry, I didn't catch that. Could you say it again?",
            (Self::Fallback, Language::Es) => {
                "Vaya, he tenido un problema técnico. ¿Me lo puedes decir otra vez?"
            }
            (Self::Fallback, Language::En) => {
                "Oops, I ran into a technical problem. Could you tell me again?"
            }
            (Self::RateLimited, Language::Es) => {
                "Estoy recibiendo muchas consultas. Dame unos segundos y seguimos."
            }
            (Self::RateLimited, Language::En) => {
                "I'm getting a lot of requests right now. Give me a few seconds and we'll continue."
            }
            (Self::ListenTimeout, Language::Es) => "Sigo aquí si me necesitas.",
            (Self::ListenTimeout, Language::En) => "I'm still here if you need me.",
            (Self::Farewell, Language::Es) => "¡Gracias por tu tiempo! Hasta pronto.",
            (Self::Farewell, Language::En) => "Thanks for your time! See you soon.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_utterance_exists_in_every_language() {
        let all = [
            CannedUtterance::Greeting,
            CannedUtterance::NotUnderstood,
            CannedUtterance::Fallback,
            CannedUtterance::RateLimited,
            CannedUtterance::ListenTimeout,
            CannedUtterance::Farewell,
        ];
        for utterance in all {
            for language in Language::ALL {
                assert!(!utterance.text(language).is_empty());
            }
            assert_ne!(utterance.text(Language::Es), utterance.text(Language::En));
        }
    }
}
