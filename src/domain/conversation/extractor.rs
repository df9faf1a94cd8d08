//! Lead extraction from user utterances.
//!
//! Pattern based and bilingual (Spanish and English). Extraction never
//! fails: anything that does not match simply leaves the field empty.

use regex::Regex;

use super::lead::LeadData;

/// Minimum digits for a number to be taken as a phone.
const MIN_PHONE_DIGITS: usize = 9;

/// Maximum characters kept for a free-text pain point.
const MAX_PAIN_POINT_CHARS: usize = 80;

/// Regex-based extractor for [`LeadData`] fields.
#[derive(Debug, Clone)]
pub struct LeadExtractor {
    name_regex: Regex,
    company_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    role_regex: Regex,
    budget_regex: Regex,
    money_regex: Regex,
    timeline_regex: Regex,
    company_size_regex: Regex,
    location_regex: Regex,
    calendar_regex: Regex,
    meeting_regex: Regex,
    pain_point_regex: Regex,
    interest_regexes: Vec<(&'static str, Regex)>,
}

impl Default for LeadExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadExtractor {
    /// Creates an extractor with precompiled patterns.
    pub fn new() -> Self {
        Self {
            // "soy Ana", "me llamo Ana García", "I'm John"
            name_regex: Regex::new(
                r"\b(?i:me llamo|mi nombre es|soy|my name is|i am|i'm)\s+(\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)?)",
            )
            .unwrap(),
            // "de Acme", "trabajo en Acme Corp", "from Globex"
            company_regex: Regex::new(
                r"\b(?i:trabajo en|trabajo para|de la empresa|la empresa|work at|work for|from|de)\s+(\p{Lu}[\p{L}\p{N}&\-]*(?:\s+\p{Lu}[\p{L}\p{N}&\-]*)*)",
            )
            .unwrap(),
            email_regex: Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap(),
            phone_regex: Regex::new(r"\+?\d[\d\s\-().]{6,}\d").unwrap(),
            role_regex: Regex::new(
                r"(?i)\b(ceo|cto|cfo|coo|cmo|co-?fundador[a]?|fundador[a]?|co-?founder|founder|dueñ[oa]|owner|director[a]? de \p{L}+|director[a]?|gerente de \p{L}+|gerente|jefe de \p{L}+|responsable de \p{L}+|head of \p{L}+|vp of \p{L}+|(?:sales|marketing|operations|product) manager|manager)\b",
            )
            .unwrap(),
            // "presupuesto de 10.000 euros", "budget is $5k"
            budget_regex: Regex::new(
                r"(?i)(?:presupuesto|budget)\D{0,25}?([$€]?\s?\d[\d.,]*\s?(?:k|mil|millones)?\s?(?:euros|eur|usd|dólares|dolares|dollars|€)?)",
            )
            .unwrap(),
            money_regex: Regex::new(
                r"(?i)([$€]\s?\d[\d.,]*\s?(?:k|mil)?|\d[\d.,]*\s?(?:k|mil)?\s?(?:euros|eur|usd|dólares|dolares|dollars|€))",
            )
            .unwrap(),
            timeline_regex: Regex::new(
                r"(?i)\b(este mes|el próximo mes|próximo mes|proximo mes|este año|el próximo año|este trimestre|el próximo trimestre|próximo trimestre|lo antes posible|cuanto antes|ya mismo|asap|this month|next month|this quarter|next quarter|this year|next year|right away|as soon as possible|en \d+ (?:días|dias|semanas|meses)|in \d+ (?:days|weeks|months))\b",
            )
            .unwrap(),
            company_size_regex: Regex::new(
                r"(?i)\b(\d[\d.,]*)\s*(?:empleados|trabajadores|personas|employees|people|staff|workers)\b",
            )
            .unwrap(),
            location_regex: Regex::new(
                r"\b(?i:estamos ubicados en|estamos en|somos de|ubicados en|based in|located in|we're in|we are in)\s+(\p{Lu}\p{L}+(?:\s+\p{Lu}\p{L}+)?)",
            )
            .unwrap(),
            calendar_regex: Regex::new(
                r"https?://(?:www\.)?(?:calendly\.com|cal\.com|calendar\.google\.com|meet\.google\.com|zoom\.us)/\S+",
            )
            .unwrap(),
            meeting_regex: Regex::new(
                r"(?i)\b(?:ya (?:lo |la )?(?:agendé|agende|reservé|reserve)|(?:reunión|reunion|cita|llamada|demo) (?:agendada|confirmada|reservada)|quedamos el|i(?:'ve| have) (?:booked|scheduled)|(?:meeting|call|demo) (?:is )?(?:booked|scheduled|confirmed)|see you on)\b",
            )
            .unwrap(),
            pain_point_regex: Regex::new(
                r"(?i)\b(?:tenemos problemas? con|problemas? con|nos cuesta|es dif[ií]cil|perdemos|we struggle with|struggling with|problems? with|it's hard to|hard to|we lose|we're losing)\s+([^.,;!?]{3,})",
            )
            .unwrap(),
            interest_regexes: vec![
                ("automation", Regex::new(r"(?i)\b(?:automatizaci[oó]n|automatizar|automation|automate)\b").unwrap()),
                ("chatbot", Regex::new(r"(?i)\b(?:chatbots?|asistentes? virtual(?:es)?|virtual assistants?)\b").unwrap()),
                ("robotics", Regex::new(r"(?i)\b(?:robots?|rob[oó]tica|robotics)\b").unwrap()),
                ("sales", Regex::new(r"(?i)\b(?:ventas|vender|sales|selling)\b").unwrap()),
                ("customer_service", Regex::new(r"(?i)\b(?:atenci[oó]n al cliente|soporte|customer (?:service|support))\b").unwrap()),
                ("marketing", Regex::new(r"(?i)\b(?:marketing|publicidad|advertising)\b").unwrap()),
                ("ai", Regex::new(r"(?i)\b(?:ia|inteligencia artificial|ai|artificial intelligence)\b").unwrap()),
                ("lead_generation", Regex::new(r"(?i)\b(?:leads?|prospectos?|clientes potenciales|lead generation)\b").unwrap()),
            ],
        }
    }

    /// Extracts whatever lead fields the utterance mentions.
    pub fn extract(&self, text: &str) -> LeadData {
        let mut lead = LeadData {
            name: self.capture(&self.name_regex, text),
            company: self.capture(&self.company_regex, text).map(trim_entity),
            email: self
                .email_regex
                .find(text)
                .map(|m| m.as_str().to_lowercase()),
            phone: self.extract_phone(text),
            role: self.capture(&self.role_regex, text),
            interest: self.extract_interests(text),
            pain_points: self
                .capture(&self.pain_point_regex, text)
                .map(|p| truncate(p.trim(), MAX_PAIN_POINT_CHARS))
                .into_iter()
                .collect(),
            budget: self.extract_budget(text),
            timeline: self.capture(&self.timeline_regex, text).map(|t| t.to_lowercase()),
            company_size: self
                .capture(&self.company_size_regex, text)
                .map(|n| n.replace(['.', ','], "")),
            location: self.capture(&self.location_regex, text),
            calendar_link: self
                .calendar_regex
                .find(text)
                .map(|m| m.as_str().trim_end_matches(['.', ',', ')', '!', '?']).to_string()),
            meeting_scheduled: None,
        };

        if self.meeting_regex.is_match(text) {
            lead.meeting_scheduled = Some(true);
        }

        // "somos de Sevilla" matches both the company and location patterns
        if lead.company.is_some() && lead.company == lead.location {
            lead.company = None;
        }

        lead
    }

    /// Canonical topic keys mentioned in the utterance.
    pub fn extract_interests(&self, text: &str) -> Vec<String> {
        self.interest_regexes
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(topic, _)| topic.to_string())
            .collect()
    }

    fn capture(&self, re: &Regex, text: &str) -> Option<String> {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_phone(&self, text: &str) -> Option<String> {
        self.phone_regex.find_iter(text).find_map(|m| {
            let raw = m.as_str();
            let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < MIN_PHONE_DIGITS {
                return None;
            }
            let mut phone: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            if raw.starts_with('+') {
                phone.insert(0, '+');
            }
            Some(phone)
        })
    }

    fn extract_budget(&self, text: &str) -> Option<String> {
        self.capture(&self.budget_regex, text)
            .or_else(|| self.capture(&self.money_regex, text))
    }
}

fn trim_entity(value: String) -> String {
    value.trim_end_matches(['.', ',', '-']).to_string()
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LeadExtractor {
        LeadExtractor::new()
    }

    mod identity {
        use super::*;

        #[test]
        fn spanish_greeting_with_company() {
            let lead = extractor().extract("Hola, soy Ana de Acme");
            assert_eq!(lead.name.as_deref(), Some("Ana"));
            assert!(lead.company.as_deref().unwrap().contains("Acme"));
        }

        #[test]
        fn english_full_name_and_company() {
            let lead = extractor().extract("Hi, I'm John Smith from Globex Corp.");
            assert_eq!(lead.name.as_deref(), Some("John Smith"));
            assert_eq!(lead.company.as_deref(), Some("Globex Corp"));
        }

        #[test]
        fn lowercase_words_are_not_names() {
            let lead = extractor().extract("soy el director de ventas");
            assert_eq!(lead.name, None);
            assert_eq!(lead.company, None);
        }

        #[test]
        fn role_keywords() {
            let lead = extractor().extract("Soy el CTO de la empresa");
            assert_eq!(lead.role.as_deref(), Some("CTO"));

            let lead = extractor().extract("I'm the marketing manager");
            assert_eq!(lead.role.as_deref(), Some("marketing manager"));
        }
    }

    mod contact {
        use super::*;

        #[test]
        fn email_is_lowercased() {
            let lead = extractor().extract("mi correo es Ana.Lopez@Acme.com gracias");
            assert_eq!(lead.email.as_deref(), Some("ana.lopez@acme.com"));
        }

        #[test]
        fn phone_is_normalized() {
            let lead = extractor().extract("llámame al +34 600 111 222");
            assert_eq!(lead.phone.as_deref(), Some("+34600111222"));
        }

        #[test]
        fn short_numbers_are_not_phones() {
            let lead = extractor().extract("somos 50 empleados");
            assert_eq!(lead.phone, None);
            assert_eq!(lead.company_size.as_deref(), Some("50"));
        }
    }

    mod qualification {
        use super::*;

        #[test]
        fn budget_after_keyword() {
            let lead = extractor().extract("tenemos un presupuesto de 10.000 euros");
            assert_eq!(lead.budget.as_deref(), Some("10.000 euros"));
        }

        #[test]
        fn bare_money_amount() {
            let lead = extractor().extract("we could spend $5k on this");
            assert_eq!(lead.budget.as_deref(), Some("$5k"));
        }

        #[test]
        fn timeline_phrases() {
            let lead = extractor().extract("Queremos empezar el próximo mes");
            assert_eq!(lead.timeline.as_deref(), Some("el próximo mes"));
        }

        #[test]
        fn location_does_not_leak_into_company() {
            let lead = extractor().extract("somos de Sevilla");
            assert_eq!(lead.location.as_deref(), Some("Sevilla"));
            assert_eq!(lead.company, None);
        }
    }

    mod interests_and_pain {
        use super::*;

        #[test]
        fn canonical_interest_topics() {
            let lead = extractor().extract("Nos interesa la automatización de ventas con IA");
            assert_eq!(lead.interest, vec!["automation", "sales", "ai"]);
        }

        #[test]
        fn pain_point_is_captured_until_punctuation() {
            let lead = extractor().extract("Perdemos muchos clientes por la noche, es un lío");
            assert_eq!(lead.pain_points, vec!["muchos clientes por la noche"]);
        }
    }

    mod booking {
        use super::*;

        #[test]
        fn meeting_confirmation() {
            let lead = extractor().extract("Perfecto, ya agendé la reunión");
            assert_eq!(lead.meeting_scheduled, Some(true));
        }

        #[test]
        fn calendar_link_trailing_punctuation_trimmed() {
            let lead = extractor().extract("use https://calendly.com/acme/demo.");
            assert_eq!(
                lead.calendar_link.as_deref(),
                Some("https://calendly.com/acme/demo")
            );
        }

        #[test]
        fn plain_chat_extracts_nothing() {
            assert!(extractor().extract("qué tal, todo bien").is_empty());
        }
    }
}
