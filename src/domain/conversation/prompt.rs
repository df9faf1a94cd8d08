//! System prompt construction with an explicit, injected cache.
//!
//! The static persona section is expensive to assemble and identical for
//! every turn in a language, so it is cached per language. The cache is an
//! ordinary value owned by whoever builds prompts and is cleared explicitly
//! when the conversation language changes.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use super::context::ConversationContext;
use crate::domain::language::Language;

/// Per-language cache of the static prompt section.
#[derive(Debug, Default)]
pub struct PromptCache {
    entries: HashMap<Language, Arc<str>>,
    hits: u64,
    misses: u64,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached prompt for `language`, building it on a miss.
    pub fn get_or_insert_with(&mut self, language: Language, build: impl FnOnce() -> String) -> Arc<str> {
        if let Some(prompt) = self.entries.get(&language) {
            self.hits += 1;
            return Arc::clone(prompt);
        }
        self.misses += 1;
        let prompt: Arc<str> = Arc::from(build());
        self.entries.insert(language, Arc::clone(&prompt));
        prompt
    }

    pub fn invalidate(&mut self, language: Language) {
        self.entries.remove(&language);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, language: Language) -> bool {
        self.entries.contains_key(&language)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

/// Persona details baked into the static prompt section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPersona {
    pub assistant_name: String,
    pub company_name: String,
    pub product_summary: String,
}

impl Default for PromptPersona {
    fn default() -> Self {
        Self {
            assistant_name: "Robi".to_string(),
            company_name: "our company".to_string(),
            product_summary: "AI assistants and automation for sales and customer service"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemPromptBuilder {
    persona: PromptPersona,
}

impl SystemPromptBuilder {
    pub fn new(persona: PromptPersona) -> Self {
        Self { persona }
    }

    /// Static persona section for `language`.
    pub fn base_prompt(&self, language: Language) -> String {
        let p = &self.persona;
        match language {
            Language::Es => format!(
                "Eres {name}, un robot asistente de ventas de {company}. Ofrecemos {product}.\n\
                 Hablas por voz: responde en frases cortas y naturales, máximo tres frases, sin listas ni formato.\n\
                 Haz una sola pregunta por respuesta. Nunca inventes precios ni compromisos.\n\
                 Responde siempre en español.",
                name = p.assistant_name,
                company = p.company_name,
                product = p.product_summary,
            ),
            Language::En => format!(
                "You are {name}, a sales assistant robot for {company}. We offer {product}.\n\
                 You speak out loud: answer in short natural sentences, at most three, no lists or formatting.\n\
                 Ask only one question per reply. Never make up prices or commitments.\n\
                 Always answer in English.",
                name = p.assistant_name,
                company = p.company_name,
                product = p.product_summary,
            ),
        }
    }

    /// Full prompt: cached static section plus the per-turn dynamic section.
    pub fn build(
        &self,
        cache: &mut PromptCache,
        context: &ConversationContext,
        language: Language,
        session_expiring: bool,
    ) -> String {
        let base = cache.get_or_insert_with(language, || self.base_prompt(language));
        let mut prompt = String::with_capacity(base.len() + 512);
        prompt.push_str(&base);

        let _ = write!(
            prompt,
            "\n\n## Conversation phase: {}\n{}",
            context.phase.label(),
            context.phase.directive()
        );

        let known = context.lead_data.known_fields();
        if !known.is_empty() {
            prompt.push_str("\n\n## What we know about the visitor");
            for (key, value) in known {
                let _ = write!(prompt, "\n- {}: {}", key, value);
            }
        }

        let missing = context.lead_data.missing_fields();
        if !missing.is_empty() {
            let _ = write!(
                prompt,
                "\n\n## Still unknown (ask naturally, one at a time)\n{}",
                missing.join(", ")
            );
        }

        if !context.objections.is_empty() {
            let _ = write!(
                prompt,
                "\n\n## Objections raised\n{}",
                context.objections.join(", ")
            );
        }

        if let Some(topic) = &context.last_topic {
            let _ = write!(prompt, "\n\n## Current topic\n{}", topic);
        }

        if session_expiring {
            prompt.push_str(
                "\n\n## Time is almost up\nWrap up now: propose a next step, ask for an email if missing and say goodbye.",
            );
        }

        prompt
    }
}
