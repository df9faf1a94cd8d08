//! Lead data captured from the conversation.

use serde::{Deserialize, Serialize};

/// Contact and interest information about the visitor.
///
/// Every field is optional and filled incrementally. Updates are always
/// merged field by field; a later utterance never wipes an earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadData {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub interest: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub company_size: Option<String>,
    pub location: Option<String>,
    pub meeting_scheduled: Option<bool>,
    pub calendar_link: Option<String>,
}

impl LeadData {
    /// Merges `update` into self. Scalars are replaced only when the update
    /// carries a different value; lists are unioned preserving order.
    ///
    /// Returns true if anything changed.
    pub fn merge(&mut self, update: LeadData) -> bool {
        let mut changed = false;
        changed |= merge_scalar(&mut self.name, update.name);
        changed |= merge_scalar(&mut self.company, update.company);
        changed |= merge_scalar(&mut self.email, update.email);
        changed |= merge_scalar(&mut self.phone, update.phone);
        changed |= merge_scalar(&mut self.role, update.role);
        changed |= merge_list(&mut self.interest, update.interest);
        changed |= merge_list(&mut self.pain_points, update.pain_points);
        changed |= merge_scalar(&mut self.budget, update.budget);
        changed |= merge_scalar(&mut self.timeline, update.timeline);
        changed |= merge_scalar(&mut self.company_size, update.company_size);
        changed |= merge_scalar(&mut self.location, update.location);
        changed |= merge_scalar(&mut self.meeting_scheduled, update.meeting_scheduled);
        changed |= merge_scalar(&mut self.calendar_link, update.calendar_link);
        changed
    }

    pub fn is_empty(&self) -> bool {
        *self == LeadData::default()
    }

    pub fn has_meeting(&self) -> bool {
        self.meeting_scheduled == Some(true)
    }

    /// True once enough is known to talk about fit.
    pub fn is_qualifiable(&self) -> bool {
        self.company.is_some()
            && (self.role.is_some() || self.company_size.is_some() || self.budget.is_some())
    }

    /// Core fields still unknown, in the order the avatar should ask for them.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.company.is_none() {
            missing.push("company");
        }
        if self.role.is_none() {
            missing.push("role");
        }
        if self.interest.is_empty() {
            missing.push("interest");
        }
        if self.email.is_none() && self.phone.is_none() {
            missing.push("email");
        }
        missing
    }

    /// Known fields as `key: value` lines for the system prompt.
    pub fn known_fields(&self) -> Vec<(&'static str, String)> {
        let mut known = Vec::new();
        let scalars = [
            ("name", &self.name),
            ("company", &self.company),
            ("email", &self.email),
            ("phone", &self.phone),
            ("role", &self.role),
            ("budget", &self.budget),
            ("timeline", &self.timeline),
            ("company size", &self.company_size),
            ("location", &self.location),
            ("calendar link", &self.calendar_link),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                known.push((key, value.clone()));
            }
        }
        if !self.interest.is_empty() {
            known.push(("interest", self.interest.join(", ")));
        }
        if !self.pain_points.is_empty() {
            known.push(("pain points", self.pain_points.join("; ")));
        }
        if self.has_meeting() {
            known.push(("meeting", "scheduled".to_string()));
        }
        known
    }
}

fn merge_scalar<T: PartialEq>(slot: &mut Option<T>, update: Option<T>) -> bool {
    match update {
        Some(value) if slot.as_ref() != Some(&value) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

fn merge_list(list: &mut Vec<String>, update: Vec<String>) -> bool {
    let mut changed = false;
    for item in update {
        if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&item)) {
            list.push(item);
            changed = true;
        }
    }
    changed
}
