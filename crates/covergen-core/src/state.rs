//! UI-agnostic form state types
//!
//! These are the values the user types in. They don't depend on any specific
//! UI framework, so the TUI (or any other front end) can share them.

use serde::{Deserialize, Serialize};

/// The candidate half of the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub skills: String,
    pub experience: String,
}

/// Selects one field of a [`UserProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Skills,
    Experience,
}

impl UserProfile {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Skills => &self.skills,
            ProfileField::Experience => &self.experience,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Skills => self.skills = value,
            ProfileField::Experience => self.experience = value,
        }
    }
}

impl ProfileField {
    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Name => "Your Name",
            ProfileField::Skills => "Key Skills",
            ProfileField::Experience => "Relevant Experience",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ProfileField::Name => "John Doe",
            ProfileField::Skills => "List your key skills relevant to the position",
            ProfileField::Experience => "Briefly describe your relevant work experience...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_touches_only_selected_field() {
        let mut profile = UserProfile::default();
        profile.set(ProfileField::Skills, "Rust".to_string());
        assert_eq!(profile.get(ProfileField::Skills), "Rust");
        assert_eq!(profile.name, "");
        assert_eq!(profile.experience, "");
    }
}
