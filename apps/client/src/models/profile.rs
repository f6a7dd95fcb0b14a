use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The durable identity of the user. The only entity that survives across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub education: String,
    /// Unique, case-sensitive, insertion-ordered.
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    /// `data:<mime>;base64,<payload>`
    pub profile_photo: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub tech: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: u64,
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

impl Profile {
    /// A profile is complete once it has a name and an email.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Highest project or experience id in use, 0 when there are none.
    pub fn max_entry_id(&self) -> u64 {
        self.projects
            .iter()
            .map(|p| p.id)
            .chain(self.experience.iter().map(|e| e.id))
            .max()
            .unwrap_or(0)
    }
}

/// Editable scalar fields, addressed by name from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Location,
    Bio,
    Education,
}
