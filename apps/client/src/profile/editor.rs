use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use tracing::debug;

use crate::errors::ClientError;
use crate::models::profile::{Experience, Profile, ProfileField, Project};
use crate::profile::store::ProfileStore;

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tech: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

/// An editing session over a profile.
///
/// Mutations apply to a draft and are only allowed while editing is active.
/// `save` persists the whole draft; `cancel` throws it away.
pub struct ProfileEditor {
    saved: Profile,
    draft: Profile,
    editing: bool,
    last_id: u64,
}

impl ProfileEditor {
    pub fn open(store: &ProfileStore) -> Self {
        Self::from_profile(store.load())
    }

    pub fn from_profile(profile: Profile) -> Self {
        let last_id = profile.max_entry_id();
        Self {
            saved: profile.clone(),
            draft: profile,
            editing: false,
            last_id,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.draft
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Drops unsaved changes. Ids handed out during the session stay consumed.
    pub fn cancel(&mut self) {
        self.draft = self.saved.clone();
        self.editing = false;
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) -> Result<(), ClientError> {
        self.ensure_editing()?;
        let value = value.into();
        let slot = match field {
            ProfileField::Name => &mut self.draft.name,
            ProfileField::Email => &mut self.draft.email,
            ProfileField::Phone => &mut self.draft.phone,
            ProfileField::Location => &mut self.draft.location,
            ProfileField::Bio => &mut self.draft.bio,
            ProfileField::Education => &mut self.draft.education,
        };
        *slot = value;
        Ok(())
    }

    /// Appends a skill. Returns `false` (and changes nothing) for blanks and duplicates.
    pub fn add_skill(&mut self, skill: &str) -> Result<bool, ClientError> {
        self.ensure_editing()?;
        let skill = skill.trim();
        if skill.is_empty() || self.draft.skills.iter().any(|s| s == skill) {
            debug!("Skipping blank or duplicate skill '{skill}'");
            return Ok(false);
        }
        self.draft.skills.push(skill.to_string());
        Ok(true)
    }

    pub fn remove_skill(&mut self, skill: &str) -> Result<bool, ClientError> {
        self.ensure_editing()?;
        let before = self.draft.skills.len();
        self.draft.skills.retain(|s| s != skill.trim());
        Ok(self.draft.skills.len() != before)
    }

    /// Adds a project and returns its id. Title and description are required.
    pub fn add_project(&mut self, project: NewProject) -> Result<u64, ClientError> {
        self.ensure_editing()?;
        if project.title.trim().is_empty() || project.description.trim().is_empty() {
            return Err(ClientError::Validation(
                "A project needs a title and a description".to_string(),
            ));
        }
        let id = self.next_id();
        self.draft.projects.push(Project {
            id,
            title: project.title,
            description: project.description,
            tech: project.tech,
        });
        Ok(id)
    }

    pub fn remove_project(&mut self, id: u64) -> Result<bool, ClientError> {
        self.ensure_editing()?;
        let before = self.draft.projects.len();
        self.draft.projects.retain(|p| p.id != id);
        Ok(self.draft.projects.len() != before)
    }

    /// Adds an experience entry and returns its id. Title and company are required.
    pub fn add_experience(&mut self, experience: NewExperience) -> Result<u64, ClientError> {
        self.ensure_editing()?;
        if experience.title.trim().is_empty() || experience.company.trim().is_empty() {
            return Err(ClientError::Validation(
                "An experience entry needs a title and a company".to_string(),
            ));
        }
        let id = self.next_id();
        self.draft.experience.push(Experience {
            id,
            title: experience.title,
            company: experience.company,
            duration: experience.duration,
            description: experience.description,
        });
        Ok(id)
    }

    pub fn remove_experience(&mut self, id: u64) -> Result<bool, ClientError> {
        self.ensure_editing()?;
        let before = self.draft.experience.len();
        self.draft.experience.retain(|e| e.id != id);
        Ok(self.draft.experience.len() != before)
    }

    /// Stores an image as a `data:` URI.
    pub fn set_photo(&mut self, content_type: &str, bytes: &[u8]) -> Result<(), ClientError> {
        self.ensure_editing()?;
        if !content_type.starts_with("image/") {
            return Err(ClientError::Validation(format!(
                "Profile photo must be an image, got '{content_type}'"
            )));
        }
        self.draft.profile_photo = format!("data:{content_type};base64,{}", BASE64.encode(bytes));
        Ok(())
    }

    /// Persists the draft through the store and leaves editing mode.
    pub fn save(&mut self, store: &ProfileStore) -> Result<&Profile, ClientError> {
        let persisted = store.save(&self.draft)?;
        self.saved = persisted.clone();
        self.draft = persisted;
        self.editing = false;
        Ok(&self.draft)
    }

    fn ensure_editing(&self) -> Result<(), ClientError> {
        if self.editing {
            Ok(())
        } else {
            Err(ClientError::Validation(
                "Start editing the profile before changing it".to_string(),
            ))
        }
    }

    /// Millisecond clock, bumped past anything already issued or stored.
    fn next_id(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let floor = self.last_id.max(self.draft.max_entry_id()) + 1;
        self.last_id = now.max(floor);
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing() -> ProfileEditor {
        let mut editor = ProfileEditor::from_profile(Profile::default());
        editor.begin_edit();
        editor
    }

    #[test]
    fn test_mutation_requires_editing() {
        let mut editor = ProfileEditor::from_profile(Profile::default());
        let err = editor.add_skill("SQL").unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_duplicate_skill_is_ignored() {
        let mut editor = editing();
        assert!(editor.add_skill("SQL").unwrap());
        assert!(editor.add_skill("Agile").unwrap());
        assert!(!editor.add_skill("SQL").unwrap());
        assert_eq!(editor.profile().skills.len(), 2);
    }

    #[test]
    fn test_duplicate_skill_after_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));
        let mut editor = editing();
        editor.add_skill("SQL").unwrap();
        editor.add_skill("Python").unwrap();
        editor.save(&store).unwrap();

        let mut reopened = ProfileEditor::open(&store);
        reopened.begin_edit();
        assert!(!reopened.add_skill("SQL").unwrap());
        assert_eq!(reopened.profile().skills.len(), 2);
    }

    #[test]
    fn test_skill_compare_is_case_sensitive() {
        let mut editor = editing();
        editor.add_skill("sql").unwrap();
        assert!(editor.add_skill("SQL").unwrap());
        assert!(!editor.add_skill("  SQL ").unwrap());
        assert!(!editor.add_skill("   ").unwrap());
    }

    #[test]
    fn test_remove_skill() {
        let mut editor = editing();
        editor.add_skill("SQL").unwrap();
        assert!(editor.remove_skill("SQL").unwrap());
        assert!(!editor.remove_skill("SQL").unwrap());
    }

    #[test]
    fn test_project_ids_unique_and_not_reused() {
        let mut editor = editing();
        let project = || NewProject {
            title: "Dashboard".to_string(),
            description: "Cohorts".to_string(),
            tech: String::new(),
        };
        let a = editor.add_project(project()).unwrap();
        let b = editor.add_project(project()).unwrap();
        assert!(b > a);
        assert!(editor.remove_project(b).unwrap());
        let c = editor.add_project(project()).unwrap();
        assert!(c > b, "removed id {b} was reused as {c}");
    }

    #[test]
    fn test_ids_shared_across_projects_and_experience() {
        let mut editor = editing();
        let p = editor
            .add_project(NewProject {
                title: "T".to_string(),
                description: "D".to_string(),
                ..Default::default()
            })
            .unwrap();
        let e = editor
            .add_experience(NewExperience {
                title: "Intern".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_ne!(p, e);
    }

    #[test]
    fn test_ids_start_above_stored_entries() {
        let profile = Profile {
            projects: vec![Project {
                id: u64::MAX / 2,
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut editor = ProfileEditor::from_profile(profile);
        editor.begin_edit();
        let id = editor
            .add_experience(NewExperience {
                title: "Intern".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(id, u64::MAX / 2 + 1);
    }

    #[test]
    fn test_project_requires_title_and_description() {
        let mut editor = editing();
        let err = editor
            .add_project(NewProject {
                title: "Only a title".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(editor.profile().projects.is_empty());
    }

    #[test]
    fn test_experience_requires_company() {
        let mut editor = editing();
        assert!(editor
            .add_experience(NewExperience {
                title: "Intern".to_string(),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut editor = editing();
        editor.set_field(ProfileField::Name, "Asha").unwrap();
        editor.cancel();
        assert!(editor.profile().name.is_empty());
        assert!(editor.add_skill("SQL").is_err());
    }

    #[test]
    fn test_photo_becomes_data_uri() {
        let mut editor = editing();
        editor.set_photo("image/png", b"abc").unwrap();
        assert_eq!(editor.profile().profile_photo, "data:image/png;base64,YWJj");
        assert!(editor.set_photo("application/pdf", b"abc").is_err());
    }

    #[test]
    fn test_save_persists_and_leaves_editing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));
        let mut editor = editing();
        editor.set_field(ProfileField::Name, "Asha").unwrap();
        editor.set_field(ProfileField::Email, "asha@example.com").unwrap();
        let saved = editor.save(&store).unwrap().clone();
        assert!(editor.add_skill("SQL").is_err());
        assert!(saved.updated_at.is_some());
        assert_eq!(store.load(), saved);
        assert!(saved.is_complete());
    }
}
