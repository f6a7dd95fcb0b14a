//! Profile Store: the single persisted profile slot.
//!
//! One instance per process, shared by `Arc` with whatever needs the profile.
//! The slot is a JSON file holding `{"schema_version": N, "profile": {...}}`.
//! Reads fail soft; writes replace the whole file via temp file + rename.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ClientError;
use crate::models::profile::Profile;

/// Bump when the Profile shape changes, and add a step to [`migrate`].
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ProfileEnvelope {
    schema_version: u32,
    profile: Profile,
}

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved profile, or the empty default when there is none or it cannot be read.
    pub fn load(&self) -> Profile {
        self.load_saved().unwrap_or_default()
    }

    /// The saved profile, or `None` when the slot is absent, unreadable, or from a
    /// newer schema than this build understands.
    pub fn load_saved(&self) -> Option<Profile> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read profile at {}: {e}", self.path.display());
                return None;
            }
        };

        match decode(&contents) {
            Ok(profile) => Some(profile),
            Err(reason) => {
                warn!(
                    "Discarding unreadable profile at {}: {reason}",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Stamps `updated_at` (and `created_at` if unset) and overwrites the slot.
    /// Returns the profile as persisted.
    pub fn save(&self, profile: &Profile) -> Result<Profile, ClientError> {
        let now = Utc::now();
        let mut stamped = profile.clone();
        stamped.updated_at = Some(now);
        if stamped.created_at.is_none() {
            stamped.created_at = Some(now);
        }

        let envelope = ProfileEnvelope {
            schema_version: CURRENT_SCHEMA_VERSION,
            profile: stamped,
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| ClientError::Storage(format!("serialize profile: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, &self.path)?;

        info!(path = %self.path.display(), "profile saved");
        Ok(envelope.profile)
    }

    /// Removes the slot. Clearing an absent slot is a no-op.
    pub fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "profile cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode(contents: &str) -> Result<Profile, String> {
    let json: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    // A bare profile object predates the envelope.
    let on_disk_version = match json.get("schema_version") {
        None => 0,
        Some(raw) => raw
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("schema_version {raw} is not a version number"))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let envelope: ProfileEnvelope = serde_json::from_value(migrated).map_err(|e| e.to_string())?;
    Ok(envelope.profile)
}

/// Sequential pure transforms from `from_version` up to [`CURRENT_SCHEMA_VERSION`].
/// Newer versions are refused; the caller discards them.
fn migrate(json: Value, from_version: u32) -> Result<Value, String> {
    if from_version > CURRENT_SCHEMA_VERSION {
        return Err(format!(
            "schema_version {from_version} is newer than this build supports ({CURRENT_SCHEMA_VERSION})"
        ));
    }

    let mut json = json;

    // v0 → v1: wrap the bare profile; empty-string timestamps become null.
    if from_version < 1 {
        let mut profile = json;
        let obj = profile
            .as_object_mut()
            .ok_or_else(|| "profile is not a JSON object".to_string())?;
        for key in ["created_at", "updated_at"] {
            if obj.get(key).and_then(Value::as_str) == Some("") {
                obj.insert(key.to_string(), Value::Null);
            }
        }
        json = serde_json::json!({
            "schema_version": 1,
            "profile": profile,
        });
        info!("migrated profile v0 → v1");
    }

    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{Experience, Project};

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join("user_profile.json"))
    }

    fn sample_profile() -> Profile {
        Profile {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98450 00000".to_string(),
            location: "bangalore".to_string(),
            bio: "Aspiring PM".to_string(),
            education: "MBA, IIM Bangalore (2024)".to_string(),
            skills: vec!["SQL".to_string(), "Agile".to_string()],
            projects: vec![Project {
                id: 1_700_000_000_000,
                title: "Churn dashboard".to_string(),
                description: "Cohort analysis".to_string(),
                tech: "SQL, Tableau".to_string(),
            }],
            experience: vec![Experience {
                id: 1_700_000_000_001,
                title: "Analyst Intern".to_string(),
                company: "Acme".to_string(),
                duration: "3 months".to_string(),
                description: "Ran pricing experiments".to_string(),
            }],
            profile_photo: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_load_absent_slot_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load(), Profile::default());
        assert!(store.load_saved().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let saved = store.save(&sample_profile()).unwrap();
        assert_eq!(store.load(), saved);
    }

    #[test]
    fn test_save_stamps_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = store.save(&sample_profile()).unwrap();
        let created = first.created_at.expect("created_at stamped");
        assert!(first.updated_at.is_some());

        let second = store.save(&first).unwrap();
        assert_eq!(second.created_at, Some(created));
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("nested/deeper/profile.json"));
        store.save(&sample_profile()).unwrap();
        assert!(store.load().is_complete());
    }

    #[test]
    fn test_garbage_fails_soft() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn test_wrong_shape_fails_soft() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"schema_version":1,"profile":{"skills":"SQL"}}"#)
            .unwrap();
        assert!(store.load_saved().is_none());
    }

    #[test]
    fn test_legacy_bare_profile_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"name":"Asha","email":"asha@example.com","skills":["SQL"],
                "projects":[{"id":1700000000000,"title":"T","description":"D","tech":""}],
                "created_at":"","updated_at":""}"#,
        )
        .unwrap();
        let profile = store.load_saved().expect("legacy profile migrated");
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.projects[0].id, 1_700_000_000_000);
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn test_newer_schema_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"schema_version":99,"profile":{"name":"Future"}}"#,
        )
        .unwrap();
        assert!(store.load_saved().is_none());
    }

    #[test]
    fn test_non_numeric_schema_version_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for version in [r#""2""#, "-1", "1.5", "null", "4294967296"] {
            std::fs::write(
                store.path(),
                format!(r#"{{"schema_version":{version},"profile":{{"name":"Future"}}}}"#),
            )
            .unwrap();
            assert!(store.load_saved().is_none(), "kept schema_version {version}");
        }
    }

    #[test]
    fn test_clear_removes_slot_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample_profile()).unwrap();
        store.clear().unwrap();
        assert!(store.load_saved().is_none());
        store.clear().unwrap();
    }
}
