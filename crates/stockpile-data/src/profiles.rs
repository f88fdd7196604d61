//! Player profiles.
//!
//! Profiles are user data rather than shipped content, so every document is
//! allowed to be missing: a bad document is reported and skipped, never fatal.

use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{DataLoadError, LoadContext, LoadPolicy, load_with_policy};
use crate::schema::{Document, RaidState};
use crate::source::AssetSource;

/// One player's documents plus their (never persisted) raid state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRecord {
    pub account: Option<Document>,
    pub character: Option<Document>,
    pub storage: Option<Document>,
    pub dialogues: Option<Document>,
    pub raid: RaidState,
}

fn load_profile_document(
    source: &dyn AssetSource,
    profile_dir: &Path,
    profile_id: &str,
    file: &str,
) -> Result<Option<Document>, DataLoadError> {
    let path = profile_dir.join(file);
    let document: Option<Document> = load_with_policy(source, &path, LoadPolicy::Logged)?;
    match document {
        Some(doc) if doc.is_empty() => {
            tracing::warn!(profile = profile_id, file, "profile document is empty");
            Ok(None)
        }
        other => Ok(other),
    }
}

/// Load one profile directory.
pub fn load_profile(
    source: &dyn AssetSource,
    profile_dir: &Path,
    profile_id: &str,
) -> Result<ProfileRecord, DataLoadError> {
    Ok(ProfileRecord {
        account: load_profile_document(source, profile_dir, profile_id, "account.json")?,
        character: load_profile_document(source, profile_dir, profile_id, "character.json")?,
        storage: load_profile_document(source, profile_dir, profile_id, "storage.json")?,
        dialogues: load_profile_document(source, profile_dir, profile_id, "dialogues.json")?,
        raid: RaidState::default(),
    })
}

/// Load every profile under `profiles_dir`, creating the directory on first run.
pub fn load_profiles(
    source: &dyn AssetSource,
    profiles_dir: &Path,
) -> Result<BTreeMap<String, ProfileRecord>, DataLoadError> {
    if !source.exists(profiles_dir) {
        source
            .create_dir_all(profiles_dir)
            .context("profiles directory")?;
        tracing::info!(path = %profiles_dir.display(), "created profiles directory");
        return Ok(BTreeMap::new());
    }

    let profile_ids = source.list_dirs(profiles_dir).context("profiles directory")?;
    if profile_ids.is_empty() {
        tracing::info!(path = %profiles_dir.display(), "no profiles found");
    }

    let mut profiles = BTreeMap::new();
    for id in profile_ids {
        let record = load_profile(source, &profiles_dir.join(&id), &id)?;
        profiles.insert(id, record);
    }
    Ok(profiles)
}
