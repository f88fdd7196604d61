//! Single-document content tables: quests, hideout, customization, weather.

use std::path::Path;

use crate::loader::{
    DataLoadError, LoadContext, LoadPolicy, apply_policy, load_document, load_document_with,
    load_unwrapped, load_with_policy, normalize_records,
};
use crate::schema::{Document, Hideout};
use crate::source::AssetSource;

pub fn load_quests(source: &dyn AssetSource, database_dir: &Path) -> Result<Document, DataLoadError> {
    load_document(source, &database_dir.join("quests.json")).context("quests")
}

pub fn load_weather(source: &dyn AssetSource, database_dir: &Path) -> Result<Document, DataLoadError> {
    load_document(source, &database_dir.join("weather.json")).context("weather")
}

/// Customization entries, unwrapped from their `data` envelope.
pub fn load_customization(
    source: &dyn AssetSource,
    database_dir: &Path,
) -> Result<Document, DataLoadError> {
    load_unwrapped(source, &database_dir.join("customization.json")).context("customization")
}

fn load_record_list(source: &dyn AssetSource, path: &Path) -> Result<Option<Vec<Document>>, DataLoadError> {
    apply_policy(
        path,
        LoadPolicy::Tolerant,
        load_document_with(source, path, normalize_records),
    )
}

/// Load the hideout tables. Each file fills its own slot; a missing or
/// malformed file leaves that slot empty and the rest untouched.
pub fn load_hideout(source: &dyn AssetSource, database_dir: &Path) -> Result<Hideout, DataLoadError> {
    let dir = database_dir.join("hideout");
    let policy = LoadPolicy::Tolerant;

    let hideout = Hideout {
        areas: load_record_list(source, &dir.join("areas.json"))?.unwrap_or_default(),
        productions: load_with_policy(source, &dir.join("productions.json"), policy)?
            .unwrap_or_default(),
        scavcase: load_record_list(source, &dir.join("scavcase.json"))?.unwrap_or_default(),
        qte: load_record_list(source, &dir.join("qte.json"))?.unwrap_or_default(),
        settings: load_with_policy(source, &dir.join("settings.json"), policy)?
            .unwrap_or_default(),
    };

    tracing::debug!(
        areas = hideout.areas.len(),
        scavcase = hideout.scavcase.len(),
        qte = hideout.qte.len(),
        "hideout loaded"
    );
    Ok(hideout)
}
