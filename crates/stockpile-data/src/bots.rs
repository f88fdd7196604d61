//! Bot definitions: global bot documents and per-archetype bundles.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{
    DataLoadError, LoadContext, LoadPolicy, load_document, load_keyed_dir, load_with_policy,
};
use crate::schema::Document;
use crate::source::AssetSource;

/// Health table, loadout and difficulty settings for one AI archetype.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotTypeRecord {
    pub health: Option<Document>,
    pub loadout: Option<Document>,
    /// Difficulty documents keyed by file stem (`easy`, `normal`, ...).
    pub difficulties: BTreeMap<String, Document>,
}

/// All bot documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotDefinitions {
    pub core: Document,
    pub names: Document,
    pub appearance: Document,
    pub player_scav: Document,
    pub weapon_cache: Document,
    /// Archetypes keyed by directory name.
    pub bots: BTreeMap<String, BotTypeRecord>,
}

impl BotDefinitions {
    pub fn bot_type(&self, name: &str) -> Option<&BotTypeRecord> {
        self.bots.get(name)
    }
}

/// Normalize a health document.
///
/// A single-entry document is already in its final shape. Anything larger
/// keeps only its object-valued entries, dropping legacy scalar fields.
pub fn normalize_health(mut health: Document) -> Document {
    if health.len() == 1 {
        return health;
    }
    health.retain(|_, value| matches!(value, Value::Object(_)));
    health
}

/// Load one archetype directory.
///
/// Health and loadout are optional. Difficulties are not: a missing or
/// unreadable `difficulties/` directory, or any bad document inside it, fails
/// the build.
pub fn load_bot_type(source: &dyn AssetSource, type_dir: &Path) -> Result<BotTypeRecord, DataLoadError> {
    let health: Option<Document> =
        load_with_policy(source, &type_dir.join("health.json"), LoadPolicy::Tolerant)?;
    let loadout = load_with_policy(source, &type_dir.join("loadout.json"), LoadPolicy::Tolerant)?;

    let difficulties_dir = type_dir.join("difficulties");
    let difficulties = load_keyed_dir(source, &difficulties_dir).inspect_err(|e| {
        tracing::error!(path = %difficulties_dir.display(), error = %e, "bot difficulties unreadable");
    })?;

    Ok(BotTypeRecord {
        health: health.map(normalize_health),
        loadout,
        difficulties,
    })
}

/// Load the global bot documents, then every archetype under `bot/bots/`.
pub fn load_bots(source: &dyn AssetSource, database_dir: &Path) -> Result<BotDefinitions, DataLoadError> {
    let bot_dir = database_dir.join("bot");

    let core = load_document(source, &bot_dir.join("__BotGlobalSettings.json"))
        .context("bot global settings")?;
    let names = load_document(source, &bot_dir.join("names.json")).context("bot names")?;
    let appearance =
        load_document(source, &bot_dir.join("appearance.json")).context("bot appearance")?;
    let player_scav =
        load_document(source, &bot_dir.join("playerScav.json")).context("player scav")?;
    let weapon_cache =
        load_document(source, &bot_dir.join("weaponCache.json")).context("weapon cache")?;

    let bots_dir = bot_dir.join("bots");
    let archetypes = source.list_dirs(&bots_dir).context("bots directory")?;
    let mut bots = BTreeMap::new();
    for name in archetypes {
        let record = load_bot_type(source, &bots_dir.join(&name))
            .with_context(|| format!("bot type {name}"))?;
        bots.insert(name, record);
    }

    Ok(BotDefinitions {
        core,
        names,
        appearance,
        player_scav,
        weapon_cache,
        bots,
    })
}
