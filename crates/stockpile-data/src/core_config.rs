//! Core configuration documents and the item-preset index derived from globals.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{DataLoadError, LoadContext, load_document, load_unwrapped};
use crate::schema::{Document, PresetHeader};
use crate::source::AssetSource;

/// The six core documents plus the preset index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreConfig {
    pub server: Document,
    pub match_metrics: Document,
    pub globals: Document,
    pub presets: PresetIndex,
    pub client_settings: Document,
    pub locations: Document,
    pub bot_template: Document,
}

/// Global presets grouped by the template id of their root item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetIndex {
    by_template: BTreeMap<String, BTreeMap<String, Document>>,
}

impl PresetIndex {
    /// Index every entry of `globals.ItemPresets`.
    ///
    /// All-or-nothing: a preset without an `_id` or without a root item
    /// template fails the whole index.
    pub fn from_globals(file: &Path, globals: &Document) -> Result<Self, DataLoadError> {
        let schema_err = |detail: String| DataLoadError::Schema {
            file: file.to_path_buf(),
            detail,
        };

        let presets = match globals.get("ItemPresets") {
            Some(Value::Object(presets)) => presets,
            Some(_) => return Err(schema_err("ItemPresets is not an object".to_string())),
            None => return Err(schema_err("ItemPresets not found in globals".to_string())),
        };

        let mut by_template: BTreeMap<String, BTreeMap<String, Document>> = BTreeMap::new();
        for (key, preset) in presets {
            let header = PresetHeader::deserialize(preset)
                .map_err(|e| schema_err(format!("preset {key}: {e}")))?;
            if header.items.is_empty() {
                return Err(schema_err(format!("preset {key} has no items")));
            }
            let root_tpl = header
                .root_tpl()
                .ok_or_else(|| schema_err(format!("preset {key}: root item has no _tpl")))?
                .to_string();
            let Value::Object(record) = preset else {
                return Err(schema_err(format!("preset {key} is not an object")));
            };

            by_template
                .entry(root_tpl)
                .or_default()
                .insert(header.id, record.clone());
        }

        Ok(Self { by_template })
    }

    /// Presets whose root item is `tpl`, keyed by preset id.
    pub fn presets_for(&self, tpl: &str) -> Option<&BTreeMap<String, Document>> {
        self.by_template.get(tpl)
    }

    /// Template ids that have at least one preset.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.by_template.keys().map(String::as_str)
    }

    /// Total number of indexed presets.
    pub fn len(&self) -> usize {
        self.by_template.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_template.is_empty()
    }
}

/// Load `core/` in its fixed order. Every document is required.
pub fn load_core_config(
    source: &dyn AssetSource,
    database_dir: &Path,
) -> Result<CoreConfig, DataLoadError> {
    let core_dir = database_dir.join("core");

    let server = load_document(source, &core_dir.join("server.json")).context("server config")?;
    let match_metrics =
        load_document(source, &core_dir.join("matchMetrics.json")).context("match metrics")?;

    let globals_path = core_dir.join("globals.json");
    let globals: Document = load_document(source, &globals_path).context("globals")?;
    let presets = PresetIndex::from_globals(&globals_path, &globals).context("presets")?;

    let client_settings = load_unwrapped(source, &core_dir.join("client.settings.json"))
        .context("client settings")?;
    let locations = load_document(source, &core_dir.join("locations.json")).context("locations")?;
    let bot_template =
        load_document(source, &core_dir.join("botTemplate.json")).context("bot template")?;

    tracing::debug!(presets = presets.len(), "core config loaded");

    Ok(CoreConfig {
        server,
        match_metrics,
        globals,
        presets,
        client_settings,
        locations,
        bot_template,
    })
}
