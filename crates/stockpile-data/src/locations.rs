//! Locations: per-map bundles plus the global loot generation tables.

use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{
    DataLoadError, LoadContext, load_document, load_keyed_dir, load_keyed_dir_with,
    normalize_records,
};
use crate::schema::Document;
use crate::source::AssetSource;

/// Everything loaded for one map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRecord {
    pub base: Document,
    pub available_spawns: Document,
    /// Loot spawn entries per spawn category, in file order.
    pub loot_spawns: BTreeMap<String, Vec<Document>>,
    /// Static scenery presets keyed by preset name.
    pub presets: BTreeMap<String, Document>,
}

/// Loot placement weights shared by every map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootGenTables {
    pub containers: Document,
    pub static_weapons: Document,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locations {
    /// Maps keyed by directory name.
    pub maps: BTreeMap<String, LocationRecord>,
    pub loot_gen: LootGenTables,
}

impl Locations {
    pub fn location(&self, name: &str) -> Option<&LocationRecord> {
        self.maps.get(name)
    }
}

/// Strict enumeration used for loot and preset directories: any failure is
/// logged at error level and aborts the build.
fn load_strict_dir<T>(
    dir: &Path,
    load: impl FnOnce() -> Result<T, DataLoadError>,
) -> Result<T, DataLoadError> {
    load().inspect_err(|e| {
        tracing::error!(path = %dir.display(), error = %e, "required location data unreadable");
    })
}

/// Load one map directory. Every part is required.
pub fn load_location(source: &dyn AssetSource, map_dir: &Path) -> Result<LocationRecord, DataLoadError> {
    let base = load_document(source, &map_dir.join("base.json")).context("base")?;
    let available_spawns =
        load_document(source, &map_dir.join("availableSpawns.json")).context("available spawns")?;

    let loot_dir = map_dir.join("lootSpawns");
    let loot_spawns = load_strict_dir(&loot_dir, || {
        load_keyed_dir_with(source, &loot_dir, normalize_records)
    })
    .context("loot spawns")?;

    let presets_dir = map_dir.join("#presets");
    let presets = load_strict_dir(&presets_dir, || load_keyed_dir(source, &presets_dir))
        .context("presets")?;

    Ok(LocationRecord {
        base,
        available_spawns,
        loot_spawns,
        presets,
    })
}

/// Load the two global loot generation tables.
pub fn load_loot_gen(source: &dyn AssetSource, database_dir: &Path) -> Result<LootGenTables, DataLoadError> {
    let dir = database_dir.join("lootGen");
    Ok(LootGenTables {
        containers: load_document(source, &dir.join("containersSpawnData.json"))
            .context("container spawn data")?,
        static_weapons: load_document(source, &dir.join("staticWeaponsData.json"))
            .context("static weapons data")?,
    })
}

/// Load every map under `locations/`, then the loot generation tables.
pub fn load_locations(source: &dyn AssetSource, database_dir: &Path) -> Result<Locations, DataLoadError> {
    let locations_dir = database_dir.join("locations");
    let names = source.list_dirs(&locations_dir).context("locations directory")?;

    let mut maps = BTreeMap::new();
    for name in names {
        let record = load_location(source, &locations_dir.join(&name))
            .with_context(|| format!("location {name}"))?;
        maps.insert(name, record);
    }

    let loot_gen = load_loot_gen(source, database_dir)?;
    Ok(Locations { maps, loot_gen })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemorySource, minimal_tree};

    const MAP: &str = "database/locations/factory4_day";

    #[test]
    fn loads_map_bundle() {
        let source = MemorySource::from_tree(minimal_tree());
        let locations = load_locations(&source, Path::new("database")).unwrap();
        let factory = locations.location("factory4_day").unwrap();

        assert_eq!(factory.base["Id"], "factory4_day");
        assert!(factory.available_spawns.contains_key("spawns"));
        let loose = &factory.loot_spawns["looseLoot"];
        assert_eq!(loose.len(), 2);
        assert_eq!(loose[0]["id"], "spawn1");
        assert!(factory.presets.contains_key("scenery"));
        assert!(locations.loot_gen.containers.contains_key("container_tpl"));
        assert!(locations.loot_gen.static_weapons.contains_key("mounted"));
    }

    #[test]
    fn loot_spawn_must_be_array() {
        let source = MemorySource::from_tree(minimal_tree())
            .with_file(&format!("{MAP}/lootSpawns/looseLoot.json"), r#"{"id": "x"}"#);
        let err = load_locations(&source, Path::new("database")).unwrap_err();
        assert!(err.is_schema());
        assert!(format!("{err}").contains("loot spawns"));
    }

    #[test]
    fn missing_presets_directory_is_fatal() {
        let source =
            MemorySource::from_tree(minimal_tree()).without_dir(&format!("{MAP}/#presets"));
        let err = load_locations(&source, Path::new("database")).unwrap_err();
        assert!(err.is_not_found());
        assert!(format!("{err}").contains("location factory4_day"));
    }

    #[test]
    fn missing_base_is_fatal() {
        let source =
            MemorySource::from_tree(minimal_tree()).without_file(&format!("{MAP}/base.json"));
        let err = load_locations(&source, Path::new("database")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_loot_gen_is_fatal() {
        let source = MemorySource::from_tree(minimal_tree())
            .without_file("database/lootGen/staticWeaponsData.json");
        let err = load_locations(&source, Path::new("database")).unwrap_err();
        assert!(format!("{err}").contains("static weapons data"));
    }
}
