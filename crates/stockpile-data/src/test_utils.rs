//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in the
//! integration test crate.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::loader::{DataLoadError, parse_document};
use crate::source::AssetSource;

// ===========================================================================
// In-memory asset source
// ===========================================================================

/// An [`AssetSource`] over an in-memory file tree.
///
/// Adding a file adds all of its parent directories. Directories can also
/// exist on their own (empty). `create_dir_all` mutates the tree, so the
/// maps sit behind `RefCell`s.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from `(path, content)` pairs.
    pub fn from_tree<P, C>(tree: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<String>,
    {
        tree.into_iter()
            .fold(Self::new(), |source, (path, content)| source.with_file(path, content))
    }

    /// Add or replace a file.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = path.as_ref();
        self.add_parents(path);
        self.files.borrow_mut().insert(path.to_path_buf(), content.into());
        self
    }

    pub fn without_file(self, path: impl AsRef<Path>) -> Self {
        self.files.borrow_mut().remove(path.as_ref());
        self
    }

    /// Add an (initially empty) directory and its parents.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path.as_ref());
        self
    }

    /// Remove a directory and everything beneath it.
    pub fn without_dir(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.files.borrow_mut().retain(|p, _| !p.starts_with(path));
        self.dirs.borrow_mut().retain(|p| !p.starts_with(path));
        self
    }

    fn add_parents(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
    }

    fn add_dir(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.borrow().contains(path)
    }

    fn check_dir(&self, path: &Path) -> Result<(), DataLoadError> {
        if self.is_dir(path) {
            return Ok(());
        }
        if self.files.borrow().contains_key(path) {
            return Err(DataLoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }
        Err(DataLoadError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

fn child_name(parent: &Path, child: &Path) -> Option<String> {
    if child.parent() == Some(parent) {
        child.file_name().map(|n| n.to_string_lossy().into_owned())
    } else {
        None
    }
}

impl AssetSource for MemorySource {
    fn read_document(&self, path: &Path) -> Result<Value, DataLoadError> {
        match self.files.borrow().get(path) {
            Some(content) => parse_document(path, content),
            None if self.is_dir(path) => Err(DataLoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            }),
            None => Err(DataLoadError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, DataLoadError> {
        self.check_dir(path)?;
        Ok(self
            .dirs
            .borrow()
            .iter()
            .filter_map(|d| child_name(path, d))
            .collect())
    }

    fn list_files(&self, path: &Path) -> Result<Vec<String>, DataLoadError> {
        self.check_dir(path)?;
        Ok(self
            .files
            .borrow()
            .keys()
            .filter_map(|f| child_name(path, f))
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path) || self.files.borrow().contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DataLoadError> {
        self.add_dir(path);
        Ok(())
    }
}

// ===========================================================================
// Fixture tree
// ===========================================================================

const PRAPOR: &str = "database/traders/54cb50c76803fa8b248b4571";
const ASSAULT: &str = "database/bot/bots/assault";
const FACTORY: &str = "database/locations/factory4_day";

/// The smallest content tree that builds a complete store: one of everything.
pub fn minimal_tree() -> Vec<(String, String)> {
    let entries: Vec<(String, &str)> = vec![
        // core
        (
            "database/core/server.json".into(),
            r#"{"ip": "127.0.0.1", "port": 6969, "name": "stockpile"}"#,
        ),
        ("database/core/matchMetrics.json".into(), r#"{"Keys": [0, 5, 10]}"#),
        (
            "database/core/globals.json".into(),
            r#"{
                "config": {"RagFair": {"minUserLevel": 15}},
                "ItemPresets": {
                    "preset1": {
                        "_id": "preset1",
                        "_type": "Preset",
                        "_items": [
                            {"_id": "root", "_tpl": "weapon_tpl"},
                            {"_id": "mag", "_tpl": "mag_tpl", "parentId": "root"}
                        ]
                    }
                }
            }"#,
        ),
        (
            "database/core/client.settings.json".into(),
            r#"{"err": 0, "errmsg": null, "data": {"config": {"AFKTimeoutSeconds": 7200}}}"#,
        ),
        ("database/core/locations.json".into(), r#"{"locations": {}, "paths": []}"#),
        ("database/core/botTemplate.json".into(), r#"{"_id": "", "Info": {}}"#),
        // editions
        (
            "database/editions/Standard/character_bear.json".into(),
            r#"{"Info": {"Side": "Bear", "Level": 1}}"#,
        ),
        (
            "database/editions/Standard/character_usec.json".into(),
            r#"{"Info": {"Side": "Usec", "Level": 1}}"#,
        ),
        (
            "database/editions/Standard/storage.json".into(),
            r#"{"suites": ["suit1"]}"#,
        ),
        // catalog
        (
            "database/items.json".into(),
            r#"{
                "item_ammo": {"_id": "item_ammo", "_name": "patron_545x39", "_parent": "ammo"},
                "item_bandage": {"_id": "item_bandage", "_name": "bandage", "_parent": "medical"}
            }"#,
        ),
        (
            "database/templates.json".into(),
            r#"{"data": {
                "Categories": [
                    {"Id": "cat_root", "ParentId": null, "Icon": "/icons/root.png"},
                    {"Id": "cat_ammo", "ParentId": "cat_root", "Icon": "/icons/ammo.png"}
                ],
                "Items": [
                    {"Id": "item_ammo", "ParentId": "cat_ammo", "Price": 100},
                    {"Id": "item_bandage", "ParentId": "cat_ammo", "Price": 1200}
                ]
            }}"#,
        ),
        ("database/liveflea.json".into(), r#"{"item_ammo": 250}"#),
        // locales
        ("database/locales/en/locale.json".into(), r#"{"interface": {"Quit": "Quit"}}"#),
        ("database/locales/en/menu.json".into(), r#"{"Start": "Start"}"#),
        ("database/locales/ru/locale.json".into(), r#"{"interface": {"Quit": "Выход"}}"#),
        ("database/locales/ru/menu.json".into(), r#"{"Start": "Начать"}"#),
        (
            "database/locales/languages.json".into(),
            r#"{"err": 0, "data": {"en": "English", "ru": "Русский"}}"#,
        ),
        ("database/locales/extras.json".into(), r#"{"notes": {"en": "Welcome"}}"#),
        // traders
        (
            format!("{PRAPOR}/base.json"),
            r#"{"_id": "54cb50c76803fa8b248b4571", "nickname": "Prapor", "currency": "RUB"}"#,
        ),
        (
            format!("{PRAPOR}/assort.json"),
            r#"{
                "items": [{"_id": "offer1", "_tpl": "item_ammo", "parentId": "hideout"}],
                "barter_scheme": {"offer1": [[{"count": 100, "_tpl": "roubles"}]]},
                "loyal_level_items": {"offer1": 1}
            }"#,
        ),
        (
            format!("{PRAPOR}/questassort.json"),
            r#"{"started": {}, "success": {"offer1": "quest1"}, "fail": {}}"#,
        ),
        (
            format!("{PRAPOR}/suits.json"),
            r#"[{"_id": "suit_offer1", "suiteId": "suit1", "requirements": {"loyaltyLevel": 1}}]"#,
        ),
        (format!("{PRAPOR}/dialogue.json"), r#"{"insuranceStart": ["msg1"]}"#),
        // single-document tables
        (
            "database/quests.json".into(),
            r#"{"quest1": {"_id": "quest1", "traderId": "54cb50c76803fa8b248b4571"}}"#,
        ),
        (
            "database/customization.json".into(),
            r#"{"err": 0, "data": {"suit1": {"_id": "suit1", "_type": "Item"}}}"#,
        ),
        ("database/weather.json".into(), r#"{"weather": {"cloud": 0.1}, "acceleration": 7}"#),
        // hideout
        (
            "database/hideout/areas.json".into(),
            r#"[{"_id": "area_vents", "type": 0}, {"_id": "area_security", "type": 1}]"#,
        ),
        (
            "database/hideout/productions.json".into(),
            r#"{"recipe1": {"_id": "recipe1", "areaType": 2, "productionTime": 600}}"#,
        ),
        ("database/hideout/scavcase.json".into(), r#"[{"_id": "scav1", "ProductionTime": 2500}]"#),
        ("database/hideout/qte.json".into(), r#"[{"id": "qte1", "type": "ShrinkingCircle"}]"#),
        (
            "database/hideout/settings.json".into(),
            r#"{"generatorSpeedWithoutFuel": 0.15, "airFilterUnitFlowRate": 0.0047}"#,
        ),
        // profiles
        (
            "user/profiles/pmc1/account.json".into(),
            r#"{"id": "pmc1", "username": "player", "edition": "Standard"}"#,
        ),
        (
            "user/profiles/pmc1/character.json".into(),
            r#"{"_id": "pmc1", "Info": {"Side": "Bear"}}"#,
        ),
        ("user/profiles/pmc1/storage.json".into(), r#"{"suites": ["suit1"]}"#),
        ("user/profiles/pmc1/dialogues.json".into(), r#"{"54cb50c76803fa8b248b4571": {}}"#),
        // bots
        (
            "database/bot/__BotGlobalSettings.json".into(),
            r#"{"SAVAGE_KILL_DIST": 5}"#,
        ),
        ("database/bot/names.json".into(), r#"{"bear": ["Ivan"], "usec": ["John"]}"#),
        ("database/bot/appearance.json".into(), r#"{"head": ["head1"]}"#),
        ("database/bot/playerScav.json".into(), r#"{"Info": {"Side": "Savage"}}"#),
        ("database/bot/weaponCache.json".into(), r#"{"weapon_tpl": ["mag_tpl"]}"#),
        (
            format!("{ASSAULT}/health.json"),
            r#"{
                "BodyParts": {"Head": {"min": 35, "max": 35}},
                "Temperature": {"min": 36, "max": 37},
                "Hydration": 100
            }"#,
        ),
        (format!("{ASSAULT}/loadout.json"), r#"{"FirstPrimaryWeapon": ["weapon_tpl"]}"#),
        (format!("{ASSAULT}/difficulties/easy.json"), r#"{"Aiming": {"BOTTOM_COEF": 0.3}}"#),
        (format!("{ASSAULT}/difficulties/hard.json"), r#"{"Aiming": {"BOTTOM_COEF": 0.1}}"#),
        // locations
        (format!("{FACTORY}/base.json"), r#"{"Id": "factory4_day", "Enabled": true}"#),
        (format!("{FACTORY}/availableSpawns.json"), r#"{"spawns": []}"#),
        (
            format!("{FACTORY}/lootSpawns/looseLoot.json"),
            r#"[{"id": "spawn1", "Position": {"x": 1}}, {"id": "spawn2", "Position": {"x": 2}}]"#,
        ),
        (format!("{FACTORY}/#presets/scenery.json"), r#"{"props": ["crate"]}"#),
        (
            "database/lootGen/containersSpawnData.json".into(),
            r#"{"container_tpl": {"items": ["item_ammo"]}}"#,
        ),
        (
            "database/lootGen/staticWeaponsData.json".into(),
            r#"{"mounted": ["weapon_tpl"]}"#,
        ),
    ];

    entries
        .into_iter()
        .map(|(path, content)| (path, content.to_string()))
        .collect()
}

/// Write a `(path, content)` tree under `root` on disk.
pub fn write_tree(root: &Path, tree: &[(String, String)]) -> std::io::Result<()> {
    for (path, content) in tree {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_direct_children_only() {
        let source = MemorySource::new()
            .with_file("db/traders/a/base.json", "{}")
            .with_file("db/traders/b/sub/x.json", "{}")
            .with_file("db/traders/index.json", "{}");

        assert_eq!(source.list_dirs(Path::new("db/traders")).unwrap(), vec!["a", "b"]);
        assert_eq!(source.list_files(Path::new("db/traders")).unwrap(), vec!["index.json"]);
        assert_eq!(source.list_dirs(Path::new("")).unwrap(), vec!["db"]);
    }

    #[test]
    fn missing_and_non_directory_paths() {
        let source = MemorySource::new().with_file("d/file.json", "{}");
        assert!(source.list_dirs(Path::new("nope")).unwrap_err().is_not_found());
        assert!(matches!(
            source.list_files(Path::new("d/file.json")),
            Err(DataLoadError::Io { .. })
        ));
        assert!(source.read_document(Path::new("d/other.json")).unwrap_err().is_not_found());
    }

    #[test]
    fn without_dir_is_recursive() {
        let source = MemorySource::new()
            .with_file("a/b/c.json", "{}")
            .with_file("a/d.json", "{}")
            .without_dir("a/b");
        assert!(!source.exists(Path::new("a/b")));
        assert!(!source.exists(Path::new("a/b/c.json")));
        assert!(source.exists(Path::new("a/d.json")));
    }

    #[test]
    fn minimal_tree_parses() {
        let source = MemorySource::from_tree(minimal_tree());
        for (path, _) in minimal_tree() {
            assert!(source.read_document(Path::new(&path)).is_ok(), "{path}");
        }
    }
}
