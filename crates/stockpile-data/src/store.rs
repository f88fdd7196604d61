//! The game data store: aggregate root and its build sequence.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::bots::{BotDefinitions, BotTypeRecord, load_bots};
use crate::catalog::{Catalog, load_catalog};
use crate::config::StoreConfig;
use crate::content::{load_customization, load_hideout, load_quests, load_weather};
use crate::core_config::{CoreConfig, load_core_config};
use crate::loader::DataLoadError;
use crate::locales::{EditionRecord, LocaleRecord, Locales, load_editions, load_locales};
use crate::locations::{LocationRecord, Locations, load_locations};
use crate::profiles::{ProfileRecord, load_profiles};
use crate::schema::{Document, FleaState, Hideout};
use crate::source::{AssetSource, FsAssetSource};
use crate::traders::{TraderRecord, load_traders};

/// Every loaded content table, built once at startup.
///
/// Fields are public so later gameplay code can mutate runtime state (live
/// trader stock, flea offers, raid state) in place; the build itself never
/// shares a partially built store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDataStore {
    pub core: CoreConfig,
    pub editions: BTreeMap<String, EditionRecord>,
    pub catalog: Catalog,
    pub locales: Locales,
    pub traders: BTreeMap<String, TraderRecord>,
    pub quests: Document,
    pub hideout: Hideout,
    pub customization: Document,
    pub profiles: BTreeMap<String, ProfileRecord>,
    pub weather: Document,
    pub bots: BotDefinitions,
    pub locations: Locations,
    pub flea: FleaState,
}

/// Run one build step, wrapping any error with the step name and logging
/// how many entries it produced.
fn step<T>(
    name: &'static str,
    load: impl FnOnce() -> Result<T, DataLoadError>,
    count: impl FnOnce(&T) -> usize,
) -> Result<T, DataLoadError> {
    let started = Instant::now();
    let value = load().map_err(|e| e.context(name))?;
    tracing::info!(
        step = name,
        count = count(&value),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded"
    );
    Ok(value)
}

impl GameDataStore {
    /// Build the store from `source`, in a fixed order. The first failing
    /// required resource aborts the build.
    pub fn build(source: &dyn AssetSource, config: &StoreConfig) -> Result<Self, DataLoadError> {
        let started = Instant::now();
        let db = config.database_dir.as_path();

        let core = step(
            "core config",
            || load_core_config(source, db),
            |c: &CoreConfig| c.presets.len(),
        )?;
        let editions = step("editions", || load_editions(source, db), BTreeMap::len)?;
        let catalog = step(
            "catalog",
            || load_catalog(source, db),
            |c: &Catalog| c.prices.len(),
        )?;
        let locales = step(
            "locales",
            || load_locales(source, db),
            |l: &Locales| l.locales.len(),
        )?;
        let traders = step("traders", || load_traders(source, db), BTreeMap::len)?;
        let quests = step("quests", || load_quests(source, db), Document::len)?;
        let hideout = step(
            "hideout",
            || load_hideout(source, db),
            |h: &Hideout| h.areas.len(),
        )?;
        let customization =
            step("customization", || load_customization(source, db), Document::len)?;
        let profiles = step(
            "profiles",
            || load_profiles(source, &config.profiles_dir),
            BTreeMap::len,
        )?;
        let weather = step("weather", || load_weather(source, db), Document::len)?;
        let bots = step(
            "bots",
            || load_bots(source, db),
            |b: &BotDefinitions| b.bots.len(),
        )?;
        let locations = step(
            "locations",
            || load_locations(source, db),
            |l: &Locations| l.maps.len(),
        )?;

        let store = Self {
            core,
            editions,
            catalog,
            locales,
            traders,
            quests,
            hideout,
            customization,
            profiles,
            weather,
            bots,
            locations,
            flea: FleaState::default(),
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            traders = store.traders.len(),
            items = store.catalog.prices.len(),
            bots = store.bots.bots.len(),
            locations = store.locations.maps.len(),
            profiles = store.profiles.len(),
            "game data store built"
        );
        Ok(store)
    }

    pub fn trader(&self, id: &str) -> Option<&TraderRecord> {
        self.traders.get(id)
    }

    pub fn bot_type(&self, name: &str) -> Option<&BotTypeRecord> {
        self.bots.bot_type(name)
    }

    pub fn location(&self, name: &str) -> Option<&LocationRecord> {
        self.locations.location(name)
    }

    pub fn profile(&self, id: &str) -> Option<&ProfileRecord> {
        self.profiles.get(id)
    }

    pub fn locale(&self, code: &str) -> Option<&LocaleRecord> {
        self.locales.locale(code)
    }

    pub fn edition(&self, name: &str) -> Option<&EditionRecord> {
        self.editions.get(name)
    }

    /// Presets whose root item is `tpl`.
    pub fn presets_for(&self, tpl: &str) -> Option<&BTreeMap<String, Document>> {
        self.core.presets.presets_for(tpl)
    }

    /// Child categories of a handbook category.
    pub fn category_children(&self, id: &str) -> &[String] {
        self.catalog.categories.children_of(id)
    }

    pub fn items_in_category(&self, id: &str) -> &[String] {
        self.catalog.items_in_category(id)
    }

    pub fn price(&self, id: &str) -> Option<f64> {
        self.catalog.price(id)
    }

    /// Collection sizes, for startup reporting.
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            presets: self.core.presets.len(),
            editions: self.editions.len(),
            item_templates: self.catalog.items.len(),
            handbook_categories: self.catalog.categories.by_id.len(),
            handbook_items: self.catalog.item_index.by_id.len(),
            locales: self.locales.locales.len(),
            traders: self.traders.len(),
            quests: self.quests.len(),
            hideout_areas: self.hideout.areas.len(),
            profiles: self.profiles.len(),
            bot_types: self.bots.bots.len(),
            locations: self.locations.maps.len(),
        }
    }
}

/// Per-collection counts of a built store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub presets: usize,
    pub editions: usize,
    pub item_templates: usize,
    pub handbook_categories: usize,
    pub handbook_items: usize,
    pub locales: usize,
    pub traders: usize,
    pub quests: usize,
    pub hideout_areas: usize,
    pub profiles: usize,
    pub bot_types: usize,
    pub locations: usize,
}

/// Build a store from a content root on disk with the default layout.
pub fn load_game_data(root: impl Into<PathBuf>) -> Result<GameDataStore, DataLoadError> {
    GameDataStore::build(&FsAssetSource::new(root), &StoreConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemorySource, minimal_tree};
    use std::path::Path;

    #[test]
    fn builds_minimal_tree() {
        let source = MemorySource::from_tree(minimal_tree());
        let store = GameDataStore::build(&source, &StoreConfig::default()).unwrap();

        assert!(store.trader("54cb50c76803fa8b248b4571").is_some());
        assert!(store.bot_type("assault").is_some());
        assert!(store.location("factory4_day").is_some());
        assert!(store.profile("pmc1").is_some());
        assert!(store.locale("en").is_some());
        assert!(store.edition("Standard").is_some());
        assert_eq!(store.presets_for("weapon_tpl").unwrap().len(), 1);
        assert_eq!(store.category_children("cat_root"), ["cat_ammo"]);
        assert_eq!(store.items_in_category("cat_ammo").len(), 2);
        assert_eq!(store.price("item_ammo"), Some(250.0));
        assert_eq!(store.flea, FleaState::default());
    }

    #[test]
    fn summary_counts() {
        let source = MemorySource::from_tree(minimal_tree());
        let store = GameDataStore::build(&source, &StoreConfig::default()).unwrap();
        let summary = store.summary();

        assert_eq!(summary.traders, 1);
        assert_eq!(summary.handbook_items, 2);
        assert_eq!(summary.handbook_categories, 2);
        assert_eq!(summary.locales, 2);
        assert_eq!(summary.bot_types, 1);
        assert_eq!(summary.locations, 1);
        assert_eq!(summary.profiles, 1);
        assert_eq!(summary.presets, 1);
    }

    #[test]
    fn build_is_deterministic() {
        let first = GameDataStore::build(&MemorySource::from_tree(minimal_tree()), &StoreConfig::default())
            .unwrap();
        let second = GameDataStore::build(&MemorySource::from_tree(minimal_tree()), &StoreConfig::default())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_step_is_named() {
        let source = MemorySource::from_tree(minimal_tree()).without_file("database/weather.json");
        let err = GameDataStore::build(&source, &StoreConfig::default()).unwrap_err();
        assert!(err.is_not_found());
        assert!(format!("{err}").starts_with("error loading weather"));
    }

    #[test]
    fn custom_directories() {
        let mut tree = minimal_tree();
        for (path, _) in tree.iter_mut() {
            if let Some(rest) = path.strip_prefix("user/profiles/") {
                *path = format!("saves/{rest}");
            }
        }
        let config = StoreConfig {
            profiles_dir: PathBuf::from("saves"),
            ..StoreConfig::default()
        };
        let store = GameDataStore::build(&MemorySource::from_tree(tree), &config).unwrap();
        assert!(store.profile("pmc1").is_some());

        let source = MemorySource::from_tree(minimal_tree());
        let store = GameDataStore::build(&source, &config).unwrap();
        assert!(store.profiles.is_empty());
        assert!(source.exists(Path::new("saves")));
    }
}
