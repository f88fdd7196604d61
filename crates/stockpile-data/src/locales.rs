//! Locales and purchase editions.

use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{DataLoadError, LoadContext, load_document, load_unwrapped};
use crate::schema::Document;
use crate::source::AssetSource;

/// Translation tables for one locale code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleRecord {
    pub locale: Document,
    pub menu: Document,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locales {
    /// Per-locale tables keyed by locale code.
    pub locales: BTreeMap<String, LocaleRecord>,
    /// Locale code → display name, unwrapped from its `data` envelope.
    pub languages: Document,
    pub extras: Document,
}

impl Locales {
    pub fn locale(&self, code: &str) -> Option<&LocaleRecord> {
        self.locales.get(code)
    }
}

/// Starting character and stash templates for one purchase edition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditionRecord {
    pub bear: Document,
    pub usec: Document,
    pub storage: Document,
}

fn load_edition(source: &dyn AssetSource, dir: &Path) -> Result<EditionRecord, DataLoadError> {
    Ok(EditionRecord {
        bear: load_document(source, &dir.join("character_bear.json"))?,
        usec: load_document(source, &dir.join("character_usec.json"))?,
        storage: load_document(source, &dir.join("storage.json"))?,
    })
}

/// Load every edition under `editions/`. All three documents are required.
pub fn load_editions(
    source: &dyn AssetSource,
    database_dir: &Path,
) -> Result<BTreeMap<String, EditionRecord>, DataLoadError> {
    let editions_dir = database_dir.join("editions");
    let names = source.list_dirs(&editions_dir).context("editions directory")?;

    let mut editions = BTreeMap::new();
    for name in names {
        let record = load_edition(source, &editions_dir.join(&name))
            .with_context(|| format!("edition {name}"))?;
        editions.insert(name, record);
    }
    Ok(editions)
}

/// Load every locale directory plus the shared `languages` and `extras` tables.
pub fn load_locales(source: &dyn AssetSource, database_dir: &Path) -> Result<Locales, DataLoadError> {
    let locales_dir = database_dir.join("locales");
    let codes = source.list_dirs(&locales_dir).context("locales directory")?;

    let mut locales = BTreeMap::new();
    for code in codes {
        let dir = locales_dir.join(&code);
        let locale = load_document(source, &dir.join("locale.json"))
            .with_context(|| format!("locale.json for locale {code}"))?;
        let menu = load_document(source, &dir.join("menu.json"))
            .with_context(|| format!("menu.json for locale {code}"))?;
        locales.insert(code, LocaleRecord { locale, menu });
    }

    let languages = load_unwrapped(source, &locales_dir.join("languages.json")).context("languages")?;
    let extras = load_document(source, &locales_dir.join("extras.json")).context("locale extras")?;

    Ok(Locales {
        locales,
        languages,
        extras,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemorySource, minimal_tree};

    #[test]
    fn loads_locales_and_shared_tables() {
        let source = MemorySource::from_tree(minimal_tree());
        let locales = load_locales(&source, Path::new("database")).unwrap();

        assert_eq!(locales.locales.keys().collect::<Vec<_>>(), vec!["en", "ru"]);
        assert_eq!(locales.locale("en").unwrap().menu["Start"], "Start");
        assert_eq!(locales.languages["en"], "English");
        assert!(locales.extras.contains_key("notes"));
    }

    #[test]
    fn missing_menu_names_locale() {
        let source =
            MemorySource::from_tree(minimal_tree()).without_file("database/locales/ru/menu.json");
        let err = load_locales(&source, Path::new("database")).unwrap_err();
        assert!(err.is_not_found());
        assert!(format!("{err}").contains("locale ru"));
    }

    #[test]
    fn missing_extras_is_fatal() {
        let source =
            MemorySource::from_tree(minimal_tree()).without_file("database/locales/extras.json");
        let err = load_locales(&source, Path::new("database")).unwrap_err();
        assert!(format!("{err}").contains("locale extras"));
    }

    #[test]
    fn loads_editions() {
        let source = MemorySource::from_tree(minimal_tree());
        let editions = load_editions(&source, Path::new("database")).unwrap();
        let standard = &editions["Standard"];
        assert_eq!(standard.bear["Info"]["Side"], "Bear");
        assert_eq!(standard.usec["Info"]["Side"], "Usec");
        assert!(standard.storage.contains_key("suites"));
    }

    #[test]
    fn edition_with_bad_storage_fails() {
        let source = MemorySource::from_tree(minimal_tree())
            .with_file("database/editions/Standard/storage.json", "[]");
        let err = load_editions(&source, Path::new("database")).unwrap_err();
        assert!(err.is_schema());
        assert!(format!("{err}").contains("edition Standard"));
    }
}
