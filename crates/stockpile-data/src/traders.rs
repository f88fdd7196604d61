//! Traders: one composite record per trader directory.

use std::collections::BTreeMap;
use std::path::Path;

use crate::loader::{
    DataLoadError, LoadContext, load_optional, load_optional_with, normalize_records,
};
use crate::schema::{Assortment, Document};
use crate::source::AssetSource;

/// A trader's merged documents. Every sub-document is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraderRecord {
    pub base: Option<Document>,
    /// Live stock. Starts empty whenever an assortment exists.
    pub assort: Option<Assortment>,
    /// The assortment as read from disk, kept to reset live stock from.
    pub base_assort: Option<Assortment>,
    pub quest_assort: Option<Document>,
    pub suits: Option<Vec<Document>>,
    pub dialogue: Option<Document>,
}

impl TraderRecord {
    /// Replace live stock with a fresh copy of the base assortment.
    pub fn reset_assort(&mut self) {
        if let Some(base) = &self.base_assort {
            self.assort = Some(base.clone());
        }
    }
}

/// Load a single trader directory. A missing or malformed sub-document just
/// leaves its field empty.
pub fn load_trader(source: &dyn AssetSource, trader_dir: &Path) -> TraderRecord {
    let base_assort: Option<Assortment> = load_optional(source, &trader_dir.join("assort.json"));

    TraderRecord {
        base: load_optional(source, &trader_dir.join("base.json")),
        assort: base_assort.as_ref().map(|_| Assortment::default()),
        base_assort,
        quest_assort: load_optional(source, &trader_dir.join("questassort.json")),
        suits: load_optional_with(source, &trader_dir.join("suits.json"), normalize_records),
        dialogue: load_optional(source, &trader_dir.join("dialogue.json")),
    }
}

/// Load every trader under `traders/`, keyed by directory name.
pub fn load_traders(
    source: &dyn AssetSource,
    database_dir: &Path,
) -> Result<BTreeMap<String, TraderRecord>, DataLoadError> {
    let traders_dir = database_dir.join("traders");
    let trader_ids = source.list_dirs(&traders_dir).context("traders directory")?;

    let mut traders = BTreeMap::new();
    for id in trader_ids {
        let record = load_trader(source, &traders_dir.join(&id));
        traders.insert(id, record);
    }
    Ok(traders)
}
