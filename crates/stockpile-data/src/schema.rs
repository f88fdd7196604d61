//! Serde record types for the documents the aggregators look inside.
//!
//! Most content documents are carried through opaquely as a [`Document`];
//! only the shapes the indexers actually read (presets, handbook entries,
//! assortments, hideout slots) and the runtime-only records get real types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded object document, kept as-is.
pub type Document = Map<String, Value>;

// ===========================================================================
// Globals: item presets
// ===========================================================================

/// The fields of a global preset that the preset index needs.
///
/// Only the first item (the root) is inspected; the rest are kept opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct PresetHeader {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_items")]
    pub items: Vec<Value>,
}

impl PresetHeader {
    /// Template id of the root item, if the preset has one.
    pub fn root_tpl(&self) -> Option<&str> {
        self.items.first()?.get("_tpl")?.as_str()
    }
}

// ===========================================================================
// Handbook
// ===========================================================================

/// A handbook category entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandbookCategory {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "ParentId", default)]
    pub parent_id: Option<String>,
}

/// A handbook item entry: which category it is listed under and its static price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandbookItem {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "ParentId")]
    pub parent_id: String,
    #[serde(rename = "Price")]
    pub price: f64,
}

// ===========================================================================
// Traders
// ===========================================================================

/// A trader assortment: offered items, their barter costs, and the loyalty
/// level each offer requires.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Assortment {
    pub items: Vec<Document>,
    pub barter_scheme: Document,
    pub loyal_level_items: Document,
}

// ===========================================================================
// Hideout
// ===========================================================================

/// Static hideout definitions. Every slot is independently optional and
/// stays empty when its file is absent or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hideout {
    pub areas: Vec<Document>,
    pub productions: Document,
    pub scavcase: Vec<Document>,
    pub qte: Vec<Document>,
    pub settings: Document,
}

// ===========================================================================
// Runtime-only records
// ===========================================================================

/// Per-profile raid state. Never read from disk; always starts zeroed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RaidState {
    pub last_location: RaidLocation,
    pub car_extracts: u32,
}

/// The location a profile last entered and whether it went in insured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RaidLocation {
    pub name: String,
    pub insurance: bool,
}

/// Flea market state. Never read from disk; starts with no offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleaState {
    pub offers: Vec<Document>,
    pub offers_count: usize,
    pub selected_category: String,
    pub categories: Document,
}
