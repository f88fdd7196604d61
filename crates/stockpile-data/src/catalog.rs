//! Item catalog: item templates, the handbook, category adjacency and prices.
//!
//! The handbook lists every category (with its parent) and every item (with
//! its category and static price). Live market prices overlay the static
//! ones: when both exist the live price always wins.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::loader::{
    DataLoadError, LoadContext, load_document, load_unwrapped, normalize_records,
};
use crate::schema::{Document, HandbookCategory, HandbookItem};
use crate::source::AssetSource;

// ===========================================================================
// Indices
// ===========================================================================

/// Category → parent lookup and parent → children adjacency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryIndex {
    /// Every category id, mapped to its parent (`None` for roots).
    pub by_id: HashMap<String, Option<String>>,
    /// Child category ids per parent, in handbook order.
    pub by_parent: HashMap<String, Vec<String>>,
}

impl CategoryIndex {
    /// Build both maps in a single pass over the category list.
    ///
    /// A repeated category id keeps its first entry.
    pub fn build(categories: &[HandbookCategory]) -> Self {
        let mut index = Self::default();
        for category in categories {
            if index.by_id.contains_key(&category.id) {
                tracing::warn!(category = %category.id, "duplicate handbook category ignored");
                continue;
            }
            index
                .by_id
                .insert(category.id.clone(), category.parent_id.clone());
            if let Some(parent) = &category.parent_id {
                index
                    .by_parent
                    .entry(parent.clone())
                    .or_default()
                    .push(category.id.clone());
            }
        }
        index
    }

    /// The parent of `id`, or `None` for a root or unknown category.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).and_then(|p| p.as_deref())
    }

    /// Direct children of `id` in handbook order.
    pub fn children_of(&self, id: &str) -> &[String] {
        self.by_parent.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Resolved price per item and item ids per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemIndex {
    pub by_id: HashMap<String, f64>,
    /// Item ids per category, in handbook order.
    pub by_parent: HashMap<String, Vec<String>>,
}

/// Flat `item id → price` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPriceTable(HashMap<String, f64>);

impl ItemPriceTable {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(id, price)| (id.as_str(), *price))
    }
}

/// Resolve every handbook item's price against the live feed and index it.
///
/// `live` must already be fully loaded: prices are resolved per item as the
/// loop runs.
pub fn index_items(items: &[HandbookItem], live: &HashMap<String, f64>) -> (ItemIndex, ItemPriceTable) {
    let mut index = ItemIndex::default();
    let mut prices = HashMap::with_capacity(items.len());

    for item in items {
        if index.by_id.contains_key(&item.id) {
            tracing::warn!(item = %item.id, "duplicate handbook item ignored");
            continue;
        }
        let price = live.get(&item.id).copied().unwrap_or(item.price);
        index.by_id.insert(item.id.clone(), price);
        prices.insert(item.id.clone(), price);
        index
            .by_parent
            .entry(item.parent_id.clone())
            .or_default()
            .push(item.id.clone());
    }

    (index, ItemPriceTable(prices))
}

// ===========================================================================
// Catalog
// ===========================================================================

/// Raw handbook records, normalized from the two handbook arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Handbook {
    pub items: Vec<Document>,
    pub categories: Vec<Document>,
}

/// Everything the catalog step produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Item templates keyed by template id.
    pub items: Document,
    pub handbook: Handbook,
    pub categories: CategoryIndex,
    pub item_index: ItemIndex,
    pub prices: ItemPriceTable,
}

impl Catalog {
    /// Resolved price of an item.
    pub fn price(&self, id: &str) -> Option<f64> {
        self.prices.get(id)
    }

    /// Item ids listed directly under a category.
    pub fn items_in_category(&self, category: &str) -> &[String] {
        self.item_index
            .by_parent
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Item template by template id.
    pub fn template(&self, tpl: &str) -> Option<&Value> {
        self.items.get(tpl)
    }
}

/// Take one of the handbook arrays: typed entries for indexing, raw records
/// for storage.
fn split_handbook_array<T>(
    file: &Path,
    handbook: &mut Document,
    key: &str,
) -> Result<(Vec<T>, Vec<Document>), DataLoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let value = handbook.remove(key).ok_or_else(|| DataLoadError::Schema {
        file: file.to_path_buf(),
        detail: format!("handbook has no {key} array"),
    })?;
    let entries = Vec::<T>::deserialize(&value).map_err(|e| DataLoadError::Schema {
        file: file.to_path_buf(),
        detail: format!("{key}: {e}"),
    })?;
    let records = normalize_records(file, value)?;
    Ok((entries, records))
}

/// Load item templates, the handbook and the live price feed, then index.
pub fn load_catalog(source: &dyn AssetSource, database_dir: &Path) -> Result<Catalog, DataLoadError> {
    let items = load_document(source, &database_dir.join("items.json")).context("items")?;

    let handbook_path = database_dir.join("templates.json");
    let mut handbook_doc = load_unwrapped(source, &handbook_path).context("handbook")?;
    let (item_entries, item_records) =
        split_handbook_array::<HandbookItem>(&handbook_path, &mut handbook_doc, "Items")
            .context("handbook")?;
    let (category_entries, category_records) =
        split_handbook_array::<HandbookCategory>(&handbook_path, &mut handbook_doc, "Categories")
            .context("handbook")?;

    let categories = CategoryIndex::build(&category_entries);

    let live: HashMap<String, f64> =
        load_document(source, &database_dir.join("liveflea.json")).context("live prices")?;
    let (item_index, prices) = index_items(&item_entries, &live);

    tracing::debug!(
        categories = categories.by_id.len(),
        items = item_index.by_id.len(),
        live_prices = live.len(),
        "catalog indexed"
    );

    Ok(Catalog {
        items,
        handbook: Handbook {
            items: item_records,
            categories: category_records,
        },
        categories,
        item_index,
        prices,
    })
}
