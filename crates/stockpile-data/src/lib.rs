//! Stockpile Data -- the in-memory game content store.
//!
//! The store is built once at startup from a tree of content documents and
//! then serves every lookup from memory. Nothing is written back to disk.
//!
//! # Build Order
//!
//! [`store::GameDataStore::build`] runs its steps in a fixed order; the first
//! failing required resource aborts the build:
//!
//! 1. **Core** -- server, match metrics, globals (plus the preset index),
//!    client settings, locations and the bot template.
//! 2. **Editions** -- starting character and stash templates per edition.
//! 3. **Catalog** -- item templates, handbook indices and resolved prices.
//! 4. **Locales** -- per-locale tables, languages and extras.
//! 5. **Traders** -- one tolerant composite record per trader.
//! 6. **Quests**, **Hideout**, **Customization**.
//! 7. **Profiles** -- user data; never fatal.
//! 8. **Weather**, **Bots**, **Locations**.
//!
//! # Load Policies
//!
//! Each resource is loaded under a [`loader::LoadPolicy`]: `Required`
//! resources abort the build, `Tolerant` ones fall back to an empty slot,
//! and `Logged` ones do the same with a warning.
//!
//! # Key Types
//!
//! - [`store::GameDataStore`] -- The aggregate root.
//! - [`source::AssetSource`] -- File-access boundary; [`source::FsAssetSource`]
//!   reads the local filesystem.
//! - [`loader::DataLoadError`] -- Every failure the build can report.
//! - [`config::StoreConfig`] -- Where the content roots live.

pub mod bots;
pub mod catalog;
pub mod config;
pub mod content;
pub mod core_config;
pub mod loader;
pub mod locales;
pub mod locations;
pub mod profiles;
pub mod schema;
pub mod source;
pub mod store;
pub mod traders;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::StoreConfig;
pub use loader::{DataLoadError, LoadPolicy};
pub use schema::Document;
pub use source::{AssetSource, FsAssetSource};
pub use store::{GameDataStore, StoreSummary, load_game_data};
