//! Data-driven kitchens: layouts, menus, order scripts and tuning loaded
//! from RON, TOML or JSON files.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, KitchenData, load_kitchen};
