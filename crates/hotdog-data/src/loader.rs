//! Resolution pipeline: reads kitchen data files, resolves filling names and
//! builds the zone registry, menu, order script and tuning.
//!
//! A kitchen directory holds up to four files, each in RON, TOML or JSON:
//!
//! | base name | required | contents                              |
//! |-----------|----------|---------------------------------------|
//! | `zones`   | yes      | list of [`ZoneData`]                  |
//! | `menu`    | yes      | list of [`FillingData`]               |
//! | `orders`  | no       | list of [`OrderData`]                 |
//! | `kitchen` | no       | a [`KitchenConfig`] (partial is fine) |
//!
//! TOML has no top-level arrays, so TOML lists live under a key named after
//! the file (`zones`, `fillings`, `orders`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hotdog_core::config::{ConfigError, KitchenConfig};
use hotdog_core::id::FillingId;
use hotdog_core::item::OrderSpec;
use hotdog_core::order::{Menu, ScriptedOrders};
use hotdog_core::zone::{Station, ZoneError, ZoneLookup, ZoneRegistry};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::schema::{FillingData, OrderData, ZoneData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a kitchen.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The layout was rejected by the zone registry.
    #[error("invalid zone in {file}: {source}")]
    InvalidZone { file: PathBuf, source: ZoneError },

    #[error("invalid tuning in {file}: {source}")]
    InvalidConfig { file: PathBuf, source: ConfigError },

    #[error("{file} lists no fillings")]
    EmptyMenu { file: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// `Ok(None)` if none exists; `ConflictingFormats` if more than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. RON and JSON files hold the array itself; TOML
/// files hold it under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name, or fail with `UnresolvedRef`.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Fail with `DuplicateName` if `name` is already taken.
pub fn check_duplicate<V>(map: &HashMap<String, V>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Kitchen loading
// ===========================================================================

/// Everything a host needs to open the stand.
#[derive(Debug)]
pub struct KitchenData {
    pub config: KitchenConfig,
    pub zones: ZoneRegistry,
    pub menu: Menu,
    /// Empty when the directory has no `orders` file.
    pub orders: ScriptedOrders,
}

/// Load a kitchen from `dir`.
pub fn load_kitchen(dir: &Path) -> Result<KitchenData, DataLoadError> {
    let config = load_config(dir)?;
    let zones = load_zones(dir)?;
    let menu = load_menu(dir)?;
    let orders = load_orders(dir, &menu)?;
    debug!(
        dir = %dir.display(),
        zones = zones.len(),
        fillings = menu.len(),
        orders = orders.remaining(),
        "kitchen loaded"
    );
    Ok(KitchenData {
        config,
        zones,
        menu,
        orders,
    })
}

fn load_config(dir: &Path) -> Result<KitchenConfig, DataLoadError> {
    let Some(path) = find_data_file(dir, "kitchen")? else {
        return Ok(KitchenConfig::default());
    };
    let config: KitchenConfig = deserialize_file(&path)?;
    config
        .validate()
        .map_err(|source| DataLoadError::InvalidConfig { file: path, source })?;
    Ok(config)
}

fn load_zones(dir: &Path) -> Result<ZoneRegistry, DataLoadError> {
    let path = require_data_file(dir, "zones")?;
    let entries: Vec<ZoneData> = deserialize_list(&path, "zones")?;

    let mut names: HashMap<String, ()> = HashMap::new();
    let mut zones = ZoneRegistry::new();
    for entry in entries {
        check_duplicate(&names, &entry.name, &path)?;
        names.insert(entry.name.clone(), ());
        zones.insert(entry.into_zone()).map_err(|source| DataLoadError::InvalidZone {
            file: path.clone(),
            source,
        })?;
    }

    // A kitchen may be built without some stations; the pipeline stalls
    // there at run time, so say so now.
    for station in Station::ALL {
        if zones.station_zone(station).is_none() {
            warn!(%station, file = %path.display(), "no zone for station");
        }
    }
    Ok(zones)
}

fn load_menu(dir: &Path) -> Result<Menu, DataLoadError> {
    let path = require_data_file(dir, "menu")?;
    let entries: Vec<FillingData> = deserialize_list(&path, "fillings")?;
    if entries.is_empty() {
        return Err(DataLoadError::EmptyMenu { file: path });
    }

    let mut seen: HashMap<String, FillingId> = HashMap::new();
    let mut menu = Menu::new();
    for entry in entries {
        check_duplicate(&seen, &entry.name, &path)?;
        let id = menu.add(&entry.name);
        seen.insert(entry.name, id);
    }
    Ok(menu)
}

fn load_orders(dir: &Path, menu: &Menu) -> Result<ScriptedOrders, DataLoadError> {
    let Some(path) = find_data_file(dir, "orders")? else {
        return Ok(ScriptedOrders::default());
    };
    let entries: Vec<OrderData> = deserialize_list(&path, "orders")?;
    let by_name: HashMap<String, FillingId> = menu
        .ids()
        .filter_map(|id| menu.name(id).map(|name| (name.to_string(), id)))
        .collect();

    let mut orders = ScriptedOrders::default();
    for entry in entries {
        let filling1 = *resolve_name(&by_name, &entry.filling1, &path, "filling")?;
        let filling2 = *resolve_name(&by_name, &entry.filling2, &path, "filling")?;
        orders.push(
            OrderSpec::plain(filling1, filling2)
                .with_sugar(entry.sugar)
                .with_ketchup(entry.ketchup)
                .with_mustard(entry.mustard),
        );
    }
    Ok(orders)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hotdog_core::phase::batter::BatterTuning;
    use hotdog_core::zone::Point;
    use std::fs;

    /// A fresh scratch directory, unique per test and process.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hotdog_data_test_{suffix}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const ZONES_TOML: &str = r#"
[[zones]]
name = "prep"
station = "preparation"
shape = { x = 0.0, y = 0.0, width = 100.0, height = 100.0 }

[[zones]]
name = "fryer"
station = "fryer"
shape = { x = 300.0, y = 0.0, width = 100.0, height = 100.0 }
snap = { x = 350.0, y = 60.0 }

[[zones]]
name = "canvas"
station = "sauce_canvas"
shape = { x = 550.0, y = 200.0, radius = 80.0 }
"#;

    const MENU_JSON: &str = r#"[{"name": "sausage"}, {"name": "cheese"}]"#;

    // -----------------------------------------------------------------------
    // Formats and discovery
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("zones.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("zones.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("zones.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("zones.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(detect_format(Path::new("zones")).is_err());
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("menu.ron"), "[]").unwrap();
        fs::write(dir.join("menu.json"), "[]").unwrap();

        assert!(matches!(
            find_data_file(&dir, "menu"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");
        let err = require_data_file(&dir, "zones").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingRequired { ref file, .. } if file == "zones"));
        assert!(err.to_string().contains("required file 'zones' not found"));
        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("menu.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<FillingData>, _> = deserialize_list(&path, "fillings");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn resolve_and_duplicate_helpers() {
        let mut map = HashMap::new();
        map.insert("sausage".to_string(), FillingId(0));

        let file = Path::new("orders.ron");
        assert_eq!(resolve_name(&map, "sausage", file, "filling").unwrap(), &FillingId(0));
        assert!(matches!(
            resolve_name(&map, "onion", file, "filling"),
            Err(DataLoadError::UnresolvedRef { expected_kind: "filling", .. })
        ));
        assert!(check_duplicate(&map, "cheese", file).is_ok());
        assert!(matches!(
            check_duplicate(&map, "sausage", file),
            Err(DataLoadError::DuplicateName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // load_kitchen
    // -----------------------------------------------------------------------

    #[test]
    fn loads_mixed_formats() {
        let dir = make_test_dir("mixed");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.json"), MENU_JSON).unwrap();
        fs::write(
            dir.join("orders.ron"),
            r#"[(filling1: "sausage", filling2: "cheese", mustard: true)]"#,
        )
        .unwrap();

        let mut data = load_kitchen(&dir).unwrap();
        assert_eq!(data.zones.len(), 3);
        assert_eq!(data.menu.id("cheese"), Some(FillingId(1)));
        assert_eq!(data.config, KitchenConfig::default());

        let fryer = data.zones.station_zone(Station::Fryer).unwrap();
        assert_eq!(data.zones.snap_point(fryer), Some(Point::new(350.0, 60.0)));
        let canvas = data.zones.station_zone(Station::SauceCanvas).unwrap();
        assert!(data.zones.contains(canvas, Point::new(600.0, 200.0)));
        assert!(!data.zones.contains(canvas, Point::new(640.0, 200.0)));

        use hotdog_core::order::OrderSource;
        let order = data.orders.next_order().unwrap();
        assert_eq!(order, OrderSpec::plain(FillingId(0), FillingId(1)).with_mustard(true));
        assert_eq!(data.orders.next_order(), None);

        cleanup(&dir);
    }

    #[test]
    fn partial_tuning_keeps_defaults() {
        let dir = make_test_dir("tuning");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.json"), MENU_JSON).unwrap();
        fs::write(
            dir.join("kitchen.toml"),
            r#"
auto_advance = false
restart_policy = "reject"

[batter]
time_per_stage = 2.0
"#,
        )
        .unwrap();

        let data = load_kitchen(&dir).unwrap();
        assert!(!data.config.auto_advance);
        assert_eq!(data.config.restart_policy, hotdog_core::config::RestartPolicy::Reject);
        assert_eq!(data.config.batter.time_per_stage, 2.0);
        assert_eq!(data.config.batter.first_stage_delay, BatterTuning::default().first_stage_delay);
        assert_eq!(data.config.scoring.golden, 1500);

        cleanup(&dir);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let dir = make_test_dir("bad_tuning");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.json"), MENU_JSON).unwrap();
        fs::write(dir.join("kitchen.json"), r#"{"frying": {"golden_at": 2.0}}"#).unwrap();

        assert!(matches!(
            load_kitchen(&dir),
            Err(DataLoadError::InvalidConfig {
                source: ConfigError::UnorderedFryingThresholds,
                ..
            })
        ));

        cleanup(&dir);
    }

    #[test]
    fn unknown_filling_in_orders() {
        let dir = make_test_dir("unknown_filling");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.json"), MENU_JSON).unwrap();
        fs::write(
            dir.join("orders.json"),
            r#"[{"filling1": "sausage", "filling2": "onion"}]"#,
        )
        .unwrap();

        let err = load_kitchen(&dir).unwrap_err();
        assert!(matches!(err, DataLoadError::UnresolvedRef { ref name, .. } if name == "onion"));

        cleanup(&dir);
    }

    #[test]
    fn duplicate_station_is_rejected() {
        let dir = make_test_dir("dup_station");
        fs::write(
            dir.join("zones.json"),
            r#"[
                {"name": "left fryer", "station": "fryer", "shape": {"x": 0, "y": 0, "width": 10, "height": 10}},
                {"name": "right fryer", "station": "fryer", "shape": {"x": 20, "y": 0, "width": 10, "height": 10}}
            ]"#,
        )
        .unwrap();
        fs::write(dir.join("menu.json"), MENU_JSON).unwrap();

        assert!(matches!(
            load_kitchen(&dir),
            Err(DataLoadError::InvalidZone {
                source: ZoneError::DuplicateStation(Station::Fryer),
                ..
            })
        ));

        cleanup(&dir);
    }

    #[test]
    fn duplicate_filling_name_is_rejected() {
        let dir = make_test_dir("dup_filling");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.ron"), r#"[(name: "cheese"), (name: "cheese")]"#).unwrap();

        assert!(matches!(
            load_kitchen(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "cheese"
        ));

        cleanup(&dir);
    }

    #[test]
    fn empty_menu_is_rejected() {
        let dir = make_test_dir("empty_menu");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();
        fs::write(dir.join("menu.toml"), "fillings = []").unwrap();

        assert!(matches!(load_kitchen(&dir), Err(DataLoadError::EmptyMenu { .. })));

        cleanup(&dir);
    }

    #[test]
    fn missing_menu_is_reported() {
        let dir = make_test_dir("no_menu");
        fs::write(dir.join("zones.toml"), ZONES_TOML).unwrap();

        assert!(matches!(
            load_kitchen(&dir),
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "menu"
        ));

        cleanup(&dir);
    }
}
