//! Interaction zones and placement validation.
//!
//! Every phase validates drops and drag positions against named zones. The
//! geometry itself belongs to the host (the scene that draws the fryer, the
//! cooling rack, ...); the core only asks the questions in [`ZoneLookup`].
//! [`ZoneRegistry`] is the in-memory implementation used by the data loader,
//! the tests, and any host that is happy to hand its layout to the core.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::ZoneId;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The outline of a zone. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { min: Point, max: Point },
    Circle { center: Point, radius: f32 },
}

impl Shape {
    /// Whether the shape contains `p`. NaN coordinates are never contained.
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Shape::Rect { min, max } => p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y,
            Shape::Circle { center, radius } => center.distance(&p) <= radius,
        }
    }

    /// The geometric centre, used as the default snap point.
    pub fn center(&self) -> Point {
        match *self {
            Shape::Rect { min, max } => Point::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5),
            Shape::Circle { center, .. } => center,
        }
    }
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

/// The role a zone plays in the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Station {
    /// Where a freshly picked-up stick must be set down.
    Preparation,
    /// Where half-fillings are skewered onto the stick.
    IngredientBoard,
    BatterVat,
    Fryer,
    CoolingRack,
    /// Area in which sauce can be drawn over the item.
    SauceCanvas,
    ServingWindow,
    TrashBin,
}

impl Station {
    pub const ALL: [Station; 8] = [
        Station::Preparation,
        Station::IngredientBoard,
        Station::BatterVat,
        Station::Fryer,
        Station::CoolingRack,
        Station::SauceCanvas,
        Station::ServingWindow,
        Station::TrashBin,
    ];
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Station::Preparation => "preparation",
            Station::IngredientBoard => "ingredient board",
            Station::BatterVat => "batter vat",
            Station::Fryer => "fryer",
            Station::CoolingRack => "cooling rack",
            Station::SauceCanvas => "sauce canvas",
            Station::ServingWindow => "serving window",
            Station::TrashBin => "trash bin",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Lookup seam
// ---------------------------------------------------------------------------

/// The questions the cooking pipeline asks about zone geometry.
///
/// Unknown zone ids answer `false` / `None`; none of these calls may panic.
pub trait ZoneLookup: fmt::Debug {
    /// The zone configured for a station, if any.
    fn station_zone(&self, station: Station) -> Option<ZoneId>;

    /// The station a zone is registered for.
    fn station_of(&self, zone: ZoneId) -> Option<Station>;

    /// Whether `zone` contains `point`.
    fn contains(&self, zone: ZoneId, point: Point) -> bool;

    /// The canonical position an item snaps to when placed in `zone`.
    fn snap_point(&self, zone: ZoneId) -> Option<Point>;

    /// The zone containing `point`, if any.
    fn zone_at(&self, point: Point) -> Option<ZoneId>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Errors raised while building a [`ZoneRegistry`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ZoneError {
    #[error("station '{0}' already has a zone")]
    DuplicateStation(Station),

    #[error("zone '{name}' has a degenerate shape")]
    DegenerateShape { name: String },
}

/// A named zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub station: Station,
    pub shape: Shape,
    /// Where items snap to. Defaults to the shape's centre.
    pub snap: Option<Point>,
}

impl Zone {
    pub fn new(name: impl Into<String>, station: Station, shape: Shape) -> Self {
        Self {
            name: name.into(),
            station,
            shape,
            snap: None,
        }
    }

    pub fn with_snap(mut self, snap: Point) -> Self {
        self.snap = Some(snap);
        self
    }

    fn is_degenerate(&self) -> bool {
        match self.shape {
            Shape::Rect { min, max } => !(max.x > min.x && max.y > min.y),
            Shape::Circle { radius, .. } => !(radius > 0.0),
        }
    }
}

/// In-memory zone registry: one zone per station.
#[derive(Debug, Default, Clone)]
pub struct ZoneRegistry {
    zones: SlotMap<ZoneId, Zone>,
    /// Registration order; `zone_at` resolves overlaps by it.
    order: Vec<ZoneId>,
    by_station: HashMap<Station, ZoneId>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone. Each station may be registered once.
    pub fn insert(&mut self, zone: Zone) -> Result<ZoneId, ZoneError> {
        if self.by_station.contains_key(&zone.station) {
            return Err(ZoneError::DuplicateStation(zone.station));
        }
        if zone.is_degenerate() {
            return Err(ZoneError::DegenerateShape { name: zone.name });
        }
        let station = zone.station;
        let id = self.zones.insert(zone);
        self.order.push(id);
        self.by_station.insert(station, id);
        Ok(id)
    }

    /// Remove a zone, e.g. when the host tears down a station.
    pub fn remove(&mut self, zone: ZoneId) -> Option<Zone> {
        let removed = self.zones.remove(zone)?;
        self.order.retain(|&id| id != zone);
        self.by_station.remove(&removed.station);
        Some(removed)
    }

    pub fn get(&self, zone: ZoneId) -> Option<&Zone> {
        self.zones.get(zone)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Iterate zones in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.order.iter().filter_map(|&id| self.zones.get(id).map(|z| (id, z)))
    }
}

impl ZoneLookup for ZoneRegistry {
    fn station_zone(&self, station: Station) -> Option<ZoneId> {
        self.by_station.get(&station).copied()
    }

    fn station_of(&self, zone: ZoneId) -> Option<Station> {
        self.zones.get(zone).map(|z| z.station)
    }

    fn contains(&self, zone: ZoneId, point: Point) -> bool {
        self.zones
            .get(zone)
            .is_some_and(|z| z.shape.contains(point))
    }

    fn snap_point(&self, zone: ZoneId) -> Option<Point> {
        self.zones
            .get(zone)
            .map(|z| z.snap.unwrap_or_else(|| z.shape.center()))
    }

    fn zone_at(&self, point: Point) -> Option<ZoneId> {
        self.iter()
            .find(|(_, z)| z.shape.contains(point))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Shape {
        Shape::Rect {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    #[test]
    fn rect_contains_is_edge_inclusive() {
        let r = rect(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 5.0)));
        assert!(r.contains(Point::new(4.0, 2.0)));
        assert!(!r.contains(Point::new(10.1, 2.0)));
        assert!(!r.contains(Point::new(f32::NAN, 2.0)));
    }

    #[test]
    fn circle_contains() {
        let c = Shape::Circle {
            center: Point::new(5.0, 5.0),
            radius: 2.0,
        };
        assert!(c.contains(Point::new(6.0, 6.0)));
        assert!(c.contains(Point::new(7.0, 5.0)));
        assert!(!c.contains(Point::new(7.5, 5.0)));
    }

    #[test]
    fn duplicate_station_rejected() {
        let mut reg = ZoneRegistry::new();
        reg.insert(Zone::new("fryer", Station::Fryer, rect(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let err = reg
            .insert(Zone::new("fryer2", Station::Fryer, rect(2.0, 2.0, 3.0, 3.0)))
            .unwrap_err();
        assert_eq!(err, ZoneError::DuplicateStation(Station::Fryer));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn degenerate_shape_rejected() {
        let mut reg = ZoneRegistry::new();
        let err = reg
            .insert(Zone::new("flat", Station::Fryer, rect(0.0, 0.0, 0.0, 1.0)))
            .unwrap_err();
        assert!(matches!(err, ZoneError::DegenerateShape { .. }));
    }

    #[test]
    fn zone_at_prefers_first_registered() {
        let mut reg = ZoneRegistry::new();
        let a = reg
            .insert(Zone::new("a", Station::Fryer, rect(0.0, 0.0, 10.0, 10.0)))
            .unwrap();
        let b = reg
            .insert(Zone::new("b", Station::CoolingRack, rect(5.0, 5.0, 15.0, 15.0)))
            .unwrap();
        assert_eq!(reg.zone_at(Point::new(7.0, 7.0)), Some(a));
        assert_eq!(reg.zone_at(Point::new(12.0, 12.0)), Some(b));
        assert_eq!(reg.zone_at(Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn snap_defaults_to_center() {
        let mut reg = ZoneRegistry::new();
        let a = reg
            .insert(Zone::new("a", Station::Fryer, rect(0.0, 0.0, 10.0, 4.0)))
            .unwrap();
        let b = reg
            .insert(
                Zone::new("b", Station::ServingWindow, rect(20.0, 0.0, 30.0, 4.0))
                    .with_snap(Point::new(21.0, 1.0)),
            )
            .unwrap();
        assert_eq!(reg.snap_point(a), Some(Point::new(5.0, 2.0)));
        assert_eq!(reg.snap_point(b), Some(Point::new(21.0, 1.0)));
    }

    #[test]
    fn removed_zone_answers_nothing() {
        let mut reg = ZoneRegistry::new();
        let a = reg
            .insert(Zone::new("a", Station::Fryer, rect(0.0, 0.0, 10.0, 4.0)))
            .unwrap();
        assert!(reg.remove(a).is_some());
        assert!(!reg.contains(a, Point::new(1.0, 1.0)));
        assert_eq!(reg.station_zone(Station::Fryer), None);
        assert_eq!(reg.snap_point(a), None);
        assert_eq!(reg.station_of(a), None);
    }
}
