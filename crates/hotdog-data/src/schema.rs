//! Serde data file structs for kitchen content.
//!
//! These define the on-disk format for zone layouts, the filling menu and
//! scripted orders. Tuning is read straight into
//! [`KitchenConfig`](hotdog_core::config::KitchenConfig), which already
//! defaults every field.

use hotdog_core::zone::{Point, Shape, Station, Zone};
use serde::Deserialize;

// ===========================================================================
// Zones
// ===========================================================================

/// A zone outline. Rectangles are given by their top-left corner.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ShapeData {
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Circle { x: f32, y: f32, radius: f32 },
}

impl From<ShapeData> for Shape {
    fn from(data: ShapeData) -> Self {
        match data {
            ShapeData::Rect { x, y, width, height } => Shape::Rect {
                min: Point::new(x, y),
                max: Point::new(x + width, y + height),
            },
            ShapeData::Circle { x, y, radius } => Shape::Circle {
                center: Point::new(x, y),
                radius,
            },
        }
    }
}

/// A zone definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneData {
    pub name: String,
    pub station: Station,
    pub shape: ShapeData,
    #[serde(default)]
    pub snap: Option<Point>,
}

impl ZoneData {
    pub fn into_zone(self) -> Zone {
        let zone = Zone::new(self.name, self.station, self.shape.into());
        match self.snap {
            Some(snap) => zone.with_snap(snap),
            None => zone,
        }
    }
}

// ===========================================================================
// Menu and orders
// ===========================================================================

/// A filling on the menu.
#[derive(Debug, Clone, Deserialize)]
pub struct FillingData {
    pub name: String,
}

/// A scripted customer order. Fillings are referenced by menu name.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderData {
    pub filling1: String,
    pub filling2: String,
    #[serde(default)]
    pub sugar: bool,
    #[serde(default)]
    pub ketchup: bool,
    #[serde(default)]
    pub mustard: bool,
}
