//! Spherical geometry and the volunteer grid index.
//!
//! Distances are great-circle distances on a sphere of radius
//! [`EARTH_RADIUS_KM`], matching what a 2-D sphere index reports for
//! `$near`-style radius queries. Never substitute planar distance here:
//! radius semantics must not drift between deployments.

use std::collections::{HashMap, HashSet};

use relief_id::VolunteerId;
use serde::{Deserialize, Serialize};

use crate::store::CoordinationError;

/// Sphere radius used by the 2-D sphere index, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Edge length of one grid cell, in degrees.
const CELL_DEGREES: f64 = 0.5;

/// A point on the globe. Serialized GeoJSON-style as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Location given to volunteers who register without one.
    pub const PLACEHOLDER: GeoPoint = GeoPoint::new(0.0, 0.0);

    /// Rejects NaN and out-of-range coordinates.
    pub fn validate(&self, field: &'static str) -> Result<(), CoordinationError> {
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinationError::validation(
                field,
                format!("longitude {} outside [-180, 180]", self.lng),
            ));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinationError::validation(
                field,
                format!("latitude {} outside [-90, 90]", self.lat),
            ));
        }
        Ok(())
    }

    /// Haversine distance to `other`, in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lng, p.lat]
    }
}

type Cell = (i32, i32);

fn cell_of(point: &GeoPoint) -> Cell {
    (
        (point.lat / CELL_DEGREES).floor() as i32,
        (point.lng / CELL_DEGREES).floor() as i32,
    )
}

/// Bounding box, in degrees, that contains every point within a radius.
///
/// `None` when the box would touch a pole or wrap the antimeridian; the
/// caller then scans everything.
fn bounding_box(origin: &GeoPoint, radius_km: f64) -> Option<(f64, f64, f64, f64)> {
    let angular = radius_km / EARTH_RADIUS_KM;
    let dlat = angular.to_degrees();
    let lat_min = origin.lat - dlat;
    let lat_max = origin.lat + dlat;
    if lat_min <= -90.0 || lat_max >= 90.0 {
        return None;
    }

    // hav(d) >= cos(lat1) cos(lat2) hav(dlng), so with both latitudes
    // bounded by `widest`: sin(dlng / 2) <= sin(d / 2) / cos(widest).
    let widest = lat_min.abs().max(lat_max.abs()).to_radians();
    let ratio = (angular / 2.0).sin() / widest.cos();
    if ratio >= 1.0 {
        return None;
    }
    let dlng = (2.0 * ratio.asin()).to_degrees();
    let lng_min = origin.lng - dlng;
    let lng_max = origin.lng + dlng;
    if lng_min < -180.0 || lng_max > 180.0 {
        return None;
    }

    Some((lat_min, lat_max, lng_min, lng_max))
}

/// Fixed-size lat/lng grid over volunteer positions.
///
/// The index only narrows the candidate set; callers must still apply the
/// exact distance check.
#[derive(Debug, Default)]
pub struct GridIndex {
    cells: HashMap<Cell, HashSet<VolunteerId>>,
    positions: HashMap<VolunteerId, Cell>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Inserts or moves `id` to `point`.
    pub fn upsert(&mut self, id: VolunteerId, point: &GeoPoint) {
        let cell = cell_of(point);
        if let Some(previous) = self.positions.insert(id, cell) {
            if previous == cell {
                return;
            }
            self.detach(id, previous);
        }
        self.cells.entry(cell).or_default().insert(id);
    }

    pub fn remove(&mut self, id: VolunteerId) {
        if let Some(cell) = self.positions.remove(&id) {
            self.detach(id, cell);
        }
    }

    fn detach(&mut self, id: VolunteerId, cell: Cell) {
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(&id);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Ids whose cell overlaps the bounding box of the query circle.
    pub fn candidates_within(&self, origin: &GeoPoint, radius_km: f64) -> Vec<VolunteerId> {
        let Some((lat_min, lat_max, lng_min, lng_max)) = bounding_box(origin, radius_km) else {
            return self.positions.keys().copied().collect();
        };

        let (row_min, col_min) = cell_of(&GeoPoint::new(lng_min, lat_min));
        let (row_max, col_max) = cell_of(&GeoPoint::new(lng_max, lat_max));
        let span = (row_max - row_min + 1) as usize * (col_max - col_min + 1) as usize;

        let in_range =
            |&(row, col): &Cell| (row_min..=row_max).contains(&row) && (col_min..=col_max).contains(&col);

        if span > self.cells.len() {
            // Cheaper to walk the occupied cells than the box.
            return self
                .cells
                .iter()
                .filter(|(cell, _)| in_range(cell))
                .flat_map(|(_, members)| members.iter().copied())
                .collect();
        }

        let mut out = Vec::new();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if let Some(members) = self.cells.get(&(row, col)) {
                    out.extend(members.iter().copied());
                }
            }
        }
        out
    }
}
