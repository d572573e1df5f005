use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

/// Country boundary made of one or more closed exterior rings.
///
/// Islands and exclaves are separate rings; a point is inside when it falls
/// inside any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub name: String,
    pub rings: Vec<Vec<GeoPoint>>,
}

impl Boundary {
    pub fn new(name: impl Into<String>, rings: Vec<Vec<GeoPoint>>) -> Self {
        Self {
            name: name.into(),
            rings,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        self.rings.iter().any(|ring| ring_contains(ring, point))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self.rings.iter().flatten();
        let first = points.next()?;
        let seed = BoundingBox {
            west: first.lon,
            south: first.lat,
            east: first.lon,
            north: first.lat,
        };
        Some(points.fold(seed, |bbox, p| BoundingBox {
            west: bbox.west.min(p.lon),
            south: bbox.south.min(p.lat),
            east: bbox.east.max(p.lon),
            north: bbox.north.max(p.lat),
        }))
    }
}

/// Even-odd ray cast; the closing edge is implied.
fn ring_contains(ring: &[GeoPoint], point: GeoPoint) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let crossing = (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if point.lon < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
