use iced::{Point, Rectangle};
use ndvicore::geo::{BoundingBox, GeoPoint};

/// Plate carrée fit of a geographic extent into a canvas, aspect preserved.
#[derive(Debug, Clone, Copy)]
pub struct MapProjection {
    extent: BoundingBox,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl MapProjection {
    pub fn fit(extent: BoundingBox, bounds: Rectangle) -> Option<Self> {
        let width = (extent.east - extent.west) as f32;
        let height = (extent.north - extent.south) as f32;
        if width <= 0.0 || height <= 0.0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return None;
        }
        let scale = (bounds.width / width).min(bounds.height / height);
        Some(Self {
            extent,
            scale,
            offset_x: (bounds.width - width * scale) / 2.0,
            offset_y: (bounds.height - height * scale) / 2.0,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_screen(&self, point: GeoPoint) -> Point {
        Point::new(
            self.offset_x + (point.lon - self.extent.west) as f32 * self.scale,
            self.offset_y + (self.extent.north - point.lat) as f32 * self.scale,
        )
    }

    pub fn to_geo(&self, point: Point) -> GeoPoint {
        GeoPoint::new(
            self.extent.west + f64::from((point.x - self.offset_x) / self.scale),
            self.extent.north - f64::from((point.y - self.offset_y) / self.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> BoundingBox {
        BoundingBox {
            west: 88.0,
            south: 20.0,
            east: 93.0,
            north: 27.0,
        }
    }

    #[test]
    fn corners_map_inside_bounds() {
        let bounds = Rectangle::new(Point::ORIGIN, iced::Size::new(500.0, 700.0));
        let projection = MapProjection::fit(extent(), bounds).unwrap();
        let north_west = projection.to_screen(GeoPoint::new(88.0, 27.0));
        let south_east = projection.to_screen(GeoPoint::new(93.0, 20.0));
        assert!(north_west.x.abs() < 1e-3 && north_west.y.abs() < 1e-3);
        assert!((south_east.x - 500.0).abs() < 1e-3);
        assert!((south_east.y - 700.0).abs() < 1e-3);
    }

    #[test]
    fn screen_and_geo_are_inverse() {
        let bounds = Rectangle::new(Point::ORIGIN, iced::Size::new(800.0, 400.0));
        let projection = MapProjection::fit(extent(), bounds).unwrap();
        let dhaka = GeoPoint::new(90.41, 23.81);
        let back = projection.to_geo(projection.to_screen(dhaka));
        assert!((back.lon - dhaka.lon).abs() < 1e-3);
        assert!((back.lat - dhaka.lat).abs() < 1e-3);
    }

    #[test]
    fn degenerate_extent_has_no_projection() {
        let bounds = Rectangle::new(Point::ORIGIN, iced::Size::new(100.0, 100.0));
        let flat = BoundingBox {
            north: 20.0,
            ..extent()
        };
        assert!(MapProjection::fit(flat, bounds).is_none());
    }
}
