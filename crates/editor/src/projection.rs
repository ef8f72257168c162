use std::f64::consts::PI;

use model::point::Point;
use serde::{Deserialize, Serialize};

/// Pixel position inside the map viewport, origin top left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub trait Projection {
    fn screen_to_geo(&self, screen: ScreenPoint) -> Point;
    fn geo_to_screen(&self, geo: Point) -> ScreenPoint;
}

const TILE_SIZE: f64 = 256.0;

/// Spherical web mercator, the projection slippy map tiles are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MercatorViewport {
    pub center: Point,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for MercatorViewport {
    /// Zagreb city centre.
    fn default() -> Self {
        Self {
            center: Point::new(45.80724, 15.96757),
            zoom: 14.0,
            width: 1024.0,
            height: 768.0,
        }
    }
}

impl MercatorViewport {
    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn project(&self, geo: Point) -> (f64, f64) {
        let size = self.world_size();
        let x = (geo.lng + 180.0) / 360.0 * size;
        let sin = geo.lat.to_radians().sin();
        let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;
        (x, y)
    }

    fn unproject(&self, x: f64, y: f64) -> Point {
        let size = self.world_size();
        let lng = x / size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * y / size;
        let lat = n.sinh().atan().to_degrees();
        Point::new(lat, lng)
    }
}

impl Projection for MercatorViewport {
    fn screen_to_geo(&self, screen: ScreenPoint) -> Point {
        let (center_x, center_y) = self.project(self.center);
        self.unproject(
            center_x + screen.x - self.width / 2.0,
            center_y + screen.y - self.height / 2.0,
        )
    }

    fn geo_to_screen(&self, geo: Point) -> ScreenPoint {
        let (center_x, center_y) = self.project(self.center);
        let (x, y) = self.project(geo);
        ScreenPoint::new(
            x - center_x + self.width / 2.0,
            y - center_y + self.height / 2.0,
        )
    }
}
