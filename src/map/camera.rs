//! Web-Mercator camera: converts between geographic coordinates and screen
//! pixels for a viewport of a given size.

use crate::{config::MapConfig, model::LatLng};
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
/// Latitudes beyond this do not project.
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

fn scale(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Absolute world pixel of `at` at `zoom`.
pub fn project(at: LatLng, zoom: f64) -> Pixel {
    let scale = scale(zoom);
    let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Pixel {
        x: (at.lng + 180.0) / 360.0 * scale,
        y: (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale,
    }
}

pub fn unproject(pixel: Pixel, zoom: f64) -> LatLng {
    let scale = scale(zoom);
    let n = PI - 2.0 * PI * pixel.y / scale;
    LatLng {
        lat: n.sinh().atan().to_degrees(),
        lng: pixel.x / scale * 360.0 - 180.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    center: LatLng,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    /// South-west and north-east corners the centre must stay within.
    limits: Option<(LatLng, LatLng)>,
}

impl Camera {
    pub fn new(config: &MapConfig) -> Self {
        let limits = config
            .restrict_to_bounds
            .then(|| bounding_box(&config.bounds))
            .flatten();
        let mut camera = Self {
            center: config.start,
            zoom: config.start_zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            limits,
        };
        camera.zoom = camera.clamp_zoom(camera.zoom);
        camera.restrict();
        camera
    }

    pub const fn center(&self) -> LatLng {
        self.center
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    fn restrict(&mut self) {
        if let Some((south_west, north_east)) = self.limits {
            self.center.lat = self.center.lat.clamp(south_west.lat, north_east.lat);
            self.center.lng = self.center.lng.clamp(south_west.lng, north_east.lng);
        }
    }

    pub fn to_screen(&self, at: LatLng, viewport: Pixel) -> Pixel {
        let origin = project(self.center, self.zoom);
        let world = project(at, self.zoom);
        Pixel {
            x: world.x - origin.x + viewport.x / 2.0,
            y: world.y - origin.y + viewport.y / 2.0,
        }
    }

    pub fn to_latlng(&self, screen: Pixel, viewport: Pixel) -> LatLng {
        let origin = project(self.center, self.zoom);
        unproject(
            Pixel {
                x: origin.x + screen.x - viewport.x / 2.0,
                y: origin.y + screen.y - viewport.y / 2.0,
            },
            self.zoom,
        )
    }

    /// Moves the map content by `delta` screen pixels.
    pub fn pan(&mut self, delta: Pixel) {
        let origin = project(self.center, self.zoom);
        self.center = unproject(
            Pixel {
                x: origin.x - delta.x,
                y: origin.y - delta.y,
            },
            self.zoom,
        );
        self.restrict();
    }

    /// Zooms by `steps` levels keeping the point under `cursor` in place.
    pub fn zoom_at(&mut self, steps: f64, cursor: Pixel, viewport: Pixel) {
        let zoom = self.clamp_zoom(self.zoom + steps);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.to_latlng(cursor, viewport);
        let anchored = project(anchor, zoom);
        self.zoom = zoom;
        self.center = unproject(
            Pixel {
                x: anchored.x - (cursor.x - viewport.x / 2.0),
                y: anchored.y - (cursor.y - viewport.y / 2.0),
            },
            zoom,
        );
        self.restrict();
    }

    pub fn center_on(&mut self, at: LatLng) {
        self.center = at;
        self.restrict();
    }
}

pub fn bounding_box(points: &[LatLng]) -> Option<(LatLng, LatLng)> {
    let first = points.first()?;
    Some(points.iter().fold((*first, *first), |(sw, ne), p| {
        (
            LatLng::new(sw.lat.min(p.lat), sw.lng.min(p.lng)),
            LatLng::new(ne.lat.max(p.lat), ne.lng.max(p.lng)),
        )
    }))
}

/// Even-odd rule.
pub fn contains(polygon: &[Pixel], point: Pixel) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn distance_to_segment(point: Pixel, a: Pixel, b: Pixel) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length = dx * dx + dy * dy;
    if length == 0.0 {
        return point.distance(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length).clamp(0.0, 1.0);
    point.distance(Pixel::new(a.x + t * dx, a.y + t * dy))
}

pub fn distance_to_polyline(point: Pixel, line: &[Pixel]) -> Option<f64> {
    line.windows(2)
        .map(|pair| distance_to_segment(point, pair[0], pair[1]))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Pixel = Pixel::new(800.0, 600.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn camera() -> Camera {
        Camera::new(&MapConfig::default())
    }

    #[test]
    fn projection_roundtrip() {
        let at = LatLng::new(51.437_285_5, 7.878_100_2);
        let back = unproject(project(at, 15.0), 15.0);
        assert!(close(at.lat, back.lat) && close(at.lng, back.lng));
    }

    #[test]
    fn origin_of_world() {
        let pixel = project(LatLng::new(0.0, 0.0), 0.0);
        assert!(close(pixel.x, 128.0) && close(pixel.y, 128.0));
    }

    #[test]
    fn center_is_middle_of_viewport() {
        let camera = camera();
        let screen = camera.to_screen(camera.center(), VIEWPORT);
        assert!(close(screen.x, 400.0) && close(screen.y, 300.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = camera();
        camera.zoom_at(10.0, Pixel::new(400.0, 300.0), VIEWPORT);
        assert!(close(camera.zoom(), 17.0));
        camera.zoom_at(-20.0, Pixel::new(400.0, 300.0), VIEWPORT);
        assert!(close(camera.zoom(), 10.0));
    }

    #[test]
    fn zoom_keeps_cursor_anchor() {
        let mut camera = camera();
        let cursor = Pixel::new(100.0, 500.0);
        let before = camera.to_latlng(cursor, VIEWPORT);
        camera.zoom_at(1.0, cursor, VIEWPORT);
        let after = camera.to_screen(before, VIEWPORT);
        assert!((after.x - cursor.x).abs() < 1e-3);
        assert!((after.y - cursor.y).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_content() {
        let mut camera = camera();
        let at = camera.to_latlng(Pixel::new(400.0, 300.0), VIEWPORT);
        camera.pan(Pixel::new(50.0, -20.0));
        let screen = camera.to_screen(at, VIEWPORT);
        assert!((screen.x - 450.0).abs() < 1e-3);
        assert!((screen.y - 280.0).abs() < 1e-3);
    }

    #[test]
    fn restricted_center() {
        let mut camera = Camera::new(&MapConfig {
            restrict_to_bounds: true,
            ..MapConfig::default()
        });
        camera.center_on(LatLng::new(60.0, 0.0));
        let center = camera.center();
        assert!(close(center.lat, 51.448_635_880_508_2));
        assert!(close(center.lng, 7.854_194_641_113_28));
    }

    #[test]
    fn polygon_containment() {
        let square = [
            Pixel::new(0.0, 0.0),
            Pixel::new(10.0, 0.0),
            Pixel::new(10.0, 10.0),
            Pixel::new(0.0, 10.0),
        ];
        assert!(contains(&square, Pixel::new(5.0, 5.0)));
        assert!(!contains(&square, Pixel::new(15.0, 5.0)));
        assert!(!contains(&[], Pixel::new(0.0, 0.0)));
    }

    #[test]
    fn polyline_distance() {
        let line = [Pixel::new(0.0, 0.0), Pixel::new(10.0, 0.0), Pixel::new(10.0, 10.0)];
        assert!(close(distance_to_polyline(Pixel::new(5.0, 3.0), &line).unwrap(), 3.0));
        assert!(close(distance_to_polyline(Pixel::new(13.0, 14.0), &line).unwrap(), 5.0));
        assert_eq!(distance_to_polyline(Pixel::new(0.0, 0.0), &line[..1]), None);
    }
}
