use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions.
///
/// Projection is the flat "Simple CRS" used for plain raster images: a map
/// coordinate maps to pixel space as `(lng * 2^zoom, -lat * 2^zoom)`. Two
/// independent instances exist when a minimap is attached (main + overview).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in map coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            min_zoom: 0.0,
            max_zoom: 18.0,
        }
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets center and zoom in one step
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits. `min_zoom` may be negative when a tile source
    /// has synthesized extra zoomed-out levels.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a map coordinate to world pixel coordinates at the given
    /// zoom level (Simple CRS: x = lng, y = -lat, scaled by 2^zoom)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 2_f64.powf(z);
        Point::new(lat_lng.lng * scale, -lat_lng.lat * scale)
    }

    /// Unprojects world pixel coordinates back to a map coordinate
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 2_f64.powf(z);
        LatLng::new(-pixel.y / scale, pixel.x / scale)
    }

    /// Converts a map coordinate to screen pixel coordinates (container
    /// relative, origin at the viewport's top-left corner)
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let world = self.project(lat_lng, None);
        let center_world = self.project(&self.center, None);
        Point::new(
            world.x - center_world.x + self.size.x / 2.0,
            world.y - center_world.y + self.size.y / 2.0,
        )
    }

    /// Converts screen pixel coordinates back to a map coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let center_world = self.project(&self.center, None);
        let world = Point::new(
            pixel.x - self.size.x / 2.0 + center_world.x,
            pixel.y - self.size.y / 2.0 + center_world.y,
        );
        self.unproject(&world, None)
    }

    /// Pans the viewport by the given pixel offset
    pub fn pan(&mut self, delta: Point) {
        let center_world = self.project(&self.center, None);
        let new_center = self.unproject(&center_world.add(&delta), None);
        self.set_center(new_center);
    }

    /// Zooms the viewport to a specific level, optionally keeping the map
    /// coordinate under `focus_point` stationary on screen
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < 1e-9 {
            return;
        }

        if let Some(focus_screen) = focus_point {
            let focus_latlng = self.pixel_to_lat_lng(&focus_screen);
            self.zoom = new_zoom;
            let new_focus_screen = self.lat_lng_to_pixel(&focus_latlng);
            let offset = new_focus_screen.subtract(&focus_screen);
            self.pan(offset);
        } else {
            self.zoom = new_zoom;
        }
    }

    /// Gets the current viewport bounds in map coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));
        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Fits the viewport to contain the given bounds, choosing the largest
    /// integer zoom at which the bounds fit inside the padded viewport
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) {
        let padding = padding.unwrap_or(20.0);
        self.center = bounds.center();

        let inner = Point::new(self.size.x - 2.0 * padding, self.size.y - 2.0 * padding);

        let mut best_zoom = self.min_zoom;
        for test_zoom in (self.min_zoom.floor() as i32)..=(self.max_zoom.floor() as i32) {
            let zoom = test_zoom as f64;
            let nw = self.project(
                &LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
                Some(zoom),
            );
            let se = self.project(
                &LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
                Some(zoom),
            );

            let width = (se.x - nw.x).abs();
            let height = (se.y - nw.y).abs();

            if width <= inner.x && height <= inner.y {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        self.set_zoom(best_zoom);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(
            LatLng::new(-0.28, 0.2),
            10.0,
            Point::new(800.0, 600.0),
        );

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, -0.28);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_simple_crs_projection_roundtrip() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 13.0, Point::new(512.0, 512.0));

        let coord = LatLng::new(-0.24526, 0.20057);
        let projected = viewport.project(&coord, Some(13.0));
        let back = viewport.unproject(&projected, Some(13.0));

        assert!((back.lat - coord.lat).abs() < 1e-12);
        assert!((back.lng - coord.lng).abs() < 1e-12);
    }

    #[test]
    fn test_projection_orientation() {
        // Larger lat is further up the image, i.e. smaller pixel y.
        let viewport = Viewport::default();
        let high = viewport.project(&LatLng::new(-0.1, 0.0), Some(10.0));
        let low = viewport.project(&LatLng::new(-0.5, 0.0), Some(10.0));
        assert!(high.y < low.y);
    }

    #[test]
    fn test_center_pixel_roundtrip() {
        let viewport = Viewport::new(LatLng::new(-0.3, 0.2), 5.0, Point::new(512.0, 512.0));

        let center_pixel = Point::new(256.0, 256.0);
        let center = viewport.pixel_to_lat_lng(&center_pixel);

        assert!((center.lat - viewport.center.lat).abs() < 1e-9);
        assert!((center.lng - viewport.center.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0); // Below minimum
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0); // Above maximum
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_negative_min_zoom() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(-5.0, 13.0);
        viewport.set_zoom(-3.0);
        assert_eq!(viewport.zoom, -3.0);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let original_center = viewport.center;
        viewport.pan(Point::new(10.0, 10.0));

        assert_ne!(viewport.center, original_center);
    }

    #[test]
    fn test_fit_bounds_selects_fitting_zoom() {
        // 51712x74240 image unprojected at zoom 13: lat spans -74240/8192,
        // lng spans 51712/8192 map units.
        let mut viewport = Viewport::new(LatLng::default(), 0.0, Point::new(800.0, 600.0));
        viewport.set_zoom_limits(0.0, 13.0);

        let bounds = LatLngBounds::from_coords(-74240.0 / 8192.0, 0.0, 0.0, 51712.0 / 8192.0);
        viewport.fit_bounds(&bounds, None);

        // At the chosen zoom the whole image fits the padded viewport.
        let scale = viewport.scale();
        assert!(51712.0 / 8192.0 * scale <= 760.0);
        assert!(74240.0 / 8192.0 * scale <= 560.0);
        // And one zoom further in it would not.
        let next = scale * 2.0;
        assert!(51712.0 / 8192.0 * next > 760.0 || 74240.0 / 8192.0 * next > 560.0);
    }
}
