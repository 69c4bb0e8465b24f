//! DeepZoom tile source: pre-cut pyramid served as
//! `<base><zoom>/<col>_<row>.<format>`.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::source::pyramid::{ImageDimensions, PyramidTable};
use crate::source::{TileRequest, TileSize, TileSource};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Options for a DeepZoom source. `width` and `height` default to the `-1`
/// sentinel and must be set by the caller; construction rejects anything
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepZoomOptions {
    pub width: i64,
    pub height: i64,
    pub tile_size: u32,
    pub image_format: String,
    /// Cap on the served zoom range; defaults to the native level
    pub max_zoom: Option<i32>,
}

impl Default for DeepZoomOptions {
    fn default() -> Self {
        Self {
            width: -1,
            height: -1,
            tile_size: 256,
            image_format: "jpeg".to_string(),
            max_zoom: None,
        }
    }
}

/// Tile source over a pre-generated DeepZoom pyramid
#[derive(Debug, Clone)]
pub struct DeepZoomSource {
    base_url: String,
    options: DeepZoomOptions,
    dimensions: ImageDimensions,
    table: PyramidTable,
}

impl DeepZoomSource {
    /// Builds the source, deriving the full level table up front. Fails
    /// with an input-validation error when the image dimensions were never
    /// set (or set to something negative) so a misconfigured layer is
    /// caught at construction rather than at first tile fetch.
    pub fn new(base_url: impl Into<String>, options: DeepZoomOptions) -> Result<Self> {
        if options.width < 0 || options.height < 0 {
            return Err(MapError::InvalidDimensions(format!(
                "deep zoom source needs explicit image width and height, got {}x{}",
                options.width, options.height
            ))
            .into());
        }
        if options.tile_size == 0 {
            return Err(
                MapError::InvalidDimensions("tile size must be positive".to_string()).into(),
            );
        }

        let dimensions = ImageDimensions::new(options.width as u32, options.height as u32);
        let table = PyramidTable::deep_zoom(dimensions, options.tile_size);

        Ok(Self {
            base_url: base_url.into(),
            options,
            dimensions,
            table,
        })
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn table(&self) -> &PyramidTable {
        &self.table
    }
}

impl TileSource for DeepZoomSource {
    fn url_for(&self, request: &TileRequest) -> String {
        format!(
            "{}{}/{}_{}.{}",
            self.base_url, request.z, request.x, request.y, self.options.image_format
        )
    }

    fn size_of(&self, request: &TileRequest) -> TileSize {
        self.table.tile_display_size(request)
    }

    fn is_valid(&self, request: &TileRequest) -> bool {
        request.z >= self.min_zoom() && request.z <= self.max_zoom() && self.table.contains(request)
    }

    fn tile_size(&self) -> u32 {
        self.options.tile_size
    }

    fn min_zoom(&self) -> i32 {
        0
    }

    fn max_zoom(&self) -> i32 {
        self.options
            .max_zoom
            .unwrap_or_else(|| self.table.max_native_zoom())
    }

    fn max_native_zoom(&self) -> i32 {
        self.table.max_native_zoom()
    }

    /// Image footprint in map coordinates: the native-resolution pixel
    /// rectangle unprojected at the native zoom
    fn bounds(&self) -> Option<LatLngBounds> {
        let scale = 2_f64.powi(self.table.max_native_zoom());
        let south_west = LatLng::new(-(self.dimensions.height as f64) / scale, 0.0);
        let north_east = LatLng::new(0.0, self.dimensions.width as f64 / scale);
        Some(LatLngBounds::new(south_west, north_east))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noita_source() -> DeepZoomSource {
        DeepZoomSource::new(
            "https://tiles.example.org/noita/",
            DeepZoomOptions {
                width: 51712,
                height: 74240,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_construction_requires_dimensions() {
        let err = DeepZoomSource::new("https://t.example/", DeepZoomOptions::default());
        assert!(err.is_err());

        let err = DeepZoomSource::new(
            "https://t.example/",
            DeepZoomOptions {
                width: 100,
                height: -1,
                ..Default::default()
            },
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_url_format() {
        let source = noita_source();
        assert_eq!(
            source.url_for(&TileRequest::new(13, 7, 11)),
            "https://tiles.example.org/noita/13/7_11.jpeg"
        );
    }

    #[test]
    fn test_zoom_range() {
        let source = noita_source();
        assert_eq!(source.min_zoom(), 0);
        assert_eq!(source.max_native_zoom(), 17);
        assert_eq!(source.max_zoom(), 17);
    }

    #[test]
    fn test_max_zoom_override() {
        let source = DeepZoomSource::new(
            "https://t.example/",
            DeepZoomOptions {
                width: 51712,
                height: 74240,
                max_zoom: Some(13),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(source.max_zoom(), 13);
        assert!(!source.is_valid(&TileRequest::new(14, 0, 0)));
    }

    #[test]
    fn test_is_valid_rejects_out_of_grid() {
        let source = noita_source();

        assert!(source.is_valid(&TileRequest::new(17, 0, 0)));
        assert!(source.is_valid(&TileRequest::new(17, 201, 289)));
        assert!(!source.is_valid(&TileRequest::new(17, 202, 0)));
        assert!(!source.is_valid(&TileRequest::new(17, -1, 0)));
        assert!(!source.is_valid(&TileRequest::new(-1, 0, 0)));
    }

    #[test]
    fn test_edge_tile_size() {
        let source = noita_source();
        // 51712 = 202 * 256, exact; 74240 = 290 * 256, exact too.
        assert_eq!(
            source.size_of(&TileRequest::new(17, 201, 289)),
            TileSize::new(256, 256)
        );

        // A level with remainders: level 15 is 12928x18560, a 51x73 grid
        // with 128px leftovers on both axes.
        assert_eq!(
            source.size_of(&TileRequest::new(15, 50, 72)),
            TileSize::new(128, 128)
        );
    }

    #[test]
    fn test_bounds_cover_image() {
        let source = noita_source();
        let bounds = source.bounds().unwrap();

        let scale = 2_f64.powi(17);
        assert!((bounds.south_west.lat - (-74240.0 / scale)).abs() < 1e-12);
        assert!((bounds.north_east.lng - 51712.0 / scale).abs() < 1e-12);
    }
}
