use crate::core::geo::{LatLngBounds, TileCoord};
use crate::core::viewport::Viewport;
use crate::layers::base::{LayerKind, LayerProperties, LayerTrait};
use crate::layers::tile::{TileCache, TileLoader};
use crate::source::{TileRequest, TileSize, TileSource};
use crate::Result;
use log::warn;
use std::any::Any;
use std::sync::Arc;

/// Layer that drives a [`TileSource`]: computes the visible tile set for
/// the current viewport, keeps fetches and the cache in sync, and answers
/// layout questions for whoever draws the tiles.
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    cache: TileCache,
    loader: TileLoader,
}

impl TileLayer {
    pub fn new(id: impl Into<String>, source: Box<dyn TileSource>) -> Self {
        let id = id.into();
        Self {
            properties: LayerProperties::new(id.clone(), id, LayerKind::Tile),
            source,
            cache: TileCache::default(),
            loader: TileLoader::new(),
        }
    }

    /// Forwards the attach to the source so it can finish configuring
    /// itself against the live viewport
    pub fn attach(&mut self, viewport: &Viewport) {
        self.source.attach(viewport);
    }

    pub fn detach(&mut self) {
        self.source.detach();
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    /// Tile requests covering the viewport at its current (floored) zoom,
    /// already filtered through the source's validity check
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TileRequest> {
        let zoom = (viewport.zoom.floor() as i32)
            .clamp(self.source.min_zoom(), self.source.max_zoom());
        let tile_size = self.source.tile_size() as f64;

        // World pixel bounds of the viewport at the tile zoom. The tile
        // grid is anchored at the world origin, so tile indices fall out
        // of a plain division.
        let center = viewport.project(&viewport.center, Some(zoom as f64));
        let min_x = center.x - viewport.size.x / 2.0;
        let min_y = center.y - viewport.size.y / 2.0;
        let max_x = center.x + viewport.size.x / 2.0;
        let max_y = center.y + viewport.size.y / 2.0;

        let first_col = (min_x / tile_size).floor() as i32;
        let first_row = (min_y / tile_size).floor() as i32;
        let last_col = (max_x / tile_size).ceil() as i32 - 1;
        let last_row = (max_y / tile_size).ceil() as i32 - 1;

        let mut tiles = Vec::new();
        for y in first_row..=last_row {
            for x in first_col..=last_col {
                let request = TileRequest::new(zoom, x, y);
                if self.source.is_valid(&request) {
                    tiles.push(request);
                }
            }
        }
        tiles
    }

    /// On-screen size a tile should be laid out at; edge tiles come back
    /// clipped to the level's true extent
    pub fn display_size(&self, request: &TileRequest) -> TileSize {
        self.source.size_of(request)
    }

    /// Whether a decoded tile image must be stretched to its computed
    /// display size before drawing
    pub fn needs_stretch(&self, request: &TileRequest, decoded: TileSize) -> bool {
        decoded != self.display_size(request)
    }

    pub fn tile_data(&self, coord: &TileCoord) -> Option<Arc<Vec<u8>>> {
        self.cache.get(coord)
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn loading_count(&self) -> usize {
        self.loader.in_flight_count()
    }

    /// One update cycle: drain finished fetches into the cache, then kick
    /// off fetches for visible tiles not yet cached or in flight
    fn refresh(&mut self, viewport: &Viewport) {
        for result in self.loader.poll_results() {
            match result.result {
                Ok(bytes) => self.cache.insert(result.coord, Arc::new(bytes)),
                Err(e) => warn!("tile {:?} failed to load: {}", result.coord, e),
            }
        }

        for request in self.visible_tiles(viewport) {
            let coord = TileCoord::from(request);
            if self.cache.contains(&coord) || self.loader.is_loading(&coord) {
                continue;
            }
            let url = self.source.url_for(&request);
            self.loader.request_tile(coord, url);
        }
    }
}

impl LayerTrait for TileLayer {
    fn id(&self) -> &str {
        &self.properties.id
    }

    fn name(&self) -> &str {
        &self.properties.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Tile
    }

    fn opacity(&self) -> f32 {
        self.properties.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.properties.opacity = opacity.clamp(0.0, 1.0);
    }

    fn is_visible(&self) -> bool {
        self.properties.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties.visible = visible;
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.source.bounds()
    }

    fn update(&mut self, viewport: &Viewport) -> Result<()> {
        if self.properties.visible {
            self.refresh(viewport);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use crate::source::deepzoom::{DeepZoomOptions, DeepZoomSource};

    fn noita_layer() -> TileLayer {
        let source = DeepZoomSource::new(
            "https://tiles.example.org/noita/",
            DeepZoomOptions {
                width: 51712,
                height: 74240,
                ..Default::default()
            },
        )
        .unwrap();
        TileLayer::new("world", Box::new(source))
    }

    #[test]
    fn test_visible_tiles_single_tile_level() {
        let layer = noita_layer();
        // Level 3 of the pyramid is 3x4 pixels, a single tile; panning the
        // viewport around it must only ever yield tile (0, 0).
        let viewport = Viewport::new(LatLng::new(-0.28, 0.19), 3.0, Point::new(800.0, 600.0));

        let tiles = layer.visible_tiles(&viewport);
        assert_eq!(tiles, vec![TileRequest::new(3, 0, 0)]);
    }

    #[test]
    fn test_visible_tiles_exact_window() {
        let layer = noita_layer();
        // Center the 256px viewport on world pixel (384, 384) at zoom 13 so
        // it covers exactly tile (1, 1).
        let center = LatLng::new(-384.0 / 8192.0, 384.0 / 8192.0);
        let viewport = Viewport::new(center, 13.0, Point::new(256.0, 256.0));

        let tiles = layer.visible_tiles(&viewport);
        assert_eq!(tiles, vec![TileRequest::new(13, 1, 1)]);
    }

    #[test]
    fn test_visible_tiles_filters_invalid() {
        let layer = noita_layer();
        // Viewport hanging off the top-left corner of the image: requests
        // with negative columns/rows are filtered out.
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 13.0, Point::new(512.0, 512.0));

        let tiles = layer.visible_tiles(&viewport);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.x >= 0 && t.y >= 0));
    }

    #[test]
    fn test_needs_stretch_on_edge_tiles() {
        let layer = noita_layer();
        // Level 15 edge tile is 128x128; a server delivering a full 256px
        // tile there has to be stretched down.
        let edge = TileRequest::new(15, 50, 72);
        assert!(layer.needs_stretch(&edge, TileSize::new(256, 256)));
        assert!(!layer.needs_stretch(&edge, TileSize::new(128, 128)));
    }

    #[test]
    fn test_layer_bounds_from_source() {
        let layer = noita_layer();
        let bounds = layer.bounds().unwrap();
        assert!(bounds.contains(&LatLng::new(-0.24526, 0.20057)));
    }
}
