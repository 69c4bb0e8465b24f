//! Tile sources: adapters that translate a single large raster image into
//! the tile/zoom coordinate scheme the rendering engine requests tiles in.
//!
//! Two kinds are supported: a pre-cut DeepZoom pyramid
//! ([`deepzoom::DeepZoomSource`]) and an IIIF Image API service
//! ([`iiif::IiifSource`]). Both sit on the shared pyramid geometry in
//! [`pyramid`].

pub mod deepzoom;
pub mod iiif;
pub mod pyramid;

use crate::core::geo::{LatLngBounds, TileCoord};
use crate::core::viewport::Viewport;
use once_cell::sync::Lazy;

pub use deepzoom::DeepZoomSource;
pub use iiif::IiifSource;

/// Shared async HTTP client with a custom User-Agent so that public image
/// servers don't reject the request. Building the client once avoids the
/// cost of TLS and connection pool setup for every fetch.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent("noitamap/0.1 (+https://github.com/example/noitamap)")
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build reqwest async client")
});

/// A single tile requested by the rendering engine: zoom level, column, row.
///
/// Signed throughout; negative `z` addresses synthetic zoomed-out levels and
/// negative `x`/`y` are representable so `is_valid` can reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRequest {
    pub z: i32,
    pub x: i32,
    pub y: i32,
}

impl TileRequest {
    pub fn new(z: i32, x: i32, y: i32) -> Self {
        Self { z, x, y }
    }
}

impl From<TileCoord> for TileRequest {
    fn from(coord: TileCoord) -> Self {
        Self::new(coord.z, coord.x, coord.y)
    }
}

impl From<TileRequest> for TileCoord {
    fn from(request: TileRequest) -> Self {
        TileCoord::new(request.x, request.y, request.z)
    }
}

/// Pixel dimensions of a tile as it should be laid out on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(edge: u32) -> Self {
        Self::new(edge, edge)
    }
}

/// Capability surface a tile source exposes to the rendering engine.
///
/// `url_for` and `size_of` assume the request already passed `is_valid`;
/// the engine is expected to suppress invalid requests rather than issue
/// doomed fetches.
pub trait TileSource: Send + Sync {
    /// Build the URL serving the requested tile
    fn url_for(&self, request: &TileRequest) -> String;

    /// Expected on-screen pixel size of the requested tile. Tiles on the
    /// final row/column of a level are clipped to the level's true image
    /// dimensions so the engine lays them out without gaps or overlap.
    fn size_of(&self, request: &TileRequest) -> TileSize;

    /// Whether the request addresses a tile that exists at all
    fn is_valid(&self, request: &TileRequest) -> bool;

    /// Called when the source is added to an engine view. Sources may use
    /// the viewport to finish configuring themselves (the IIIF source
    /// synthesizes extra zoomed-out levels here).
    fn attach(&mut self, _viewport: &Viewport) {}

    /// Called when the source is removed from the engine view
    fn detach(&mut self) {}

    /// Edge length of a nominal (non-edge) tile in pixels
    fn tile_size(&self) -> u32;

    /// Lowest zoom level this source serves (negative once synthetic
    /// levels have been added)
    fn min_zoom(&self) -> i32;

    /// Highest zoom level this source serves
    fn max_zoom(&self) -> i32;

    /// Highest zoom level directly backed by source tiles
    fn max_native_zoom(&self) -> i32;

    /// Map-coordinate bounds of the full image, if known
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }
}
