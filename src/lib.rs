//! # noitamap
//!
//! Engine crate for an interactive, zoomable viewer of the Noita world map.
//!
//! The interesting parts live in [`source`]: tile-source adapters that
//! translate a single large raster image (published either as a DeepZoom
//! pyramid or as an IIIF Image API service) into the tile/zoom scheme a
//! pan/zoom rendering engine expects. Around that sit a slim map engine
//! (viewport, layers, events), a minimap control that keeps two viewports
//! in sync without feedback loops, a mouse-position readout, and a marker
//! layer for the static points of interest.

pub mod controls;
pub mod core;
pub mod layers;
pub mod source;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    events::{EventManager, MapEvent},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use layers::{base::LayerTrait, marker::Marker, tile::TileLayer};

pub use source::{
    deepzoom::DeepZoomSource,
    iiif::{IiifServiceInfo, IiifSource},
    pyramid::{ImageDimensions, PyramidTable},
    TileRequest, TileSource,
};

pub use controls::{minimap::MiniMap, mouse_position::MousePosition};

pub mod prelude;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid image dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Tile source error: {0}")]
    TileSource(String),

    #[error("Layer error: {0}")]
    Layer(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Wires `log` output to env_logger; safe to call more than once
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
