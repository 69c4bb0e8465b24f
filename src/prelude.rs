//! Prelude module for common noitamap types and traits
//!
//! Re-exports the most commonly used types and functions for easy
//! importing with `use noitamap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    events::{EventManager, MapEvent},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions},
    viewport::Viewport,
};

pub use crate::layers::{
    base::LayerTrait,
    marker::Marker,
    tile::{TileCache, TileLayer, TileLoader},
};

pub use crate::source::{
    deepzoom::{DeepZoomOptions, DeepZoomSource},
    iiif::{IiifOptions, IiifServiceInfo, IiifSource},
    pyramid::{GridSize, ImageDimensions, PyramidLevel, PyramidTable},
    TileRequest, TileSize, TileSource,
};

pub use crate::controls::{
    minimap::{MiniMap, MiniMapOptions},
    mouse_position::{MousePosition, MousePositionOptions},
};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
