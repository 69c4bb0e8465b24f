//! Pyramid geometry shared by the tile source adapters.
//!
//! A pyramid is the per-zoom table of level image sizes and tile grid sizes
//! derived from the full-resolution image dimensions. DeepZoom builds it by
//! repeated floor-halving; IIIF derives each level analytically from the
//! zoom distance to the native level.

use crate::source::{TileRequest, TileSize};
use serde::{Deserialize, Serialize};

/// Full or per-level image dimensions in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Floor-halved dimensions, the DeepZoom level step
    pub fn halved(&self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Number of tile columns and rows covering a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

impl GridSize {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Ceiling-division grid for an image of the given size
    pub fn covering(image: ImageDimensions, tile_size: u32) -> Self {
        Self::new(
            image.width.div_ceil(tile_size),
            image.height.div_ceil(tile_size),
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cols && (y as u32) < self.rows
    }
}

/// One zoom level of a pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidLevel {
    pub image_size: ImageDimensions,
    pub grid: GridSize,
}

impl PyramidLevel {
    pub fn new(image_size: ImageDimensions, tile_size: u32) -> Self {
        Self {
            image_size,
            grid: GridSize::covering(image_size, tile_size),
        }
    }
}

/// Per-zoom table of level geometry, indexed by zoom level with 0 the
/// smallest level and the last entry the native resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyramidTable {
    levels: Vec<PyramidLevel>,
    tile_size: u32,
}

impl PyramidTable {
    /// Builds the DeepZoom pyramid: floor-halve the full-resolution
    /// dimensions until both reach zero, keeping the final empty entry the
    /// generator scheme counts, then index with the smallest level first.
    ///
    /// The resulting level count is `floor(log2(max(w, h))) + 2` and the
    /// native level index is `len - 1`.
    pub fn deep_zoom(full: ImageDimensions, tile_size: u32) -> Self {
        let mut sizes = vec![full];
        let mut current = full;
        while !current.is_empty() {
            current = current.halved();
            sizes.push(current);
        }
        sizes.reverse();

        Self {
            levels: sizes
                .into_iter()
                .map(|size| PyramidLevel::new(size, tile_size))
                .collect(),
            tile_size,
        }
    }

    /// Builds the IIIF pyramid analytically. The native level is the
    /// smallest zoom at which one tile spans at most `tile_size` source
    /// pixels in each direction; every shallower level halves from there.
    pub fn iiif(full: ImageDimensions, tile_size: u32) -> Self {
        let max_native = Self::iiif_max_native_zoom(full, tile_size);

        let levels = (0..=max_native)
            .map(|z| {
                let scale = 1u64 << (max_native - z) as u32;
                PyramidLevel::new(Self::scaled_down(full, scale), tile_size)
            })
            .collect();

        Self { levels, tile_size }
    }

    /// `max(ceil(log2(w / tile)), ceil(log2(h / tile)), 0)`
    pub fn iiif_max_native_zoom(full: ImageDimensions, tile_size: u32) -> i32 {
        if full.width == 0 || full.height == 0 {
            return 0;
        }
        let per_axis = |extent: u32| (extent as f64 / tile_size as f64).log2().ceil() as i32;
        per_axis(full.width).max(per_axis(full.height)).max(0)
    }

    /// Ceiling-scaled level dimensions for an integer downscale factor
    pub fn scaled_down(full: ImageDimensions, scale: u64) -> ImageDimensions {
        ImageDimensions::new(
            ((full.width as u64).div_ceil(scale)) as u32,
            ((full.height as u64).div_ceil(scale)) as u32,
        )
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Zoom index of the native-resolution level
    pub fn max_native_zoom(&self) -> i32 {
        self.levels.len() as i32 - 1
    }

    pub fn level(&self, z: i32) -> Option<&PyramidLevel> {
        if z < 0 {
            return None;
        }
        self.levels.get(z as usize)
    }

    /// Whether the request addresses an existing tile of the table
    pub fn contains(&self, request: &TileRequest) -> bool {
        self.level(request.z)
            .map(|level| level.grid.contains(request.x, request.y))
            .unwrap_or(false)
    }

    /// On-screen size of a tile, clipping the last row/column to the
    /// level's true image extent. Requests outside the table get the
    /// nominal size.
    pub fn tile_display_size(&self, request: &TileRequest) -> TileSize {
        match self.level(request.z) {
            Some(level) if level.grid.contains(request.x, request.y) => {
                Self::clip_tile(level, self.tile_size, request.x, request.y)
            }
            _ => TileSize::square(self.tile_size),
        }
    }

    /// Edge clip for an arbitrary level, shared with synthetic levels the
    /// table itself does not store
    pub fn clip_tile(level: &PyramidLevel, tile_size: u32, x: i32, y: i32) -> TileSize {
        let width = if x as u32 + 1 == level.grid.cols {
            level.image_size.width - tile_size * (level.grid.cols - 1)
        } else {
            tile_size
        };
        let height = if y as u32 + 1 == level.grid.rows {
            level.image_size.height - tile_size * (level.grid.rows - 1)
        } else {
            tile_size
        };
        TileSize::new(width, height)
    }
}
