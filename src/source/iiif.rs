//! IIIF Image API tile source.
//!
//! Unlike DeepZoom there is no pre-cut pyramid on disk; every tile is a
//! region/size request the server crops and scales on demand. Construction
//! is two-phase: [`IiifSource::resolve`] fetches and parses the service's
//! `info.json`, then [`IiifSource::new`] builds the source from the parsed
//! description. A failed resolve means the source is simply never built.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::core::viewport::Viewport;
use crate::source::pyramid::{ImageDimensions, PyramidLevel, PyramidTable};
use crate::source::{TileRequest, TileSize, TileSource, HTTP_CLIENT};
use crate::{MapError, Result};
use log::{debug, error};
use serde::Deserialize;
use serde_json::Value;

/// Zoomed-out levels synthesized below level 0 at attach time, at most
const MAX_SYNTHETIC_LEVELS: i32 = 5;

/// Image API 1.1 services advertise this compliance document as their
/// profile; they only accept the `native` quality keyword.
const V1_COMPLIANCE_PREFIX: &str = "http://library.stanford.edu/iiif/image-api/1.1/compliance";

/// Raw `info.json` shape across API versions 1 through 3. Version 1 carries
/// `tile_width`, versions 2/3 a `tiles` array; `profile` is a bare string in
/// v1/v3 and usually an array in v2.
#[derive(Debug, Deserialize)]
struct InfoDoc {
    width: u32,
    height: u32,
    tiles: Option<Vec<TileSpec>>,
    tile_width: Option<u32>,
    profile: Option<Value>,
    #[serde(rename = "type")]
    service_type: Option<String>,
    /// A string in most documents, but API 3 allows a list of contexts
    #[serde(rename = "@context")]
    context: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TileSpec {
    width: u32,
}

/// Normalized IIIF service description, the output of the resolve phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IiifServiceInfo {
    pub width: u32,
    pub height: u32,
    /// Preferred tile edge advertised by the service, if any
    pub tile_size: Option<u32>,
    /// First profile entry, when the document carried one
    pub profile: Option<String>,
    pub service_type: Option<String>,
    pub context: Option<String>,
}

impl IiifServiceInfo {
    pub fn from_json(body: &str) -> Result<Self> {
        let doc: InfoDoc = serde_json::from_str(body).map_err(|e| {
            error!("invalid IIIF info document: {}", e);
            MapError::Serialization(e)
        })?;

        if doc.width == 0 || doc.height == 0 {
            return Err(MapError::InvalidDimensions(format!(
                "IIIF service reports a {}x{} image",
                doc.width, doc.height
            ))
            .into());
        }

        let tile_size = doc
            .tiles
            .as_ref()
            .and_then(|tiles| tiles.first())
            .map(|tile_spec| tile_spec.width)
            .or(doc.tile_width);

        let profile = doc.profile.as_ref().and_then(first_string_entry);
        let context = doc.context.as_ref().and_then(first_string_entry);

        Ok(Self {
            width: doc.width,
            height: doc.height,
            tile_size,
            profile,
            service_type: doc.service_type,
            context,
        })
    }

    /// Quality keyword for tile URLs: version 1.1 services only understand
    /// `native`, everything newer takes `default`
    pub fn quality(&self) -> &'static str {
        match &self.profile {
            Some(profile) if profile.starts_with(V1_COMPLIANCE_PREFIX) => "native",
            _ => "default",
        }
    }

    /// Whether the service speaks Image API 3, which changes the size
    /// syntax of tile URLs
    pub fn is_v3(&self) -> bool {
        if let Some(service_type) = &self.service_type {
            return service_type.starts_with("ImageService3");
        }
        self.context
            .as_deref()
            .map(|c| c.contains("/image/3/"))
            .unwrap_or(false)
    }
}

/// `profile` and `@context` are strings in most documents but arrays in
/// some (v2 profiles mix a compliance URI with capability objects); the
/// first string entry is the one that identifies the API generation
fn first_string_entry(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct IiifOptions {
    pub tile_format: String,
    /// Overrides the tile size advertised by the service
    pub tile_size: Option<u32>,
    /// Overrides the quality keyword derived from the profile
    pub quality: Option<String>,
}

impl Default for IiifOptions {
    fn default() -> Self {
        Self {
            tile_format: "jpg".to_string(),
            tile_size: None,
            quality: None,
        }
    }
}

/// Tile source over an IIIF Image API endpoint
#[derive(Debug, Clone)]
pub struct IiifSource {
    base_url: String,
    info: IiifServiceInfo,
    options: IiifOptions,
    table: PyramidTable,
    tile_size: u32,
    quality: String,
    v3: bool,
    synthetic_levels: i32,
}

impl IiifSource {
    /// Fetches and parses the service description. Callers construct the
    /// source from the result; on failure there is nothing to construct.
    pub async fn resolve(info_url: &str) -> Result<IiifServiceInfo> {
        debug!("resolving IIIF service description from {}", info_url);

        let response = match HTTP_CLIENT.get(info_url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("IIIF info request to {} failed: {}", info_url, e);
                return Err(MapError::Network(e).into());
            }
        };
        let response = response.error_for_status().map_err(|e| {
            error!("IIIF info request to {} failed: {}", info_url, e);
            MapError::Network(e)
        })?;
        let body = response.text().await.map_err(MapError::Network)?;

        IiifServiceInfo::from_json(&body)
    }

    /// Builds the source from a resolved service description. `info_url`
    /// may be the `info.json` URL or the bare service base.
    pub fn new(info_url: impl Into<String>, info: IiifServiceInfo, options: IiifOptions) -> Self {
        let mut base_url = info_url.into();
        if let Some(stripped) = base_url.strip_suffix("/info.json") {
            base_url = stripped.to_string();
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let tile_size = options
            .tile_size
            .or(info.tile_size)
            .filter(|&t| t > 0)
            .unwrap_or(256);
        let quality = options
            .quality
            .clone()
            .unwrap_or_else(|| info.quality().to_string());
        let v3 = info.is_v3();
        let full = ImageDimensions::new(info.width, info.height);
        let table = PyramidTable::iiif(full, tile_size);

        Self {
            base_url,
            info,
            options,
            table,
            tile_size,
            quality,
            v3,
            synthetic_levels: 0,
        }
    }

    /// Resolve-then-construct in one call
    pub async fn connect(info_url: &str, options: IiifOptions) -> Result<Self> {
        let info = Self::resolve(info_url).await?;
        Ok(Self::new(info_url, info, options))
    }

    pub fn info(&self) -> &IiifServiceInfo {
        &self.info
    }

    pub fn table(&self) -> &PyramidTable {
        &self.table
    }

    fn full_dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.info.width, self.info.height)
    }

    /// Level geometry for any served zoom, including the synthetic
    /// negative levels the table itself does not store
    fn level_geometry(&self, z: i32) -> PyramidLevel {
        match self.table.level(z) {
            Some(level) => *level,
            None => {
                let shift = (self.table.max_native_zoom() - z) as u32;
                let image = PyramidTable::scaled_down(self.full_dimensions(), 1u64 << shift);
                PyramidLevel::new(image, self.tile_size)
            }
        }
    }
}

impl TileSource for IiifSource {
    /// `{base}/{region}/{size}/0/{quality}.{format}` with the region in
    /// native-resolution pixels clipped to the image, and the size holding
    /// one numeric component before the trailing comma for API 1/2 and two
    /// for API 3
    fn url_for(&self, request: &TileRequest) -> String {
        let shift = (self.table.max_native_zoom() - request.z) as u32;
        let scale = 1u64 << shift;
        let tile_span = self.tile_size as u64 * scale;

        let min_x = request.x as u64 * tile_span;
        let min_y = request.y as u64 * tile_span;
        let max_x = (min_x + tile_span).min(self.info.width as u64);
        let max_y = (min_y + tile_span).min(self.info.height as u64);
        let x_diff = max_x.saturating_sub(min_x);
        let y_diff = max_y.saturating_sub(min_y);

        let size_w = x_diff.div_ceil(scale);
        let size_h = y_diff.div_ceil(scale);
        let size = if self.v3 {
            format!("{},{},", size_w, size_h)
        } else {
            format!("{},", size_w)
        };

        format!(
            "{}/{},{},{},{}/{}/0/{}.{}",
            self.base_url, min_x, min_y, x_diff, y_diff, size, self.quality, self.options.tile_format
        )
    }

    fn size_of(&self, request: &TileRequest) -> TileSize {
        if request.z < self.min_zoom() || request.z > self.max_zoom() {
            return TileSize::square(self.tile_size);
        }
        let level = self.level_geometry(request.z);
        if level.grid.contains(request.x, request.y) {
            PyramidTable::clip_tile(&level, self.tile_size, request.x, request.y)
        } else {
            TileSize::square(self.tile_size)
        }
    }

    /// Native levels validate against the level grid; synthetic levels
    /// accept any non-negative column and row
    fn is_valid(&self, request: &TileRequest) -> bool {
        if request.z >= 0 {
            request.z <= self.max_zoom() && self.table.contains(request)
        } else {
            request.z >= self.min_zoom() && request.x >= 0 && request.y >= 0
        }
    }

    /// Synthesizes up to five zoomed-out levels below level 0 until the
    /// smallest level fits the attaching viewport
    fn attach(&mut self, viewport: &Viewport) {
        let native = self.table.max_native_zoom();
        let full = self.full_dimensions();

        let mut extra: i32 = 0;
        loop {
            let shift = (native + extra) as u32;
            let size = PyramidTable::scaled_down(full, 1u64 << shift);
            let fits = (size.width as f64) <= viewport.size.x
                && (size.height as f64) <= viewport.size.y;
            if fits || extra >= MAX_SYNTHETIC_LEVELS {
                break;
            }
            extra += 1;
        }

        if extra > 0 {
            debug!(
                "synthesized {} zoomed-out IIIF levels for a {}x{} viewport",
                extra, viewport.size.x, viewport.size.y
            );
        }
        self.synthetic_levels = extra;
    }

    fn detach(&mut self) {
        self.synthetic_levels = 0;
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn min_zoom(&self) -> i32 {
        -self.synthetic_levels
    }

    fn max_zoom(&self) -> i32 {
        self.table.max_native_zoom()
    }

    fn max_native_zoom(&self) -> i32 {
        self.table.max_native_zoom()
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let scale = 2_f64.powi(self.table.max_native_zoom());
        let south_west = LatLng::new(-(self.info.height as f64) / scale, 0.0);
        let north_east = LatLng::new(0.0, self.info.width as f64 / scale);
        Some(LatLngBounds::new(south_west, north_east))
    }
}
