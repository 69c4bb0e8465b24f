use crate::core::geo::LatLngBounds;
use crate::core::viewport::Viewport;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Layer categories the map distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Tile,
    Marker,
    Custom,
}

/// Shared layer bookkeeping embedded by every concrete layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub kind: LayerKind,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, kind: LayerKind) -> Self {
        Self {
            id,
            name,
            kind,
            z_index: 0,
            opacity: 1.0,
            visible: true,
        }
    }
}

/// Behaviour common to all map layers
pub trait LayerTrait: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn kind(&self) -> LayerKind;

    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn z_index(&self) -> i32 {
        0
    }

    /// Map-coordinate extent of the layer's content, if it has one
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    /// Called once per frame/interaction cycle with the current viewport
    fn update(&mut self, _viewport: &Viewport) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
