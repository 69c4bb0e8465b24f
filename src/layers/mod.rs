pub mod base;
pub mod marker;
pub mod tile;

pub use base::{LayerKind, LayerProperties, LayerTrait};
pub use marker::Marker;
pub use tile::{TileCache, TileLayer, TileLoader};
