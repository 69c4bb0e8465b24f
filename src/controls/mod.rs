pub mod minimap;
pub mod mouse_position;

pub use minimap::{MiniMap, MiniMapOptions, SyncState};
pub use mouse_position::{MousePosition, MousePositionOptions};

use serde::{Deserialize, Serialize};

/// Screen corner a control is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}
