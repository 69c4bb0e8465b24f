//! Overview-map control kept in sync with the main map.
//!
//! The two maps drive each other: a main-map move repositions the
//! overview, and dragging the overview repositions the main map. Each side
//! carries an explicit [`SyncState`] so a programmatic `set_view` echo is
//! consumed instead of bouncing the view back and forth forever.

use crate::controls::ControlPosition;
use crate::core::bounds::Bounds;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::core::viewport::Viewport;
use log::debug;
use serde::{Deserialize, Serialize};

/// Propagation state of one side of the main/overview pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No propagation pending; the next move-end on the other side is a
    /// genuine user move
    #[default]
    Idle,
    /// This side just drove the other side; the move-end that comes back
    /// is an echo and must be consumed
    Propagating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniMapOptions {
    pub position: ControlPosition,
    /// Show a button that collapses the control
    pub toggle_display: bool,
    /// Overview zoom relative to the main map
    pub zoom_level_offset: f64,
    /// Pin the overview to one zoom level, disabling relative zooming
    pub zoom_level_fixed: Option<f64>,
    /// Pin the overview center, turning it into a static locator
    pub center_fixed: Option<LatLng>,
    /// Collapse automatically while the main map already shows everything
    /// the overview would
    pub auto_toggle_display: bool,
    /// Start collapsed
    pub minimized: bool,
    pub width: f64,
    pub height: f64,
    pub collapsed_width: f64,
    pub collapsed_height: f64,
    /// Zoom limits applied to the overview viewport
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MiniMapOptions {
    fn default() -> Self {
        Self {
            position: ControlPosition::BottomRight,
            toggle_display: false,
            zoom_level_offset: -5.0,
            zoom_level_fixed: None,
            center_fixed: None,
            auto_toggle_display: false,
            minimized: false,
            width: 150.0,
            height: 150.0,
            collapsed_width: 16.0,
            collapsed_height: 16.0,
            min_zoom: 0.0,
            max_zoom: 18.0,
        }
    }
}

/// Minimap control owning its overview viewport.
///
/// The host feeds it move events from both maps; it answers with view
/// changes, the aiming rectangle drawn over the overview, and the shadow
/// rectangle shown while the overview is being dragged.
pub struct MiniMap {
    options: MiniMapOptions,
    overview: Viewport,
    main_state: SyncState,
    overview_state: SyncState,
    /// Main-map footprint drawn on the overview
    aiming_rect: Option<LatLngBounds>,
    /// Aiming rectangle captured when an overview drag starts; the shadow
    /// keeps marking this footprint while the aim moves with the drag
    drag_anchor: Option<LatLngBounds>,
    shadow_rect: Option<LatLngBounds>,
    shadow_visible: bool,
    last_overview_zoom: Option<f64>,
    minimized: bool,
    user_toggled: bool,
}

impl MiniMap {
    pub fn new(options: MiniMapOptions, main: &Viewport) -> Self {
        let mut overview = Viewport::new(
            options.center_fixed.unwrap_or(main.center),
            0.0,
            Point::new(options.width, options.height),
        );
        overview.set_zoom_limits(options.min_zoom, options.max_zoom);

        let minimized = options.minimized;
        let mut minimap = Self {
            options,
            overview,
            main_state: SyncState::Idle,
            overview_state: SyncState::Idle,
            aiming_rect: None,
            drag_anchor: None,
            shadow_rect: None,
            shadow_visible: false,
            last_overview_zoom: None,
            minimized,
            user_toggled: false,
        };

        let zoom = minimap.overview_zoom_for(main);
        let center = minimap.options.center_fixed.unwrap_or(main.center);
        minimap.overview.set_view(center, zoom);
        minimap.aiming_rect = Some(main.bounds());
        minimap
    }

    pub fn options(&self) -> &MiniMapOptions {
        &self.options
    }

    pub fn overview(&self) -> &Viewport {
        &self.overview
    }

    /// Mutable handle for the host to apply drag/zoom gestures to the
    /// overview before reporting move events back
    pub fn overview_mut(&mut self) -> &mut Viewport {
        &mut self.overview
    }

    pub fn main_state(&self) -> SyncState {
        self.main_state
    }

    pub fn overview_state(&self) -> SyncState {
        self.overview_state
    }

    /// Footprint of the main map, drawn on the overview
    pub fn aiming_rect(&self) -> Option<&LatLngBounds> {
        self.aiming_rect.as_ref()
    }

    /// Aiming rectangle in overview screen pixels, ready to draw
    pub fn aiming_rect_screen(&self) -> Option<Bounds> {
        let rect = self.aiming_rect.as_ref()?;
        let nw = self
            .overview
            .lat_lng_to_pixel(&LatLng::new(rect.north_east.lat, rect.south_west.lng));
        let se = self
            .overview
            .lat_lng_to_pixel(&LatLng::new(rect.south_west.lat, rect.north_east.lng));
        Some(Bounds::new(nw, se))
    }

    /// Pre-drag footprint shown while the overview is being dragged
    pub fn shadow_rect(&self) -> Option<&LatLngBounds> {
        if self.shadow_visible {
            self.shadow_rect.as_ref()
        } else {
            None
        }
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Current control footprint in screen pixels
    pub fn current_size(&self) -> (f64, f64) {
        if self.minimized {
            (self.options.collapsed_width, self.options.collapsed_height)
        } else {
            (self.options.width, self.options.height)
        }
    }

    /// Manual collapse/restore. Once the user has toggled by hand the
    /// automatic show/hide logic stays out of the way for good.
    pub fn toggle_display(&mut self) {
        self.user_toggled = true;
        self.minimized = !self.minimized;
    }

    /// Intermediate main-map move: the aiming rectangle tracks every move,
    /// whatever the propagation state
    pub fn on_main_move(&mut self, main: &Viewport) {
        self.aiming_rect = Some(main.bounds());
    }

    /// Main-map move finished. When the overview is idle this is a genuine
    /// user move and gets propagated; when the overview just drove the
    /// main map this is the echo and is consumed.
    pub fn on_main_move_end(&mut self, main: &Viewport) {
        if self.overview_state == SyncState::Idle {
            self.main_state = SyncState::Propagating;
            let center = self.options.center_fixed.unwrap_or(main.center);
            let zoom = self.overview_zoom_for(main);
            debug!("propagating main view to overview at zoom {}", zoom);
            self.overview.set_view(center, zoom);

            let minimize = self.decide_minimized(main);
            self.set_display(minimize);
        } else {
            self.overview_state = SyncState::Idle;
        }
        self.aiming_rect = Some(main.bounds());
    }

    /// Overview drag started: remember where the aiming rectangle sat so
    /// the shadow can keep marking it
    pub fn on_overview_move_start(&mut self) {
        if self.options.center_fixed.is_some() {
            return;
        }
        self.drag_anchor = self.aiming_rect.clone();
    }

    /// Intermediate overview move: show the shadow at the pre-drag
    /// footprint
    pub fn on_overview_move(&mut self) {
        if self.options.center_fixed.is_some() || self.main_state != SyncState::Idle {
            return;
        }
        if let Some(anchor) = &self.drag_anchor {
            self.shadow_rect = Some(anchor.clone());
            self.shadow_visible = true;
        }
    }

    /// Overview move finished: drive the main map unless this was the echo
    /// of a main-map propagation
    pub fn on_overview_move_end(&mut self, main: &mut Viewport) {
        if self.main_state == SyncState::Idle {
            self.overview_state = SyncState::Propagating;
            let zoom = self.main_zoom_for(main);
            debug!("propagating overview view to main map at zoom {}", zoom);
            main.set_view(self.overview.center, zoom);
            self.shadow_visible = false;
        } else {
            self.main_state = SyncState::Idle;
        }
    }

    /// Zoom the overview should adopt for the given main view
    fn overview_zoom_for(&self, main: &Viewport) -> f64 {
        match self.options.zoom_level_fixed {
            Some(fixed) => fixed,
            None => main.zoom + self.options.zoom_level_offset,
        }
    }

    /// Zoom the main map should adopt after an overview drag. With a fixed
    /// overview zoom the main zoom is left alone; otherwise the offset is
    /// inverted, with a clamp that stops the pair zooming each other out
    /// once the overview has hit its minimum zoom.
    fn main_zoom_for(&mut self, main: &Viewport) -> f64 {
        if self.options.zoom_level_fixed.is_some() {
            return main.zoom;
        }

        let offset = self.options.zoom_level_offset;
        let current_diff = self.overview.zoom - main.zoom;
        let proposed = self.overview.zoom - offset;

        let result = if current_diff > offset && main.zoom < self.overview.min_zoom - offset {
            // The overview is pinned at its minimum zoom; keep the main
            // map where it is instead of walking it further out.
            let zoomed_in = self
                .last_overview_zoom
                .map(|last| self.overview.zoom > last)
                .unwrap_or(false);
            if zoomed_in {
                self.overview.set_zoom(self.overview.zoom - 1.0);
                main.zoom + 1.0
            } else {
                main.zoom
            }
        } else {
            proposed
        };

        self.last_overview_zoom = Some(self.overview.zoom);
        result
    }

    /// Collapse while the main map already shows at least everything the
    /// overview does; a manual toggle wins permanently
    fn decide_minimized(&self, main: &Viewport) -> bool {
        if self.user_toggled {
            return self.minimized;
        }
        if self.options.auto_toggle_display {
            return main.bounds().contains_bounds(&self.overview.bounds());
        }
        self.minimized
    }

    fn set_display(&mut self, minimize: bool) {
        self.minimized = minimize;
    }
}
