use crate::{
    core::{
        events::{EventManager, MapEvent},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::base::LayerTrait,
    Result,
};

/// Map behaviour switches, a subset of the rendering engine's options that
/// matters to the viewer (the minimap constructs its overview map with
/// dragging/zooming disabled when its center or zoom is fixed)
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub dragging: bool,
    pub scroll_wheel_zoom: bool,
    pub double_click_zoom: bool,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub zoom_snap: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dragging: true,
            scroll_wheel_zoom: true,
            double_click_zoom: true,
            min_zoom: None,
            max_zoom: None,
            zoom_snap: 1.0,
        }
    }
}

/// Slim map engine: a viewport, an ordered layer list and an event queue.
///
/// Pixel drawing is delegated to whatever front end hosts the map; this
/// type models the state the tile sources and controls interact with.
pub struct Map {
    pub viewport: Viewport,
    layers: Vec<Box<dyn LayerTrait>>,
    event_manager: EventManager,
    options: MapOptions,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(viewport, MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            viewport,
            layers: Vec::new(),
            event_manager: EventManager::new(),
            options,
        };

        if let (Some(min), Some(max)) = (map.options.min_zoom, map.options.max_zoom) {
            map.viewport.set_zoom_limits(min, max);
        }

        map
    }

    /// Sets center and zoom, emitting the full move event cycle the way an
    /// interactive engine would for a programmatic view change
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.event_manager
            .emit(MapEvent::MoveStart { center: old_center });
        self.viewport.set_view(center, zoom);
        self.event_manager.emit(MapEvent::Move {
            center: self.viewport.center,
        });
        self.event_manager.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });

        if self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ZoomEnd {
                zoom: self.viewport.zoom,
            });
        }
        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }

        Ok(())
    }

    /// Pans the viewport by a pixel delta, emitting move events
    pub fn pan(&mut self, delta: Point) -> Result<()> {
        let old_center = self.viewport.center;

        self.event_manager
            .emit(MapEvent::MoveStart { center: old_center });
        self.viewport.pan(delta);
        self.event_manager.emit(MapEvent::Move {
            center: self.viewport.center,
        });
        self.event_manager.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });

        Ok(())
    }

    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) -> Result<()> {
        let old_zoom = self.viewport.zoom;
        self.viewport.zoom_to(zoom, focus_point);

        if self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ZoomEnd {
                zoom: self.viewport.zoom,
            });
        }

        Ok(())
    }

    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) -> Result<()> {
        self.viewport.fit_bounds(bounds, padding);
        self.event_manager.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });
        Ok(())
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.iter().any(|l| l.id() == layer_id) {
            return Err(crate::MapError::Layer(format!(
                "layer '{}' already added",
                layer_id
            ))
            .into());
        }
        self.layers.push(layer);
        self.event_manager.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        let before = self.layers.len();
        self.layers.retain(|l| l.id() != layer_id);
        if self.layers.len() != before {
            self.event_manager.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers
            .iter()
            .find(|l| l.id() == layer_id)
            .map(|l| l.as_ref())
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers
            .iter_mut()
            .find(|l| l.id() == layer_id)
            .map(|l| f(l.as_mut()))
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id().to_string()).collect()
    }

    /// Register an event listener by event type name
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    /// Process queued events, invoking listeners; returns the drained events
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }
}
