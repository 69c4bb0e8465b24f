use crate::core::geo::{LatLng, Point};
use crate::prelude::HashMap;
use std::collections::VecDeque;

/// Events emitted by the map engine during user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center, zoom, or size)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Mouse/touch move over the map
    MouseMove { lat_lng: LatLng, pixel: Point },
    /// Mouse left the map container
    MouseOut,
    /// Zoom ended
    ZoomEnd { zoom: f64 },
    /// Pan started
    MoveStart { center: LatLng },
    /// Pan in progress
    Move { center: LatLng },
    /// Pan ended
    MoveEnd { center: LatLng },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
}

impl MapEvent {
    /// Event type name used for listener registration
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::MouseMove { .. } => "mousemove",
            MapEvent::MouseOut => "mouseout",
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::MoveStart { .. } => "movestart",
            MapEvent::Move { .. } => "move",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
        }
    }
}

type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Listener registry plus a queue of pending events, processed explicitly
/// by the owner once per interaction cycle
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<String, Vec<EventCallback>>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events, invoking matching listeners
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Clear all events from the queue
    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}
