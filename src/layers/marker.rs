use crate::core::geo::{LatLng, LatLngBounds};
use crate::layers::base::{LayerKind, LayerProperties, LayerTrait};
use std::any::Any;

/// A point of interest pinned to a map coordinate, with an optional icon
/// name and popup text
#[derive(Debug, Clone)]
pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    icon: Option<String>,
    popup_text: Option<String>,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        Self {
            properties: LayerProperties::new(id.clone(), id, LayerKind::Marker),
            position,
            icon: None,
            popup_text: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup_text = Some(text.into());
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn popup_text(&self) -> Option<&str> {
        self.popup_text.as_deref()
    }
}

impl LayerTrait for Marker {
    fn id(&self) -> &str {
        &self.properties.id
    }

    fn name(&self) -> &str {
        &self.properties.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Marker
    }

    fn opacity(&self) -> f32 {
        self.properties.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.properties.opacity = opacity.clamp(0.0, 1.0);
    }

    fn is_visible(&self) -> bool {
        self.properties.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties.visible = visible;
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_builder() {
        let marker = Marker::new("spawn".to_string(), LatLng::new(-0.24526, 0.20057))
            .with_icon("flag")
            .with_popup("The Mines");

        assert_eq!(marker.id(), "spawn");
        assert_eq!(marker.icon(), Some("flag"));
        assert_eq!(marker.popup_text(), Some("The Mines"));
        assert_eq!(marker.kind(), LayerKind::Marker);
    }

    #[test]
    fn test_marker_point_bounds() {
        let position = LatLng::new(-0.3, 0.1);
        let marker = Marker::new("m".to_string(), position);
        let bounds = marker.bounds().unwrap();
        assert!(bounds.contains(&position));
    }

    #[test]
    fn test_opacity_clamped() {
        let mut marker = Marker::new("m".to_string(), LatLng::default());
        marker.set_opacity(1.8);
        assert_eq!(marker.opacity(), 1.0);
    }
}
