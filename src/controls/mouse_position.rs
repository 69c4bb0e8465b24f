use crate::controls::ControlPosition;
use crate::core::events::MapEvent;
use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MousePositionOptions {
    pub position: ControlPosition,
    pub separator: String,
    /// Decimal places coordinates are rounded to
    pub num_digits: u32,
    /// Shown while the pointer is outside the map
    pub empty_string: String,
    /// Emit longitude before latitude
    pub lng_first: bool,
    pub prefix: String,
    /// Replaces the default rounding for the latitude component
    #[serde(skip)]
    pub lat_formatter: Option<fn(f64) -> String>,
    /// Replaces the default rounding for the longitude component
    #[serde(skip)]
    pub lng_formatter: Option<fn(f64) -> String>,
}

impl Default for MousePositionOptions {
    fn default() -> Self {
        Self {
            position: ControlPosition::BottomLeft,
            separator: " : ".to_string(),
            num_digits: 5,
            empty_string: "Unavailable".to_string(),
            lng_first: false,
            prefix: String::new(),
            lat_formatter: None,
            lng_formatter: None,
        }
    }
}

/// Readout control showing the map coordinate under the pointer
#[derive(Debug, Clone)]
pub struct MousePosition {
    options: MousePositionOptions,
    text: String,
}

impl MousePosition {
    pub fn new(options: MousePositionOptions) -> Self {
        let text = options.empty_string.clone();
        Self { options, text }
    }

    /// Feed a map event through the control; mouse moves update the
    /// readout, leaving the map resets it
    pub fn handle_event(&mut self, event: &MapEvent) {
        match event {
            MapEvent::MouseMove { lat_lng, .. } => {
                self.text = self.format(Some(*lat_lng));
            }
            MapEvent::MouseOut => {
                self.text = self.options.empty_string.clone();
            }
            _ => {}
        }
    }

    /// Current readout text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Formats a coordinate the way the readout displays it
    pub fn format(&self, position: Option<LatLng>) -> String {
        let Some(position) = position else {
            return self.options.empty_string.clone();
        };

        let lat = match self.options.lat_formatter {
            Some(formatter) => formatter(position.lat),
            None => round_to(position.lat, self.options.num_digits).to_string(),
        };
        let lng = match self.options.lng_formatter {
            Some(formatter) => formatter(position.lng),
            None => round_to(position.lng, self.options.num_digits).to_string(),
        };
        let (first, second) = if self.options.lng_first {
            (lng, lat)
        } else {
            (lat, lng)
        };

        format!(
            "{}{}{}{}",
            self.options.prefix, first, self.options.separator, second
        )
    }

    pub fn options(&self) -> &MousePositionOptions {
        &self.options
    }
}

impl Default for MousePosition {
    fn default() -> Self {
        Self::new(MousePositionOptions::default())
    }
}

/// Round to a fixed number of decimals; formatting the result with `{}`
/// then drops trailing zeros, matching the readout's display rules
fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10_f64.powi(digits as i32);
    (value * factor).round() / factor
}
