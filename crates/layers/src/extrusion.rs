use serde_json::{Map, Value, json};
use tracing::info;

use crate::host::{HostError, HostLayer, MapHost};
use crate::layer::{Layer, LayerId};
use crate::style::{LayerType, StyleLayer};

pub const BUILDINGS_LAYER_ID: &str = "3d-buildings";

/// Extruded building footprints from the style's `composite` vector source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionLayer {
    pub source: String,
    pub source_layer: String,
    pub min_zoom: f64,
    pub color: String,
    pub opacity: f64,
}

impl Default for ExtrusionLayer {
    fn default() -> Self {
        Self {
            source: "composite".to_string(),
            source_layer: "building".to_string(),
            min_zoom: 15.0,
            color: "#aaa".to_string(),
            opacity: 0.6,
        }
    }
}

impl Layer for ExtrusionLayer {
    fn id(&self) -> LayerId {
        LayerId::new(BUILDINGS_LAYER_ID)
    }
}

impl ExtrusionLayer {
    /// Style layer extruding features flagged `extrude`, from `min_height`
    /// up to `height`.
    pub fn style_layer(&self) -> StyleLayer {
        let mut paint = Map::new();
        paint.insert("fill-extrusion-color".into(), Value::from(self.color.as_str()));
        paint.insert("fill-extrusion-height".into(), json!(["get", "height"]));
        paint.insert("fill-extrusion-base".into(), json!(["get", "min_height"]));
        paint.insert("fill-extrusion-opacity".into(), Value::from(self.opacity));

        StyleLayer {
            source: Some(self.source.clone()),
            source_layer: Some(self.source_layer.clone()),
            filter: Some(json!(["==", "extrude", "true"])),
            minzoom: Some(self.min_zoom),
            paint,
            ..StyleLayer::new(BUILDINGS_LAYER_ID, LayerType::FillExtrusion)
        }
    }

    /// Adds the layer just below the first text label, or on top when the
    /// style has none. Any previous copy is replaced.
    pub fn install<H: MapHost>(&self, host: &mut H) -> Result<(), HostError> {
        let layers = host.style_layers()?;
        let before = first_label_layer(&layers).map(LayerId::new);
        host.install_layer(&self.id(), HostLayer::Style(self.style_layer()), before.as_ref())?;
        info!(before = ?before.as_ref().map(LayerId::as_str), "3d buildings added");
        Ok(())
    }
}

/// Id of the first symbol layer that draws text.
pub fn first_label_layer(layers: &[StyleLayer]) -> Option<&str> {
    layers
        .iter()
        .find(|l| l.is_text_label())
        .map(|l| l.id.as_str())
}
