use foundation::math::LngLat;
use serde::Serialize;
use tracing::{debug, warn};

use crate::layer::LayerId;
use crate::style::StyleLayer;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("style is not loaded")]
    StyleNotLoaded,
    #[error("host rejected layer {id}: {reason}")]
    LayerRejected { id: String, reason: String },
    #[error("host call failed: {0}")]
    Call(String),
}

/// A layer handed to the host: either a plain style layer or a custom
/// layer drawn by this application.
#[derive(Debug, Clone)]
pub enum HostLayer<C> {
    Style(StyleLayer),
    Custom(C),
}

/// Camera animation request, serialized with the host's option names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyTo {
    pub center: LngLat,
    pub zoom: f64,
    pub speed: f64,
    pub curve: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub essential: bool,
}

/// The interactive map this application draws into.
pub trait MapHost {
    /// Host representation of a custom layer.
    type Custom;

    fn style_layers(&self) -> Result<Vec<StyleLayer>, HostError>;
    fn has_layer(&self, id: &LayerId) -> bool;
    fn add_layer(
        &mut self,
        layer: HostLayer<Self::Custom>,
        before: Option<&LayerId>,
    ) -> Result<(), HostError>;
    fn remove_layer(&mut self, id: &LayerId) -> Result<(), HostError>;
    fn set_style(&mut self, url: &str);
    fn bearing(&self) -> f64;
    fn fly_to(&mut self, options: &FlyTo);
    fn trigger_repaint(&self);

    /// Adds `layer`, first removing any existing layer with the same id.
    fn install_layer(
        &mut self,
        id: &LayerId,
        layer: HostLayer<Self::Custom>,
        before: Option<&LayerId>,
    ) -> Result<(), HostError> {
        if self.has_layer(id) {
            debug!(layer = %id, "replacing existing layer");
            if let Err(err) = self.remove_layer(id) {
                warn!(layer = %id, "failed to remove existing layer: {err}");
            }
        }
        self.add_layer(layer, before)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::style::LayerType;

    /// In-memory host keeping a flat layer list and a log of calls.
    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub layers: Vec<StyleLayer>,
        pub customs: Vec<String>,
        pub styles: Vec<String>,
        pub flights: Vec<FlyTo>,
        pub bearing: f64,
        pub repaints: std::cell::Cell<u32>,
    }

    impl FakeHost {
        pub fn with_layers(layers: Vec<StyleLayer>) -> Self {
            Self {
                layers,
                ..Self::default()
            }
        }

        pub fn ids(&self) -> Vec<&str> {
            self.layers.iter().map(|l| l.id.as_str()).collect()
        }

        pub fn count(&self, id: &str) -> usize {
            self.layers.iter().filter(|l| l.id == id).count()
        }
    }

    impl MapHost for FakeHost {
        type Custom = String;

        fn style_layers(&self) -> Result<Vec<StyleLayer>, HostError> {
            Ok(self.layers.clone())
        }

        fn has_layer(&self, id: &LayerId) -> bool {
            self.layers.iter().any(|l| l.id == id.as_str())
        }

        fn add_layer(
            &mut self,
            layer: HostLayer<String>,
            before: Option<&LayerId>,
        ) -> Result<(), HostError> {
            let layer = match layer {
                HostLayer::Style(l) => l,
                HostLayer::Custom(id) => {
                    self.customs.push(id.clone());
                    StyleLayer::new(id, LayerType::Custom)
                }
            };
            if self.layers.iter().any(|l| l.id == layer.id) {
                return Err(HostError::LayerRejected {
                    id: layer.id,
                    reason: "duplicate id".into(),
                });
            }
            let at = before
                .and_then(|b| self.layers.iter().position(|l| l.id == b.as_str()))
                .unwrap_or(self.layers.len());
            self.layers.insert(at, layer);
            Ok(())
        }

        fn remove_layer(&mut self, id: &LayerId) -> Result<(), HostError> {
            self.layers.retain(|l| l.id != id.as_str());
            Ok(())
        }

        fn set_style(&mut self, url: &str) {
            self.styles.push(url.to_string());
            self.layers.clear();
        }

        fn bearing(&self) -> f64 {
            self.bearing
        }

        fn fly_to(&mut self, options: &FlyTo) {
            self.bearing = options.bearing;
            self.flights.push(options.clone());
        }

        fn trigger_repaint(&self) {
            self.repaints.set(self.repaints.get() + 1);
        }
    }
}
