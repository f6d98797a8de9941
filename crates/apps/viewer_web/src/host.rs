use layers::host::{FlyTo, HostError, HostLayer, MapHost};
use layers::layer::LayerId;
use layers::style::{StyleDocument, StyleLayer};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::mapbox::Map;

/// `MapHost` over a live `mapboxgl.Map`.
#[derive(Debug, Clone)]
pub struct MapboxHost {
    map: Map,
}

impl MapboxHost {
    pub fn new(map: Map) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }
}

fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Serde value to a plain JS object.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, HostError> {
    let json = serde_json::to_string(value).map_err(|e| HostError::Call(e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|e| HostError::Call(js_error(&e)))
}

impl MapHost for MapboxHost {
    type Custom = js_sys::Object;

    fn style_layers(&self) -> Result<Vec<StyleLayer>, HostError> {
        let style = self.map.get_style().map_err(|_| HostError::StyleNotLoaded)?;
        if style.is_undefined() || style.is_null() {
            return Err(HostError::StyleNotLoaded);
        }
        let json = js_sys::JSON::stringify(&style)
            .map_err(|e| HostError::Call(js_error(&e)))?
            .as_string()
            .ok_or(HostError::StyleNotLoaded)?;
        let doc: StyleDocument =
            serde_json::from_str(&json).map_err(|e| HostError::Call(e.to_string()))?;
        Ok(doc.layers)
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        let layer = self.map.get_layer(id.as_str());
        !(layer.is_undefined() || layer.is_null())
    }

    fn add_layer(
        &mut self,
        layer: HostLayer<js_sys::Object>,
        before: Option<&LayerId>,
    ) -> Result<(), HostError> {
        let (id, value) = match layer {
            HostLayer::Style(l) => (l.id.clone(), to_js(&l)?),
            HostLayer::Custom(obj) => {
                let id = js_sys::Reflect::get(&obj, &JsValue::from_str("id"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default();
                (id, obj.into())
            }
        };
        let before = before
            .map(|b| JsValue::from_str(b.as_str()))
            .unwrap_or(JsValue::UNDEFINED);
        self.map
            .add_layer(&value, &before)
            .map_err(|e| HostError::LayerRejected {
                id,
                reason: js_error(&e),
            })
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), HostError> {
        self.map
            .remove_layer(id.as_str())
            .map_err(|e| HostError::Call(js_error(&e)))
    }

    fn set_style(&mut self, url: &str) {
        self.map.set_style(url);
    }

    fn bearing(&self) -> f64 {
        self.map.get_bearing()
    }

    fn fly_to(&mut self, options: &FlyTo) {
        match to_js(options) {
            Ok(v) => self.map.fly_to(&v),
            Err(err) => tracing::error!("flyTo options: {err}"),
        }
    }

    fn trigger_repaint(&self) {
        self.map.trigger_repaint();
    }
}
