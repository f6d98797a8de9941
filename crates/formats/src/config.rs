use foundation::math::LngLat;
use scene::options::{DEFAULT_ORIGIN, OverlayOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid viewer config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid viewer config: {0}")]
    Invalid(String),
}

/// Everything the viewer reads at startup. Every field has a default so a
/// partial (or absent) config is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map: MapConfig,
    pub overlay: OverlayOptions,
    pub transition: TransitionConfig,
    pub dom: DomConfig,
}

impl ViewerConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.overlay.mesh_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "overlay.meshScale must be a positive number, got {scale}"
            )));
        }
        if self.overlay.model_url.is_empty() {
            return Err(ConfigError::Invalid("overlay.modelUrl is empty".into()));
        }
        if self.overlay.building_id.as_str().is_empty() {
            return Err(ConfigError::Invalid("overlay.buildingId is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    pub access_token: String,
    pub container: String,
    pub style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub antialias: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            container: "map".to_string(),
            style: "mapbox://styles/mapbox/satellite-streets-v12".to_string(),
            center: DEFAULT_ORIGIN,
            zoom: 16.0,
            pitch: 0.0,
            bearing: 20.0,
            antialias: true,
        }
    }
}

/// Double-click fly and style swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    pub style: String,
    pub zoom: f64,
    pub speed: f64,
    pub curve: f64,
    pub pitch: f64,
    pub bearing_step: f64,
    pub loader_delay_ms: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/mapbox/standard".to_string(),
            zoom: 18.0,
            speed: 0.6,
            curve: 1.8,
            pitch: 70.0,
            bearing_step: 20.0,
            loader_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomConfig {
    pub info_panel_id: String,
    pub loader_id: String,
    pub overlay_canvas_id: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            info_panel_id: "info".to_string(),
            loader_id: "loader".to_string(),
            overlay_canvas_id: "model-canvas".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewerConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_the_default_config() {
        let config = ViewerConfig::from_json("{}").expect("parse");
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.map.zoom, 16.0);
        assert_eq!(config.transition.loader_delay_ms, 1500);
        assert_eq!(config.dom.info_panel_id, "info");
    }

    #[test]
    fn nested_fields_override_individually() {
        let config = ViewerConfig::from_json(
            r#"{
                "map": { "accessToken": "pk.test", "zoom": 14 },
                "overlay": { "modelUrl": "/models/a.glb", "origin": [10.0, 20.0] },
                "transition": { "bearingStep": 45 }
            }"#,
        )
        .expect("parse");

        assert_eq!(config.map.access_token, "pk.test");
        assert_eq!(config.map.zoom, 14.0);
        assert_eq!(config.map.style, "mapbox://styles/mapbox/satellite-streets-v12");
        assert_eq!(config.overlay.model_url, "/models/a.glb");
        assert_eq!(config.overlay.origin.lat, 20.0);
        assert_eq!(config.transition.bearing_step, 45.0);
        assert_eq!(config.transition.zoom, 18.0);
    }

    #[test]
    fn rejects_non_positive_scale() {
        let err = ViewerConfig::from_json(r#"{"overlay":{"meshScale":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ViewerConfig::from_json("{ map: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn serializes_camel_case_keys() {
        let s = ViewerConfig::default().to_json_pretty().expect("json");
        assert!(s.contains("\"accessToken\""));
        assert!(s.contains("\"loaderDelayMs\": 1500"));
        assert!(s.contains("\"buildingId\": \"ec3\""));
    }
}
