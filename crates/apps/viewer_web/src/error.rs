use formats::config::ConfigError;
use formats::model::AssetError;
use layers::host::HostError;
use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("browser window or document unavailable")]
    NoDocument,
    #[error("viewer not started")]
    NotStarted,
    #[error("fetch {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("gpu: {0}")]
    Gpu(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<JsValue> for ViewerError {
    fn from(value: JsValue) -> Self {
        let msg = value
            .as_string()
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        ViewerError::Js(msg)
    }
}

impl From<ViewerError> for JsValue {
    fn from(err: ViewerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
