//! Bindings to the subset of Mapbox GL JS the viewer drives.
//!
//! `mapboxgl` is expected as a page global (loaded from the CDN script tag).

use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Map", catch)]
    pub fn new(options: &JsValue) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getStyle)]
    pub fn get_style(this: &Map) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = getLayer)]
    pub fn get_layer(this: &Map, id: &str) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    pub fn add_layer(this: &Map, layer: &JsValue, before_id: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeLayer)]
    pub fn remove_layer(this: &Map, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setStyle)]
    pub fn set_style(this: &Map, style: &str);

    #[wasm_bindgen(method, js_name = getBearing)]
    pub fn get_bearing(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &Map, options: &JsValue);

    #[wasm_bindgen(method, js_name = triggerRepaint)]
    pub fn trigger_repaint(this: &Map);

    #[wasm_bindgen(method, js_name = getCanvas)]
    pub fn get_canvas(this: &Map) -> web_sys::HtmlCanvasElement;

    #[wasm_bindgen(method, js_name = getCanvasContainer)]
    pub fn get_canvas_container(this: &Map) -> web_sys::HtmlElement;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, listener: &Function);

    #[wasm_bindgen(method, getter, js_name = doubleClickZoom)]
    pub fn double_click_zoom(this: &Map) -> HandlerToggle;

    pub type HandlerToggle;

    #[wasm_bindgen(method)]
    pub fn disable(this: &HandlerToggle);

    /// Event passed to mouse listeners registered with `Map::on`.
    pub type MapMouseEvent;

    #[wasm_bindgen(method, getter, js_name = lngLat)]
    pub fn lng_lat(this: &MapMouseEvent) -> JsLngLat;

    #[wasm_bindgen(js_name = LngLat)]
    pub type JsLngLat;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &JsLngLat) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &JsLngLat) -> f64;
}

/// Sets `mapboxgl.accessToken`. Empty tokens are left alone so a token set
/// by the page itself survives.
pub fn set_access_token(token: &str) -> Result<(), JsValue> {
    if token.is_empty() {
        return Ok(());
    }
    let ns = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl"))?;
    if ns.is_undefined() {
        return Err(JsValue::from_str("mapboxgl is not loaded"));
    }
    js_sys::Reflect::set(&ns, &JsValue::from_str("accessToken"), &JsValue::from_str(token))?;
    Ok(())
}
