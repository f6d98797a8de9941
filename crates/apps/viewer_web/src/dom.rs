use std::time::Duration;

use gloo_timers::callback::Timeout;
use layers::transition::LoadingIndicator;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

use crate::error::ViewerError;

pub const INFO_HTML: &str = r#"
    <div class="animate__animated animate__fadeInUp"> <h1> You Clicked a building </h1></div>
"#;

pub fn document() -> Result<Document, ViewerError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(ViewerError::NoDocument)
}

pub fn element_by_id(id: &str) -> Result<HtmlElement, ViewerError> {
    document()?
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| ViewerError::MissingElement(id.to_string()))
}

/// The "you clicked a building" panel.
#[derive(Debug, Clone)]
pub struct InfoPanel {
    id: String,
}

impl InfoPanel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn show(&self) -> Result<(), ViewerError> {
        let el = element_by_id(&self.id)?;
        el.set_inner_html(INFO_HTML);
        el.style().set_property("display", "block")?;
        Ok(())
    }

    pub fn hide(&self) -> Result<(), ViewerError> {
        element_by_id(&self.id)?
            .style()
            .set_property("display", "none")?;
        Ok(())
    }
}

/// Loader element toggled through its `visible`/`hidden` classes.
#[derive(Debug, Clone)]
pub struct DomLoader {
    id: String,
}

impl DomLoader {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    fn set_visible(id: &str, visible: bool) -> Result<(), ViewerError> {
        let classes = element_by_id(id)?.class_list();
        let (on, off) = if visible {
            ("visible", "hidden")
        } else {
            ("hidden", "visible")
        };
        classes.remove_1(off)?;
        classes.add_1(on)?;
        Ok(())
    }
}

impl LoadingIndicator for DomLoader {
    fn show(&mut self) {
        if let Err(err) = Self::set_visible(&self.id, true) {
            tracing::warn!("loader: {err}");
        }
    }

    fn hide_after(&mut self, delay: Duration) {
        let id = self.id.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            if let Err(err) = Self::set_visible(&id, false) {
                tracing::warn!("loader: {err}");
            }
        })
        .forget();
    }
}

/// Transparent canvas stacked over the map canvas for the model pass.
///
/// Reuses an existing element with `id`; otherwise creates one inside the
/// map's canvas container. Pointer events fall through to the map.
pub fn overlay_canvas(container: &HtmlElement, id: &str) -> Result<HtmlCanvasElement, ViewerError> {
    let doc = document()?;
    if let Some(existing) = doc.get_element_by_id(id) {
        return existing
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ViewerError::MissingElement(id.to_string()));
    }
    let canvas = doc
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ViewerError::Js("created element is not a canvas".into()))?;
    canvas.set_id(id);
    let style = canvas.style();
    style.set_property("position", "absolute")?;
    style.set_property("top", "0")?;
    style.set_property("left", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("pointer-events", "none")?;
    container.append_child(&canvas)?;
    Ok(canvas)
}

/// Matches the overlay's drawing buffer to the map canvas. Returns the new
/// size when it changed.
pub fn sync_canvas_size(map_canvas: &HtmlCanvasElement, overlay: &HtmlCanvasElement) -> Option<(u32, u32)> {
    let (w, h) = (map_canvas.width(), map_canvas.height());
    if overlay.width() == w && overlay.height() == h {
        return None;
    }
    overlay.set_width(w);
    overlay.set_height(h);
    Some((w, h))
}
