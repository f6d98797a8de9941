use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::math::Mat4;
use formats::model::parts_from_glb;
use gloo_net::http::Request;
use layers::layer::LayerId;
use scene::input::PointerSample;
use scene::options::OverlayOptions;
use scene::picking::Viewport;
use scene::{ModelOverlay, PanelUpdate, ScaleOutcome};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, MouseEvent};

use crate::dom::{InfoPanel, sync_canvas_size};
use crate::error::ViewerError;
use crate::gpu::ModelRenderer;
use crate::mapbox::Map;

/// Renderer shared by every overlay instance. Filled once GPU init finishes.
pub type SharedRenderer = Rc<RefCell<Option<ModelRenderer>>>;

type LayerCallback = Closure<dyn FnMut(JsValue, JsValue)>;
type PointerListener = Closure<dyn FnMut(MouseEvent)>;

#[derive(Default)]
struct PointerListeners {
    on_move: Option<PointerListener>,
    on_click: Option<PointerListener>,
}

impl PointerListeners {
    fn attach(&mut self, canvas: &HtmlCanvasElement, overlay: &Rc<RefCell<ModelOverlay>>) {
        self.detach(canvas);

        let sample = {
            let canvas = canvas.clone();
            move |evt: &MouseEvent| {
                let rect = canvas.get_bounding_client_rect();
                PointerSample::from_client(
                    f64::from(evt.client_x()),
                    f64::from(evt.client_y()),
                    rect.left(),
                    rect.top(),
                    rect.width(),
                    rect.height(),
                )
            }
        };

        let on_move = {
            let overlay = Rc::clone(overlay);
            let sample = sample.clone();
            Closure::wrap(Box::new(move |evt: MouseEvent| {
                if let Ok(mut o) = overlay.try_borrow_mut() {
                    o.pointer_moved(sample(&evt));
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let on_click = {
            let overlay = Rc::clone(overlay);
            Closure::wrap(Box::new(move |evt: MouseEvent| {
                if let Ok(mut o) = overlay.try_borrow_mut() {
                    o.pointer_clicked(sample(&evt));
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        for (event, cb) in [("mousemove", &on_move), ("click", &on_click)] {
            if let Err(err) =
                canvas.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
            {
                tracing::warn!("addEventListener({event}): {}", ViewerError::from(err));
            }
        }
        self.on_move = Some(on_move);
        self.on_click = Some(on_click);
    }

    fn detach(&mut self, canvas: &HtmlCanvasElement) {
        for (event, cb) in [("mousemove", self.on_move.take()), ("click", self.on_click.take())] {
            if let Some(cb) = cb {
                let _ = canvas
                    .remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
            }
        }
    }
}

/// Shows or hides the info panel for a processed click.
fn apply_panel(panel: &InfoPanel, update: PanelUpdate) {
    let res = match update {
        PanelUpdate::Show => panel.show(),
        PanelUpdate::Hide => panel.hide(),
    };
    if let Err(err) = res {
        tracing::warn!("info panel: {err}");
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ViewerError> {
    let fetch_err = |reason: String| ViewerError::Fetch {
        url: url.to_string(),
        reason,
    };
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    if !resp.ok() {
        return Err(fetch_err(format!("HTTP {}", resp.status())));
    }
    resp.binary().await.map_err(|e| fetch_err(e.to_string()))
}

/// A [`ModelOverlay`] bound to a Mapbox custom layer.
///
/// Owns the JS layer object and the callbacks it references; dropping the
/// handle while the layer is still on the map leaves dangling callbacks.
pub struct OverlayHandle {
    overlay: Rc<RefCell<ModelOverlay>>,
    layer: js_sys::Object,
    _callbacks: [LayerCallback; 3],
}

impl OverlayHandle {
    /// Builds the custom layer and starts fetching the model.
    pub fn create(
        map: Map,
        options: OverlayOptions,
        renderer: SharedRenderer,
        panel: InfoPanel,
        overlay_canvas: HtmlCanvasElement,
    ) -> Result<Self, ViewerError> {
        let model_url = options.model_url.clone();
        let overlay = Rc::new(RefCell::new(ModelOverlay::new(options)));
        let layer_id = overlay.borrow().layer_id().to_string();
        let listeners = Rc::new(RefCell::new(PointerListeners::default()));
        let uploaded = Rc::new(Cell::new(false));

        let on_add: LayerCallback = {
            let overlay = Rc::clone(&overlay);
            let listeners = Rc::clone(&listeners);
            let map = map.clone();
            Closure::wrap(Box::new(move |_map: JsValue, _gl: JsValue| {
                if let Ok(mut l) = listeners.try_borrow_mut() {
                    l.attach(&map.get_canvas(), &overlay);
                }
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };

        let on_remove: LayerCallback = {
            let listeners = Rc::clone(&listeners);
            let map = map.clone();
            Closure::wrap(Box::new(move |_map: JsValue, _gl: JsValue| {
                if let Ok(mut l) = listeners.try_borrow_mut() {
                    l.detach(&map.get_canvas());
                }
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };

        let render: LayerCallback = {
            let overlay = Rc::clone(&overlay);
            let map = map.clone();
            Closure::wrap(Box::new(move |_gl: JsValue, matrix: JsValue| {
                let values = js_sys::Float64Array::new(&matrix).to_vec();
                let Some(host_matrix) = Mat4::from_cols_slice(&values) else {
                    tracing::warn!(len = values.len(), "unexpected host matrix");
                    return;
                };
                let canvas = map.get_canvas();
                let rect = canvas.get_bounding_client_rect();
                let viewport = Viewport::new(rect.width(), rect.height());

                let Ok(mut o) = overlay.try_borrow_mut() else {
                    return;
                };
                let frame = o.render_frame(&host_matrix, viewport);
                if let Some(update) = frame.panel {
                    apply_panel(&panel, update);
                }

                if let Ok(mut slot) = renderer.try_borrow_mut()
                    && let Some(r) = slot.as_mut()
                {
                    if let Some((w, h)) = sync_canvas_size(&canvas, &overlay_canvas) {
                        r.resize(w, h);
                    }
                    if !uploaded.get()
                        && let Some(model) = o.model()
                    {
                        r.upload_parts(model.parts());
                        uploaded.set(true);
                    }
                    if let Err(err) = r.render(&frame.view_proj, &o.draw_list()) {
                        tracing::warn!("overlay draw: {err}");
                    }
                }
                drop(o);
                map.trigger_repaint();
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };

        let layer = js_sys::Object::new();
        let set = |key: &str, value: &JsValue| {
            js_sys::Reflect::set(&layer, &JsValue::from_str(key), value).map(|_| ())
        };
        set("id", &JsValue::from_str(&layer_id))?;
        set("type", &JsValue::from_str("custom"))?;
        set("renderingMode", &JsValue::from_str("3d"))?;
        set("onAdd", on_add.as_ref())?;
        set("render", render.as_ref())?;
        set("onRemove", on_remove.as_ref())?;

        {
            let overlay = Rc::clone(&overlay);
            spawn_local(async move {
                let loaded = match fetch_bytes(&model_url).await {
                    Ok(bytes) => parts_from_glb(&bytes).map_err(ViewerError::from),
                    Err(err) => Err(err),
                };
                match overlay.try_borrow_mut() {
                    Ok(mut o) => match loaded {
                        Ok(parts) => o.on_model_loaded(parts),
                        Err(err) => o.on_model_failed(&err),
                    },
                    Err(_) => tracing::error!("overlay busy when model arrived"),
                }
                map.trigger_repaint();
            });
        }

        Ok(Self {
            overlay,
            layer,
            _callbacks: [on_add, render, on_remove],
        })
    }

    pub fn layer_id(&self) -> LayerId {
        LayerId::new(self.overlay.borrow().layer_id())
    }

    /// The JS object to pass to `map.addLayer`.
    pub fn layer_object(&self) -> js_sys::Object {
        self.layer.clone()
    }

    pub fn set_scale(&self, multiplier: f64) -> Result<ScaleOutcome, ViewerError> {
        let mut overlay = self
            .overlay
            .try_borrow_mut()
            .map_err(|_| ViewerError::Js("overlay is busy".into()))?;
        Ok(overlay.set_scale(multiplier))
    }
}
