use console_error_panic_hook::set_once;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::config::ViewerConfig;
use foundation::math::LngLat;
use layers::extrusion::ExtrusionLayer;
use layers::host::{HostLayer, MapHost};
use layers::transition::StyleTransitionController;
use scene::ScaleOutcome;

mod dom;
mod error;
mod gpu;
mod host;
mod mapbox;
mod overlay_layer;

use dom::{DomLoader, InfoPanel, overlay_canvas, sync_canvas_size};
use error::ViewerError;
use host::MapboxHost;
use mapbox::{Map, MapMouseEvent};
use overlay_layer::{OverlayHandle, SharedRenderer};

type Controller = StyleTransitionController<MapboxHost, DomLoader>;
type MapEvent = Closure<dyn FnMut(JsValue)>;
type EventHandler = dyn FnMut(&mut Controller, &mut MapboxHost, JsValue);

struct App {
    map: Map,
    overlay: Rc<RefCell<Option<OverlayHandle>>>,
    /// Last multiplier requested from the page; carried across re-attaches.
    scale: Rc<Cell<Option<f64>>>,
    _controller: Rc<RefCell<Controller>>,
    _events: Vec<MapEvent>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    // A second init (hot reload) keeps the first logger.
    let _ = console_log::init_with_level(log::Level::Info);
    Ok(())
}

/// Default configuration as pretty JSON, for pages that want a template.
#[wasm_bindgen]
pub fn default_config() -> Result<String, JsValue> {
    ViewerConfig::default()
        .to_json_pretty()
        .map_err(|e| JsValue::from(ViewerError::from(e)))
}

/// Creates the map and wires the buildings layer, the model overlay and the
/// double-click transition. `config_json` overrides any subset of the
/// defaults.
#[wasm_bindgen]
pub fn start_viewer(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => ViewerConfig::from_json(json),
        _ => Ok(ViewerConfig::default()),
    }
    .map_err(ViewerError::from)?;
    if APP.with(|slot| slot.borrow().is_some()) {
        return Err(JsValue::from_str("viewer already started"));
    }
    let app = build_app(config)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    Ok(())
}

/// Sets the model's visual size multiplier. Applied when the model is
/// loaded, otherwise kept until it is.
#[wasm_bindgen]
pub fn set_model_scale(multiplier: f64) -> Result<(), JsValue> {
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(JsValue::from_str("scale must be a positive number"));
    }
    APP.with(|slot| {
        let slot = slot.borrow();
        let app = slot.as_ref().ok_or(ViewerError::NotStarted)?;
        app.scale.set(Some(multiplier));
        let overlay = app.overlay.borrow();
        if let Some(handle) = overlay.as_ref()
            && handle.set_scale(multiplier)? == ScaleOutcome::Applied
        {
            app.map.trigger_repaint();
        }
        Ok::<(), ViewerError>(())
    })?;
    Ok(())
}

fn map_options(config: &ViewerConfig) -> Result<JsValue, ViewerError> {
    let m = &config.map;
    let json = serde_json::json!({
        "container": m.container,
        "style": m.style,
        "center": m.center,
        "zoom": m.zoom,
        "pitch": m.pitch,
        "bearing": m.bearing,
        "antialias": m.antialias,
    });
    Ok(js_sys::JSON::parse(&json.to_string())?)
}

fn build_app(config: ViewerConfig) -> Result<App, ViewerError> {
    mapbox::set_access_token(&config.map.access_token)?;
    let map = Map::new(&map_options(&config)?)?;
    map.double_click_zoom().disable();

    let container = map.get_canvas_container();
    let canvas = overlay_canvas(&container, &config.dom.overlay_canvas_id)?;
    sync_canvas_size(&map.get_canvas(), &canvas);

    let renderer: SharedRenderer = Rc::new(RefCell::new(None));
    {
        let renderer = Rc::clone(&renderer);
        let canvas = canvas.clone();
        let map = map.clone();
        spawn_local(async move {
            match gpu::init_renderer(canvas).await {
                Ok(r) => {
                    *renderer.borrow_mut() = Some(r);
                    map.trigger_repaint();
                }
                Err(err) => tracing::error!("model renderer unavailable: {err}"),
            }
        });
    }

    let overlay: Rc<RefCell<Option<OverlayHandle>>> = Rc::new(RefCell::new(None));
    let scale: Rc<Cell<Option<f64>>> = Rc::new(Cell::new(None));
    // Mapbox can still call into a layer replaced by a style swap.
    let retired: Rc<RefCell<Vec<OverlayHandle>>> = Rc::new(RefCell::new(Vec::new()));

    let attach_overlay = {
        let overlay = Rc::clone(&overlay);
        let scale = Rc::clone(&scale);
        let options = config.overlay.clone();
        let panel = InfoPanel::new(config.dom.info_panel_id.clone());
        move |host: &mut MapboxHost| {
            let handle = match OverlayHandle::create(
                host.map().clone(),
                options.clone(),
                Rc::clone(&renderer),
                panel.clone(),
                canvas.clone(),
            ) {
                Ok(h) => h,
                Err(err) => {
                    tracing::error!("model overlay: {err}");
                    return;
                }
            };
            if let Some(multiplier) = scale.get()
                && let Err(err) = handle.set_scale(multiplier)
            {
                tracing::warn!("model overlay scale: {err}");
            }
            let id = handle.layer_id();
            if let Err(err) =
                host.install_layer(&id, HostLayer::Custom(handle.layer_object()), None)
            {
                tracing::error!("model overlay: {err}");
                return;
            }
            if let Some(old) = overlay.borrow_mut().replace(handle) {
                retired.borrow_mut().push(old);
            }
        }
    };

    let extrusion = ExtrusionLayer::default();
    let controller: Rc<RefCell<Controller>> = Rc::new(RefCell::new(
        StyleTransitionController::new(
            config.transition.clone(),
            DomLoader::new(config.dom.loader_id.clone()),
        )
        .with_hook(move |host: &mut MapboxHost| {
            if let Err(err) = extrusion.install(host) {
                tracing::error!("3d buildings: {err}");
            }
        })
        .with_hook(attach_overlay),
    ));

    let mut events = Vec::new();
    let mut on = |event: &str, mut handler: Box<EventHandler>| {
        let controller = Rc::clone(&controller);
        let mut host = MapboxHost::new(map.clone());
        let cb: MapEvent = Closure::wrap(Box::new(move |evt: JsValue| {
            match controller.try_borrow_mut() {
                Ok(mut ctl) => handler(&mut *ctl, &mut host, evt),
                Err(_) => tracing::debug!("transition busy, event dropped"),
            }
        }) as Box<dyn FnMut(JsValue)>);
        map.on(event, cb.as_ref().unchecked_ref());
        events.push(cb);
    };

    on(
        "load",
        Box::new(|ctl: &mut Controller, host: &mut MapboxHost, _: JsValue| {
            tracing::info!("map loaded");
            ctl.attach_all(host);
        }),
    );
    on(
        "dblclick",
        Box::new(|ctl: &mut Controller, host: &mut MapboxHost, evt: JsValue| {
            let at = evt.unchecked_into::<MapMouseEvent>().lng_lat();
            ctl.on_double_click(host, LngLat::new(at.lng(), at.lat()));
        }),
    );
    on(
        "moveend",
        Box::new(|ctl: &mut Controller, host: &mut MapboxHost, _: JsValue| {
            ctl.on_move_end(host);
        }),
    );
    on(
        "styledata",
        Box::new(|ctl: &mut Controller, host: &mut MapboxHost, _: JsValue| {
            if ctl.on_style_data(host) {
                host.trigger_repaint();
            }
        }),
    );

    Ok(App {
        map,
        overlay,
        scale,
        _controller: controller,
        _events: events,
    })
}
