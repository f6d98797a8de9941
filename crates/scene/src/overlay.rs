use std::fmt::Display;

use foundation::color::Rgb;
use foundation::math::{Mat4, MercatorCoordinate};
use tracing::{debug, error, info, warn};

use crate::camera::{Camera, model_transform};
use crate::components::{BuildingId, Part, PartId};
use crate::highlight::Highlight;
use crate::input::{PendingInput, PointerSample};
use crate::model::Model;
use crate::options::OverlayOptions;
use crate::picking::{Viewport, pick_screen};

/// Host layer id of the overlay for a building.
pub fn model_layer_id(building_id: &BuildingId) -> String {
    format!("3d-ec3-{building_id}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    /// Asset still in flight; the last requested multiplier waits here.
    Loading { pending_scale: Option<f64> },
    Ready(Model),
    Failed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Stored until the model arrives.
    Deferred,
    /// Applied to the loaded model; the host should repaint.
    Applied,
    /// The load failed; there is nothing to scale.
    Ignored,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    Show,
    Hide,
}

/// What a frame produced for the caller to act on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameOutput {
    /// Scene to clip space for this frame.
    pub view_proj: Mat4,
    pub panel: Option<PanelUpdate>,
    pub highlight_changed: bool,
}

/// Per-part draw data.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub part: PartId,
    pub world: Mat4,
    pub base_color: [f32; 4],
    pub emissive: Rgb,
}

/// 3D model anchored at a geographic coordinate, drawn in lockstep with the
/// host map.
///
/// Pointer events only record input; picking runs inside [`render_frame`]
/// with that frame's camera.
///
/// [`render_frame`]: ModelOverlay::render_frame
#[derive(Debug, Clone)]
pub struct ModelOverlay {
    options: OverlayOptions,
    layer_id: String,
    anchor: MercatorCoordinate,
    mercator_unit: f64,
    camera: Camera,
    picking_camera: Camera,
    input: PendingInput,
    highlight: Highlight,
    state: ModelState,
}

impl ModelOverlay {
    pub fn new(options: OverlayOptions) -> Self {
        let anchor = MercatorCoordinate::from_lng_lat(options.origin, options.altitude);
        let mercator_unit = anchor.meter_in_mercator_units();
        Self {
            layer_id: model_layer_id(&options.building_id),
            options,
            anchor,
            mercator_unit,
            camera: Camera::new(),
            picking_camera: Camera::new(),
            input: PendingInput::default(),
            highlight: Highlight::default(),
            state: ModelState::Loading {
                pending_scale: None,
            },
        }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn anchor(&self) -> MercatorCoordinate {
        self.anchor
    }

    /// Mercator units per meter at the anchor.
    pub fn mercator_unit(&self) -> f64 {
        self.mercator_unit
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn model(&self) -> Option<&Model> {
        match &self.state {
            ModelState::Ready(model) => Some(model),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn highlighted(&self) -> Option<&BuildingId> {
        self.highlight.current()
    }

    pub fn pending_input(&self) -> &PendingInput {
        &self.input
    }

    /// Sets the visual multiplier on top of the meters-to-mercator factor.
    pub fn set_scale(&mut self, multiplier: f64) -> ScaleOutcome {
        match &mut self.state {
            ModelState::Loading { pending_scale } => {
                debug!(multiplier, "scale deferred until model loads");
                *pending_scale = Some(multiplier);
                ScaleOutcome::Deferred
            }
            ModelState::Ready(model) => {
                model.set_scale(self.mercator_unit * multiplier);
                ScaleOutcome::Applied
            }
            ModelState::Failed => {
                warn!(multiplier, layer = %self.layer_id, "scale ignored, model failed to load");
                ScaleOutcome::Ignored
            }
        }
    }

    /// Installs the loaded parts, applying a deferred multiplier if one was set.
    pub fn on_model_loaded(&mut self, parts: Vec<Part>) {
        let multiplier = match self.state {
            ModelState::Loading {
                pending_scale: Some(m),
            } => m,
            _ => self.options.mesh_scale,
        };
        let model = Model::new(
            parts,
            &self.options.building_id,
            self.mercator_unit * multiplier,
        );
        info!(
            layer = %self.layer_id,
            parts = model.len(),
            multiplier,
            "model loaded"
        );
        self.highlight = Highlight::default();
        self.state = ModelState::Ready(model);
    }

    pub fn on_model_failed(&mut self, err: &dyn Display) {
        error!(layer = %self.layer_id, url = %self.options.model_url, "model load failed: {err}");
        self.state = ModelState::Failed;
    }

    pub fn pointer_moved(&mut self, sample: PointerSample) {
        self.input.record_move(sample);
    }

    pub fn pointer_clicked(&mut self, sample: PointerSample) {
        self.input.record_click(sample);
    }

    /// Advances one host frame.
    ///
    /// `host_matrix` is the map's column-major view-projection for mercator
    /// space, `viewport` the current map canvas size in CSS pixels.
    pub fn render_frame(&mut self, host_matrix: &Mat4, viewport: Viewport) -> FrameOutput {
        let placement = model_transform(self.anchor, self.options.rotate);
        self.camera.projection = *host_matrix * placement;
        self.picking_camera.mirror_from(&self.camera);

        let mut out = FrameOutput {
            view_proj: self.camera.view_projection(),
            panel: None,
            highlight_changed: false,
        };

        let ModelState::Ready(model) = &mut self.state else {
            return out;
        };
        if model.is_empty() {
            return out;
        }
        let Some(frame) = self.input.take() else {
            return out;
        };

        let hit = pick_screen(model, &self.picking_camera, viewport, frame.pointer.screen());
        let hit_building = hit.and_then(|id| model.part(id)).map(|p| p.building_id.clone());
        out.highlight_changed = match &hit_building {
            Some(building) => self.highlight.highlight(model, building),
            None => self.highlight.reset(model),
        };
        if frame.click {
            out.panel = Some(if hit_building.is_some() {
                PanelUpdate::Show
            } else {
                PanelUpdate::Hide
            });
            debug!(hit = ?hit, "click processed");
        }
        out
    }

    /// Parts to draw this frame; empty until the model is ready.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let Some(model) = self.model() else {
            return Vec::new();
        };
        model
            .iter()
            .map(|(id, part)| DrawItem {
                part: id,
                world: model.part_world(part),
                base_color: part.base_color,
                emissive: part.emissive,
            })
            .collect()
    }
}
