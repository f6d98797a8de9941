use foundation::bounds::{Aabb2, Aabb3};
use foundation::math::Vec2;

use crate::camera::Camera;
use crate::components::PartId;
use crate::model::Model;

/// Size of the drawing surface in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// NDC x/y to pixel coordinates with y growing downwards.
    pub fn ndc_to_screen(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new((x + 1.0) / 2.0 * self.width, (-y + 1.0) / 2.0 * self.height)
    }
}

/// Screen rectangle covered by a scene-space box.
///
/// Only the `min` and `max` corners are projected and the rectangle is their
/// pixel-space extent. This is an approximation: under rotation or strong
/// perspective the other six corners may fall outside it.
pub fn screen_rect(camera: &Camera, viewport: Viewport, bounds: &Aabb3) -> Aabb2 {
    let a = camera.project(bounds.min);
    let b = camera.project(bounds.max);
    Aabb2::from_corners(
        viewport.ndc_to_screen(a.x, a.y),
        viewport.ndc_to_screen(b.x, b.y),
    )
}

/// First part (in model order) whose screen rectangle contains `pointer`.
///
/// Parts are not depth sorted; with overlapping rectangles the earlier part
/// wins regardless of which one is in front.
pub fn pick_screen(model: &Model, camera: &Camera, viewport: Viewport, pointer: Vec2) -> Option<PartId> {
    model.iter().find_map(|(id, part)| {
        let bounds = model.world_bounds(part);
        if bounds.is_empty() {
            return None;
        }
        screen_rect(camera, viewport, &bounds)
            .contains(pointer)
            .then_some(id)
    })
}
