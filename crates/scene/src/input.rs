use foundation::math::Vec2;

/// Pointer position relative to the drawing surface, in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerSample {
    pub x_px: f64,
    pub y_px: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl PointerSample {
    pub fn new(x_px: f64, y_px: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            x_px,
            y_px,
            width_px,
            height_px,
        }
    }

    /// Sample from client coordinates and the surface's client rect origin.
    pub fn from_client(
        client_x: f64,
        client_y: f64,
        rect_left: f64,
        rect_top: f64,
        width_px: f64,
        height_px: f64,
    ) -> Self {
        Self::new(client_x - rect_left, client_y - rect_top, width_px, height_px)
    }

    /// Normalized device coordinates (y up).
    pub fn ndc(&self) -> Vec2 {
        Vec2::new(
            (self.x_px / self.width_px) * 2.0 - 1.0,
            -(self.y_px / self.height_px) * 2.0 + 1.0,
        )
    }

    pub fn screen(&self) -> Vec2 {
        Vec2::new(self.x_px, self.y_px)
    }
}

/// Input consumed by a single frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputFrame {
    pub pointer: PointerSample,
    pub click: bool,
}

/// Pointer state written by event handlers and drained by the render loop.
#[derive(Debug, Clone, Default)]
pub struct PendingInput {
    pointer: Option<PointerSample>,
    hover_pending: bool,
    click_pending: bool,
}

impl PendingInput {
    pub fn record_move(&mut self, sample: PointerSample) {
        self.pointer = Some(sample);
        self.hover_pending = true;
    }

    pub fn record_click(&mut self, sample: PointerSample) {
        self.pointer = Some(sample);
        self.hover_pending = true;
        self.click_pending = true;
    }

    pub fn pointer(&self) -> Option<PointerSample> {
        self.pointer
    }

    pub fn hover_pending(&self) -> bool {
        self.hover_pending
    }

    pub fn click_pending(&self) -> bool {
        self.click_pending
    }

    /// Takes the pending work for this frame, clearing both flags.
    ///
    /// Returns `None` (and leaves the flags alone) when there is nothing to
    /// process: no hover pending or no pointer sample yet. The last sample is
    /// kept.
    pub fn take(&mut self) -> Option<InputFrame> {
        if !self.hover_pending {
            return None;
        }
        let pointer = self.pointer?;
        let click = self.click_pending;
        self.hover_pending = false;
        self.click_pending = false;
        Some(InputFrame { pointer, click })
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingInput, PointerSample};
    use foundation::math::Vec2;

    #[test]
    fn ndc_maps_corners() {
        let top_left = PointerSample::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(top_left.ndc(), Vec2::new(-1.0, 1.0));
        let center = PointerSample::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(center.ndc(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn client_coordinates_are_made_relative() {
        let s = PointerSample::from_client(130.0, 70.0, 30.0, 20.0, 200.0, 100.0);
        assert_eq!(s.screen(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn take_consumes_once() {
        let mut input = PendingInput::default();
        assert!(input.take().is_none());

        input.record_click(PointerSample::new(1.0, 2.0, 10.0, 10.0));
        let frame = input.take().expect("pending");
        assert!(frame.click);
        assert!(input.take().is_none());
        assert!(input.pointer().is_some());

        input.record_move(PointerSample::new(3.0, 4.0, 10.0, 10.0));
        let frame = input.take().expect("pending");
        assert!(!frame.click);
        assert_eq!(frame.pointer.x_px, 3.0);
    }

    #[test]
    fn later_move_keeps_click_pending() {
        let mut input = PendingInput::default();
        input.record_click(PointerSample::new(1.0, 1.0, 10.0, 10.0));
        input.record_move(PointerSample::new(5.0, 5.0, 10.0, 10.0));
        let frame = input.take().expect("pending");
        assert!(frame.click);
        assert_eq!(frame.pointer.x_px, 5.0);
    }
}
