use std::time::Duration;

use formats::config::TransitionConfig;
use foundation::math::LngLat;
use tracing::{debug, info};

use crate::host::{FlyTo, MapHost};

/// Page element shown while the switched style loads.
pub trait LoadingIndicator {
    fn show(&mut self);
    fn hide_after(&mut self, delay: Duration);
}

/// Re-attaches a layer after the host discarded it with a style change.
pub type ReattachHook<H> = Box<dyn FnMut(&mut H)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionState {
    Base,
    Switched,
}

/// Double-click fly-to followed by a one-time style swap.
///
/// Each double-click arms one fly completion. The first completion seen in
/// `Base` swaps the style; all later completions only hide the indicator.
/// Once the new style reports data, the hooks run again in order.
pub struct StyleTransitionController<H, L> {
    config: TransitionConfig,
    loader: L,
    hooks: Vec<ReattachHook<H>>,
    state: TransitionState,
    armed_move_ends: u32,
    awaiting_style_data: bool,
}

impl<H: MapHost, L: LoadingIndicator> StyleTransitionController<H, L> {
    pub fn new(config: TransitionConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            hooks: Vec::new(),
            state: TransitionState::Base,
            armed_move_ends: 0,
            awaiting_style_data: false,
        }
    }

    pub fn with_hook(mut self, hook: impl FnMut(&mut H) + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn is_awaiting_style_data(&self) -> bool {
        self.awaiting_style_data
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.config.loader_delay_ms))
    }

    /// Runs every re-attach hook against the current style.
    pub fn attach_all(&mut self, host: &mut H) {
        for hook in &mut self.hooks {
            hook(host);
        }
    }

    pub fn on_double_click(&mut self, host: &mut H, at: LngLat) {
        let fly = FlyTo {
            center: at,
            zoom: self.config.zoom,
            speed: self.config.speed,
            curve: self.config.curve,
            pitch: self.config.pitch,
            bearing: host.bearing() + self.config.bearing_step,
            essential: true,
        };
        info!(lng = at.lng, lat = at.lat, "double click, flying");
        host.fly_to(&fly);
        self.armed_move_ends += 1;
    }

    /// Handles a camera move completion. Returns whether the style was swapped.
    pub fn on_move_end(&mut self, host: &mut H) -> bool {
        let armed = std::mem::take(&mut self.armed_move_ends);
        let mut swapped = false;
        for _ in 0..armed {
            match self.state {
                TransitionState::Base => {
                    host.set_style(&self.config.style);
                    self.loader.show();
                    self.awaiting_style_data = true;
                    self.state = TransitionState::Switched;
                    swapped = true;
                    info!(style = %self.config.style, "style switched");
                }
                TransitionState::Switched => {
                    debug!("fly finished after switch");
                    self.loader.hide_after(self.delay());
                }
            }
        }
        swapped
    }

    /// Handles the host's style-data event. Returns whether the hooks ran.
    pub fn on_style_data(&mut self, host: &mut H) -> bool {
        if !self.awaiting_style_data {
            return false;
        }
        self.awaiting_style_data = false;
        info!(style = %self.config.style, "style data loaded, re-attaching layers");
        self.attach_all(host);
        self.loader.hide_after(self.delay());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::{BUILDINGS_LAYER_ID, ExtrusionLayer};
    use crate::host::fake::FakeHost;
    use crate::host::{HostLayer, MapHost};
    use crate::layer::LayerId;
    use crate::style::{LayerType, StyleLayer};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct RecordingLoader {
        events: Vec<String>,
    }

    impl LoadingIndicator for RecordingLoader {
        fn show(&mut self) {
            self.events.push("show".into());
        }

        fn hide_after(&mut self, delay: Duration) {
            self.events.push(format!("hide {}ms", delay.as_millis()));
        }
    }

    fn controller() -> StyleTransitionController<FakeHost, RecordingLoader> {
        StyleTransitionController::new(TransitionConfig::default(), RecordingLoader::default())
            .with_hook(|host: &mut FakeHost| {
                ExtrusionLayer::default().install(host).expect("extrusion");
            })
            .with_hook(|host: &mut FakeHost| {
                let id = LayerId::new("3d-ec3-ec3");
                host.install_layer(&id, HostLayer::Custom(id.0.clone()), None)
                    .expect("overlay");
            })
    }

    fn host() -> FakeHost {
        FakeHost::with_layers(vec![StyleLayer::new("land", LayerType::Fill)])
    }

    #[test]
    fn double_click_flies_with_bearing_step() {
        let mut host = host();
        host.bearing = 20.0;
        let mut ctl = controller();
        ctl.on_double_click(&mut host, LngLat::new(55.0, 25.0));

        let fly = &host.flights[0];
        assert_eq!(fly.center, LngLat::new(55.0, 25.0));
        assert_eq!(fly.zoom, 18.0);
        assert_eq!(fly.pitch, 70.0);
        assert_eq!(fly.bearing, 40.0);
        assert!(fly.essential);
    }

    #[test]
    fn first_completion_swaps_style_second_only_hides_loader() {
        let mut host = host();
        let mut ctl = controller();

        ctl.on_double_click(&mut host, LngLat::new(0.0, 0.0));
        assert!(ctl.on_move_end(&mut host));
        assert_eq!(ctl.state(), TransitionState::Switched);
        assert_eq!(host.styles, vec!["mapbox://styles/mapbox/standard"]);
        assert_eq!(ctl.loader().events, vec!["show"]);

        ctl.on_double_click(&mut host, LngLat::new(0.0, 0.0));
        assert!(!ctl.on_move_end(&mut host));
        assert_eq!(host.styles.len(), 1);
        assert_eq!(ctl.loader().events, vec!["show", "hide 1500ms"]);
    }

    #[test]
    fn move_end_without_double_click_is_ignored() {
        let mut host = host();
        let mut ctl = controller();
        assert!(!ctl.on_move_end(&mut host));
        assert_eq!(ctl.state(), TransitionState::Base);
        assert!(host.styles.is_empty());
    }

    #[test]
    fn style_data_reattaches_once() {
        let mut host = host();
        let mut ctl = controller();
        ctl.attach_all(&mut host);
        assert_eq!(host.ids(), vec!["land", BUILDINGS_LAYER_ID, "3d-ec3-ec3"]);

        assert!(!ctl.on_style_data(&mut host));

        ctl.on_double_click(&mut host, LngLat::new(0.0, 0.0));
        ctl.on_move_end(&mut host);
        assert!(host.ids().is_empty());

        assert!(ctl.on_style_data(&mut host));
        assert_eq!(host.ids(), vec![BUILDINGS_LAYER_ID, "3d-ec3-ec3"]);
        assert_eq!(ctl.loader().events, vec!["show", "hide 1500ms"]);

        assert!(!ctl.on_style_data(&mut host));
    }

    #[test]
    fn repeated_hooks_do_not_duplicate_layers() {
        let mut host = host();
        let mut ctl = controller();
        ctl.attach_all(&mut host);
        ctl.attach_all(&mut host);
        assert_eq!(host.count(BUILDINGS_LAYER_ID), 1);
        assert_eq!(host.count("3d-ec3-ec3"), 1);
    }
}
