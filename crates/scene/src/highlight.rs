use foundation::color::Rgb;
use tracing::debug;

use crate::components::BuildingId;
use crate::model::Model;

pub const HIGHLIGHT_COLOR: Rgb = Rgb::from_hex(0x66ff66);

/// Tracks the single highlighted building.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    current: Option<BuildingId>,
    color: Rgb,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            current: None,
            color: HIGHLIGHT_COLOR,
        }
    }
}

impl Highlight {
    pub fn current(&self) -> Option<&BuildingId> {
        self.current.as_ref()
    }

    /// Highlights every part of `id`. Returns whether anything changed.
    ///
    /// All parts get their original emissive back before the new building is
    /// lit, so at most one building is highlighted at a time.
    pub fn highlight(&mut self, model: &mut Model, id: &BuildingId) -> bool {
        if self.current.as_ref() == Some(id) {
            return false;
        }
        restore_all(model);
        for part in model.parts_mut().iter_mut().filter(|p| &p.building_id == id) {
            part.emissive = self.color;
        }
        debug!(building = %id, "highlighted");
        self.current = Some(id.clone());
        true
    }

    /// Restores every part. Returns whether a building was highlighted.
    pub fn reset(&mut self, model: &mut Model) -> bool {
        if self.current.take().is_none() {
            return false;
        }
        restore_all(model);
        true
    }
}

fn restore_all(model: &mut Model) {
    model.parts_mut().iter_mut().for_each(|p| p.restore_emissive());
}

#[cfg(test)]
mod tests {
    use super::{HIGHLIGHT_COLOR, Highlight};
    use crate::components::{BuildingId, MeshGeometry, Part};
    use crate::model::Model;
    use foundation::color::Rgb;
    use foundation::math::Mat4;

    fn part(name: &str, emissive: u32) -> Part {
        Part::new(
            name,
            MeshGeometry::new(vec![[0.0; 3]], Vec::new(), vec![0, 0, 0]),
            Mat4::IDENTITY,
            [1.0; 4],
            Rgb::from_hex(emissive),
        )
    }

    fn model() -> Model {
        Model::new(
            vec![part("a", 0x000000), part("b", 0x000000)],
            &BuildingId::new("x"),
            1.0,
        )
    }

    #[test]
    fn highlight_lights_every_part_of_the_building() {
        let mut m = model();
        let mut h = Highlight::default();
        assert!(h.highlight(&mut m, &BuildingId::new("x")));
        assert!(m.parts().iter().all(|p| p.emissive == HIGHLIGHT_COLOR));
        assert_eq!(h.current().map(BuildingId::as_str), Some("x"));
    }

    #[test]
    fn repeat_highlight_is_a_no_op() {
        let mut m = model();
        let mut h = Highlight::default();
        h.highlight(&mut m, &BuildingId::new("x"));
        assert!(!h.highlight(&mut m, &BuildingId::new("x")));
    }

    #[test]
    fn switching_restores_previous_building() {
        let mut m = model();
        m.parts_mut()[1].building_id = BuildingId::new("y");
        m.parts_mut()[1].original_emissive = Rgb::from_hex(0x202020);

        let mut h = Highlight::default();
        h.highlight(&mut m, &BuildingId::new("y"));
        assert_eq!(m.parts()[1].emissive, HIGHLIGHT_COLOR);

        h.highlight(&mut m, &BuildingId::new("x"));
        assert_eq!(m.parts()[0].emissive, HIGHLIGHT_COLOR);
        assert_eq!(m.parts()[1].emissive, Rgb::from_hex(0x202020));
    }

    #[test]
    fn reset_restores_originals() {
        let mut m = model();
        let mut h = Highlight::default();
        assert!(!h.reset(&mut m));
        h.highlight(&mut m, &BuildingId::new("x"));
        assert!(h.reset(&mut m));
        assert!(m.parts().iter().all(|p| p.emissive == Rgb::BLACK));
        assert!(h.current().is_none());
    }
}
