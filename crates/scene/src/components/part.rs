use foundation::bounds::Aabb3;
use foundation::color::Rgb;
use foundation::math::Mat4;

use super::{BuildingId, MeshGeometry};

/// Index of a part inside its model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

impl PartId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One drawable, highlightable piece of a loaded model.
///
/// The record keeps everything the overlay needs about the piece: which
/// building it belongs to, its material colors and the emissive color to
/// restore after a highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub building_id: BuildingId,
    pub geometry: MeshGeometry,
    /// Node transform relative to the model root.
    pub node_transform: Mat4,
    pub local_bounds: Aabb3,
    pub base_color: [f32; 4],
    pub emissive: Rgb,
    pub original_emissive: Rgb,
}

impl Part {
    pub fn new(
        name: impl Into<String>,
        geometry: MeshGeometry,
        node_transform: Mat4,
        base_color: [f32; 4],
        emissive: Rgb,
    ) -> Self {
        let local_bounds = geometry.bounds();
        Self {
            name: name.into(),
            building_id: BuildingId::default(),
            geometry,
            node_transform,
            local_bounds,
            base_color,
            emissive,
            original_emissive: emissive,
        }
    }

    pub fn restore_emissive(&mut self) {
        self.emissive = self.original_emissive;
    }
}

#[cfg(test)]
mod tests {
    use super::Part;
    use crate::components::MeshGeometry;
    use foundation::color::Rgb;
    use foundation::math::Mat4;

    #[test]
    fn remembers_original_emissive() {
        let mut part = Part::new(
            "roof",
            MeshGeometry::new(vec![[0.0; 3]], Vec::new(), vec![0, 0, 0]),
            Mat4::IDENTITY,
            [1.0; 4],
            Rgb::from_hex(0x101010),
        );
        part.emissive = Rgb::from_hex(0x66ff66);
        part.restore_emissive();
        assert_eq!(part.emissive, Rgb::from_hex(0x101010));
    }
}
