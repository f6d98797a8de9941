use foundation::bounds::Aabb3;
use foundation::math::Mat4;

use crate::components::{BuildingId, Part, PartId};

/// A loaded model: its parts plus the uniform root scale.
///
/// The root scale converts model units into mercator units; placement and
/// orientation are carried by the camera matrix instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    parts: Vec<Part>,
    scale: f64,
}

impl Model {
    /// Builds a model and tags every part with `building_id`.
    pub fn new(mut parts: Vec<Part>, building_id: &BuildingId, scale: f64) -> Self {
        for part in &mut parts {
            part.building_id = building_id.clone();
        }
        Self { parts, scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn root_matrix(&self) -> Mat4 {
        Mat4::uniform_scale(self.scale)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.index())
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    /// Iterates parts with their ids in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PartId, &Part)> + '_ {
        self.parts
            .iter()
            .enumerate()
            .map(|(idx, part)| (PartId(idx as u32), part))
    }

    /// Scene-space transform of a part.
    pub fn part_world(&self, part: &Part) -> Mat4 {
        self.root_matrix() * part.node_transform
    }

    /// Scene-space bounds of a part: its local box pushed through the world transform.
    pub fn world_bounds(&self, part: &Part) -> Aabb3 {
        part.local_bounds.transformed(&self.part_world(part))
    }
}

#[cfg(test)]
mod tests {
    use super::Model;
    use crate::components::{BuildingId, MeshGeometry, Part, PartId};
    use foundation::color::Rgb;
    use foundation::math::{Mat4, Vec3};

    fn unit_cube_part(name: &str, node: Mat4) -> Part {
        Part::new(
            name,
            MeshGeometry::new(
                vec![[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
                Vec::new(),
                vec![0, 1, 2],
            ),
            node,
            [1.0; 4],
            Rgb::BLACK,
        )
    }

    #[test]
    fn tags_every_part() {
        let model = Model::new(
            vec![
                unit_cube_part("a", Mat4::IDENTITY),
                unit_cube_part("b", Mat4::IDENTITY),
            ],
            &BuildingId::new("ec3"),
            1.0,
        );
        assert!(model.parts().iter().all(|p| p.building_id.as_str() == "ec3"));
        assert_eq!(model.part(PartId(1)).map(|p| p.name.as_str()), Some("b"));
    }

    #[test]
    fn world_bounds_apply_root_scale_after_node_transform() {
        let node = Mat4::translation(Vec3::new(10.0, 0.0, 0.0));
        let model = Model::new(
            vec![unit_cube_part("a", node)],
            &BuildingId::new("ec3"),
            0.5,
        );
        let b = model.world_bounds(&model.parts()[0]);
        assert_eq!(b.min, Vec3::new(4.5, -0.5, -0.5));
        assert_eq!(b.max, Vec3::new(5.5, 0.5, 0.5));
    }
}
