use foundation::color::Rgb;
use foundation::math::Mat4;
use gltf::buffer::Source;
use scene::components::{MeshGeometry, Part};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to parse glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("buffer {0} is external; only self-contained GLB files are supported")]
    ExternalBuffer(usize),
    #[error("GLB has no binary chunk")]
    MissingBlob,
    #[error("model contains no drawable triangles")]
    Empty,
}

/// Decodes a binary glTF into one part per triangle primitive.
///
/// The default scene (or the first one) is walked depth first and every
/// node's transform is accumulated from the root. Primitives without
/// positions, or in a mode other than triangles, are skipped.
pub fn parts_from_glb(bytes: &[u8]) -> Result<Vec<Part>, AssetError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    for buffer in gltf.document.buffers() {
        if !matches!(buffer.source(), Source::Bin) {
            return Err(AssetError::ExternalBuffer(buffer.index()));
        }
    }
    let blob = gltf.blob.as_deref();
    if blob.is_none() && gltf.document.buffers().len() > 0 {
        return Err(AssetError::MissingBlob);
    }

    let Some(scene) = gltf
        .document
        .default_scene()
        .or_else(|| gltf.document.scenes().next())
    else {
        return Err(AssetError::Empty);
    };

    let mut parts = Vec::new();
    let mut stack: Vec<(gltf::Node<'_>, Mat4)> =
        scene.nodes().map(|n| (n, Mat4::IDENTITY)).collect();
    while let Some((node, parent)) = stack.pop() {
        let world = parent * node_matrix(&node);
        if let Some(mesh) = node.mesh() {
            collect_mesh(&mesh, &node, world, blob, &mut parts);
        }
        stack.extend(node.children().map(|c| (c, world)));
    }

    if parts.is_empty() {
        return Err(AssetError::Empty);
    }
    debug!(parts = parts.len(), bytes = bytes.len(), "decoded GLB");
    Ok(parts)
}

fn node_matrix(node: &gltf::Node<'_>) -> Mat4 {
    let m = node.transform().matrix();
    let mut cols = [0.0f64; 16];
    for (c, col) in m.iter().enumerate() {
        for (r, v) in col.iter().enumerate() {
            cols[c * 4 + r] = f64::from(*v);
        }
    }
    Mat4::from_cols_array(cols)
}

fn collect_mesh(
    mesh: &gltf::Mesh<'_>,
    node: &gltf::Node<'_>,
    world: Mat4,
    blob: Option<&[u8]>,
    out: &mut Vec<Part>,
) {
    let base_name = mesh
        .name()
        .or_else(|| node.name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh-{}", mesh.index()));

    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            warn!(mesh = %base_name, mode = ?prim.mode(), "skipping non-triangle primitive");
            continue;
        }
        let reader = prim.reader(|buffer| match buffer.source() {
            Source::Bin => blob,
            Source::Uri(_) => None,
        });

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|n| n.collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(idx) => idx.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let geometry = MeshGeometry::new(positions, normals, indices);
        if geometry.is_empty() {
            continue;
        }

        let material = prim.material();
        let base_color = material.pbr_metallic_roughness().base_color_factor();
        let emissive = Rgb::from_array(material.emissive_factor());

        let name = if mesh.primitives().len() > 1 {
            format!("{base_name}#{}", prim.index())
        } else {
            base_name.clone()
        };
        out.push(Part::new(name, geometry, world, base_color, emissive));
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetError, parts_from_glb};
    use foundation::color::Rgb;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    /// Two-triangle GLB: a root node translated by (0, 0, 5) with one child
    /// translated by (1, 0, 0). Both reference the same mesh.
    fn sample_glb() -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        let indices: [u16; 3] = [0, 1, 2];

        let mut bin = Vec::new();
        for p in positions {
            for v in p {
                bin.extend_from_slice(&v.to_le_bytes());
            }
        }
        for i in indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let bin_len = bin.len();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "root", "mesh": 0, "translation": [0.0, 0.0, 5.0], "children": [1] },
                { "name": "child", "mesh": 0, "translation": [1.0, 0.0, 0.0] }
            ],
            "meshes": [{
                "name": "slab",
                "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
            }],
            "materials": [{
                "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] },
                "emissiveFactor": [0.0, 0.0, 1.0]
            }],
            "buffers": [{ "byteLength": bin_len }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
            ],
            "accessors": [
                {
                    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [1.0, 2.0, 0.0]
                },
                { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
            ]
        });
        let mut json = serde_json::to_vec(&json).expect("json");
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    #[test]
    fn decodes_every_node_instance() {
        let parts = parts_from_glb(&sample_glb()).expect("decode");
        assert_eq!(parts.len(), 2);

        let mut offsets: Vec<Vec3> = parts
            .iter()
            .map(|p| p.node_transform.transform_point(Vec3::ZERO))
            .collect();
        offsets.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(offsets, vec![Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 5.0)]);
    }

    #[test]
    fn carries_geometry_and_material() {
        let parts = parts_from_glb(&sample_glb()).expect("decode");
        let part = &parts[0];
        assert_eq!(part.name, "slab");
        assert_eq!(part.geometry.indices, vec![0, 1, 2]);
        assert_eq!(part.local_bounds.max, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(part.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(part.emissive, Rgb::new(0.0, 0.0, 1.0));
        assert_eq!(part.original_emissive, part.emissive);
    }

    #[test]
    fn rejects_garbage() {
        let err = parts_from_glb(b"not a model").unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }
}
