use thiserror::Error;

use crate::core::mesh::{self, InterchangeMesh};
use crate::host::{self, HostScene, MeshCreation};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Refusing to build a mesh with no geometry")]
    EmptyMesh,

    #[error("Host error during mesh construction: {0}")]
    Host(#[from] host::Err),

    #[error("Malformed topology: {0}")]
    MalformedTopology(mesh::Err),
}

/// Reconstructs a host mesh from an interchange mesh. The mesh is validated
/// up front; no host call is made for degenerate or inconsistent input.
pub fn build<S: HostScene>(
    scene: &mut S,
    name: &str,
    mesh: &InterchangeMesh,
) -> Result<S::Handle, Err> {
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err(Err::EmptyMesh);
    }
    mesh.validate().map_err(Err::MalformedTopology)?;

    // uv pairs are split into one U and one V stream, one value per vertex
    let (us, vs) = match &mesh.uvs {
        Some(uvs) => {
            let us: Vec<f32> = uvs.iter().step_by(2).copied().collect();
            let vs: Vec<f32> = uvs.iter().skip(1).step_by(2).copied().collect();
            (Some(us), Some(vs))
        }
        None => (None, None),
    };

    let handle = scene.create_mesh(MeshCreation {
        name,
        vertices: &mesh.vertices,
        faces: &mesh.faces,
        us: us.as_deref(),
        vs: vs.as_deref(),
    })?;

    if let Some(normals) = &mesh.normals {
        scene.set_vertex_normals(&handle, normals)?;
    }

    scene.update_surface(&handle)?;

    // only a grouping that accepts arbitrary renderable members gets the mesh
    if scene.default_render_group_accepts_meshes() {
        scene.add_to_default_render_group(&handle)?;
    }

    log::debug!(
        "built '{}': {} vertices, {} triangles",
        name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryScene;

    fn quad_mesh() -> InterchangeMesh {
        InterchangeMesh {
            vertices: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            faces: vec![0, 1, 2, 0, 2, 3],
            normals: None,
            uvs: None,
        }
    }

    #[test]
    fn empty_mesh_is_rejected_before_any_host_call() {
        let mut scene = MemoryScene::new();
        let result = build(&mut scene, "empty", &InterchangeMesh::new());
        assert!(matches!(result, Err(Err::EmptyMesh)));
    }

    #[test]
    fn vertices_without_faces_are_rejected() {
        let mut scene = MemoryScene::new();
        let mesh = InterchangeMesh { faces: Vec::new(), ..quad_mesh() };
        assert!(matches!(build(&mut scene, "m", &mesh), Err(Err::EmptyMesh)));
    }

    #[test]
    fn unaligned_faces_are_malformed() {
        let mut scene = MemoryScene::new();
        let mut mesh = quad_mesh();
        mesh.faces.pop();
        assert!(matches!(build(&mut scene, "m", &mesh), Err(Err::MalformedTopology(_))));
    }

    #[test]
    fn out_of_range_face_index_is_malformed_not_a_panic() {
        let mut scene = MemoryScene::new();
        let mut mesh = quad_mesh();
        mesh.faces[4] = 9;
        assert!(matches!(
            build(&mut scene, "m", &mesh),
            Err(Err::MalformedTopology(mesh::Err::FaceIndexOutOfRange { index: 9, .. }))
        ));
    }

    #[test]
    fn uvs_without_normals_leave_default_normals_in_place() {
        let mut scene = MemoryScene::new();
        let mesh = InterchangeMesh {
            uvs: Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
            ..quad_mesh()
        };
        let handle = build(&mut scene, "textured", &mesh).unwrap();

        let built = scene.built_mesh(&handle).unwrap();
        assert_eq!(built.us.as_deref(), Some(&[0.0, 1.0, 1.0, 0.0][..]));
        assert_eq!(built.vs.as_deref(), Some(&[0.0, 0.0, 1.0, 1.0][..]));
        assert!(built.normal_overrides.is_none());
        assert!(built.surface_updated);
        assert!(scene.in_default_render_group(&handle));
    }

    #[test]
    fn normals_are_assigned_after_creation() {
        let mut scene = MemoryScene::new();
        let normals = vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ];
        let mesh = InterchangeMesh { normals: Some(normals.clone()), ..quad_mesh() };
        let handle = build(&mut scene, "flat", &mesh).unwrap();
        assert_eq!(
            scene.built_mesh(&handle).unwrap().normal_overrides.as_deref(),
            Some(&normals[..])
        );
    }

    #[test]
    fn closed_render_group_is_left_alone() {
        let mut scene = MemoryScene::with_closed_render_group();
        let handle = build(&mut scene, "m", &quad_mesh()).unwrap();
        assert!(!scene.in_default_render_group(&handle));
        assert!(scene.built_mesh(&handle).unwrap().surface_updated);
    }
}
