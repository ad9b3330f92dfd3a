use indexmap::IndexMap;
use thiserror::Error;

use super::{Corner, InterchangeMesh};

/// Builds an [InterchangeMesh] by welding polygon corners into shared
/// vertices. Two corners collapse into one vertex only when position, normal,
/// and uv all agree bit for bit, so attribute seams stay split and the
/// per-vertex interchange arrays lose nothing on the way out of the host.
/// Vertices are numbered in first-visit order, which makes extraction
/// deterministic.
pub struct MeshBuilder {
    vertices: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    faces: Vec<u32>,
    welded: IndexMap<CornerKey, u32>,
    // fixed by the first corner; every later corner must agree
    layout: Option<AttributeLayout>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct AttributeLayout {
    has_normals: bool,
    has_uvs: bool,
}

/// Weld key over the f32 bit patterns. -0.0 and 0.0 stay distinct vertices
/// and NaN corners weld only with bit-identical NaNs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct CornerKey {
    position: [u32; 3],
    normal: Option<[u32; 3]>,
    uv: Option<[u32; 2]>,
}

impl CornerKey {
    fn of(corner: &Corner) -> Self {
        Self {
            position: corner.position.map(f32::to_bits),
            normal: corner.normal.map(|n| n.map(f32::to_bits)),
            uv: corner.uv.map(|t| t.map(f32::to_bits)),
        }
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            faces: Vec::new(),
            welded: IndexMap::new(),
            layout: None,
        }
    }

    /// Welds a corner into the vertex arrays and returns its vertex index.
    pub fn add_corner(&mut self, corner: &Corner) -> Result<u32, Err> {
        let layout = AttributeLayout {
            has_normals: corner.normal.is_some(),
            has_uvs: corner.uv.is_some(),
        };
        match self.layout {
            None => self.layout = Some(layout),
            Some(expected) if expected != layout => {
                return Err(Err::AttributeMismatch {
                    expected_normals: expected.has_normals,
                    expected_uvs: expected.has_uvs,
                    found_normals: layout.has_normals,
                    found_uvs: layout.has_uvs,
                });
            }
            Some(_) => {}
        }

        let key = CornerKey::of(corner);
        if let Some(&index) = self.welded.get(&key) {
            return Ok(index);
        }

        let index = u32::try_from(self.welded.len()).map_err(|_| Err::TooManyVertices)?;
        self.vertices.extend_from_slice(&corner.position);
        if let Some(normal) = corner.normal {
            self.normals.extend_from_slice(&normal);
        }
        if let Some(uv) = corner.uv {
            self.uvs.extend_from_slice(&uv);
        }
        self.welded.insert(key, index);
        Ok(index)
    }

    /// Appends one triangle of welded vertex indices.
    pub fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.faces.extend_from_slice(&triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.welded.len()
    }

    pub fn build(self) -> Result<InterchangeMesh, Err> {
        let Self { vertices, normals, uvs, faces, layout, .. } = self;
        let mesh = InterchangeMesh {
            vertices,
            faces,
            normals: match layout {
                Some(l) if l.has_normals => Some(normals),
                _ => None,
            },
            uvs: match layout {
                Some(l) if l.has_uvs => Some(uvs),
                _ => None,
            },
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error(
        "Corner attribute layout changed mid-mesh; \
         the mesh started with normals: {expected_normals}, uvs: {expected_uvs} \
         but a corner carries normals: {found_normals}, uvs: {found_uvs}."
    )]
    AttributeMismatch {
        expected_normals: bool,
        expected_uvs: bool,
        found_normals: bool,
        found_uvs: bool,
    },

    #[error("Welded mesh failed validation: {0}")]
    Structure(#[from] super::Err),

    #[error("Vertex count exceeds the u32 index space.")]
    TooManyVertices,
}
