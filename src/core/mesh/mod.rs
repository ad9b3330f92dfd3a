pub mod builder;

use thiserror::Error;

/// The canonical mesh representation passed across the codec boundary.
/// Positions, normals, and texture coordinates are flat arrays sharing one
/// per-vertex index; `faces` holds fully triangulated index triples. There is
/// no per-corner indirection, so any corner splitting must happen before a
/// value of this type is produced (see [builder::MeshBuilder]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterchangeMesh {
    /// Flattened xyz triples; `len` is a multiple of 3.
    pub vertices: Vec<f32>,
    /// Flattened triangle index triples into `vertices`.
    pub faces: Vec<u32>,
    /// Per-vertex normal triples, `vertex_count * 3` floats when present.
    pub normals: Option<Vec<f32>>,
    /// Per-vertex uv pairs, `vertex_count * 2` floats when present.
    pub uvs: Option<Vec<f32>>,
}

impl InterchangeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Iterates the faces as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.chunks_exact(3).map(|f| [f[0], f[1], f[2]])
    }

    /// Checks every structural invariant of the interchange contract. Called
    /// at the builder entry and as the post-decode check at the codec
    /// boundary.
    pub fn validate(&self) -> Result<(), Err> {
        if self.vertices.len() % 3 != 0 {
            return Err(Err::UnalignedVertices(self.vertices.len()));
        }
        if self.faces.len() % 3 != 0 {
            return Err(Err::UnalignedFaces(self.faces.len()));
        }
        let vertex_count = self.vertex_count();
        if let Some(index) = self.faces.iter().copied().find(|&i| i as usize >= vertex_count) {
            return Err(Err::FaceIndexOutOfRange { index, vertex_count });
        }
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count * 3 {
                return Err(Err::AttributeSizeMismatch {
                    attribute: "normals",
                    len: normals.len(),
                    expected: vertex_count * 3,
                });
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count * 2 {
                return Err(Err::AttributeSizeMismatch {
                    attribute: "uvs",
                    len: uvs.len(),
                    expected: vertex_count * 2,
                });
            }
        }
        Ok(())
    }
}

/// One polygon's reference to a vertex together with the attribute values the
/// host exposes at that corner. Corners sharing a vertex may disagree on
/// normal or uv; the welding builder decides whether they collapse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub position: [f32; 3],
    pub normal: Option<[f32; 3]>,
    pub uv: Option<[f32; 2]>,
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("The {attribute} array has {len} values but the mesh needs {expected}.")]
    AttributeSizeMismatch { attribute: &'static str, len: usize, expected: usize },

    #[error("Face index {index} is out of range for {vertex_count} vertices.")]
    FaceIndexOutOfRange { index: u32, vertex_count: usize },

    #[error("The face array has {0} entries, which is not a multiple of 3.")]
    UnalignedFaces(usize),

    #[error("The vertex array has {0} floats, which is not a multiple of 3.")]
    UnalignedVertices(usize),
}
