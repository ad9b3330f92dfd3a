pub mod memory;

use thiserror::Error;

pub use crate::core::mesh::Corner;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Host API call failed: {0}")]
    Api(String),

    #[error("Selected node '{0}' does not carry mesh geometry")]
    UnsupportedSelection(String),
}

/// One polygon as the host exposes it: corners in native winding order plus,
/// when the host supplies one, its triangulation as local corner-index
/// triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub corners: Vec<Corner>,
    pub triangulation: Option<Vec<[usize; 3]>>,
}

impl Polygon {
    pub fn from_corners(corners: Vec<Corner>) -> Self {
        Self { corners, triangulation: None }
    }

    /// The polygon's triangulation in local corner indices, falling back to a
    /// fan over the corner list when the host supplied none. Triangles
    /// referencing corners outside this polygon are a host defect and fail.
    pub fn triangles(&self) -> Result<Vec<[usize; 3]>, Err> {
        let triangles = match &self.triangulation {
            Some(triangles) => triangles.clone(),
            None if self.corners.len() < 3 => Vec::new(),
            None => (1..self.corners.len() - 1).map(|i| [0, i, i + 1]).collect(),
        };
        for triangle in &triangles {
            if triangle.iter().any(|&c| c >= self.corners.len()) {
                return Err(Err::Api(format!(
                    "triangulation {:?} references corners outside a {}-corner polygon",
                    triangle,
                    self.corners.len()
                )));
            }
        }
        Ok(triangles)
    }
}

/// Everything the adapter needs from a host scene graph. A concrete host
/// binds this in an adapter layer of its own; the extractor and builder only
/// ever talk to this surface.
pub trait HostScene {
    /// Opaque per-node handle.
    type Handle;

    /// The current selection, filtered to nodes the host considers
    /// geometric. Nodes that later turn out to carry no mesh are skipped by
    /// the extractor, not reported as batch failures.
    fn selected_meshes(&self) -> Result<Vec<Self::Handle>, Err>;

    fn node_name(&self, handle: &Self::Handle) -> String;

    /// Polygons of the node in native index order. Fails with
    /// [Err::UnsupportedSelection] when the node resolves to no mesh.
    fn read_polygons(&self, handle: &Self::Handle) -> Result<Vec<Polygon>, Err>;

    /// Creates a triangulated mesh. Texture coordinates arrive deinterleaved
    /// as one U and one V stream, one value per vertex.
    fn create_mesh(&mut self, creation: MeshCreation<'_>) -> Result<Self::Handle, Err>;

    /// Overrides per-vertex normals across the whole vertex range.
    fn set_vertex_normals(&mut self, handle: &Self::Handle, normals: &[f32]) -> Result<(), Err>;

    /// Recomputes whatever derived surface data the host maintains
    /// (tangents, bounding volume).
    fn update_surface(&mut self, handle: &Self::Handle) -> Result<(), Err>;

    /// Whether the default renderable grouping accepts arbitrary members.
    fn default_render_group_accepts_meshes(&self) -> bool;

    fn add_to_default_render_group(&mut self, handle: &Self::Handle) -> Result<(), Err>;
}

/// Arguments for [HostScene::create_mesh].
#[derive(Clone, Copy, Debug)]
pub struct MeshCreation<'a> {
    pub name: &'a str,
    pub vertices: &'a [f32],
    pub faces: &'a [u32],
    pub us: Option<&'a [f32]>,
    pub vs: Option<&'a [f32]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(position: [f32; 3]) -> Corner {
        Corner { position, normal: None, uv: None }
    }

    #[test]
    fn fan_triangulation_of_a_pentagon() {
        let polygon = Polygon::from_corners(
            (0..5).map(|i| corner([i as f32, 0.0, 0.0])).collect(),
        );
        assert_eq!(polygon.triangles().unwrap(), vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn degenerate_polygon_has_no_triangles() {
        let polygon = Polygon::from_corners(vec![corner([0.0; 3]), corner([1.0, 0.0, 0.0])]);
        assert!(polygon.triangles().unwrap().is_empty());
    }

    #[test]
    fn host_triangulation_is_taken_verbatim() {
        let mut polygon = Polygon::from_corners(
            (0..4).map(|i| corner([i as f32, 0.0, 0.0])).collect(),
        );
        polygon.triangulation = Some(vec![[1, 2, 3], [1, 3, 0]]);
        assert_eq!(polygon.triangles().unwrap(), vec![[1, 2, 3], [1, 3, 0]]);
    }

    #[test]
    fn out_of_polygon_triangulation_is_rejected() {
        let mut polygon = Polygon::from_corners(
            (0..3).map(|i| corner([i as f32, 0.0, 0.0])).collect(),
        );
        polygon.triangulation = Some(vec![[0, 1, 5]]);
        assert!(matches!(polygon.triangles(), Err(Err::Api(_))));
    }
}
