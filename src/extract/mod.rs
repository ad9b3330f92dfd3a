use thiserror::Error;

use crate::core::mesh::{builder, builder::MeshBuilder, InterchangeMesh};
use crate::host::{self, HostScene};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Host error during extraction: {0}")]
    Host(#[from] host::Err),

    #[error("Welding failed: {0}")]
    Weld(#[from] builder::Err),
}

/// Walks the current selection and flattens every mesh-bearing node into an
/// interchange mesh, in selection order. Per-node failures are logged and
/// skipped; one bad node never aborts the batch.
pub fn extract<S: HostScene>(scene: &S) -> Result<Vec<(String, InterchangeMesh)>, Err> {
    let mut out = Vec::new();
    for handle in scene.selected_meshes()? {
        let name = scene.node_name(&handle);
        match extract_node(scene, &handle) {
            Ok(mesh) if mesh.is_empty() => {
                log::debug!("skipping '{}': no polygons", name);
            }
            Ok(mesh) => out.push((name, mesh)),
            Err(Err::Host(host::Err::UnsupportedSelection(node))) => {
                log::debug!("skipping '{}': not mesh geometry", node);
            }
            Err(e) => {
                log::warn!("skipping '{}': {}", name, e);
            }
        }
    }
    Ok(out)
}

/// Flattens one node. Polygons are visited in native index order and corners
/// are welded by their full attribute tuple, so extracting the same
/// unmodified mesh twice yields identical arrays.
pub fn extract_node<S: HostScene>(
    scene: &S,
    handle: &S::Handle,
) -> Result<InterchangeMesh, Err> {
    let polygons = scene.read_polygons(handle)?;
    let mut builder = MeshBuilder::new();
    let mut welded = Vec::new();
    for polygon in &polygons {
        welded.clear();
        for corner in &polygon.corners {
            welded.push(builder.add_corner(corner)?);
        }
        // local corner indices are range-checked by triangles()
        for [a, b, c] in polygon.triangles()? {
            builder.add_triangle([welded[a], welded[b], welded[c]]);
        }
    }
    Ok(builder.build()?)
}
