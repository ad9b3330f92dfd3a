//! An in-memory host used by the tests and as a reference for binding a real
//! scene graph to [HostScene].

use super::{Err, HostScene, MeshCreation, Polygon};

#[derive(Clone, Debug)]
enum Node {
    /// A mesh-bearing node: name plus polygons in storage order.
    Mesh { name: String, polygons: Vec<Polygon> },
    /// A node with no geometry behind it (a locator, a group, ...).
    Locator { name: String },
    /// A mesh constructed through [HostScene::create_mesh].
    Built(BuiltMesh),
}

/// What [MemoryScene::create_mesh] records, field for field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuiltMesh {
    pub name: String,
    pub vertices: Vec<f32>,
    pub faces: Vec<u32>,
    pub us: Option<Vec<f32>>,
    pub vs: Option<Vec<f32>>,
    /// `None` means host-computed default normals are in effect.
    pub normal_overrides: Option<Vec<f32>>,
    pub surface_updated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeHandle(usize);

#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<Node>,
    selection: Vec<usize>,
    render_group: Vec<usize>,
    accepts_render_members: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self { accepts_render_members: true, ..Self::default() }
    }

    /// A scene whose default grouping refuses arbitrary members, for
    /// exercising the capability check.
    pub fn with_closed_render_group() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, name: &str, polygons: Vec<Polygon>) -> NodeHandle {
        self.nodes.push(Node::Mesh { name: name.to_owned(), polygons });
        NodeHandle(self.nodes.len() - 1)
    }

    pub fn add_locator(&mut self, name: &str) -> NodeHandle {
        self.nodes.push(Node::Locator { name: name.to_owned() });
        NodeHandle(self.nodes.len() - 1)
    }

    pub fn select(&mut self, handle: NodeHandle) {
        self.selection.push(handle.0);
    }

    pub fn built_mesh(&self, handle: &NodeHandle) -> Option<&BuiltMesh> {
        match &self.nodes[handle.0] {
            Node::Built(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn in_default_render_group(&self, handle: &NodeHandle) -> bool {
        self.render_group.contains(&handle.0)
    }

    fn built_mut(&mut self, handle: &NodeHandle) -> Result<&mut BuiltMesh, Err> {
        match self.nodes.get_mut(handle.0) {
            Some(Node::Built(mesh)) => Ok(mesh),
            _ => Err(Err::Api(format!("node #{} was not built by this scene", handle.0))),
        }
    }
}

impl HostScene for MemoryScene {
    type Handle = NodeHandle;

    fn selected_meshes(&self) -> Result<Vec<NodeHandle>, Err> {
        Ok(self.selection.iter().map(|&i| NodeHandle(i)).collect())
    }

    fn node_name(&self, handle: &NodeHandle) -> String {
        match &self.nodes[handle.0] {
            Node::Mesh { name, .. } => name.clone(),
            Node::Locator { name } => name.clone(),
            Node::Built(mesh) => mesh.name.clone(),
        }
    }

    fn read_polygons(&self, handle: &NodeHandle) -> Result<Vec<Polygon>, Err> {
        match &self.nodes[handle.0] {
            Node::Mesh { polygons, .. } => Ok(polygons.clone()),
            _ => Err(Err::UnsupportedSelection(self.node_name(handle))),
        }
    }

    fn create_mesh(&mut self, creation: MeshCreation<'_>) -> Result<NodeHandle, Err> {
        self.nodes.push(Node::Built(BuiltMesh {
            name: creation.name.to_owned(),
            vertices: creation.vertices.to_vec(),
            faces: creation.faces.to_vec(),
            us: creation.us.map(<[f32]>::to_vec),
            vs: creation.vs.map(<[f32]>::to_vec),
            normal_overrides: None,
            surface_updated: false,
        }));
        Ok(NodeHandle(self.nodes.len() - 1))
    }

    fn set_vertex_normals(&mut self, handle: &NodeHandle, normals: &[f32]) -> Result<(), Err> {
        self.built_mut(handle)?.normal_overrides = Some(normals.to_vec());
        Ok(())
    }

    fn update_surface(&mut self, handle: &NodeHandle) -> Result<(), Err> {
        self.built_mut(handle)?.surface_updated = true;
        Ok(())
    }

    fn default_render_group_accepts_meshes(&self) -> bool {
        self.accepts_render_members
    }

    fn add_to_default_render_group(&mut self, handle: &NodeHandle) -> Result<(), Err> {
        self.render_group.push(handle.0);
        Ok(())
    }
}
