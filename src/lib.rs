// lib.rs

/// Contains the interchange mesh, the welding builder, and the byte-level
/// coder shared by the codec boundary.
pub mod core;

/// The host scene-graph boundary: the capability trait a host binds to.
pub mod host;

/// Export direction: host mesh to interchange mesh.
pub mod extract;

/// Import direction: interchange mesh to host mesh.
pub mod build;

/// The opaque codec boundary and the default stream container codec.
pub mod codec;

/// File-translator surface: registration lifecycle and the read/write entry
/// points a host wires its callbacks to.
pub mod translator;

/// Scoped file IO for encoded streams.
pub mod io;

/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::build::{self, build};
    pub use crate::codec::{self, Config, MeshCodec, StreamCodec};
    pub use crate::core::bit_coder::{ByteReader, ByteWriter};
    pub use crate::core::mesh::{builder::MeshBuilder, Corner, InterchangeMesh};
    pub use crate::core::shared::ConfigType;
    pub use crate::extract::{self, extract};
    pub use crate::host::{HostScene, MeshCreation, Polygon};
    pub use crate::translator::{Capabilities, Translator};
}
