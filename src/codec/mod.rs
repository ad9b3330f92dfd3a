pub mod stream;

pub use stream::StreamCodec;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::bit_coder::{ByteReader, ByteWriter, ReaderErr};
use crate::core::mesh::{self, InterchangeMesh};
use crate::core::shared::ConfigType;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    #[error("Corrupt stream: {0}")]
    NotEnoughData(#[from] ReaderErr),

    #[error("Cannot encode mesh: {0}")]
    UnencodableMesh(mesh::Err),

    #[error("Unsupported quantization depth: {0} bits")]
    UnsupportedQuantization(u8),
}

/// Codec options handed through the translator. Mirrors the knobs the host
/// exposes in its export dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Position quantization depth in bits, 1..=30. `None` keeps raw f32.
    pub position_quantization_bits: Option<u8>,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self { position_quantization_bits: None }
    }
}

/// The opaque encode/decode pair the adapter is built around. An
/// implementation must be deterministic for identical input and config, must
/// preserve vertex count, triangle count, and attribute presence exactly, and
/// may quantize float values within its documented tolerance.
pub trait MeshCodec {
    fn encode<W: ByteWriter>(
        &self,
        mesh: &InterchangeMesh,
        writer: &mut W,
        cfg: &Config,
    ) -> Result<(), Err>;

    fn decode<R: ByteReader>(&self, reader: &mut R) -> Result<InterchangeMesh, Err>;
}

/// Encodes through a codec after checking that the mesh upholds the
/// interchange invariants.
pub fn encode<C, W>(
    codec: &C,
    mesh: &InterchangeMesh,
    writer: &mut W,
    cfg: &Config,
) -> Result<(), Err>
where
    C: MeshCodec,
    W: ByteWriter,
{
    mesh.validate().map_err(Err::UnencodableMesh)?;
    codec.encode(mesh, writer, cfg)
}

/// Decodes through a codec and re-validates the result, so a mesh handed on
/// to the builder can never carry out-of-range face indices.
pub fn decode<C, R>(codec: &C, reader: &mut R) -> Result<InterchangeMesh, Err>
where
    C: MeshCodec,
    R: ByteReader,
{
    let mesh = codec.decode(reader)?;
    mesh.validate().map_err(|e| Err::CorruptStream(e.to_string()))?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A codec that fabricates whatever mesh it is told to, for checking
    /// that the decode wrapper never lets an invalid mesh through.
    struct FixedCodec(InterchangeMesh);

    impl MeshCodec for FixedCodec {
        fn encode<W: ByteWriter>(
            &self,
            _mesh: &InterchangeMesh,
            _writer: &mut W,
            _cfg: &Config,
        ) -> Result<(), Err> {
            Ok(())
        }

        fn decode<R: ByteReader>(&self, _reader: &mut R) -> Result<InterchangeMesh, Err> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn decode_wrapper_rejects_out_of_range_indices() {
        let codec = FixedCodec(InterchangeMesh {
            vertices: vec![0.0; 9],
            faces: vec![0, 1, 15],
            normals: None,
            uvs: None,
        });
        let result = decode(&codec, &mut Vec::<u8>::new().into_iter());
        assert!(matches!(result, Err(Err::CorruptStream(_))));
    }

    #[test]
    fn encode_wrapper_rejects_inconsistent_meshes() {
        let mesh = InterchangeMesh {
            vertices: vec![0.0; 9],
            faces: vec![0, 1, 2],
            normals: Some(vec![0.0; 4]),
            uvs: None,
        };
        let mut out = Vec::new();
        let cfg: Config = ConfigType::default();
        let result = encode(&FixedCodec(InterchangeMesh::new()), &mesh, &mut out, &cfg);
        assert!(matches!(result, Err(Err::UnencodableMesh(_))));
    }
}
