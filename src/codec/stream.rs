use super::{Config, Err, MeshCodec};
use crate::core::bit_coder::{ByteReader, ByteWriter};
use crate::core::mesh::InterchangeMesh;

const MAGIC: [u8; 4] = *b"DRCB";
const VERSION: u8 = 1;

const FLAG_NORMALS: u8 = 1;
const FLAG_UVS: u8 = 1 << 1;
const FLAG_QUANTIZED: u8 = 1 << 2;

pub const MAX_QUANTIZATION_BITS: u8 = 30;

/// The default codec: a little-endian container with no entropy coding.
///
/// Layout: magic, version, flags, quantization depth, vertex and triangle
/// counts, position block (raw f32, or per-axis bbox min/range followed by
/// quantized u32 steps), normal block, uv block, face index block.
///
/// With quantization enabled each position component is reproduced within
/// `range / (2^bits - 1)` of the original, where `range` is the bounding-box
/// extent along that axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCodec;

impl MeshCodec for StreamCodec {
    fn encode<W: ByteWriter>(
        &self,
        mesh: &InterchangeMesh,
        writer: &mut W,
        cfg: &Config,
    ) -> Result<(), Err> {
        if let Some(bits) = cfg.position_quantization_bits {
            if bits == 0 || bits > MAX_QUANTIZATION_BITS {
                return Err(Err::UnsupportedQuantization(bits));
            }
        }

        let mut flags = 0u8;
        if mesh.normals.is_some() {
            flags |= FLAG_NORMALS;
        }
        if mesh.uvs.is_some() {
            flags |= FLAG_UVS;
        }
        if cfg.position_quantization_bits.is_some() {
            flags |= FLAG_QUANTIZED;
        }

        for byte in MAGIC {
            writer.write_u8(byte);
        }
        writer.write_u8(VERSION);
        writer.write_u8(flags);
        writer.write_u8(cfg.position_quantization_bits.unwrap_or(0));
        writer.write_u32(mesh.vertex_count() as u32);
        writer.write_u32(mesh.triangle_count() as u32);

        match cfg.position_quantization_bits {
            Some(bits) => encode_quantized_positions(&mesh.vertices, bits, writer),
            None => {
                for &v in &mesh.vertices {
                    writer.write_f32(v);
                }
            }
        }
        if let Some(normals) = &mesh.normals {
            for &n in normals {
                writer.write_f32(n);
            }
        }
        if let Some(uvs) = &mesh.uvs {
            for &t in uvs {
                writer.write_f32(t);
            }
        }
        for &index in &mesh.faces {
            writer.write_u32(index);
        }
        Ok(())
    }

    fn decode<R: ByteReader>(&self, reader: &mut R) -> Result<InterchangeMesh, Err> {
        for expected in MAGIC {
            if reader.read_u8()? != expected {
                return Err(Err::CorruptStream("missing DRCB magic".to_owned()));
            }
        }
        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(Err::CorruptStream(format!("unsupported stream version {version}")));
        }
        let flags = reader.read_u8()?;
        if flags & !(FLAG_NORMALS | FLAG_UVS | FLAG_QUANTIZED) != 0 {
            return Err(Err::CorruptStream(format!("unknown flag bits {flags:#04x}")));
        }
        let bits = reader.read_u8()?;
        let vertex_count = reader.read_u32()? as usize;
        let triangle_count = reader.read_u32()? as usize;

        let vertices = if flags & FLAG_QUANTIZED != 0 {
            if bits == 0 || bits > MAX_QUANTIZATION_BITS {
                return Err(Err::CorruptStream(format!("invalid quantization depth {bits}")));
            }
            decode_quantized_positions(vertex_count, bits, reader)?
        } else {
            read_f32s(vertex_count * 3, reader)?
        };
        let normals = if flags & FLAG_NORMALS != 0 {
            Some(read_f32s(vertex_count * 3, reader)?)
        } else {
            None
        };
        let uvs = if flags & FLAG_UVS != 0 {
            Some(read_f32s(vertex_count * 2, reader)?)
        } else {
            None
        };

        // header counts are untrusted; reads bound the work, so nothing is
        // preallocated from them
        let mut faces = Vec::new();
        for _ in 0..triangle_count * 3 {
            faces.push(reader.read_u32()?);
        }

        let mesh = InterchangeMesh { vertices, faces, normals, uvs };
        mesh.validate().map_err(|e| Err::CorruptStream(e.to_string()))?;
        Ok(mesh)
    }
}

fn read_f32s<R: ByteReader>(count: usize, reader: &mut R) -> Result<Vec<f32>, Err> {
    let mut out = Vec::new();
    for _ in 0..count {
        out.push(reader.read_f32()?);
    }
    Ok(out)
}

fn encode_quantized_positions<W: ByteWriter>(vertices: &[f32], bits: u8, writer: &mut W) {
    let steps = (1u32 << bits) - 1;

    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for triple in vertices.chunks_exact(3) {
        for axis in 0..3 {
            min[axis] = min[axis].min(triple[axis]);
            max[axis] = max[axis].max(triple[axis]);
        }
    }
    if vertices.is_empty() {
        min = [0.0; 3];
        max = [0.0; 3];
    }

    let mut range = [0.0f32; 3];
    for axis in 0..3 {
        range[axis] = max[axis] - min[axis];
    }
    for axis in 0..3 {
        writer.write_f32(min[axis]);
    }
    for axis in 0..3 {
        writer.write_f32(range[axis]);
    }

    for triple in vertices.chunks_exact(3) {
        for axis in 0..3 {
            let step = if range[axis] > 0.0 {
                (((triple[axis] - min[axis]) / range[axis]) * steps as f32).round() as u32
            } else {
                0
            };
            writer.write_u32(step.min(steps));
        }
    }
}

fn decode_quantized_positions<R: ByteReader>(
    vertex_count: usize,
    bits: u8,
    reader: &mut R,
) -> Result<Vec<f32>, Err> {
    let steps = (1u32 << bits) - 1;
    let mut min = [0.0f32; 3];
    for axis in 0..3 {
        min[axis] = reader.read_f32()?;
    }
    let mut range = [0.0f32; 3];
    for axis in 0..3 {
        range[axis] = reader.read_f32()?;
    }

    let mut vertices = Vec::new();
    for _ in 0..vertex_count {
        for axis in 0..3 {
            let step = reader.read_u32()?;
            vertices.push(min[axis] + (step as f32 / steps as f32) * range[axis]);
        }
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::core::shared::ConfigType;

    fn strip(vertex_count: usize) -> InterchangeMesh {
        // a zig-zag strip so positions span a real bounding box
        let mut vertices = Vec::new();
        for i in 0..vertex_count {
            vertices.extend_from_slice(&[i as f32, (i % 2) as f32, -(i as f32) * 0.5]);
        }
        let mut faces = Vec::new();
        for i in 0..vertex_count.saturating_sub(2) {
            faces.extend_from_slice(&[i as u32, i as u32 + 1, i as u32 + 2]);
        }
        InterchangeMesh { vertices, faces, normals: None, uvs: None }
    }

    fn lossless() -> Config {
        ConfigType::default()
    }

    fn quantized(bits: u8) -> Config {
        Config { position_quantization_bits: Some(bits) }
    }

    #[test]
    fn lossless_round_trip_is_exact() {
        let mut mesh = strip(10);
        mesh.normals = Some(vec![0.5; 30]);
        mesh.uvs = Some(vec![0.25; 20]);

        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &mesh, &mut bytes, &lossless()).unwrap();
        let decoded = codec::decode(&StreamCodec, &mut bytes.into_iter()).unwrap();
        assert_eq!(decoded, mesh);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mesh = strip(16);
        let encode = |cfg: &Config| {
            let mut bytes = Vec::new();
            codec::encode(&StreamCodec, &mesh, &mut bytes, cfg).unwrap();
            bytes
        };
        assert_eq!(encode(&lossless()), encode(&lossless()));
        assert_eq!(encode(&quantized(14)), encode(&quantized(14)));
    }

    #[test]
    fn quantized_round_trip_stays_within_tolerance() {
        let mesh = strip(32);
        let bits = 12;
        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &mesh, &mut bytes, &quantized(bits)).unwrap();
        let decoded = codec::decode(&StreamCodec, &mut bytes.into_iter()).unwrap();

        assert_eq!(decoded.vertex_count(), mesh.vertex_count());
        assert_eq!(decoded.faces, mesh.faces);

        // per-axis tolerance is range / (2^bits - 1)
        let steps = (1u32 << bits) - 1;
        let ranges = [31.0f32, 1.0, 15.5];
        for (i, (&got, &want)) in decoded.vertices.iter().zip(&mesh.vertices).enumerate() {
            let tolerance = ranges[i % 3] / steps as f32;
            assert!(
                (got - want).abs() <= tolerance,
                "component {i}: {got} vs {want} exceeds {tolerance}"
            );
        }
    }

    #[test]
    fn zero_or_excessive_quantization_depth_is_refused() {
        let mesh = strip(4);
        let mut bytes = Vec::new();
        assert!(matches!(
            codec::encode(&StreamCodec, &mesh, &mut bytes, &quantized(0)),
            Err(Err::UnsupportedQuantization(0))
        ));
        assert!(matches!(
            codec::encode(&StreamCodec, &mesh, &mut bytes, &quantized(31)),
            Err(Err::UnsupportedQuantization(31))
        ));
    }

    #[test]
    fn bad_magic_is_a_corrupt_stream() {
        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &strip(4), &mut bytes, &lossless()).unwrap();
        bytes[0] = b'X';
        let result = codec::decode(&StreamCodec, &mut bytes.into_iter());
        assert!(matches!(result, Err(Err::CorruptStream(_))));
    }

    #[test]
    fn truncated_stream_fails_cleanly() {
        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &strip(6), &mut bytes, &lossless()).unwrap();
        bytes.truncate(bytes.len() - 3);
        let result = codec::decode(&StreamCodec, &mut bytes.into_iter());
        assert!(matches!(result, Err(Err::NotEnoughData(_))));
    }

    #[test]
    fn unknown_flag_bits_are_rejected() {
        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &strip(4), &mut bytes, &lossless()).unwrap();
        bytes[5] |= 0x80;
        let result = codec::decode(&StreamCodec, &mut bytes.into_iter());
        assert!(matches!(result, Err(Err::CorruptStream(_))));
    }

    #[test]
    fn face_index_past_declared_vertex_count_never_reaches_the_builder() {
        // 10 vertices, raw positions: the face block starts at byte
        // 15 (header) + 120 (positions)
        let mesh = strip(10);
        let mut bytes = Vec::new();
        codec::encode(&StreamCodec, &mesh, &mut bytes, &lossless()).unwrap();
        let face_block = 15 + 10 * 3 * 4;
        bytes[face_block..face_block + 4].copy_from_slice(&15u32.to_le_bytes());

        let result = codec::decode(&StreamCodec, &mut bytes.into_iter());
        assert!(matches!(result, Err(Err::CorruptStream(_))));
    }
}
