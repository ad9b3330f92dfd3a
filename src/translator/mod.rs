use std::path::Path;
use std::sync::Mutex;

use lazy_static::lazy_static;
use thiserror::Error;

use crate::build;
use crate::codec::{self, Config, MeshCodec};
use crate::core::shared::ConfigType;
use crate::extract;
use crate::host::HostScene;
use crate::io;

#[remain::sorted]
#[derive(Error, Debug)]
pub enum Err {
    #[error("Translator is already registered")]
    AlreadyRegistered,

    #[error("Import failed: {0}")]
    Build(#[from] build::Err),

    #[error("Codec failure: {0}")]
    Codec(#[from] codec::Err),

    #[error("Nothing in the selection could be exported")]
    EmptySelection,

    #[error("Export failed: {0}")]
    Extract(#[from] extract::Err),

    #[error(transparent)]
    Io(#[from] io::Err),

    #[error("No translator is registered")]
    NotRegistered,
}

/// What the translator advertises to the host's file-type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub extension: String,
    pub have_read: bool,
    pub have_write: bool,
}

impl Capabilities {
    pub fn drc() -> Self {
        Self { extension: "drc".to_owned(), have_read: true, have_write: true }
    }
}

lazy_static! {
    // the one piece of process-wide state: the host registers the translator
    // once per session and tears it down once
    static ref REGISTRATION: Mutex<Option<Capabilities>> = Mutex::new(None);
}

/// Init hook, called exactly once when the host loads the plugin.
pub fn register(capabilities: Capabilities) -> Result<(), Err> {
    let mut slot = REGISTRATION.lock().expect("registration lock poisoned");
    if slot.is_some() {
        return Err(Err::AlreadyRegistered);
    }
    log::debug!("registering translator for .{}", capabilities.extension);
    *slot = Some(capabilities);
    Ok(())
}

/// Teardown hook, the counterpart of [register].
pub fn unregister() -> Result<(), Err> {
    let mut slot = REGISTRATION.lock().expect("registration lock poisoned");
    if slot.take().is_none() {
        return Err(Err::NotRegistered);
    }
    Ok(())
}

pub fn registration() -> Option<Capabilities> {
    REGISTRATION.lock().expect("registration lock poisoned").clone()
}

/// The file-translator surface a host wires its read/write callbacks to.
/// One call processes one file, synchronously, with no retries; the host
/// owns any retry offered at the UI level.
pub struct Translator<C: MeshCodec> {
    codec: C,
    cfg: Config,
}

/// What a write call did, for the host's report channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub exported: String,
    pub skipped: Vec<String>,
}

impl<C: MeshCodec> Translator<C> {
    pub fn new(codec: C) -> Self {
        Self { codec, cfg: ConfigType::default() }
    }

    pub fn with_config(codec: C, cfg: Config) -> Self {
        Self { codec, cfg }
    }

    /// Export entry point. Extracts the selection and encodes the first mesh
    /// to `path`; the stream format carries a single mesh, so the rest of
    /// the selection is reported back as skipped.
    pub fn write<S: HostScene>(
        &self,
        scene: &S,
        path: &Path,
        options: &str,
    ) -> Result<WriteSummary, Err> {
        let cfg = apply_options(self.cfg.clone(), options);

        let mut extracted = extract::extract(scene)?;
        if extracted.is_empty() {
            return Err(Err::EmptySelection);
        }
        let (name, mesh) = extracted.remove(0);
        let skipped: Vec<String> = extracted.into_iter().map(|(n, _)| n).collect();
        for left_behind in &skipped {
            log::warn!("'{}' not exported: the stream holds a single mesh", left_behind);
        }

        let mut bytes = Vec::new();
        codec::encode(&self.codec, &mesh, &mut bytes, &cfg)?;
        io::write_bytes(path, &bytes)?;
        log::debug!(
            "exported '{}' ({} vertices, {} triangles) to {:?}",
            name,
            mesh.vertex_count(),
            mesh.triangle_count(),
            path
        );
        Ok(WriteSummary { exported: name, skipped })
    }

    /// Import entry point. One decoded stream becomes one host mesh named
    /// after the file stem.
    pub fn read<S: HostScene>(&self, scene: &mut S, path: &Path) -> Result<S::Handle, Err> {
        let bytes = io::read_bytes(path)?;
        let mesh = codec::decode(&self.codec, &mut bytes.into_iter())?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("imported_mesh");
        Ok(build::build(scene, name, &mesh)?)
    }
}

/// Applies the host's raw `key=value;` option string on top of a base
/// config. Unknown keys and unparsable values are logged and ignored; a bad
/// option never fails an export.
fn apply_options(mut cfg: Config, options: &str) -> Config {
    for pair in options.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            log::debug!("ignoring malformed option '{}'", pair);
            continue;
        };
        match key.trim() {
            "quantization" | "position_quantization_bits" => match value.trim().parse::<u8>() {
                Ok(0) => cfg.position_quantization_bits = None,
                Ok(bits) => cfg.position_quantization_bits = Some(bits),
                Err(_) => log::debug!("ignoring quantization value '{}'", value),
            },
            other => log::debug!("ignoring unknown option '{}'", other),
        }
    }
    cfg
}
