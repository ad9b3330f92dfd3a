use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[remain::sorted]
#[derive(Error, Debug)]
pub enum Err {
    #[error("Failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

/// Reads an encoded stream whole. The handle lives for this call only and is
/// released on every exit path.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, Err> {
    let mut file = File::open(path).map_err(|source| Err::Read { path: path.to_owned(), source })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| Err::Read { path: path.to_owned(), source })?;
    Ok(bytes)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), Err> {
    let mut file =
        File::create(path).map_err(|source| Err::Write { path: path.to_owned(), source })?;
    file.write_all(bytes).map_err(|source| Err::Write { path: path.to_owned(), source })
}
