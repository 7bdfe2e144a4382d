use std::fs::File;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{DockerError, DockerResult};

pub const BUILD_CONTEXT_CONTENT_TYPE: &str = "application/x-compressed-tar";

/// Packs `files` into a gzip'd tar, each stored under its file name at the
/// archive root.
pub fn pack_build_context(files: &[PathBuf]) -> DockerResult<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);

    for path in files {
        let name = path.file_name().ok_or_else(|| {
            DockerError::invalid_argument(format!(
                "build context entry has no file name: {}",
                path.display()
            ))
        })?;
        let mut file = File::open(path)?;
        archive.append_file(name, &mut file)?;
    }

    let encoder = archive.into_inner()?;
    Ok(encoder.finish()?)
}
