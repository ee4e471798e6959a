//! Pipeline artifact persistence.
//!
//! File layout:
//! - 4 bytes: magic (`NSP\x01`)
//! - 4 bytes: format version (u32 little-endian)
//! - 32 bytes: SHA-256 of the payload
//! - N bytes: JSON payload

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use noshow_model::{NoShowError, Result};

use crate::pipeline::TrainedPipeline;

pub const MAGIC_BYTES: [u8; 4] = *b"NSP\x01";

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Default artifact file name.
pub const DEFAULT_ARTIFACT_FILE: &str = "no_show_pipeline.nsp";

const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = 4 + 4 + DIGEST_LEN;

fn io_error(operation: &'static str, path: &Path, source: std::io::Error) -> NoShowError {
    NoShowError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> NoShowError {
    NoShowError::InvalidArtifact {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Serialize a pipeline into artifact bytes.
pub fn encode_pipeline(pipeline: &TrainedPipeline) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(pipeline)?;
    let digest = Sha256::digest(&payload);

    let mut output = Vec::with_capacity(HEADER_LEN + payload.len());
    output.extend_from_slice(&MAGIC_BYTES);
    output.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
    output.extend_from_slice(&digest);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Validate artifact bytes and deserialize the pipeline.
///
/// `path` is only used in error messages.
pub fn decode_pipeline(bytes: &[u8], path: &Path) -> Result<TrainedPipeline> {
    if bytes.len() < HEADER_LEN {
        return Err(invalid(path, "file too small"));
    }
    if bytes[0..4] != MAGIC_BYTES {
        return Err(invalid(path, "not a no-show pipeline (invalid magic bytes)"));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version > ARTIFACT_VERSION {
        return Err(NoShowError::UnsupportedArtifactVersion {
            found: version,
            max_supported: ARTIFACT_VERSION,
        });
    }

    let expected = &bytes[8..HEADER_LEN];
    let payload = &bytes[HEADER_LEN..];
    let actual = Sha256::digest(payload);
    if actual.as_slice() != expected {
        return Err(invalid(
            path,
            format!(
                "checksum mismatch (expected {}, found {})",
                hex::encode(expected),
                hex::encode(actual)
            ),
        ));
    }

    serde_json::from_slice(payload).map_err(|e| invalid(path, e.to_string()))
}

/// Save a pipeline artifact.
///
/// Uses atomic write (temp file + rename) so a crash never leaves a
/// truncated artifact behind.
pub fn save_pipeline(pipeline: &TrainedPipeline, path: &Path) -> Result<()> {
    let bytes = encode_pipeline(pipeline)?;
    let temp_path = path.with_extension("nsp.tmp");

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| io_error("create directory", parent, e))?;
    }

    let mut file = File::create(&temp_path).map_err(|e| io_error("create", &temp_path, e))?;
    file.write_all(&bytes)
        .map_err(|e| io_error("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| io_error("sync", &temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| io_error("rename", path, e))?;

    info!(
        path = %path.display(),
        bytes = bytes.len(),
        digest = %hex::encode(&bytes[8..16]),
        "saved pipeline"
    );
    Ok(())
}

/// Load a pipeline artifact.
///
/// A missing file is [`NoShowError::ArtifactNotFound`]; a file that exists
/// but fails validation is [`NoShowError::InvalidArtifact`].
pub fn load_pipeline(path: &Path) -> Result<TrainedPipeline> {
    if !path.is_file() {
        return Err(NoShowError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| io_error("read", path, e))?;
    let pipeline = decode_pipeline(&bytes, path)?;
    info!(
        path = %path.display(),
        trained_at = pipeline.trained_at(),
        features = pipeline.preprocessor().n_features(),
        "loaded pipeline"
    );
    Ok(pipeline)
}
