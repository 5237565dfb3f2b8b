use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn to_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, PipelineError> {
    let mut data = serde_json::to_vec_pretty(value).map_err(|source| PipelineError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    data.push(b'\n');
    Ok(data)
}

/// Replaces `path` with `data` through a sibling temporary file and a rename, so readers
/// never observe a partially written file. Returns false when the contents were already
/// identical and nothing was written.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<bool, PipelineError> {
    let write_error = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if fs::read(path).is_ok_and(|existing| existing == data) {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let temp_path = temp_sibling(path);
    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(source) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(source));
    }

    Ok(true)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "record.json".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
