use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::model::SemesterBlock;
use crate::util::{replace_file, to_json_pretty};

pub const SEMESTER_BLOCKS_FIELD: &str = "semester_blocks";
pub const UNIT_CODES_FIELD: &str = "unitCodes";

#[cfg(test)]
mod tests;

pub type Record = Map<String, Value>;

pub fn load_record(path: &Path) -> Result<Record> {
    let raw = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PipelineError::RecordNotFound {
            path: path.to_path_buf(),
        },
        _ => PipelineError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_record(path, &raw)
}

fn parse_record(path: &Path, raw: &[u8]) -> Result<Record> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|source| PipelineError::MalformedRecord {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Object(record) => Ok(record),
        _ => Err(PipelineError::RecordNotObject {
            path: path.to_path_buf(),
        }),
    }
}

pub fn set_semester_blocks(
    record: &mut Record,
    path: &Path,
    blocks: &[SemesterBlock],
) -> Result<()> {
    let value = serde_json::to_value(blocks).map_err(|source| PipelineError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    record.insert(SEMESTER_BLOCKS_FIELD.to_string(), value);
    Ok(())
}

pub fn merge_into_record(
    record_path: &Path,
    output_path: Option<&Path>,
    blocks: &[SemesterBlock],
) -> Result<PathBuf> {
    let mut record = load_record(record_path)?;
    let target = output_path.unwrap_or(record_path);

    set_semester_blocks(&mut record, target, blocks)?;
    let data = to_json_pretty(target, &record)?;
    let written = replace_file(target, &data)?;

    if written {
        info!(path = %target.display(), blocks = blocks.len(), "wrote course record");
    } else {
        info!(path = %target.display(), "course record already up to date");
    }

    Ok(target.to_path_buf())
}

pub fn load_unit_catalog(path: &Path) -> Result<Record> {
    match fs::read(path) {
        Ok(raw) => parse_record(path, &raw),
        Err(source) if source.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "unit catalogue missing, starting empty");
            Ok(Record::new())
        }
        Err(source) => Err(PipelineError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Unions `codes` into the catalogue's sorted `unitCodes` list. Older catalogues stored
/// `{"unitCode": ...}` objects; those are flattened to plain strings. Returns how many codes
/// were new.
pub fn merge_unit_codes(catalog: &mut Record, codes: &[String]) -> usize {
    let mut known = catalog
        .get(UNIT_CODES_FIELD)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(code) => Some(code.clone()),
                    Value::Object(object) => object
                        .get("unitCode")
                        .and_then(Value::as_str)
                        .map(ToOwned::to_owned),
                    _ => None,
                })
                .collect::<BTreeSet<String>>()
        })
        .unwrap_or_default();

    let before = known.len();
    known.extend(codes.iter().cloned());
    let added = known.len() - before;

    catalog.insert(
        UNIT_CODES_FIELD.to_string(),
        Value::Array(known.into_iter().map(Value::String).collect()),
    );

    added
}

pub fn write_unit_catalog(path: &Path, catalog: &Record) -> Result<bool> {
    let data = to_json_pretty(path, catalog)?;
    replace_file(path, &data)
}

pub fn update_unit_catalog(path: &Path, codes: &[String]) -> Result<usize> {
    let mut catalog = load_unit_catalog(path)?;
    let added = merge_unit_codes(&mut catalog, codes);
    let written = write_unit_catalog(path, &catalog)?;
    debug!(path = %path.display(), added, written, "unit catalogue merged");
    Ok(added)
}
