pub mod extract;
pub mod inspect;
pub mod units;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

pub fn normalize_course_code(raw: &str) -> Result<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() {
        bail!("course code must not be empty");
    }
    if !code.chars().all(|character| character.is_ascii_alphanumeric()) {
        bail!("course code must be ASCII letters and digits, got {raw:?}");
    }
    Ok(code)
}

pub fn pdf_path(pdf_dir: &Path, course_code: &str) -> PathBuf {
    pdf_dir.join(format!("{course_code}.pdf"))
}

pub fn record_path(courses_dir: &Path, course_code: &str) -> PathBuf {
    courses_dir.join(format!("{course_code}.json"))
}

pub fn relationship_path(relationship_dir: &Path, course_code: &str) -> PathBuf {
    relationship_dir.join(format!("{course_code}.json"))
}
