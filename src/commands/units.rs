use anyhow::{Context, Result};
use tracing::info;

use crate::cli::UnitsArgs;
use crate::commands::{normalize_course_code, pdf_path, relationship_path};
use crate::merge::update_unit_catalog;
use crate::pipeline::Pipeline;

pub fn run(args: UnitsArgs) -> Result<()> {
    let course_code = normalize_course_code(&args.source.course_code)?;
    let pdf_path = pdf_path(&args.source.pdf_dir, &course_code);
    let relationship_path = relationship_path(&args.relationship_dir, &course_code);

    let pipeline = Pipeline::new()?;
    let codes = pipeline
        .unit_codes(&pdf_path, args.source.max_pages)
        .with_context(|| format!("failed to collect unit codes for {course_code}"))?;

    let added = update_unit_catalog(&args.catalog, &codes)
        .with_context(|| format!("failed to update unit catalogue for {course_code}"))?;
    update_unit_catalog(&relationship_path, &codes)
        .with_context(|| format!("failed to record units of {course_code}"))?;

    info!(
        course_code = %course_code,
        catalog = %args.catalog.display(),
        relationship = %relationship_path.display(),
        found = codes.len(),
        added,
        "unit catalogue updated"
    );

    Ok(())
}
