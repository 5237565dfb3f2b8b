use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::commands::{normalize_course_code, pdf_path, record_path};
use crate::merge::merge_into_record;
use crate::pipeline::{Pipeline, PipelineOptions};

pub fn run(args: ExtractArgs) -> Result<()> {
    let course_code = normalize_course_code(&args.source.course_code)?;
    let pdf_path = pdf_path(&args.source.pdf_dir, &course_code);
    let record_path = record_path(&args.courses_dir, &course_code);

    info!(
        course_code = %course_code,
        pdf = %pdf_path.display(),
        record = %record_path.display(),
        mode = args.structure.mode.as_str(),
        "starting extraction"
    );

    let pipeline = Pipeline::new()?;
    let structure = pipeline
        .run(
            &pdf_path,
            PipelineOptions {
                mode: args.structure.mode,
                max_pages: args.source.max_pages,
                stop_headings: &args.structure.stop_headings,
            },
        )
        .with_context(|| format!("failed to extract course structure for {course_code}"))?;

    if let Some(heading) = &structure.stop_heading {
        info!(heading = %heading, "ignored text after stop heading");
    }

    let written = merge_into_record(&record_path, args.output.as_deref(), &structure.blocks)
        .with_context(|| format!("failed to merge course structure for {course_code}"))?;

    info!(
        course_code = %course_code,
        path = %written.display(),
        blocks = structure.blocks.len(),
        "extraction completed"
    );

    Ok(())
}
